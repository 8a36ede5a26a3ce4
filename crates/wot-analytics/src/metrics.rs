//! Readers for the externally computed metrics files.
//!
//! Connectivity (`msd.csv`):
//! `keyid;msd;in;out;cross;inStrong;outStrong;crossStrong;eccentricity;inStrongSet`
//!
//! Centrality (`centrality.csv`): `keyid;absoluteCentrality`

use std::io::BufRead;
use std::str::FromStr;

use wot_core::KeyId;

use crate::error::AnalyticsError;

pub const CONNECTIVITY_FILE: &str = "connectivity table";
pub const CENTRALITY_FILE: &str = "centrality table";

/// One row of the connectivity table.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectivityRecord {
    pub key_id: KeyId,
    pub mean_distance: f64,
    pub in_degree: u32,
    pub out_degree: u32,
    pub cross_degree: u32,
    /// Degrees restricted to edges with both endpoints in the strong set.
    pub in_degree_strong: u32,
    pub out_degree_strong: u32,
    pub cross_degree_strong: u32,
    pub eccentricity: u32,
    pub in_strong_set: bool,
}

/// One row of the centrality table.
#[derive(Debug, Clone, PartialEq)]
pub struct CentralityRecord {
    pub key_id: KeyId,
    pub absolute: f64,
}

struct Row<'a> {
    file: &'static str,
    line: usize,
    fields: Vec<&'a str>,
}

impl<'a> Row<'a> {
    fn split(file: &'static str, line: usize, text: &'a str, expected: usize) -> Result<Self, AnalyticsError> {
        let fields: Vec<&str> = text.trim().split(';').collect();
        if fields.len() < expected {
            return Err(AnalyticsError::Malformed {
                file,
                line,
                reason: format!("{} fields, expected {}", fields.len(), expected),
            });
        }
        Ok(Self { file, line, fields })
    }

    fn parse<T: FromStr>(&self, index: usize) -> Result<T, AnalyticsError> {
        self.fields[index].trim().parse().map_err(|_| AnalyticsError::Malformed {
            file: self.file,
            line: self.line,
            reason: format!("field {}: cannot parse {:?}", index, self.fields[index]),
        })
    }

    fn key_id(&self) -> Result<KeyId, AnalyticsError> {
        KeyId::new(self.fields[0]).map_err(|e| AnalyticsError::Malformed {
            file: self.file,
            line: self.line,
            reason: e.to_string(),
        })
    }
}

impl ConnectivityRecord {
    pub fn parse(text: &str, line: usize) -> Result<Self, AnalyticsError> {
        let row = Row::split(CONNECTIVITY_FILE, line, text, 10)?;
        Ok(Self {
            key_id: row.key_id()?,
            mean_distance: row.parse(1)?,
            in_degree: row.parse(2)?,
            out_degree: row.parse(3)?,
            cross_degree: row.parse(4)?,
            in_degree_strong: row.parse(5)?,
            out_degree_strong: row.parse(6)?,
            cross_degree_strong: row.parse(7)?,
            eccentricity: row.parse(8)?,
            in_strong_set: row.parse::<u8>(9)? == 1,
        })
    }
}

impl CentralityRecord {
    pub fn parse(text: &str, line: usize) -> Result<Self, AnalyticsError> {
        let row = Row::split(CENTRALITY_FILE, line, text, 2)?;
        Ok(Self {
            key_id: row.key_id()?,
            absolute: row.parse(1)?,
        })
    }
}

fn read_rows<R, T>(
    reader: R,
    file: &'static str,
    parse: fn(&str, usize) -> Result<T, AnalyticsError>,
) -> Result<Vec<T>, AnalyticsError>
where
    R: BufRead,
{
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| AnalyticsError::Read { file, source })?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(parse(&line, index + 1)?);
    }
    tracing::debug!(file, rows = rows.len(), "metrics table loaded");
    Ok(rows)
}

pub fn read_connectivity<R: BufRead>(reader: R) -> Result<Vec<ConnectivityRecord>, AnalyticsError> {
    read_rows(reader, CONNECTIVITY_FILE, ConnectivityRecord::parse)
}

pub fn read_centrality<R: BufRead>(reader: R) -> Result<Vec<CentralityRecord>, AnalyticsError> {
    read_rows(reader, CENTRALITY_FILE, CentralityRecord::parse)
}
