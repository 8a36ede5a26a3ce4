//! Key-status table: one semicolon-delimited line per key.
//!
//! `status;keyid;pkalgo;keylen;created;expire;keyversion;valid-identities`

use std::fmt;
use std::io::BufRead;

use wot_core::{KeyId, KeyStatus, PublicKeyAlgorithm};

use crate::error::ResolveError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub status: KeyStatus,
    pub key_id: KeyId,
    pub pk_algorithm: PublicKeyAlgorithm,
    pub bit_length: u32,
    pub created: String,
    pub expires: String,
    pub version: u8,
    pub valid_identities: usize,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{};{};{};{};{}",
            self.status.code(),
            self.key_id,
            u8::from(self.pk_algorithm),
            self.bit_length,
            self.created,
            self.expires,
            self.version,
            self.valid_identities
        )
    }
}

impl StatusLine {
    /// Parse one table line.
    pub fn parse(line: &str, line_no: usize) -> Result<Self, ResolveError> {
        let fields: Vec<&str> = line.trim_end().split(';').collect();
        if fields.len() != 8 {
            return Err(ResolveError::malformed(
                line_no,
                format!("status line has {} fields, expected 8", fields.len()),
            ));
        }
        let number = |index: usize| -> Result<u64, ResolveError> {
            fields[index].parse().map_err(|_| {
                ResolveError::malformed(
                    line_no,
                    format!("status field {}: not a number: {:?}", index, fields[index]),
                )
            })
        };
        let narrow = |value: u64, index: usize| {
            ResolveError::malformed(line_no, format!("status field {}: out of range: {}", index, value))
        };

        let pk_algorithm = number(2)?;
        let bit_length = number(3)?;
        let version = number(6)?;
        Ok(Self {
            status: fields[0]
                .parse()
                .map_err(|e: wot_core::CoreError| ResolveError::malformed(line_no, e.to_string()))?,
            key_id: KeyId::new(fields[1])
                .map_err(|e| ResolveError::malformed(line_no, e.to_string()))?,
            pk_algorithm: PublicKeyAlgorithm::from(
                u8::try_from(pk_algorithm).map_err(|_| narrow(pk_algorithm, 2))?,
            ),
            bit_length: u32::try_from(bit_length).map_err(|_| narrow(bit_length, 3))?,
            created: fields[4].to_string(),
            expires: fields[5].to_string(),
            version: u8::try_from(version).map_err(|_| narrow(version, 6))?,
            valid_identities: number(7)? as usize,
        })
    }
}

/// Streams [`StatusLine`]s out of a status table, skipping blank lines.
pub struct StatusTableReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> StatusTableReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for StatusTableReader<R> {
    type Item = Result<StatusLine, ResolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(ResolveError::io("reading key-status table")(e))),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(StatusLine::parse(&line, self.line_no));
        }
        None
    }
}
