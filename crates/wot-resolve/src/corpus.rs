//! Edge corpus: blocks of retained certifications keyed by signee.
//!
//! ```text
//! p<signee>
//! s<issuer>;<date>;<expire>;<flags>;<level>;<pkalgo>;<hashalgo>;<version>
//! s...
//! ```

use std::fmt;
use std::io::{BufRead, Write};

use wot_core::{CertificationLevel, HashAlgorithm, KeyId, PublicKeyAlgorithm};

use crate::error::ResolveError;

/// One retained certification in an edge block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorpusEntry {
    pub issuer: KeyId,
    pub date: String,
    pub expires: String,
    pub flags: String,
    pub level: CertificationLevel,
    pub pk_algorithm: PublicKeyAlgorithm,
    pub hash_algorithm: HashAlgorithm,
    pub version: u8,
}

impl fmt::Display for CorpusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s{};{};{};{};{};{};{};{}",
            self.issuer,
            self.date,
            self.expires,
            self.flags,
            self.level.code(),
            u8::from(self.pk_algorithm),
            u8::from(self.hash_algorithm),
            self.version
        )
    }
}

impl CorpusEntry {
    /// Parse an `s` line (with its prefix).
    pub fn parse(line: &str, line_no: usize) -> Result<Self, ResolveError> {
        let body = line.strip_prefix('s').ok_or_else(|| {
            ResolveError::malformed(line_no, "certification line must start with 's'")
        })?;
        let fields: Vec<&str> = body.split(';').collect();
        if fields.len() != 8 {
            return Err(ResolveError::malformed(
                line_no,
                format!("certification line has {} fields, expected 8", fields.len()),
            ));
        }
        let byte = |index: usize| -> Result<u8, ResolveError> {
            fields[index].parse().map_err(|_| {
                ResolveError::malformed(
                    line_no,
                    format!("certification field {}: not a byte: {:?}", index, fields[index]),
                )
            })
        };
        Ok(Self {
            issuer: KeyId::new(fields[0])
                .map_err(|e| ResolveError::malformed(line_no, e.to_string()))?,
            date: fields[1].to_string(),
            expires: fields[2].to_string(),
            flags: fields[3].to_string(),
            level: CertificationLevel::from(byte(4)?),
            pk_algorithm: PublicKeyAlgorithm::from(byte(5)?),
            hash_algorithm: HashAlgorithm::from(byte(6)?),
            version: byte(7)?,
        })
    }
}

/// All retained certifications of one signee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeBlock {
    pub signee: KeyId,
    pub entries: Vec<CorpusEntry>,
}

impl EdgeBlock {
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "p{}", self.signee)?;
        for entry in &self.entries {
            writeln!(out, "{}", entry)?;
        }
        Ok(())
    }
}

/// Streams [`EdgeBlock`]s out of an edge corpus.
pub struct EdgeCorpusReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    pending: Option<EdgeBlock>,
    stage: &'static str,
}

impl<R: BufRead> EdgeCorpusReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_stage(reader, "reading edge corpus")
    }

    /// Name the stage reported on I/O failure.
    pub fn with_stage(reader: R, stage: &'static str) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            pending: None,
            stage,
        }
    }

    fn next_block(&mut self) -> Result<Option<EdgeBlock>, ResolveError> {
        while let Some(line) = self.lines.next() {
            let line = line.map_err(ResolveError::io(self.stage))?;
            self.line_no += 1;
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            if let Some(signee) = line.strip_prefix('p') {
                let signee = KeyId::new(signee)
                    .map_err(|e| ResolveError::malformed(self.line_no, e.to_string()))?;
                let started = EdgeBlock {
                    signee,
                    entries: Vec::new(),
                };
                if let Some(done) = self.pending.replace(started) {
                    return Ok(Some(done));
                }
            } else if line.starts_with('s') {
                let entry = CorpusEntry::parse(line, self.line_no)?;
                match self.pending.as_mut() {
                    Some(block) => block.entries.push(entry),
                    None => {
                        return Err(ResolveError::structural(
                            self.line_no,
                            "certification line before any signee header",
                        ))
                    }
                }
            } else {
                return Err(ResolveError::malformed(
                    self.line_no,
                    format!("unexpected corpus line: {:?}", line),
                ));
            }
        }
        Ok(self.pending.take())
    }
}

impl<R: BufRead> Iterator for EdgeCorpusReader<R> {
    type Item = Result<EdgeBlock, ResolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}
