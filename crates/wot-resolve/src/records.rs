//! Line-oriented keyring dump records.
//!
//! Each line is one colon-delimited record whose first field names its
//! type. Fields are positional:
//!
//! ```text
//! pub:<flags>:<bitlen>:<pkalgo>:<keyid>:<created>:<expire>:<keyversion>:
//! uid:<trust>::::::::<userid>:
//! sig:<issuer>:<date>:<expire>:<sigtype-hex>:<flags>:<version>:<pkalgo>:<hashalgo>
//! rev:<issuer>:<date>::<revtype-hex>::<version>:<pkalgo>:<hashalgo>
//! spk:<type>:<flags>:<len>:<escaped-data>
//! ```
//!
//! Any other record type (`fpr`, `sub`, ...) and blank lines are skipped.

use std::io::BufRead;
use std::str::FromStr;

use wot_core::{CertificationLevel, HashAlgorithm, KeyId, PublicKeyAlgorithm, RevocationKind};

use crate::error::ResolveError;

/// Signature subpacket type of a certification policy URI.
pub const POLICY_URI_SUBPACKET: u8 = 26;

/// Field index of the user id in a `uid` record.
const UID_FIELD: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubRecord {
    /// Raw flag letters (`r` revoked, `e` expired, plus trust letters).
    pub flags: String,
    pub bit_length: u32,
    pub pk_algorithm: PublicKeyAlgorithm,
    pub key_id: KeyId,
    pub created: String,
    pub expires: String,
    pub version: u8,
}

impl PubRecord {
    pub fn is_flagged_revoked(&self) -> bool {
        self.flags.contains('r')
    }

    pub fn is_flagged_expired(&self) -> bool {
        self.flags.contains('e')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UidRecord {
    /// Unescaped user id.
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigRecord {
    pub issuer: KeyId,
    pub date: String,
    pub expires: String,
    pub level: CertificationLevel,
    pub flags: String,
    pub version: u8,
    pub pk_algorithm: PublicKeyAlgorithm,
    pub hash_algorithm: HashAlgorithm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevRecord {
    pub issuer: KeyId,
    pub date: String,
    pub kind: RevocationKind,
    pub version: u8,
    pub pk_algorithm: PublicKeyAlgorithm,
    pub hash_algorithm: HashAlgorithm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpkRecord {
    pub packet_type: u8,
    pub flags: u8,
    pub length: usize,
    /// Unescaped payload.
    pub data: String,
}

impl SpkRecord {
    pub fn is_policy_uri(&self) -> bool {
        self.packet_type == POLICY_URI_SUBPACKET
    }
}

/// A decoded dump record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Pub(PubRecord),
    Uid(UidRecord),
    Sig(SigRecord),
    Rev(RevRecord),
    Spk(SpkRecord),
}

/// Positional access to the fields of one line.
struct Fields<'a> {
    line: usize,
    kind: &'static str,
    fields: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn get(&self, index: usize) -> Result<&'a str, ResolveError> {
        self.fields.get(index).copied().ok_or_else(|| {
            ResolveError::malformed(
                self.line,
                format!("{} record has no field {}", self.kind, index),
            )
        })
    }

    fn int<T: FromStr>(&self, index: usize) -> Result<T, ResolveError> {
        let raw = self.get(index)?;
        raw.trim().parse().map_err(|_| {
            ResolveError::malformed(
                self.line,
                format!("{} field {}: not a number: {:?}", self.kind, index, raw),
            )
        })
    }

    fn hex_u8(&self, index: usize) -> Result<u8, ResolveError> {
        let raw = self.get(index)?;
        u8::from_str_radix(raw.trim(), 16).map_err(|_| {
            ResolveError::malformed(
                self.line,
                format!("{} field {}: not a hex byte: {:?}", self.kind, index, raw),
            )
        })
    }

    fn key_id(&self, index: usize) -> Result<KeyId, ResolveError> {
        let raw = self.get(index)?;
        KeyId::new(raw).map_err(|e| ResolveError::malformed(self.line, e.to_string()))
    }
}

/// Decode one line. Returns `Ok(None)` for lines that carry no record the
/// resolver consumes.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Record>, ResolveError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Ok(None);
    }

    let raw: Vec<&str> = line.split(':').collect();
    let kind = match raw[0] {
        "pub" => "pub",
        "uid" => "uid",
        "sig" => "sig",
        "rev" => "rev",
        "spk" => "spk",
        _ => return Ok(None),
    };
    let f = Fields {
        line: line_no,
        kind,
        fields: raw,
    };

    let record = match kind {
        "pub" => Record::Pub(PubRecord {
            flags: f.get(1)?.to_string(),
            bit_length: f.int(2)?,
            pk_algorithm: PublicKeyAlgorithm::from(f.int::<u8>(3)?),
            key_id: f.key_id(4)?,
            created: f.get(5)?.to_string(),
            expires: f.get(6)?.to_string(),
            version: f.int(7)?,
        }),
        "uid" => {
            let user_id = f
                .fields
                .get(UID_FIELD)
                .or(f.fields.last())
                .copied()
                .unwrap_or_default();
            Record::Uid(UidRecord {
                user_id: unescape(user_id),
            })
        }
        "sig" => Record::Sig(SigRecord {
            issuer: f.key_id(1)?,
            date: f.get(2)?.to_string(),
            expires: f.get(3)?.to_string(),
            level: CertificationLevel::from_sig_type(f.hex_u8(4)?),
            flags: f.get(5)?.to_string(),
            version: f.int(6)?,
            pk_algorithm: PublicKeyAlgorithm::from(f.int::<u8>(7)?),
            hash_algorithm: HashAlgorithm::from(f.int::<u8>(8)?),
        }),
        "rev" => Record::Rev(RevRecord {
            issuer: f.key_id(1)?,
            date: f.get(2)?.to_string(),
            kind: RevocationKind::from(f.hex_u8(4)?),
            version: f.int(6)?,
            pk_algorithm: PublicKeyAlgorithm::from(f.int::<u8>(7)?),
            hash_algorithm: HashAlgorithm::from(f.int::<u8>(8)?),
        }),
        _ => {
            // Unescaped colons belong to the payload.
            let data = f.fields.get(4..).map(|rest| rest.join(":")).unwrap_or_default();
            Record::Spk(SpkRecord {
                packet_type: f.int(1)?,
                flags: f.int(2)?,
                length: f.int(3)?,
                data: unescape(&data),
            })
        }
    };

    Ok(Some(record))
}

/// Undo the dump's backslash escaping (`\xHH` for bytes outside printable
/// ASCII and for `:`).
pub fn unescape(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 >= bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        match bytes[i + 1] {
            b'x' if i + 4 <= bytes.len() => {
                match hex::decode(&bytes[i + 2..i + 4]) {
                    Ok(decoded) => {
                        out.extend_from_slice(&decoded);
                        i += 4;
                    }
                    Err(_) => {
                        out.push(b'\\');
                        i += 1;
                    }
                }
            }
            b'\\' => {
                out.push(b'\\');
                i += 2;
            }
            b'n' => {
                out.push(b'\n');
                i += 2;
            }
            b't' => {
                out.push(b'\t');
                i += 2;
            }
            _ => {
                out.push(b'\\');
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Inverse of [`unescape`] for single-line text fields: backslashes and
/// control characters are written as `\\` and `\xHH`, so the result never
/// contains a line break.
pub fn escape_line(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            c if c.is_ascii_control() => {
                out.push_str("\\x");
                out.push_str(&hex::encode([c as u8]));
            }
            c => out.push(c),
        }
    }
    out
}

/// Streams records out of a dump, tagging each with its 1-based line
/// number.
pub struct RecordReader<R> {
    reader: R,
    line_no: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<(usize, Record), ResolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(ResolveError::io("reading keyring dump")(e))),
            }
            self.line_no += 1;
            let line = String::from_utf8_lossy(&self.buf);
            match parse_line(&line, self.line_no) {
                Ok(Some(record)) => return Some(Ok((self.line_no, record))),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
