use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// OpenPGP key id as printed in keyring dumps (hexadecimal, e.g.
/// `0123456789ABCDEF`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    /// Create a key id, validating that it is a non-empty hex string.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidKeyId(id));
        }
        Ok(Self(id))
    }

    /// The key id as it appears in the dump.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for KeyId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Hash algorithms as listed in RFC 4880, section 9.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// Rivest et.al. message digest 5.
    Md5,
    /// NIST Secure Hash Algorithm (deprecated).
    Sha1,
    /// RIPEMD-160
    RipeMd160,
    /// 256-bit version of SHA2
    Sha256,
    /// 384-bit version of SHA2
    Sha384,
    /// 512-bit version of SHA2
    Sha512,
    /// 224-bit version of SHA2
    Sha224,
    /// Reserved identifiers 4 to 7.
    Reserved(u8),
    /// Private or experimental identifiers (100 and above).
    Private(u8),
    /// Any identifier outside the registry.
    Unknown(u8),
}

impl From<u8> for HashAlgorithm {
    fn from(u: u8) -> Self {
        match u {
            1 => Self::Md5,
            2 => Self::Sha1,
            3 => Self::RipeMd160,
            4..=7 => Self::Reserved(u),
            8 => Self::Sha256,
            9 => Self::Sha384,
            10 => Self::Sha512,
            11 => Self::Sha224,
            100..=u8::MAX => Self::Private(u),
            u => Self::Unknown(u),
        }
    }
}

impl From<HashAlgorithm> for u8 {
    fn from(h: HashAlgorithm) -> u8 {
        match h {
            HashAlgorithm::Md5 => 1,
            HashAlgorithm::Sha1 => 2,
            HashAlgorithm::RipeMd160 => 3,
            HashAlgorithm::Sha256 => 8,
            HashAlgorithm::Sha384 => 9,
            HashAlgorithm::Sha512 => 10,
            HashAlgorithm::Sha224 => 11,
            HashAlgorithm::Reserved(u) | HashAlgorithm::Private(u) | HashAlgorithm::Unknown(u) => u,
        }
    }
}

impl HashAlgorithm {
    /// Reporting bucket: private ids collapse into 100, ids outside the
    /// registry collapse into 0.
    pub fn bucket(&self) -> u8 {
        match self {
            Self::Private(_) => 100,
            Self::Unknown(_) => 0,
            known => u8::from(*known),
        }
    }

    /// Label of a reporting bucket.
    pub fn bucket_label(bucket: u8) -> &'static str {
        match bucket {
            1 => "MD5",
            2 => "SHA1",
            3 => "RIPEMD160",
            4..=7 => "Reserved",
            8 => "SHA256",
            9 => "SHA384",
            10 => "SHA512",
            11 => "SHA224",
            100 => "Private/Experimental",
            _ => "Unknown",
        }
    }

    /// Every bucket a report table lists, including empty ones.
    pub const BUCKETS: [u8; 13] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 100];
}

/// Public-key algorithms as listed in RFC 4880, section 9.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublicKeyAlgorithm {
    RsaEncryptSign,
    RsaEncryptOnly,
    RsaSignOnly,
    ElgamalEncryptOnly,
    Dsa,
    EllipticCurve,
    Ecdsa,
    ElgamalEncryptSign,
    DiffieHellman,
    /// Private or experimental identifiers (100 and above).
    Private(u8),
    /// Any identifier outside the registry.
    Unknown(u8),
}

impl From<u8> for PublicKeyAlgorithm {
    fn from(u: u8) -> Self {
        match u {
            1 => Self::RsaEncryptSign,
            2 => Self::RsaEncryptOnly,
            3 => Self::RsaSignOnly,
            16 => Self::ElgamalEncryptOnly,
            17 => Self::Dsa,
            18 => Self::EllipticCurve,
            19 => Self::Ecdsa,
            20 => Self::ElgamalEncryptSign,
            21 => Self::DiffieHellman,
            100..=u8::MAX => Self::Private(u),
            u => Self::Unknown(u),
        }
    }
}

impl From<PublicKeyAlgorithm> for u8 {
    fn from(p: PublicKeyAlgorithm) -> u8 {
        match p {
            PublicKeyAlgorithm::RsaEncryptSign => 1,
            PublicKeyAlgorithm::RsaEncryptOnly => 2,
            PublicKeyAlgorithm::RsaSignOnly => 3,
            PublicKeyAlgorithm::ElgamalEncryptOnly => 16,
            PublicKeyAlgorithm::Dsa => 17,
            PublicKeyAlgorithm::EllipticCurve => 18,
            PublicKeyAlgorithm::Ecdsa => 19,
            PublicKeyAlgorithm::ElgamalEncryptSign => 20,
            PublicKeyAlgorithm::DiffieHellman => 21,
            PublicKeyAlgorithm::Private(u) | PublicKeyAlgorithm::Unknown(u) => u,
        }
    }
}

impl PublicKeyAlgorithm {
    /// Reporting bucket, same convention as [`HashAlgorithm::bucket`].
    pub fn bucket(&self) -> u8 {
        match self {
            Self::Private(_) => 100,
            Self::Unknown(_) => 0,
            known => u8::from(*known),
        }
    }

    pub fn bucket_label(bucket: u8) -> &'static str {
        match bucket {
            1 => "RSA Encrypt or Sign",
            2 => "RSA Encrypt-Only",
            3 => "RSA Sign-Only",
            16 => "Elgamal (Encrypt-Only)",
            17 => "DSA",
            18 => "Elliptic Curve",
            19 => "ECDSA",
            20 => "Elgamal Encrypt or Sign (deprecated)",
            21 => "Diffie-Hellman (X9.42)",
            100 => "Private/Experimental",
            _ => "Unknown",
        }
    }

    pub const BUCKETS: [u8; 11] = [0, 1, 2, 3, 16, 17, 18, 19, 20, 21, 100];
}

/// Certification level carried by signature types 0x10 to 0x13.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertificationLevel {
    /// 0x10: no statement about how the identity was checked.
    Generic,
    /// 0x11: no verification at all.
    Persona,
    /// 0x12: some casual verification.
    Casual,
    /// 0x13: substantial verification.
    Positive,
    Unknown(u8),
}

impl CertificationLevel {
    /// Bucket used for every level outside the four defined ones.
    pub const OTHER_BUCKET: u8 = u8::MAX;

    /// Decode from a raw signature type.
    pub fn from_sig_type(sig_type: u8) -> Self {
        match sig_type {
            0x10..=0x13 => Self::from(sig_type - 0x10),
            other => Self::Unknown(other),
        }
    }

    /// Numeric level as written to the edge corpus. Every unknown level is
    /// written as [`OTHER_BUCKET`](Self::OTHER_BUCKET) so it never reads
    /// back as a defined one.
    pub fn code(&self) -> u8 {
        match self {
            Self::Generic => 0,
            Self::Persona => 1,
            Self::Casual => 2,
            Self::Positive => 3,
            Self::Unknown(_) => Self::OTHER_BUCKET,
        }
    }

    pub fn bucket(&self) -> u8 {
        match self {
            Self::Unknown(_) => Self::OTHER_BUCKET,
            known => known.code(),
        }
    }

    pub fn bucket_label(bucket: u8) -> &'static str {
        match bucket {
            0 => "Generic",
            1 => "Persona",
            2 => "Casual",
            3 => "Positive",
            _ => "Unknown",
        }
    }

    pub const BUCKETS: [u8; 5] = [0, 1, 2, 3, Self::OTHER_BUCKET];
}

impl From<u8> for CertificationLevel {
    fn from(level: u8) -> Self {
        match level {
            0 => Self::Generic,
            1 => Self::Persona,
            2 => Self::Casual,
            3 => Self::Positive,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for CertificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Kind of a revocation signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevocationKind {
    /// 0x20: the whole key is revoked.
    KeyRevocation,
    /// 0x28: a subkey is revoked.
    SubkeyRevocation,
    /// 0x30: a certification (user id binding) is revoked.
    CertificationRevocation,
    Unknown(u8),
}

impl From<u8> for RevocationKind {
    fn from(sig_type: u8) -> Self {
        match sig_type {
            0x20 => Self::KeyRevocation,
            0x28 => Self::SubkeyRevocation,
            0x30 => Self::CertificationRevocation,
            other => Self::Unknown(other),
        }
    }
}

/// Reporting bucket for key and signature format versions. Versions 2, 3
/// and 4 are reported as-is, anything else lands in bucket 0.
pub fn version_bucket(version: u8) -> u8 {
    match version {
        2..=4 => version,
        _ => 0,
    }
}
