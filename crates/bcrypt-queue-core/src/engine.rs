//! Hash Engine
//!
//! Stateless wrapper around the bcrypt primitive. Hashes are emitted in the
//! 60 character modular crypt format (`$2y$10$<salt><digest>`), which embeds
//! the algorithm version, the cost and the salt, so verification needs
//! nothing but the secret and the stored string.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{DispatchError, Result};

/// Smallest work factor accepted by bcrypt
pub const MIN_COST: u32 = 4;
/// Largest work factor accepted by bcrypt
pub const MAX_COST: u32 = 31;

/// Length of an encoded bcrypt hash
pub const HASH_LEN: usize = 60;
const SALT_CHARS: usize = 22;
const DIGEST_CHARS: usize = 31;

// ----------------------------------------------------------------------------
// Work Factor
// ----------------------------------------------------------------------------

/// A bcrypt work factor known to lie within `[MIN_COST, MAX_COST]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Cost(u32);

impl Cost {
    /// Validate a raw work factor
    pub fn new<T: Into<i64>>(cost: T) -> Result<Self> {
        let raw = cost.into();
        if raw < MIN_COST as i64 || raw > MAX_COST as i64 {
            return Err(DispatchError::invalid_cost(raw));
        }
        Ok(Self(raw as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for Cost {
    fn default() -> Self {
        Self(bcrypt::DEFAULT_COST)
    }
}

impl TryFrom<u32> for Cost {
    type Error = DispatchError;

    fn try_from(value: u32) -> Result<Self> {
        Cost::new(value)
    }
}

impl From<Cost> for u32 {
    fn from(cost: Cost) -> Self {
        cost.0
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Hash Version
// ----------------------------------------------------------------------------

/// bcrypt revision written into the prefix of generated hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashVersion {
    #[serde(rename = "2a")]
    TwoA,
    #[serde(rename = "2b")]
    TwoB,
    /// Accepted when verifying. Other implementations treat `$2x$` as the
    /// sign-extension-bug variant, which this engine does not reproduce, so
    /// it is never written into new hashes.
    #[serde(rename = "2x")]
    TwoX,
    #[default]
    #[serde(rename = "2y")]
    TwoY,
}

impl HashVersion {
    pub fn tag(self) -> &'static str {
        match self {
            HashVersion::TwoA => "2a",
            HashVersion::TwoB => "2b",
            HashVersion::TwoX => "2x",
            HashVersion::TwoY => "2y",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "2a" => Some(HashVersion::TwoA),
            "2b" => Some(HashVersion::TwoB),
            "2x" => Some(HashVersion::TwoX),
            "2y" => Some(HashVersion::TwoY),
            _ => None,
        }
    }

    fn to_bcrypt(self) -> bcrypt::Version {
        match self {
            HashVersion::TwoA => bcrypt::Version::TwoA,
            HashVersion::TwoB => bcrypt::Version::TwoB,
            HashVersion::TwoX => bcrypt::Version::TwoX,
            HashVersion::TwoY => bcrypt::Version::TwoY,
        }
    }
}

impl fmt::Display for HashVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ----------------------------------------------------------------------------
// Hash Inspection
// ----------------------------------------------------------------------------

/// Fields of a well-formed bcrypt hash string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashInfo {
    pub version: HashVersion,
    pub cost: Cost,
    /// Salt in bcrypt's base64 alphabet
    pub salt: String,
}

impl HashInfo {
    /// Parse `$<version>$<cost>$<salt><digest>`; `None` for anything else
    pub fn parse(hash: &str) -> Option<Self> {
        if hash.len() != HASH_LEN || !hash.is_ascii() {
            return None;
        }

        let mut fields = hash.split('$');
        if fields.next() != Some("") {
            return None;
        }
        let version = HashVersion::from_tag(fields.next()?)?;

        let cost_field = fields.next()?;
        if cost_field.len() != 2 || !cost_field.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let cost = Cost::new(cost_field.parse::<u32>().ok()?).ok()?;

        let tail = fields.next()?;
        if fields.next().is_some() || tail.len() != SALT_CHARS + DIGEST_CHARS {
            return None;
        }
        if !tail.bytes().all(is_bcrypt_base64) {
            return None;
        }

        Some(Self {
            version,
            cost,
            salt: tail[..SALT_CHARS].to_string(),
        })
    }
}

fn is_bcrypt_base64(byte: u8) -> bool {
    byte == b'.' || byte == b'/' || byte.is_ascii_alphanumeric()
}

// ----------------------------------------------------------------------------
// Hash Engine
// ----------------------------------------------------------------------------

/// Pure hashing and verification; safe to share across execution units
#[derive(Debug, Clone, Copy, Default)]
pub struct HashEngine {
    version: HashVersion,
}

impl HashEngine {
    pub fn new(version: HashVersion) -> Self {
        Self { version }
    }

    /// Hash `secret` with a fresh random salt.
    ///
    /// Only the first 72 bytes of the secret take part in the digest.
    pub fn hash(&self, secret: &[u8], cost: Cost) -> Result<String> {
        let parts = bcrypt::hash_with_result(secret, cost.get())?;
        Ok(parts.format_for_version(self.version.to_bcrypt()))
    }

    /// Check `secret` against a stored hash.
    ///
    /// Any reference that is not a well-formed bcrypt string yields `false`.
    /// The digest comparison inside `bcrypt::verify` is constant time.
    pub fn verify(&self, secret: &[u8], reference: &[u8]) -> bool {
        let Ok(reference) = core::str::from_utf8(reference) else {
            return false;
        };
        if HashInfo::parse(reference).is_none() {
            return false;
        }
        bcrypt::verify(secret, reference).unwrap_or(false)
    }
}
