//! Job requests and completed job records
//!
//! A `JobRequest` lives only as long as the submitting call and the execution
//! unit it moves into. The unit turns it into exactly one `JobRecord`.

use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::engine::{Cost, HashEngine};

// ----------------------------------------------------------------------------
// Caller Tags
// ----------------------------------------------------------------------------

/// Pair of caller-supplied integers echoed back with the result.
///
/// Never validated or interpreted; two jobs may carry identical tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerTag {
    pub index: i32,
    pub id: i32,
}

impl CallerTag {
    pub fn new(index: i32, id: i32) -> Self {
        Self { index, id }
    }
}

impl fmt::Display for CallerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.id)
    }
}

// ----------------------------------------------------------------------------
// Job Kinds
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    Hash,
    Verify,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Hash => write!(f, "HASH"),
            JobKind::Verify => write!(f, "VERIFY"),
        }
    }
}

// ----------------------------------------------------------------------------
// Job Request
// ----------------------------------------------------------------------------

/// Validated input for one execution unit
#[derive(Clone, PartialEq, Eq)]
pub enum JobRequest {
    Hash {
        tag: CallerTag,
        secret: Vec<u8>,
        cost: Cost,
    },
    Verify {
        tag: CallerTag,
        secret: Vec<u8>,
        reference_hash: Vec<u8>,
    },
}

impl JobRequest {
    pub fn kind(&self) -> JobKind {
        match self {
            JobRequest::Hash { .. } => JobKind::Hash,
            JobRequest::Verify { .. } => JobKind::Verify,
        }
    }

    pub fn tag(&self) -> CallerTag {
        match self {
            JobRequest::Hash { tag, .. } | JobRequest::Verify { tag, .. } => *tag,
        }
    }

    /// Run the CPU-bound part of the job.
    ///
    /// Always yields a record. If the hashing primitive itself fails the
    /// record carries an empty hash, which every later `verify` rejects.
    pub fn execute(self, engine: &HashEngine) -> JobRecord {
        match self {
            JobRequest::Hash { tag, secret, cost } => {
                let hash = engine.hash(&secret, cost).unwrap_or_else(|e| {
                    error!("Hash job {} failed, delivering empty hash: {}", tag, e);
                    String::new()
                });
                JobRecord::hashed(tag, hash)
            }
            JobRequest::Verify {
                tag,
                secret,
                reference_hash,
            } => JobRecord::verified(tag, engine.verify(&secret, &reference_hash)),
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for JobRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobRequest::Hash { tag, secret, cost } => f
                .debug_struct("Hash")
                .field("tag", tag)
                .field("secret_len", &secret.len())
                .field("cost", cost)
                .finish(),
            JobRequest::Verify {
                tag,
                secret,
                reference_hash,
            } => f
                .debug_struct("Verify")
                .field("tag", tag)
                .field("secret_len", &secret.len())
                .field("reference_len", &reference_hash.len())
                .finish(),
        }
    }
}

// ----------------------------------------------------------------------------
// Completed Job Record
// ----------------------------------------------------------------------------

/// Kind-specific result payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobOutcome {
    Hashed { hash: String },
    Verified { matched: bool },
}

/// Result of one job, owned by the result queue until drained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub tag: CallerTag,
    pub outcome: JobOutcome,
}

impl JobRecord {
    pub fn hashed(tag: CallerTag, hash: String) -> Self {
        Self {
            tag,
            outcome: JobOutcome::Hashed { hash },
        }
    }

    pub fn verified(tag: CallerTag, matched: bool) -> Self {
        Self {
            tag,
            outcome: JobOutcome::Verified { matched },
        }
    }

    pub fn kind(&self) -> JobKind {
        match self.outcome {
            JobOutcome::Hashed { .. } => JobKind::Hash,
            JobOutcome::Verified { .. } => JobKind::Verify,
        }
    }

    pub fn hash_output(&self) -> Option<&str> {
        match &self.outcome {
            JobOutcome::Hashed { hash } => Some(hash),
            JobOutcome::Verified { .. } => None,
        }
    }

    pub fn matched(&self) -> Option<bool> {
        match self.outcome {
            JobOutcome::Verified { matched } => Some(matched),
            JobOutcome::Hashed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HashInfo;

    #[test]
    fn test_hash_request_produces_hashed_record() {
        let engine = HashEngine::default();
        let request = JobRequest::Hash {
            tag: CallerTag::new(1, 42),
            secret: b"correcthorse".to_vec(),
            cost: Cost::new(4u32).unwrap(),
        };
        assert_eq!(request.kind(), JobKind::Hash);

        let record = request.execute(&engine);
        assert_eq!(record.kind(), JobKind::Hash);
        assert_eq!(record.tag, CallerTag::new(1, 42));
        assert_eq!(record.matched(), None);

        let hash = record.hash_output().unwrap();
        assert_eq!(HashInfo::parse(hash).unwrap().cost.get(), 4);
    }

    #[test]
    fn test_verify_request_produces_verified_record() {
        let engine = HashEngine::default();
        let hash = engine
            .hash(b"pw", Cost::new(4u32).unwrap())
            .unwrap()
            .into_bytes();

        let matching = JobRequest::Verify {
            tag: CallerTag::new(-1, i32::MAX),
            secret: b"pw".to_vec(),
            reference_hash: hash.clone(),
        }
        .execute(&engine);
        assert_eq!(matching.matched(), Some(true));
        assert_eq!(matching.tag, CallerTag::new(-1, i32::MAX));
        assert_eq!(matching.hash_output(), None);

        let wrong = JobRequest::Verify {
            tag: CallerTag::new(0, 0),
            secret: b"nope".to_vec(),
            reference_hash: hash,
        }
        .execute(&engine);
        assert_eq!(wrong.matched(), Some(false));
    }

    #[test]
    fn test_debug_hides_secret() {
        let request = JobRequest::Verify {
            tag: CallerTag::new(0, 0),
            secret: b"hunter2".to_vec(),
            reference_hash: Vec::new(),
        };
        let rendered = format!("{:?}", request);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("secret_len: 7"));
    }
}
