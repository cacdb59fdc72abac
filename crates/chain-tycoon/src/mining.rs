//! A real, if tiny, proof-of-work search.
//!
//! The consensus round of the game only pretends to mine. [`NonceSearch`]
//! shows what the pretending stands for: try nonces until the SHA-256 digest
//! of `payload:nonce` starts with enough zeros. The search runs on the async
//! runtime and gives other tasks a turn every [`NonceSearch::yield_every`]
//! attempts, which is also when it checks its [`CancelFlag`].

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use sha2::{Digest, Sha256};
use tracing::debug;

/// Length of a hex encoded SHA-256 digest, and so the highest difficulty.
pub const MAX_DIFFICULTY: u32 = 64;

const DEFAULT_YIELD_EVERY: u64 = 1_000;

/// Shared switch which asks a running search to give up.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("search cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },
    #[error("no nonce found in {attempts} attempts")]
    Exhausted { attempts: u64 },
    #[error("difficulty {0} exceeds the 64 hex digits of a digest")]
    DifficultyTooHigh(u32),
}

/// A nonce which satisfies a search, with the digest it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub nonce: u64,
    /// Lowercase hex digest of `payload:nonce`.
    pub hash: String,
    pub attempts: u64,
}

/// Parameters of a nonce search.
#[derive(Debug, Clone)]
pub struct NonceSearch {
    pub payload: String,
    /// Number of leading `0` hex digits required.
    pub difficulty: u32,
    /// Attempts between two cooperative yields. Never 0.
    pub yield_every: u64,
    pub max_attempts: Option<u64>,
}

impl NonceSearch {
    pub fn new(payload: impl Into<String>, difficulty: u32) -> Self {
        NonceSearch {
            payload: payload.into(),
            difficulty,
            yield_every: DEFAULT_YIELD_EVERY,
            max_attempts: None,
        }
    }

    pub fn yield_every(mut self, attempts: u64) -> Self {
        self.yield_every = attempts.max(1);

        self
    }

    pub fn max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = Some(attempts);

        self
    }

    /// Tries nonces from 0 upwards until one meets the difficulty.
    pub async fn run(&self, cancel: &CancelFlag) -> Result<Proof, SearchError> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(SearchError::DifficultyTooHigh(self.difficulty));
        }

        let yield_every = self.yield_every.max(1);
        let mut attempts = 0;

        for nonce in 0.. {
            if self.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(SearchError::Exhausted { attempts });
            }

            let hash = hash_of(&self.payload, nonce);
            attempts += 1;
            if meets(&hash, self.difficulty) {
                debug!(nonce, attempts, difficulty = self.difficulty, "nonce found");
                return Ok(Proof {
                    nonce,
                    hash,
                    attempts,
                });
            }

            if attempts % yield_every == 0 {
                tokio::task::yield_now().await;
                if cancel.is_cancelled() {
                    return Err(SearchError::Cancelled { attempts });
                }
            }
        }

        Err(SearchError::Exhausted { attempts })
    }
}

/// Lowercase hex SHA-256 digest of `payload:nonce`.
pub fn hash_of(payload: &str, nonce: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(b":");
    hasher.update(nonce.to_string().as_bytes());

    hex::encode(hasher.finalize())
}

/// Returns true if `hash` starts with `difficulty` zeros.
#[inline]
pub fn meets(hash: &str, difficulty: u32) -> bool {
    hash.len() >= difficulty as usize
        && hash.bytes().take(difficulty as usize).all(|b| b == b'0')
}

/// Checks a proof claimed for `payload`.
pub fn verify(payload: &str, difficulty: u32, proof: &Proof) -> bool {
    let hash = hash_of(payload, proof.nonce);

    hash == proof.hash && meets(&hash, difficulty)
}
