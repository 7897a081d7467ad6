//! Opaque session token issuance

use std::time::Duration;

use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

use crate::core::constants::MIN_TOKEN_BYTES;
use crate::utils::crypto::encode_token;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Random source failed: {0}")]
    Entropy(String),
}

/// Source of token bytes
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> Result<(), TokenError>;
}

/// The operating system CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), TokenError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| TokenError::Entropy(e.to_string()))
    }
}

/// A freshly issued token and its absolute deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Epoch seconds
    pub expires_at: i64,
}

/// Generates session tokens with a fixed lifetime
pub struct TokenIssuer {
    token_bytes: usize,
    ttl: Duration,
    entropy: Box<dyn EntropySource>,
}

impl TokenIssuer {
    pub fn new(token_bytes: usize, ttl: Duration) -> Self {
        Self::with_entropy(token_bytes, ttl, Box::new(OsEntropy))
    }

    pub fn with_entropy(token_bytes: usize, ttl: Duration, entropy: Box<dyn EntropySource>) -> Self {
        Self {
            token_bytes: token_bytes.max(MIN_TOKEN_BYTES),
            ttl,
            entropy,
        }
    }

    /// Issue a token valid until `now + ttl`
    pub fn issue(&self, now: i64) -> Result<IssuedToken, TokenError> {
        let mut bytes = vec![0u8; self.token_bytes];
        self.entropy.fill(&mut bytes)?;
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        Ok(IssuedToken {
            token: encode_token(&bytes),
            expires_at: now.saturating_add(ttl),
        })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("token_bytes", &self.token_bytes)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
