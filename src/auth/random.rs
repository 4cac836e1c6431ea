//! Cryptographically secure random strings for CSRF tokens.

use crate::errors::{ConfigurationError, DropboxError, DropboxResult};
use rand::rngs::OsRng;
use rand::RngCore;
use ring::rand::{SecureRandom, SystemRandom};
use std::str::FromStr;
use std::sync::Arc;

/// Source of random hex strings.
pub trait RandomStringGenerator: Send + Sync {
    /// Returns `length` random lowercase hex characters.
    fn generate(&self, length: usize) -> DropboxResult<String>;
}

/// Generator backed by `ring`'s system random source.
pub struct RingRandomStringGenerator {
    rng: SystemRandom,
}

impl RingRandomStringGenerator {
    /// Create new generator.
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for RingRandomStringGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomStringGenerator for RingRandomStringGenerator {
    fn generate(&self, length: usize) -> DropboxResult<String> {
        let mut bytes = vec![0u8; (length + 1) / 2];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| ConfigurationError::NoSecureGenerator("ring SystemRandom failed".to_string()))?;
        Ok(to_hex(&bytes, length))
    }
}

/// Generator backed by the operating system RNG through `rand`.
#[derive(Default)]
pub struct OsRandomStringGenerator;

impl RandomStringGenerator for OsRandomStringGenerator {
    fn generate(&self, length: usize) -> DropboxResult<String> {
        let mut bytes = vec![0u8; (length + 1) / 2];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| ConfigurationError::NoSecureGenerator(e.to_string()))?;
        Ok(to_hex(&bytes, length))
    }
}

/// Named selector for the bundled generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RandomStringGeneratorKind {
    /// [`RingRandomStringGenerator`].
    #[default]
    Ring,
    /// [`OsRandomStringGenerator`].
    Os,
}

impl FromStr for RandomStringGeneratorKind {
    type Err = DropboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ring" => Ok(Self::Ring),
            "os" => Ok(Self::Os),
            other => Err(ConfigurationError::UnknownRandomGenerator(other.to_string()).into()),
        }
    }
}

impl RandomStringGeneratorKind {
    /// Builds the selected generator.
    pub fn build(self) -> Arc<dyn RandomStringGenerator> {
        match self {
            Self::Ring => Arc::new(RingRandomStringGenerator::new()),
            Self::Os => Arc::new(OsRandomStringGenerator),
        }
    }
}

/// The default generator.
pub fn default_generator() -> Arc<dyn RandomStringGenerator> {
    RandomStringGeneratorKind::default().build()
}

fn to_hex(bytes: &[u8], length: usize) -> String {
    let mut encoded = hex::encode(bytes);
    encoded.truncate(length);
    encoded
}
