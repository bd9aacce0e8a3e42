//! Human-typeable connection codes.
//!
//! Codes are read aloud and typed on phones, so the alphabet drops the
//! visually confusable `I`, `O`, `0` and `1`. Each character is drawn
//! independently and uniformly. Uniqueness is the caller's concern: the
//! connection service checks the record store before claiming a code.

use rand::Rng;
use rand::seq::SliceRandom;

use super::ConnectionId;

/// Characters a generated connection code may contain.
pub const CONNECTION_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Validation errors for [`CodeLength`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("connection code length must be between {min} and {max}, got {actual}")]
pub struct CodeLengthError {
    pub min: usize,
    pub max: usize,
    pub actual: usize,
}

/// Number of characters in a generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeLength(usize);

impl CodeLength {
    /// Shortest accepted code.
    pub const MIN: usize = 4;
    /// Longest accepted code.
    pub const MAX: usize = 32;

    /// Validate a code length.
    pub fn new(length: usize) -> Result<Self, CodeLengthError> {
        if (Self::MIN..=Self::MAX).contains(&length) {
            Ok(Self(length))
        } else {
            Err(CodeLengthError {
                min: Self::MIN,
                max: Self::MAX,
                actual: length,
            })
        }
    }

    /// Raw length.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for CodeLength {
    fn default() -> Self {
        Self(8)
    }
}

/// Draw a code of `length` characters from [`CONNECTION_CODE_ALPHABET`].
///
/// # Examples
/// ```
/// use snapbeam::domain::{CodeLength, CONNECTION_CODE_ALPHABET, generate_connection_code};
///
/// let code = generate_connection_code(&mut rand::thread_rng(), CodeLength::default());
/// assert_eq!(code.as_ref().len(), 8);
/// assert!(code.as_ref().bytes().all(|b| CONNECTION_CODE_ALPHABET.contains(&b)));
/// ```
pub fn generate_connection_code<R>(rng: &mut R, length: CodeLength) -> ConnectionId
where
    R: Rng + ?Sized,
{
    let code: String = (0..length.get())
        .filter_map(|_| CONNECTION_CODE_ALPHABET.choose(&mut *rng).copied())
        .map(char::from)
        .collect();
    ConnectionId::from_generated(code)
}

/// Source of candidate connection codes.
#[cfg_attr(test, mockall::automock)]
pub trait ConnectionCodeSource: Send + Sync {
    /// Produce the next candidate code.
    fn next_code(&self) -> ConnectionId;
}

/// Thread-local RNG backed code source used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomConnectionCodes {
    length: CodeLength,
}

impl RandomConnectionCodes {
    /// Create a source producing codes of `length` characters.
    #[must_use]
    pub const fn new(length: CodeLength) -> Self {
        Self { length }
    }
}

impl ConnectionCodeSource for RandomConnectionCodes {
    fn next_code(&self) -> ConnectionId {
        generate_connection_code(&mut rand::thread_rng(), self.length)
    }
}
