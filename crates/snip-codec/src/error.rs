use thiserror::Error;

/// Errors returned when building a codec from invalid settings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("alphabet must contain at least {min} unique characters, got {actual}")]
    AlphabetTooShort { min: usize, actual: usize },
    #[error("alphabet must not contain whitespace")]
    AlphabetContainsWhitespace,
    #[error("alphabet character {0:?} is not url safe")]
    AlphabetNotUrlSafe(char),
}
