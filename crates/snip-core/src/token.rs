use serde::Serialize;
use std::fmt::Display;

/// A public short token produced by an [`IdCodec`](crate::IdCodec).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Wraps an already-encoded token.
    ///
    /// Only codecs should call this; callers that receive a token from the
    /// outside world pass it to [`IdCodec::decode`](crate::IdCodec::decode)
    /// as a plain string instead.
    pub fn new_unchecked(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
