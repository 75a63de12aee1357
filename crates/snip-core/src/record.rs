use serde::{Deserialize, Serialize};

/// A persisted shortened URL.
///
/// The `id` is assigned by the store when the record is saved and never
/// changes afterwards. The public token is derived from it by an
/// [`IdCodec`](crate::IdCodec), so the token itself is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenedUrl {
    pub id: u64,
    pub original_url: String,
}

impl ShortenedUrl {
    pub fn new(id: u64, original_url: impl Into<String>) -> Self {
        Self {
            id,
            original_url: original_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_layout_is_stable() {
        let record = ShortenedUrl::new(42, "https://example.org/page");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":42,"original_url":"https://example.org/page"}"#);

        let back: ShortenedUrl = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
