use crate::clock::truncate_to_second;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A single saved bookmark record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    /// When the bookmark was saved, second precision.
    pub timestamp: Timestamp,
    /// Sanitized display title.
    pub title: String,
    /// The bookmarked URL, stored exactly as submitted.
    pub url: String,
    /// Once set, the record is purged when this time passes.
    pub delete_at: Option<Timestamp>,
}

impl Favorite {
    /// Creates a fresh favorite saved at `now`, with no expiry mark.
    pub fn new(now: Timestamp, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            timestamp: truncate_to_second(now),
            title: title.into(),
            url: url.into(),
            delete_at: None,
        }
    }

    /// The creation timestamp formatted for display and free-text search.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.strftime("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_truncates_to_second_precision() {
        let now = Timestamp::new(1_700_000_000, 500_000_000).unwrap();
        let favorite = Favorite::new(now, "Example", "https://example.com");
        assert_eq!(favorite.timestamp.subsec_nanosecond(), 0);
        assert_eq!(favorite.delete_at, None);
    }

    #[test]
    fn timestamp_text_is_human_readable() {
        let now = Timestamp::from_second(0).unwrap();
        let favorite = Favorite::new(now, "Example", "https://example.com");
        assert_eq!(favorite.timestamp_text(), "1970-01-01 00:00:00");
    }

    #[test]
    fn serde_round_trip() {
        let favorite = Favorite::new(Timestamp::now(), "Example", "https://example.com");
        let json = serde_json::to_string(&favorite).unwrap();
        let back: Favorite = serde_json::from_str(&json).unwrap();
        assert_eq!(back, favorite);
    }
}
