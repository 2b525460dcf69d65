//! Correlation ids.
//!
//! Ids are plain strings on the wire. Client-generated ids take the form
//! `req_<n>` where `n` starts at 1 and increases by one per request for the
//! lifetime of a channel, across reconnects.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::constants::REQUEST_ID_PREFIX;

/// Correlation id linking a request to its response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Return the inner string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume self and return the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Monotonic id source owned by a single channel.
///
/// Shared between the channel handle and its driver, so ids are available
/// to the caller before the frame is queued.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    /// Create a generator whose first id is `req_1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next id.
    pub fn next_id(&self) -> RequestId {
        let n = self.last.fetch_add(1, Ordering::Relaxed) + 1;
        RequestId(format!("{REQUEST_ID_PREFIX}{n}"))
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_id_is_req_1() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next_id().as_str(), "req_1");
        assert_eq!(ids.next_id().as_str(), "req_2");
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn ids_never_repeat() {
        let ids = IdGenerator::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(ids.next_id()));
        }
    }

    #[test]
    fn shared_generator_hands_out_distinct_ids() {
        let ids = std::sync::Arc::new(IdGenerator::new());
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let ids = std::sync::Arc::clone(&ids);
                std::thread::spawn(move || (0..250).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();
        let mut seen = std::collections::HashSet::new();
        for t in threads {
            for id in t.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(ids.issued(), 1000);
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = RequestId::from("req_7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"req_7\"");
        let back: RequestId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back.to_string(), "abc");
    }
}
