use sha2::{Digest, Sha256};

/// Length of a hex-encoded content id.
pub const CONTENT_ID_LEN: usize = 64;

/// Derive the content id of a source URL: `hex(SHA-256(url))`.
///
/// Pure function of the URL bytes; identical strings always collide.
pub fn content_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// True if `id` has the exact shape of a content id (64 lowercase hex chars).
pub fn is_content_id(id: &str) -> bool {
    id.len() == CONTENT_ID_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn matches_sha256_vectors() {
        assert_eq!(
            content_id(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            content_id("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn same_url_same_id() {
        let a = content_id("http://example.com/a");
        let b = content_id(&String::from("http://example.com/a"));
        assert_eq!(a, b);
        assert_eq!(a.len(), CONTENT_ID_LEN);
        assert!(is_content_id(&a));
    }

    #[test]
    fn distinct_urls_distinct_ids() {
        let ids: HashSet<String> = (0..10_000)
            .map(|i| content_id(&format!("http://example.com/page/{i}")))
            .collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn rejects_non_ids() {
        assert!(!is_content_id(""));
        assert!(!is_content_id("../../etc/passwd"));
        assert!(!is_content_id(&"A".repeat(CONTENT_ID_LEN)));
        assert!(!is_content_id(&"a".repeat(CONTENT_ID_LEN + 1)));
        assert!(is_content_id(&"0f".repeat(CONTENT_ID_LEN / 2)));
    }
}
