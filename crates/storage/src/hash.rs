use sha2::{Digest, Sha256};

/// SHA-256 of an in-memory byte slice.
pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Lowercase hex, 64 chars.
pub fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Key for the unique index over raw message text.
pub fn raw_sms_hash(raw: &str) -> String {
    to_hex(&sha256_bytes(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_known_vector() {
        assert_eq!(
            raw_sms_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn whitespace_is_significant() {
        assert_ne!(raw_sms_hash("Rs 100 debited"), raw_sms_hash("Rs 100 debited "));
        assert_eq!(raw_sms_hash("Rs 100 debited").len(), 64);
    }
}
