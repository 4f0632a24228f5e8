use std::path::Path;

/// Number of leading base-name characters that make up an identifying key.
pub const KEY_LENGTH: usize = 20;

/// Derive the identifying key for a filename: the extension is stripped and the
/// first [`KEY_LENGTH`] characters of what remains are kept. Shorter base names
/// are returned whole.
pub fn extract_key(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.chars().take(KEY_LENGTH).collect()
}

/// Key used to tell apart local files whose identifying keys collide.
pub fn composite_match_key(key: &str, filename: &str) -> String {
    format!("{}|{}", key, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_key_truncates_to_twenty() {
        assert_eq!(
            extract_key("ABCDEFGHIJKLMNOPQRST12345.jpg"),
            "ABCDEFGHIJKLMNOPQRST"
        );
    }

    #[test]
    fn test_extract_key_short_name_not_padded() {
        assert_eq!(extract_key("short.JPG"), "short");
    }

    #[test]
    fn test_extract_key_strips_only_last_extension() {
        assert_eq!(extract_key("a.b.jpeg"), "a.b");
        assert_eq!(extract_key("noext"), "noext");
    }

    #[test]
    fn test_extract_key_counts_characters_not_bytes() {
        let name = "ÄÖÜäöüßÄÖÜäöüßÄÖÜäöüß.jpg";
        let key = extract_key(name);
        assert_eq!(key.chars().count(), KEY_LENGTH);
        assert!(name.starts_with(&key));
    }

    #[test]
    fn test_extract_key_bounded_and_deterministic() {
        let names = [
            "",
            ".jpg",
            "x.jpg",
            "0123456789012345678901234567890123456789.jpeg",
            "serial 0001 (copy).JPG",
        ];
        for name in names {
            let key = extract_key(name);
            assert!(key.chars().count() <= KEY_LENGTH);
            assert_eq!(key, extract_key(name));
        }
    }

    #[test]
    fn test_composite_match_key() {
        assert_eq!(composite_match_key("SERIAL123", "photo.jpg"), "SERIAL123|photo.jpg");
    }
}
