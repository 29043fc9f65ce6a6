//! Object key naming for uploaded question images.
//!
//! Keys have the shape `{prefix}/{base}-{suffix}{ext}` where `base` is the
//! uploaded file's base name cut to [`MAX_BASE_NAME_CHARS`] characters and
//! `suffix` is the first segment of a random v4 UUID. Keys are not checked
//! against the store for uniqueness; the suffix carries 32 bits of entropy.

use std::borrow::Cow;

use uuid::Uuid;

/// Key prefix (folder) for question images in the bucket.
pub const DEFAULT_KEY_PREFIX: &str = "questions";

/// Maximum number of characters kept from the original base name.
pub const MAX_BASE_NAME_CHARS: usize = 20;

/// Length of the random hex suffix appended to the base name.
pub const SUFFIX_LEN: usize = 8;

/// Split a file name into `(base, extension)` the way a POSIX path parser does.
///
/// Only the final `/`-separated component is considered; trailing slashes
/// are ignored and `\\` is an ordinary character. The extension keeps its
/// leading dot. A leading dot on the base name is not an extension
/// separator (`.env` has no extension), and `..` has none either.
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    let trimmed = file_name.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if last == ".." {
        return (last, "");
    }
    match last.rfind('.') {
        Some(idx) if idx > 0 => last.split_at(idx),
        _ => (last, ""),
    }
}

/// Build a fresh object key for an uploaded file under `prefix`.
///
/// # Examples
///
/// ```
/// use satprep_core::image_key::generate_object_key;
///
/// let key = generate_object_key("questions", "diagram.png");
/// assert!(key.starts_with("questions/diagram-"));
/// assert!(key.ends_with(".png"));
/// ```
pub fn generate_object_key(prefix: &str, original_file_name: &str) -> String {
    let (base, extension) = split_file_name(original_file_name);
    let truncated: String = base.chars().take(MAX_BASE_NAME_CHARS).collect();
    let suffix = short_suffix();
    format!("{prefix}/{truncated}-{suffix}{extension}")
}

/// Derive the object key from a stored location reference.
///
/// The key is `{prefix}/{tail}` where `tail` is the percent-decoded text
/// after the final `/` of the reference. A tail that does not decode to
/// UTF-8 is used as is. Returns `None` when the tail is empty, since no
/// object can be addressed from such a reference.
pub fn object_key_from_reference(prefix: &str, reference: &str) -> Option<String> {
    let tail = reference.rsplit('/').next().unwrap_or(reference);
    if tail.is_empty() {
        return None;
    }
    let tail = urlencoding::decode(tail).unwrap_or(Cow::Borrowed(tail));
    Some(format!("{prefix}/{tail}"))
}

/// First segment of a v4 UUID, always [`SUFFIX_LEN`] lowercase hex chars.
fn short_suffix() -> String {
    let (first_segment, _, _, _) = Uuid::new_v4().as_fields();
    format!("{first_segment:08x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Return the suffix part of a generated key for `base-suffix.ext` names.
    fn suffix_of<'a>(key: &'a str, prefix_and_base: &str, ext: &str) -> &'a str {
        key.strip_prefix(prefix_and_base)
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|rest| rest.strip_suffix(ext))
            .expect("key should follow the naming convention")
    }

    #[test]
    fn split_simple_name() {
        assert_eq!(split_file_name("diagram.png"), ("diagram", ".png"));
    }

    #[test]
    fn split_keeps_last_extension_only() {
        assert_eq!(split_file_name("archive.tar.gz"), ("archive.tar", ".gz"));
    }

    #[test]
    fn split_dotfile_has_no_extension() {
        assert_eq!(split_file_name(".env"), (".env", ""));
    }

    #[test]
    fn split_ignores_directories() {
        assert_eq!(split_file_name("uploads/2024/graph.jpeg"), ("graph", ".jpeg"));
        assert_eq!(split_file_name("uploads/graph.jpeg/"), ("graph", ".jpeg"));
    }

    #[test]
    fn split_treats_backslash_as_ordinary_character() {
        assert_eq!(split_file_name("C:\\tmp\\graph.jpeg"), ("C:\\tmp\\graph", ".jpeg"));
    }

    #[test]
    fn split_dot_dirs_have_no_extension() {
        assert_eq!(split_file_name(".."), ("..", ""));
        assert_eq!(split_file_name("."), (".", ""));
        assert_eq!(split_file_name("..."), ("..", "."));
    }

    #[test]
    fn split_without_extension() {
        assert_eq!(split_file_name("README"), ("README", ""));
    }

    #[test]
    fn short_name_is_kept_whole() {
        let key = generate_object_key(DEFAULT_KEY_PREFIX, "diagram.png");
        let suffix = suffix_of(&key, "questions/diagram", ".png");
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn long_name_is_truncated_to_twenty_chars() {
        let key = generate_object_key(DEFAULT_KEY_PREFIX, "a_very_long_geometry_diagram_name.svg");
        let suffix = suffix_of(&key, "questions/a_very_long_geometry", ".svg");
        assert_eq!(suffix.len(), SUFFIX_LEN);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let name = format!("{}.png", "é".repeat(25));
        let key = generate_object_key(DEFAULT_KEY_PREFIX, &name);
        let expected_base = format!("questions/{}", "é".repeat(MAX_BASE_NAME_CHARS));
        assert!(key.starts_with(&expected_base));
    }

    #[test]
    fn same_input_yields_different_keys() {
        let a = generate_object_key(DEFAULT_KEY_PREFIX, "diagram.png");
        let b = generate_object_key(DEFAULT_KEY_PREFIX, "diagram.png");
        assert_ne!(a, b);
    }

    #[test]
    fn custom_prefix_is_used() {
        let key = generate_object_key("staging/questions", "x.gif");
        assert!(key.starts_with("staging/questions/x-"));
    }

    #[test]
    fn key_from_full_url() {
        assert_eq!(
            object_key_from_reference(
                DEFAULT_KEY_PREFIX,
                "https://bucket.s3.us-east-1.amazonaws.com/questions/diagram-1a2b3c4d.png"
            ),
            Some("questions/diagram-1a2b3c4d.png".to_string())
        );
    }

    #[test]
    fn key_from_bare_name() {
        assert_eq!(
            object_key_from_reference(DEFAULT_KEY_PREFIX, "diagram-1a2b3c4d.png"),
            Some("questions/diagram-1a2b3c4d.png".to_string())
        );
    }

    #[test]
    fn key_from_encoded_reference_is_decoded() {
        assert_eq!(
            object_key_from_reference(
                DEFAULT_KEY_PREFIX,
                "https://bucket.s3.us-east-1.amazonaws.com/questions/what%20is%20x%3F%20%232-0caa52c3.png"
            ),
            Some("questions/what is x? #2-0caa52c3.png".to_string())
        );
    }

    #[test]
    fn key_from_reference_with_invalid_escape_is_kept_raw() {
        assert_eq!(
            object_key_from_reference(DEFAULT_KEY_PREFIX, "https://bucket/questions/a%FF.png"),
            Some("questions/a%FF.png".to_string())
        );
    }

    #[test]
    fn key_from_reference_with_trailing_slash_is_none() {
        assert_eq!(
            object_key_from_reference(DEFAULT_KEY_PREFIX, "https://bucket/questions/"),
            None
        );
    }
}
