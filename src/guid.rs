//! GUID helpers for store and head-office tokens.
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static GUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-5][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$",
    )
    .expect("valid GUID regex")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuidError {
    #[error("input has {0} alphanumeric characters; a GUID needs 32")]
    TooShort(usize),
}

/// Reformat a pasted token into the 8-4-4-4-12 layout.
///
/// Non-alphanumeric characters are dropped first, so an already hyphenated
/// GUID round-trips unchanged. Characters past the 32nd are ignored.
pub fn format_to_guid(raw: &str) -> Result<String, GuidError> {
    let clean: Vec<char> = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if clean.len() < 32 {
        return Err(GuidError::TooShort(clean.len()));
    }

    let mut guid = String::with_capacity(36);
    for (idx, c) in clean.iter().take(32).enumerate() {
        if matches!(idx, 8 | 12 | 16 | 20) {
            guid.push('-');
        }
        guid.push(*c);
    }
    Ok(guid)
}

/// True when `guid` is a canonical version 1-5 GUID with an RFC 4122 variant.
pub fn is_valid_guid(guid: &str) -> bool {
    GUID_RE.is_match(guid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_plain_hex() {
        let guid = format_to_guid("123e4567e89b12d3a456426614174000").unwrap();
        assert_eq!(guid, "123e4567-e89b-12d3-a456-426614174000");
        assert!(is_valid_guid(&guid));
    }

    #[test]
    fn strips_separators_and_truncates() {
        let guid = format_to_guid("{123E4567-E89B-12D3-A456-426614174000}-extra").unwrap();
        assert_eq!(guid, "123E4567-E89B-12D3-A456-426614174000");
    }

    #[test]
    fn any_alphanumerics_get_the_shape() {
        let guid = format_to_guid("abcdefghijklmnopqrstuvwxyzABCDEFGH").unwrap();
        let parts: Vec<usize> = guid.split('-').map(str::len).collect();
        assert_eq!(parts, vec![8, 4, 4, 4, 12]);
        // Shape only; non-hex letters never pass validation.
        assert!(!is_valid_guid(&guid));
    }

    #[test]
    fn short_input_fails() {
        assert_eq!(format_to_guid("abc-123"), Err(GuidError::TooShort(6)));
        assert_eq!(format_to_guid(""), Err(GuidError::TooShort(0)));
        assert!(format_to_guid("123e4567-e89b-12d3-a456-42661417400").is_err());
    }

    #[test]
    fn validation_checks_version_and_variant() {
        assert!(is_valid_guid("123e4567-e89b-12d3-a456-426614174000"));
        assert!(is_valid_guid("123E4567-E89B-52D3-B456-426614174000"));
        assert!(!is_valid_guid("not-a-guid"));
        // version nibble 0 and 6
        assert!(!is_valid_guid("123e4567-e89b-02d3-a456-426614174000"));
        assert!(!is_valid_guid("123e4567-e89b-62d3-a456-426614174000"));
        // variant nibble c
        assert!(!is_valid_guid("123e4567-e89b-12d3-c456-426614174000"));
        // missing hyphens
        assert!(!is_valid_guid("123e4567e89b12d3a456426614174000"));
    }
}
