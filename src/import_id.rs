//! Import identifier parsing.
//!
//! Single-scope resources import via a bare id. Organization- or
//! environment-scoped resources import via `"<parentId>,<childId>"` with
//! exactly two non-empty comma-separated parts.

use crate::error::ProviderError;

/// Parse a bare import id: non-empty and without a scope separator.
pub fn parse_bare_id(raw: &str) -> Result<String, ProviderError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains(',') {
        return Err(ProviderError::InvalidImportId(format!(
            "expected a bare resource id, got '{}'",
            raw
        )));
    }
    Ok(trimmed.to_string())
}

/// Parse a composite import id of the form `"<parentId>,<childId>"`.
///
/// Strict arity: exactly two parts, both non-empty.
pub fn parse_scoped_id(raw: &str) -> Result<(String, String), ProviderError> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
        return Err(ProviderError::InvalidImportId(format!(
            "expected '<parentId>,<childId>', got '{}'",
            raw
        )));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_id_populates_both_parts() {
        let (parent, child) = parse_scoped_id("org123,cluster456").unwrap();
        assert_eq!(parent, "org123");
        assert_eq!(child, "cluster456");
    }

    #[test]
    fn scoped_id_without_comma_fails_with_expected_format() {
        let err = parse_scoped_id("bad").unwrap_err();
        assert!(err.to_string().contains("<parentId>,<childId>"));
    }

    #[test]
    fn scoped_id_with_empty_parts_fails() {
        assert!(parse_scoped_id(",").is_err());
        assert!(parse_scoped_id("org123,").is_err());
        assert!(parse_scoped_id(",cluster456").is_err());
        assert!(parse_scoped_id("a,b,c").is_err());
    }

    #[test]
    fn bare_id_accepts_simple_ids() {
        assert_eq!(parse_bare_id("env-1").unwrap(), "env-1");
        assert_eq!(parse_bare_id("  env-1  ").unwrap(), "env-1");
    }

    #[test]
    fn bare_id_rejects_empty_and_composite() {
        assert!(parse_bare_id("").is_err());
        assert!(parse_bare_id("a,b").is_err());
    }
}
