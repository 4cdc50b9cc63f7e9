//! # Identity Resolver
//!
//! Deterministic identifier derivation and validation.
//!
//! - `derive_uid` hashes a semantic path into a version-3 UUID; equal paths
//!   (ignoring case and surrounding whitespace per segment) always collide
//!   to the same identifier, across runs and across processes. This is the
//!   dedup key for the whole system.
//! - `is_valid_uid` checks an externally supplied identifier: canonical
//!   format plus an accepted version set. Valid identifiers are preserved
//!   verbatim; everything else is silently regenerated.

use uuid::Uuid;

/// Separator joining path segments before hashing.
const PATH_SEPARATOR: &str = "/";

/// UUID versions accepted for most supplied identifiers (derived v3 or
/// randomly assigned v4).
pub const STANDARD_VERSIONS: &[usize] = &[3, 4];

/// UUID versions accepted for data-quality systems, which arrive with
/// pre-defined v4 identifiers only.
pub const DQ_VERSIONS: &[usize] = &[4];

/// Derive a stable identifier from an ordered semantic path.
///
/// Segments are trimmed, lower-cased, and joined with `/`; the result is
/// hashed as a version-3 UUID in the OID namespace. Pure function: the
/// same path always yields the same identifier.
#[must_use]
pub fn derive_uid<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let path = segments
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR);
    tracing::trace!(path = %path, "deriving identifier");
    Uuid::new_v3(&Uuid::NAMESPACE_OID, path.as_bytes()).to_string()
}

/// Check whether a candidate string is a canonical UUID of an accepted
/// version.
///
/// The candidate must round-trip to its canonical lower-hyphenated
/// rendering, so uppercase, braced, or URN forms are rejected — archives
/// key documents by the exact string.
#[must_use]
pub fn is_valid_uid(candidate: &str, versions: &[usize]) -> bool {
    match Uuid::try_parse(candidate) {
        Ok(parsed) => {
            parsed.hyphenated().to_string() == candidate
                && versions.contains(&parsed.get_version_num())
        }
        Err(_) => false,
    }
}

/// Convenience wrapper for optional supplied identifiers.
#[must_use]
pub fn valid_uid(candidate: Option<&str>, versions: &[usize]) -> Option<String> {
    candidate
        .filter(|c| is_valid_uid(c, versions))
        .map(str::to_string)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        let a = derive_uid(["modeltype.process", "22: Utilities", "RFCW", "coal plant"]);
        let b = derive_uid(["modeltype.process", "22: Utilities", "RFCW", "coal plant"]);
        assert_eq!(a, b);
    }

    #[test]
    fn derive_ignores_case_and_whitespace() {
        let a = derive_uid(["modeltype.flow", "air", "Carbon dioxide"]);
        let b = derive_uid(["modeltype.flow", "  AIR  ", "  carbon DIOXIDE"]);
        assert_eq!(a, b);
    }

    #[test]
    fn derive_is_order_sensitive() {
        let a = derive_uid(["a", "b"]);
        let b = derive_uid(["b", "a"]);
        assert_ne!(a, b);
    }

    #[test]
    fn derived_uid_is_version_3() {
        let uid = derive_uid(["modeltype.location", "US"]);
        assert!(is_valid_uid(&uid, &[3]));
        assert!(!is_valid_uid(&uid, &[4]));
    }

    #[test]
    fn validation_rejects_garbage() {
        assert!(!is_valid_uid("c9bf9e58", STANDARD_VERSIONS));
        assert!(!is_valid_uid("", STANDARD_VERSIONS));
        assert!(!is_valid_uid("not-a-uuid-at-all-nope", STANDARD_VERSIONS));
    }

    #[test]
    fn validation_accepts_canonical_v4() {
        assert!(is_valid_uid(
            "c9bf9e57-1685-4c89-bafb-ff5af830be8a",
            STANDARD_VERSIONS
        ));
    }

    #[test]
    fn validation_rejects_non_canonical_rendering() {
        // Same UUID, uppercase rendering: not the string an archive would key on.
        assert!(!is_valid_uid(
            "C9BF9E57-1685-4C89-BAFB-FF5AF830BE8A",
            STANDARD_VERSIONS
        ));
    }

    #[test]
    fn valid_uid_filters_by_version() {
        let v4 = "c9bf9e57-1685-4c89-bafb-ff5af830be8a";
        assert_eq!(valid_uid(Some(v4), DQ_VERSIONS).as_deref(), Some(v4));
        let v3 = derive_uid(["modeltype.dq_system", "dqSystem", "x"]);
        assert_eq!(valid_uid(Some(&v3), DQ_VERSIONS), None);
        assert_eq!(valid_uid(None, STANDARD_VERSIONS), None);
    }
}
