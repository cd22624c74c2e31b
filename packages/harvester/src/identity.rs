//! Deterministic record identity.
//!
//! The uuid of a record is the lowercase hex SHA-1 digest of its identity
//! components joined with `:`. Entities use `(origin, pk)`, locales use
//! `(origin, locale code)`. Downstream deduplication depends on this exact
//! canonical form.

use sha1::{Digest, Sha1};

use crate::error::{HarvesterError, Result};

/// Separator placed between identity components before hashing.
pub const COMPONENT_SEPARATOR: &str = ":";

/// Derive a uuid from its identity components.
///
/// # Errors
/// Returns [`HarvesterError::InvalidIdentity`] when a component is empty.
///
/// # Examples
/// ```
/// use pontoon_harvester::identity::uuid;
///
/// assert_eq!(
///     uuid(&["https://pontoon.example.com/es", "280952"]).unwrap(),
///     "9dc5c9c9cb1319c7cd397f12570632f7a152af5a"
/// );
/// ```
pub fn uuid(components: &[&str]) -> Result<String> {
    if let Some(index) = components.iter().position(|c| c.is_empty()) {
        return Err(HarvesterError::InvalidIdentity { index });
    }

    let mut hasher = Sha1::new();
    hasher.update(components.join(COMPONENT_SEPARATOR).as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_uuids() {
        let origin = "https://pontoon.example.com/es";
        let expected = [
            ("280952", "9dc5c9c9cb1319c7cd397f12570632f7a152af5a"),
            ("292898", "11e2e9a975bc4ac9e5447464666553c9bce6a431"),
            ("279094", "8207b2c6fcc9e3a76ae531a61f6611f8486c7f3f"),
        ];
        for (pk, digest) in expected {
            assert_eq!(uuid(&[origin, pk]).unwrap(), digest);
        }
    }

    #[test]
    fn test_locale_uuids() {
        let origin = "https://pontoon.example.com";
        assert_eq!(
            uuid(&[origin, "ab"]).unwrap(),
            "02ba8534699aeadcd39874462fb411486cbb156b"
        );
        assert_eq!(
            uuid(&[origin, "ach"]).unwrap(),
            "3ec24c3ea3af0c8e00ecdb7d3a9808e671a7658f"
        );
    }

    #[test]
    fn test_uuid_is_deterministic() {
        let first = uuid(&["https://pontoon.example.com/fr", "42"]).unwrap();
        let second = uuid(&["https://pontoon.example.com/fr", "42"]).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 40);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_uuid_depends_on_origin() {
        let es = uuid(&["https://pontoon.example.com/es", "42"]).unwrap();
        let fr = uuid(&["https://pontoon.example.com/fr", "42"]).unwrap();
        assert_ne!(es, fr);
    }

    #[test]
    fn test_uuid_rejects_empty_component() {
        assert!(matches!(
            uuid(&["https://pontoon.example.com", ""]),
            Err(HarvesterError::InvalidIdentity { index: 1 })
        ));
    }
}
