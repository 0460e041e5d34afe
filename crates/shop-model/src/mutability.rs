//! Mutability classification
//!
//! Seed records (ids below [`EDITABLE_THRESHOLD`]) are read-only demo data;
//! everything from the threshold up is live and may be edited or deleted.
//! Every mutation path must go through [`ensure_editable`], so the threshold
//! is defined in exactly one place.

use crate::id::RecordId;
use crate::record::Resource;
use serde::{Deserialize, Serialize};

/// First identifier that belongs to live, writable data
pub const EDITABLE_THRESHOLD: i64 = 80;

/// Which backend a record is expected to live in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Pre-provisioned, read-only seed data
    Seed,
    /// Data created through the writable backend
    Live,
}

/// Classification of one identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Expected origin
    pub origin: Origin,
    /// Whether mutations are permitted
    pub editable: bool,
}

/// Expected origin of a record
///
/// Ids whose numeric sequence is below the threshold are seed data. Ids
/// without a numeric sequence are opaque live identifiers.
#[must_use]
pub fn source_of(id: &RecordId) -> Origin {
    match id.sequence() {
        Some(sequence) if sequence < EDITABLE_THRESHOLD => Origin::Seed,
        _ => Origin::Live,
    }
}

/// Whether a record may be updated or deleted
#[inline]
#[must_use]
pub fn is_editable(id: &RecordId) -> bool {
    source_of(id) == Origin::Live
}

/// Origin and editability together
#[inline]
#[must_use]
pub fn source_info(id: &RecordId) -> SourceInfo {
    let origin = source_of(id);
    SourceInfo {
        origin,
        editable: origin == Origin::Live,
    }
}

/// Fail fast when a mutation targets seed data
///
/// # Errors
/// [`ReadOnlyViolation`] when `id` is below [`EDITABLE_THRESHOLD`].
pub fn ensure_editable(resource: Resource, id: &RecordId) -> Result<(), ReadOnlyViolation> {
    if is_editable(id) {
        Ok(())
    } else {
        Err(ReadOnlyViolation {
            resource,
            id: id.clone(),
        })
    }
}

/// Mutation attempted on read-only seed data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "{resource} {id} is read-only seed data; only ids {threshold} and above can be modified",
    threshold = EDITABLE_THRESHOLD
)]
pub struct ReadOnlyViolation {
    /// Collection of the rejected record
    pub resource: Resource,
    /// Rejected identifier
    pub id: RecordId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundaries() {
        assert!(!is_editable(&RecordId::Numeric(1)));
        assert!(!is_editable(&RecordId::Numeric(79)));
        assert!(is_editable(&RecordId::Numeric(80)));
        assert!(is_editable(&RecordId::Numeric(150)));
    }

    #[test]
    fn order_ids_use_the_same_threshold() {
        assert!(!is_editable(&RecordId::seed_order(42)));
        assert!(!is_editable(&RecordId::seed_order(79)));
        assert!(is_editable(&RecordId::seed_order(80)));
        assert_eq!(source_of(&RecordId::Text("ORD-LX3K-AB12".into())), Origin::Live);
        assert_eq!(source_of(&RecordId::Text("ORD-00042x".into())), Origin::Seed);
    }

    #[test]
    fn read_only_error_names_the_record() {
        let err = ensure_editable(Resource::Orders, &RecordId::seed_order(42)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("order ORD-00042"));
        assert!(message.contains("read-only"));
        assert!(ensure_editable(Resource::Products, &RecordId::Numeric(80)).is_ok());
    }

    #[test]
    fn source_info_is_consistent() {
        let info = source_info(&RecordId::Numeric(12));
        assert_eq!(info, SourceInfo { origin: Origin::Seed, editable: false });
    }
}
