//! Merging records from two sources
//!
//! One ordering policy for every resource: records from the first source in
//! their original order, followed by records from the second source whose id
//! has not been seen yet. The first occurrence of an id always wins.

use crate::id::RecordId;
use crate::record::CatalogRecord;
use indexmap::map::Entry;
use indexmap::IndexMap;

/// Result of merging two record sequences
#[derive(Debug, Clone)]
pub struct Merged<R> {
    /// Unique-by-id records in precedence order
    pub records: Vec<R>,
    /// Records discarded because their id was already present
    pub shadowed: usize,
}

/// Merge two sequences, first source wins on id collisions
#[must_use]
pub fn merge<R: CatalogRecord>(primary: Vec<R>, secondary: Vec<R>) -> Vec<R> {
    merge_counted(primary, secondary).records
}

/// Merge two sequences and report how many records were shadowed
#[must_use]
pub fn merge_counted<R: CatalogRecord>(primary: Vec<R>, secondary: Vec<R>) -> Merged<R> {
    let mut picked: IndexMap<RecordId, R> = IndexMap::with_capacity(primary.len() + secondary.len());
    let mut shadowed = 0;

    for record in primary.into_iter().chain(secondary) {
        match picked.entry(record.id().clone()) {
            Entry::Occupied(_) => shadowed += 1,
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }

    Merged {
        records: picked.into_values().collect(),
        shadowed,
    }
}
