use std::collections::HashMap;

use log::debug;

use super::filter::Filter;
use super::model::{ApproachRecord, CloseApproach, NearEarthObject};

// ---------------------------------------------------------------------------
// NeoDatabase – the linked, indexed dataset
// ---------------------------------------------------------------------------

/// An indexed collection of NEOs and their close approaches.
///
/// Both collections are arenas owned by the database; cross-references between
/// them are plain indexes, so there is no ownership cycle. Construction builds
/// the two lookup maps and performs the one-time join; after that the database
/// is read-only. Rebuilding means constructing a new instance.
#[derive(Debug, Clone)]
pub struct NeoDatabase {
    neos: Vec<NearEarthObject>,
    approaches: Vec<CloseApproach>,
    by_designation: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl NeoDatabase {
    /// Link and index the supplied collections, preserving their order.
    ///
    /// Duplicate designations (or names) are tolerated: the later NEO wins the
    /// index slot. An approach whose designation matches no NEO is left
    /// unlinked; that is expected of fresh close-approach feeds, not an error.
    pub fn new(mut neos: Vec<NearEarthObject>, mut approaches: Vec<CloseApproach>) -> Self {
        let mut by_designation = HashMap::with_capacity(neos.len());
        let mut by_name = HashMap::new();
        for (idx, neo) in neos.iter().enumerate() {
            by_designation.insert(neo.designation.clone(), idx);
            if let Some(name) = &neo.name {
                by_name.insert(name.clone(), idx);
            }
        }

        let mut orphans = 0usize;
        for (idx, approach) in approaches.iter_mut().enumerate() {
            match by_designation.get(&approach.designation) {
                Some(&neo_idx) => {
                    approach.neo = Some(neo_idx);
                    neos[neo_idx].approaches.push(idx);
                }
                None => orphans += 1,
            }
        }
        debug!(
            "linked {} approaches to {} NEOs ({orphans} orphans)",
            approaches.len(),
            neos.len()
        );

        NeoDatabase {
            neos,
            approaches,
            by_designation,
            by_name,
        }
    }

    /// Look up an NEO by its primary designation. O(1), `None` when absent.
    pub fn get_neo_by_designation(&self, designation: &str) -> Option<&NearEarthObject> {
        self.by_designation
            .get(designation)
            .map(|&idx| &self.neos[idx])
    }

    /// Look up an NEO by its IAU name. O(1), `None` when absent or when the
    /// name is empty (unnamed NEOs are never indexed by name).
    pub fn get_neo_by_name(&self, name: &str) -> Option<&NearEarthObject> {
        self.by_name.get(name).map(|&idx| &self.neos[idx])
    }

    /// All NEOs, in load order.
    pub fn neos(&self) -> &[NearEarthObject] {
        &self.neos
    }

    /// All close approaches, in load order.
    pub fn approaches(&self) -> &[CloseApproach] {
        &self.approaches
    }

    /// The NEO an approach was linked to, `None` for orphans.
    pub fn neo_of(&self, approach: &CloseApproach) -> Option<&NearEarthObject> {
        approach.neo.map(|idx| &self.neos[idx])
    }

    /// The approaches linked to an NEO, in the order they were supplied.
    pub fn approaches_of<'a>(
        &'a self,
        neo: &'a NearEarthObject,
    ) -> impl Iterator<Item = &'a CloseApproach> + 'a {
        neo.approaches.iter().map(move |&idx| &self.approaches[idx])
    }

    /// Stream the close approaches matching every filter, in stored order.
    ///
    /// The iterator is lazy: approaches are tested as the consumer pulls, and
    /// per-approach evaluation stops at the first failing filter. Each call
    /// returns a fresh iterator, so querying is repeatable.
    pub fn query<'a>(
        &'a self,
        filters: &'a [Filter],
    ) -> impl Iterator<Item = &'a CloseApproach> + 'a {
        self.approaches
            .iter()
            .filter(move |approach| filters.iter().all(|f| f.matches(approach, self.neo_of(approach))))
    }

    /// The flattened serialization view of one approach.
    pub fn record(&self, approach: &CloseApproach) -> ApproachRecord {
        ApproachRecord::new(approach, self.neo_of(approach))
    }
}
