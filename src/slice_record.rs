use std::{collections::HashMap, hash::Hash};

use rayon::prelude::*;

use crate::{
    enums::PartitionKey,
    geometry::{Orientation, Vec3},
    header::{HeaderLookup, UNKNOWN},
};

/// Attributes of one file that the organizer works with
#[derive(Debug, Clone, PartialEq)]
pub struct SliceRecord<F> {
    pub file: F,
    pub position: Option<Vec3>,
    pub orientation: Option<Orientation>,
    /// Value of every requested partition key, [`UNKNOWN`] when unresolved
    pub partition_values: HashMap<PartitionKey, String>,
    pub frame_count: Option<u32>,
}

/// Records of a series, keyed by file identifier
pub type RecordIndex<F> = HashMap<F, SliceRecord<F>>;

impl<F: Clone> SliceRecord<F> {
    pub fn extract<L>(file: &F, lookup: &L, keys: &[PartitionKey]) -> Self
    where
        L: HeaderLookup<F> + ?Sized,
    {
        let partition_values = keys
            .iter()
            .map(|&key| (key, lookup.text_value(file, key.tag())))
            .collect();

        Self {
            file: file.clone(),
            position: lookup.position(file),
            orientation: lookup.orientation(file),
            partition_values,
            frame_count: lookup.frame_count(file),
        }
    }

    pub fn partition_value(&self, key: PartitionKey) -> &str {
        self.partition_values
            .get(&key)
            .map_or(UNKNOWN, String::as_str)
    }
}

/// Extract the records of all `files`, reading headers in parallel.
///
/// Files listed more than once share a single record.
pub fn extract_records<F, L>(files: &[F], lookup: &L, keys: &[PartitionKey]) -> RecordIndex<F>
where
    F: Clone + Eq + Hash + Send + Sync,
    L: HeaderLookup<F> + Sync + ?Sized,
{
    files
        .par_iter()
        .map(|file| (file.clone(), SliceRecord::extract(file, lookup, keys)))
        .collect()
}
