//! Splitting of a series into candidate sub-volumes.
//!
//! A nominal series can bundle several logically separate volumes, e.g. one
//! per diffusion gradient direction or per cardiac trigger time. For every
//! partition key whose value varies across the series the partitioner
//! proposes one group per distinct value, next to the default group that
//! holds the whole series.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    enums::PartitionKey,
    header::{HeaderLookup, UNKNOWN},
    slice_record::RecordIndex,
    volume_group::VolumeGroup,
};

#[derive(Debug, Clone)]
pub struct SeriesPartitioner {
    keys: Vec<PartitionKey>,
    deduplicate: bool,
}

impl Default for SeriesPartitioner {
    fn default() -> Self {
        Self::new(PartitionKey::ALL.to_vec())
    }
}

impl SeriesPartitioner {
    /// Partition on `keys`, in the given order
    pub fn new(keys: Vec<PartitionKey>) -> Self {
        Self {
            keys,
            deduplicate: false,
        }
    }

    /// Skip sub-groups whose files exactly match a sub-group already
    /// proposed for an earlier key.
    ///
    /// Off by default, in which case every key proposes its groups even when
    /// two keys split the series identically.
    pub fn deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }

    /// Group `files` by reading every partition key through `lookup`.
    ///
    /// The default group, named after the series description of the first
    /// file, always comes first.
    pub fn partition<F, L>(&self, files: &[F], lookup: &L) -> Vec<VolumeGroup<F>>
    where
        F: Clone + PartialEq,
        L: HeaderLookup<F> + ?Sized,
    {
        let name = files
            .first()
            .map_or_else(|| UNKNOWN.to_owned(), |file| lookup.series_description(file));
        let values: Vec<Vec<String>> = files
            .iter()
            .map(|file| {
                self.keys
                    .iter()
                    .map(|key| lookup.text_value(file, key.tag()))
                    .collect()
            })
            .collect();

        self.build_groups(files, &name, &values)
    }

    /// Group `files` using the partition values of already extracted
    /// records. Files without a record count as [`UNKNOWN`] for every key.
    pub fn partition_records<F>(
        &self,
        files: &[F],
        records: &RecordIndex<F>,
        name: &str,
    ) -> Vec<VolumeGroup<F>>
    where
        F: Clone + Eq + std::hash::Hash,
    {
        let values: Vec<Vec<String>> = files
            .iter()
            .map(|file| {
                self.keys
                    .iter()
                    .map(|&key| {
                        records
                            .get(file)
                            .map_or(UNKNOWN, |record| record.partition_value(key))
                            .to_owned()
                    })
                    .collect()
            })
            .collect();

        self.build_groups(files, name, &values)
    }

    /// `values[i][k]` is the value of `self.keys[k]` for `files[i]`
    fn build_groups<F>(
        &self,
        files: &[F],
        name: &str,
        values: &[Vec<String>],
    ) -> Vec<VolumeGroup<F>>
    where
        F: Clone + PartialEq,
    {
        let mut groups = vec![VolumeGroup::new(name, files.to_vec(), true)];

        for (k, key) in self.keys.iter().enumerate() {
            let mut distinct: Vec<(&str, Vec<F>)> = Vec::new();
            let mut index: HashMap<&str, usize> = HashMap::new();

            for (file, file_values) in files.iter().zip(values) {
                let value = file_values[k].as_str();
                let slot = *index.entry(value).or_insert_with(|| {
                    distinct.push((value, Vec::new()));
                    distinct.len() - 1
                });
                distinct[slot].1.push(file.clone());
            }

            if distinct.len() < 2 {
                continue;
            }
            debug!(%key, values = distinct.len(), "series varies in partition key");

            for (value, subset) in distinct {
                if self.deduplicate && groups[1..].iter().any(|group| group.files == subset) {
                    debug!(%key, value, "skipping duplicate sub-volume");
                    continue;
                }
                groups.push(VolumeGroup::new(
                    format!("{name} for {key} of {value}"),
                    subset,
                    false,
                ));
            }
        }

        groups
    }
}
