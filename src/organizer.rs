use crate::{
    enums::{PartitionKey, VolumeWarning},
    header::{DicomHeaders, HeaderLookup},
    partitioner::SeriesPartitioner,
    slice_record::extract_records,
    sorter::{DEFAULT_EPSILON, VolumeGeometrySorter},
    volume_group::VolumeGroup,
};

use std::{
    fs,
    hash::Hash,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum OrganizerError {
    #[error("Empty file list")]
    EmptyFileList,

    #[error("No DICOM files found")]
    NoDicomFiles,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),
}

#[derive(Debug, Clone)]
pub struct OrganizerConfig {
    /// Tolerated deviation between slice spacings
    pub epsilon: f64,
    /// Keys that may split a series, in the order their groups are listed
    pub partition_keys: Vec<PartitionKey>,
    /// Drop sub-volumes identical to one proposed for an earlier key
    pub deduplicate: bool,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            partition_keys: PartitionKey::ALL.to_vec(),
            deduplicate: false,
        }
    }
}

impl OrganizerConfig {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_partition_keys(mut self, keys: impl Into<Vec<PartitionKey>>) -> Self {
        self.partition_keys = keys.into();
        self
    }

    pub fn with_deduplication(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }
}

/// Organizes the files of one series into candidate volumes.
#[derive(Debug, Clone, Default)]
pub struct VolumeOrganizer {
    config: OrganizerConfig,
}

impl VolumeOrganizer {
    pub fn new(config: OrganizerConfig) -> Self {
        Self { config }
    }

    /// Split `files` into candidate volumes and sort each of them.
    ///
    /// The first group always holds the whole series and is the only one
    /// selected. Data-quality problems are reported per group through
    /// [`VolumeGroup::warning`], never as errors.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizerError::EmptyFileList`] if `files` is empty
    pub fn organize<F, L>(
        &self,
        files: &[F],
        lookup: &L,
    ) -> Result<Vec<VolumeGroup<F>>, OrganizerError>
    where
        F: Clone + Eq + Hash + Send + Sync,
        L: HeaderLookup<F> + Sync + ?Sized,
    {
        let first = files.first().ok_or(OrganizerError::EmptyFileList)?;

        let records = extract_records(files, lookup, &self.config.partition_keys);
        let name = lookup.series_description(first);
        debug!(series = %name, files = files.len(), "organizing series");

        let groups = self.partitioner().partition_records(files, &records, &name);
        let groups = self.sorter().sort_all(groups, &records);

        let irregular = groups
            .iter()
            .filter(|group| {
                matches!(
                    group.warning,
                    Some(VolumeWarning::IrregularSpacing { .. })
                )
            })
            .count();
        if irregular != 0 {
            info!(
                series = %name,
                "Geometric issues were found with {irregular} of {} volumes",
                groups.len()
            );
        }

        Ok(groups)
    }

    /// Organize DICOM files given by path. Only the headers are read.
    pub fn organize_file_paths(
        &self,
        paths: &[impl AsRef<Path> + Sync],
    ) -> Result<Vec<VolumeGroup<PathBuf>>, OrganizerError> {
        if paths.is_empty() {
            return Err(OrganizerError::EmptyFileList);
        }

        let headers = DicomHeaders::open(paths)?;
        let files: Vec<PathBuf> = paths.iter().map(|path| path.as_ref().to_path_buf()).collect();

        self.organize(&files, &headers)
    }

    /// Organize all ".dcm" files of a directory, taken in file name order
    pub fn organize_directory(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<VolumeGroup<PathBuf>>, OrganizerError> {
        let mut paths: Vec<_> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
            })
            .collect();

        if paths.is_empty() {
            return Err(OrganizerError::NoDicomFiles);
        }
        paths.sort();

        self.organize_file_paths(&paths)
    }

    fn partitioner(&self) -> SeriesPartitioner {
        SeriesPartitioner::new(self.config.partition_keys.clone())
            .deduplicate(self.config.deduplicate)
    }

    fn sorter(&self) -> VolumeGeometrySorter {
        VolumeGeometrySorter::with_epsilon(self.config.epsilon)
    }
}
