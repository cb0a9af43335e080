//! # DICOM-volume-organizer library
//!
//! This crate turns an unordered set of single-slice DICOM files belonging
//! to one series into geometrically consistent volumes.

//!
//! A nominal series often bundles several logically separate volumes:
//! multiple time points, diffusion gradient directions, cardiac trigger
//! times or slice orientations. The organizer proposes one candidate volume
//! per distinct value of each of these attributes next to the default
//! volume that holds the whole series. Every candidate is then sorted along
//! its scan axis, the direction perpendicular to the image plane, and its
//! slice spacing is checked for uniformity.
//!
//! Headers are only ever read through the [`HeaderLookup`] trait, so the
//! organizer works with any file identifier. [`DicomHeaders`] reads them
//! from DICOM files with dicom-rs (stopping before the pixel data),
//! [`InMemoryHeaders`] and plain closures serve synthetic values. Header
//! reading and per-volume sorting run in parallel using rayon.
//!
//! Problems with the data never abort processing. Each volume carries at
//! most one [`VolumeWarning`]:
//!  - Multi-frame reference image
//!  - Reference image without position or orientation (volume left unsorted)
//!  - Slices without position (placed after the sorted slices)
//!  - Irregular slice spacing
//!
//! # Examples
//!
//! ## Organizing a directory of DICOM files
//!
//! ```no_run
//! # use dicom_volume_organizer::VolumeOrganizer;
//! let volumes = VolumeOrganizer::default()
//!     .organize_directory("dicom")
//!     .expect("should have organized files from directory");
//! for volume in &volumes {
//!     println!("{}: {} files", volume.name, volume.files.len());
//! }
//! ```
//!
//! ## Organizing files with synthetic headers
//!
//! ```
//! # use dicom_volume_organizer::{InMemoryHeaders, VolumeOrganizer};
//! # use dicom_dictionary_std::tags;
//! let mut headers = InMemoryHeaders::new();
//! for (file, z) in [("b", "5"), ("a", "0"), ("c", "10")] {
//!     headers.insert(file, tags::IMAGE_POSITION_PATIENT, format!("0\\0\\{z}"));
//!     headers.insert(file, tags::IMAGE_ORIENTATION_PATIENT, "1\\0\\0\\0\\1\\0");
//! }
//! let volumes = VolumeOrganizer::default()
//!     .organize(&["b", "a", "c"], &headers)
//!     .expect("file list is not empty");
//! assert_eq!(volumes[0].files, ["a", "b", "c"]);
//! assert_eq!(volumes[0].warning, None);
//! ```

pub mod enums;
pub mod geometry;
pub mod header;
pub mod organizer;
pub mod partitioner;
pub mod slice_record;
pub mod sorter;
pub mod volume_group;

pub use enums::{PartitionKey, VolumeWarning};
pub use header::{DicomHeaders, HeaderLookup, InMemoryHeaders, UNKNOWN};
pub use organizer::{OrganizerConfig, OrganizerError, VolumeOrganizer};
pub use partitioner::SeriesPartitioner;
pub use slice_record::{RecordIndex, SliceRecord};
pub use sorter::{DEFAULT_EPSILON, VolumeGeometrySorter};
pub use volume_group::VolumeGroup;
