//! Access to per-file header attributes.
//!
//! The organizer never parses headers itself. Everything it needs goes
//! through [`HeaderLookup`], which resolves a tag of one file to its value
//! or to nothing. Any closure `Fn(&F, Tag) -> Option<String>` is a lookup,
//! [`InMemoryHeaders`] holds synthetic attributes and [`DicomHeaders`] reads
//! them from DICOM files.

use std::{
    collections::HashMap,
    hash::Hash,
    path::{Path, PathBuf},
};

use dicom::{
    core::Tag,
    object::{InMemDicomObject, OpenFileOptions, ReadError},
};
use dicom_dictionary_std::tags;
use rayon::prelude::*;

use crate::geometry::{Orientation, Vec3};

/// Value substituted for attributes that are absent or cannot be read
pub const UNKNOWN: &str = "Unknown";

pub trait HeaderLookup<F> {
    /// Value of `tag` in the header of `file`, or `None` if the file has no
    /// such attribute or it could not be read.
    fn header_value(&self, file: &F, tag: Tag) -> Option<String>;

    /// Like [`HeaderLookup::header_value`], with empty values and lookup
    /// failures replaced by [`UNKNOWN`].
    fn text_value(&self, file: &F, tag: Tag) -> String {
        self.header_value(file, tag)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_owned())
    }

    fn series_description(&self, file: &F) -> String {
        self.text_value(file, tags::SERIES_DESCRIPTION)
    }

    /// ImagePositionPatient of `file`
    fn position(&self, file: &F) -> Option<Vec3> {
        let value = self.header_value(file, tags::IMAGE_POSITION_PATIENT)?;
        parse_numbers::<3>(&value).map(Vec3::from)
    }

    /// ImageOrientationPatient of `file`
    fn orientation(&self, file: &F) -> Option<Orientation> {
        let value = self.header_value(file, tags::IMAGE_ORIENTATION_PATIENT)?;
        parse_numbers::<6>(&value)
    }

    /// NumberOfFrames of `file`. Only multi-frame images carry it.
    fn frame_count(&self, file: &F) -> Option<u32> {
        self.header_value(file, tags::NUMBER_OF_FRAMES)?
            .trim()
            .parse()
            .ok()
    }
}

impl<F, T> HeaderLookup<F> for T
where
    T: Fn(&F, Tag) -> Option<String>,
{
    fn header_value(&self, file: &F, tag: Tag) -> Option<String> {
        self(file, tag)
    }
}

/// Parse a multi-valued numeric attribute.
///
/// Values may be separated by backslashes (the DICOM convention) or commas.
/// Returns `None` unless there are exactly `N` finite numbers.
pub fn parse_numbers<const N: usize>(value: &str) -> Option<[f64; N]> {
    let numbers = value
        .split(['\\', ','])
        .map(|part| part.trim().parse::<f64>().ok().filter(|n| n.is_finite()))
        .collect::<Option<Vec<_>>>()?;
    numbers.try_into().ok()
}

/// Header attributes kept in memory, keyed by file identifier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHeaders<F> {
    headers: HashMap<F, HashMap<Tag, String>>,
}

impl<F: Eq + Hash> InMemoryHeaders<F> {
    pub fn new() -> Self {
        Self {
            headers: HashMap::new(),
        }
    }

    pub fn insert(&mut self, file: F, tag: Tag, value: impl Into<String>) {
        self.headers
            .entry(file)
            .or_default()
            .insert(tag, value.into());
    }

    /// Builder form of [`InMemoryHeaders::insert`]
    pub fn with(mut self, file: F, tag: Tag, value: impl Into<String>) -> Self {
        self.insert(file, tag, value);
        self
    }
}

impl<F: Eq + Hash> HeaderLookup<F> for InMemoryHeaders<F> {
    fn header_value(&self, file: &F, tag: Tag) -> Option<String> {
        self.headers.get(file)?.get(&tag).cloned()
    }
}

/// Headers of DICOM files, read up to (not including) the pixel data.
#[derive(Debug, Default)]
pub struct DicomHeaders {
    objects: HashMap<PathBuf, InMemDicomObject>,
}

impl DicomHeaders {
    pub fn new(objects: HashMap<PathBuf, InMemDicomObject>) -> Self {
        Self { objects }
    }

    /// Read the headers of all `paths` in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered if any file is not a readable
    /// DICOM file.
    pub fn open(paths: &[impl AsRef<Path> + Sync]) -> Result<Self, ReadError> {
        let objects = paths
            .par_iter()
            .map(|path| {
                let path = path.as_ref();
                Self::read_header(path).map(|object| (path.to_path_buf(), object))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Self { objects })
    }

    fn read_header(path: &Path) -> Result<InMemDicomObject, ReadError> {
        let object = OpenFileOptions::new()
            .read_until(tags::PIXEL_DATA)
            .open_file(path)?;
        Ok(object.into_inner())
    }

    fn float_values(&self, file: &Path, tag: Tag) -> Option<Vec<f64>> {
        self.objects
            .get(file)?
            .element(tag)
            .ok()?
            .to_multi_float64()
            .ok()
            .filter(|values| values.iter().all(|v| v.is_finite()))
    }
}

impl HeaderLookup<PathBuf> for DicomHeaders {
    fn header_value(&self, file: &PathBuf, tag: Tag) -> Option<String> {
        let value = self.objects.get(file)?.element(tag).ok()?.to_str().ok()?;
        Some(value.trim_end_matches(['\0', ' ']).to_owned())
    }

    fn position(&self, file: &PathBuf) -> Option<Vec3> {
        let values = self.float_values(file, tags::IMAGE_POSITION_PATIENT)?;
        <[f64; 3]>::try_from(values).ok().map(Vec3::from)
    }

    fn orientation(&self, file: &PathBuf) -> Option<Orientation> {
        let values = self.float_values(file, tags::IMAGE_ORIENTATION_PATIENT)?;
        values.try_into().ok()
    }

    fn frame_count(&self, file: &PathBuf) -> Option<u32> {
        self.objects
            .get(file)?
            .element(tags::NUMBER_OF_FRAMES)
            .ok()?
            .to_int::<u32>()
            .ok()
    }
}
