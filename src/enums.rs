use std::fmt;

use dicom::core::Tag;
use dicom_dictionary_std::tags;

/// Header attributes whose values may split one nominal series into
/// several sub-volumes.
///
/// [`PartitionKey::ALL`] lists them in the order in which sub-volumes are
/// proposed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionKey {
    SeriesInstanceUid,
    ContentTime,
    TriggerTime,
    DiffusionGradientOrientation,
    ImageOrientationPatient,
}

impl PartitionKey {
    pub const ALL: [PartitionKey; 5] = [
        PartitionKey::SeriesInstanceUid,
        PartitionKey::ContentTime,
        PartitionKey::TriggerTime,
        PartitionKey::DiffusionGradientOrientation,
        PartitionKey::ImageOrientationPatient,
    ];

    /// The DICOM tag read for this key
    pub fn tag(self) -> Tag {
        match self {
            PartitionKey::SeriesInstanceUid => tags::SERIES_INSTANCE_UID,
            PartitionKey::ContentTime => tags::CONTENT_TIME,
            PartitionKey::TriggerTime => tags::TRIGGER_TIME,
            PartitionKey::DiffusionGradientOrientation => tags::DIFFUSION_GRADIENT_ORIENTATION,
            PartitionKey::ImageOrientationPatient => tags::IMAGE_ORIENTATION_PATIENT,
        }
    }

    /// Attribute keyword, used when naming sub-volumes
    pub fn name(self) -> &'static str {
        match self {
            PartitionKey::SeriesInstanceUid => "SeriesInstanceUID",
            PartitionKey::ContentTime => "ContentTime",
            PartitionKey::TriggerTime => "TriggerTime",
            PartitionKey::DiffusionGradientOrientation => "DiffusionGradientOrientation",
            PartitionKey::ImageOrientationPatient => "ImageOrientationPatient",
        }
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Data-quality conditions detected while organizing a volume.
///
/// None of these abort processing: the group is still returned and the
/// warning is meant to be shown to whoever decides to load it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeWarning {
    MultiFrame,
    MissingGeometry,
    MissingSlicePositions { count: usize },
    IrregularSpacing { difference: f64, spacing: f64 },
}

impl fmt::Display for VolumeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeWarning::MultiFrame => f.write_str(
                "Multi-frame image. If slice orientation or spacing is non-uniform then the \
                 image may be displayed incorrectly. Use with caution.",
            ),
            VolumeWarning::MissingGeometry => f.write_str(
                "Reference image in series does not contain geometry information. \
                 Please use caution.",
            ),
            VolumeWarning::MissingSlicePositions { count } => write!(
                f,
                "{count} images in series do not contain a position and were placed after \
                 the sorted images. Please use caution."
            ),
            VolumeWarning::IrregularSpacing {
                difference,
                spacing,
            } => write!(
                f,
                "Images are not equally spaced (a difference of {} in spacings was detected). \
                 The series will be loaded as if it had a spacing of {}. Please use caution.",
                significant(*difference),
                significant(*spacing)
            ),
        }
    }
}

/// Six significant digits without trailing zeros
fn significant(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (5 - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        text
    }
}
