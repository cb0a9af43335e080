use tracing::warn;

use crate::enums::VolumeWarning;

/// A candidate volume: files that may be stacked into one 3-D image.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeGroup<F> {
    pub name: String,
    pub files: Vec<F>,
    /// Only the group holding the whole series is selected by default
    pub selected: bool,
    pub warning: Option<VolumeWarning>,
}

impl<F> VolumeGroup<F> {
    pub fn new(name: impl Into<String>, files: Vec<F>, selected: bool) -> Self {
        Self {
            name: name.into(),
            files,
            selected,
            warning: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Record `warning` unless an earlier one is already set
    pub(crate) fn flag(&mut self, warning: VolumeWarning) {
        warn!(volume = %self.name, "{warning}");
        if self.warning.is_none() {
            self.warning = Some(warning);
        }
    }
}
