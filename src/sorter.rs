use std::hash::Hash;

use rayon::prelude::*;
use tracing::debug;

use crate::{
    enums::VolumeWarning,
    geometry::{scan_axis, signed_distance},
    slice_record::RecordIndex,
    volume_group::VolumeGroup,
};

/// Largest tolerated deviation between slice spacings, in the units of the
/// projected distances
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Orders the files of a group along its scan axis and checks that the
/// slices are evenly spaced.
#[derive(Debug, Clone, Copy)]
pub struct VolumeGeometrySorter {
    epsilon: f64,
}

impl Default for VolumeGeometrySorter {
    fn default() -> Self {
        Self::with_epsilon(DEFAULT_EPSILON)
    }
}

impl VolumeGeometrySorter {
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Sort the files of `group` by their distance along the scan axis.
    ///
    /// The first file is the reference: its orientation defines the scan
    /// axis and its position the origin. If it lacks either, the files are
    /// returned unsorted with [`VolumeWarning::MissingGeometry`]. Files
    /// without a position, or whose distance is not finite, keep their
    /// relative order after all positioned files. Ties keep their input
    /// order.
    pub fn sort<F>(&self, mut group: VolumeGroup<F>, records: &RecordIndex<F>) -> VolumeGroup<F>
    where
        F: Eq + Hash,
    {
        let Some(reference) = group.files.first().map(|file| records.get(file)) else {
            return group;
        };

        if reference.is_some_and(|record| record.frame_count.is_some()) {
            group.flag(VolumeWarning::MultiFrame);
        }

        let Some((origin, orientation)) =
            reference.and_then(|record| record.position.zip(record.orientation))
        else {
            group.flag(VolumeWarning::MissingGeometry);
            return group;
        };
        let axis = scan_axis(&orientation);

        let mut positioned = Vec::with_capacity(group.files.len());
        let mut unpositioned = Vec::new();
        for file in std::mem::take(&mut group.files) {
            let distance = records
                .get(&file)
                .and_then(|record| record.position)
                .map(|position| signed_distance(position, origin, axis))
                .filter(|distance| distance.is_finite());
            match distance {
                Some(distance) => positioned.push((file, distance)),
                None => unpositioned.push(file),
            }
        }

        positioned.sort_by(|a, b| a.1.total_cmp(&b.1));

        let distances: Vec<f64> = positioned.iter().map(|(_, distance)| *distance).collect();
        debug!(volume = %group.name, slices = distances.len(), "sorted along scan axis");

        group.files = positioned.into_iter().map(|(file, _)| file).collect();
        if !unpositioned.is_empty() {
            group.flag(VolumeWarning::MissingSlicePositions {
                count: unpositioned.len(),
            });
            group.files.extend(unpositioned);
        }

        if let Some(warning) = self.check_spacing(&distances) {
            group.flag(warning);
        }

        group
    }

    /// Sort every group independently, in parallel. Output order matches
    /// input order.
    pub fn sort_all<F>(
        &self,
        groups: Vec<VolumeGroup<F>>,
        records: &RecordIndex<F>,
    ) -> Vec<VolumeGroup<F>>
    where
        F: Eq + Hash + Send + Sync,
    {
        groups
            .into_par_iter()
            .map(|group| self.sort(group, records))
            .collect()
    }

    /// Compare every gap between sorted distances with the first one and
    /// report the first that deviates by more than epsilon.
    pub fn check_spacing(&self, distances: &[f64]) -> Option<VolumeWarning> {
        let mut spacings = distances.windows(2).map(|pair| pair[1] - pair[0]);
        let spacing = spacings.next()?;

        spacings
            .map(|gap| gap - spacing)
            .find(|difference| difference.abs() > self.epsilon)
            .map(|difference| VolumeWarning::IrregularSpacing {
                difference,
                spacing,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{geometry::Vec3, slice_record::SliceRecord};

    const AXIAL: [f64; 6] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    fn record(file: usize, z: Option<f64>, orientation: Option<[f64; 6]>) -> SliceRecord<usize> {
        SliceRecord {
            file,
            position: z.map(|z| Vec3::new(0.0, 0.0, z)),
            orientation,
            partition_values: HashMap::new(),
            frame_count: None,
        }
    }

    fn axial_series(zs: &[f64]) -> (VolumeGroup<usize>, RecordIndex<usize>) {
        let records = zs
            .iter()
            .enumerate()
            .map(|(file, &z)| (file, record(file, Some(z), Some(AXIAL))))
            .collect();
        let group = VolumeGroup::new("series", (0..zs.len()).collect(), true);
        (group, records)
    }

    #[test]
    fn sorts_by_distance_along_scan_axis() {
        let (group, records) = axial_series(&[10.0, 0.0, 15.0, 5.0]);
        let sorted = VolumeGeometrySorter::default().sort(group, &records);

        assert_eq!(sorted.files, [1, 3, 0, 2]);
        assert_eq!(sorted.warning, None);
    }

    #[test]
    fn distances_are_relative_to_first_file() {
        let (group, records) = axial_series(&[20.0, 30.0, 10.0]);
        let sorted = VolumeGeometrySorter::default().sort(group, &records);
        assert_eq!(sorted.files, [2, 0, 1]);
    }

    #[test]
    fn reversed_orientation_reverses_order() {
        let (group, mut records) = axial_series(&[0.0, 5.0, 10.0]);
        for record in records.values_mut() {
            record.orientation = Some([0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
        }
        let sorted = VolumeGeometrySorter::default().sort(group, &records);
        assert_eq!(sorted.files, [2, 1, 0]);
    }

    #[test]
    fn equal_positions_keep_input_order() {
        let (group, records) = axial_series(&[5.0, 0.0, 5.0, 0.0]);
        let sorted = VolumeGeometrySorter::default().sort(group, &records);
        assert_eq!(sorted.files, [1, 3, 0, 2]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let sorter = VolumeGeometrySorter::default();
        let (group, records) = axial_series(&[3.0, 1.0, 2.0, 0.0]);
        let once = sorter.sort(group, &records);
        let twice = sorter.sort(once.clone(), &records);
        assert_eq!(once.files, twice.files);
    }

    #[test]
    fn uniform_spacing_passes() {
        let (group, records) = axial_series(&[0.0, 10.0, 20.0, 30.0]);
        let sorted = VolumeGeometrySorter::default().sort(group, &records);
        assert_eq!(sorted.warning, None);
    }

    #[test]
    fn irregular_gap_is_reported() {
        let (group, records) = axial_series(&[0.0, 10.0, 20.0, 30.02]);
        let sorted = VolumeGeometrySorter::default().sort(group, &records);

        let Some(VolumeWarning::IrregularSpacing {
            difference,
            spacing,
        }) = sorted.warning
        else {
            panic!("expected irregular spacing, got {:?}", sorted.warning);
        };
        assert!((difference - 0.02).abs() < 1e-9);
        assert_eq!(spacing, 10.0);
    }

    #[test]
    fn only_first_irregular_gap_is_reported() {
        let sorter = VolumeGeometrySorter::with_epsilon(0.5);
        let warning = sorter.check_spacing(&[0.0, 1.0, 3.0, 7.0]);
        assert_eq!(
            warning,
            Some(VolumeWarning::IrregularSpacing {
                difference: 1.0,
                spacing: 1.0
            })
        );
    }

    #[test]
    fn tolerance_is_configurable() {
        let distances = [0.0, 1.0, 2.05];
        assert_eq!(VolumeGeometrySorter::with_epsilon(0.1).check_spacing(&distances), None);
        assert!(VolumeGeometrySorter::with_epsilon(0.01).check_spacing(&distances).is_some());
    }

    #[test]
    fn short_groups_skip_spacing_check() {
        let sorter = VolumeGeometrySorter::default();
        assert_eq!(sorter.check_spacing(&[]), None);
        assert_eq!(sorter.check_spacing(&[4.0]), None);
        assert_eq!(sorter.check_spacing(&[4.0, 9.0]), None);

        let (group, records) = axial_series(&[7.0]);
        assert_eq!(sorter.sort(group, &records).warning, None);
    }

    #[test]
    fn missing_reference_orientation_keeps_input_order() {
        let (group, mut records) = axial_series(&[40.0, 10.0, 30.0, 0.0, 20.0]);
        records.get_mut(&0).unwrap().orientation = None;

        let sorted = VolumeGeometrySorter::default().sort(group, &records);

        assert_eq!(sorted.files, [0, 1, 2, 3, 4]);
        assert_eq!(sorted.warning, Some(VolumeWarning::MissingGeometry));
    }

    #[test]
    fn missing_reference_record_is_missing_geometry() {
        let group = VolumeGroup::new("series", vec![1, 0], true);
        let records = HashMap::from([(0, record(0, Some(0.0), Some(AXIAL)))]);

        let sorted = VolumeGeometrySorter::default().sort(group, &records);

        assert_eq!(sorted.files, [1, 0]);
        assert_eq!(sorted.warning, Some(VolumeWarning::MissingGeometry));
    }

    #[test]
    fn multi_frame_warning_does_not_block_sorting() {
        let (group, mut records) = axial_series(&[10.0, 0.0, 7.0]);
        records.get_mut(&0).unwrap().frame_count = Some(3);

        let sorted = VolumeGeometrySorter::default().sort(group, &records);

        assert_eq!(sorted.files, [1, 2, 0]);
        assert_eq!(sorted.warning, Some(VolumeWarning::MultiFrame));
    }

    #[test]
    fn unpositioned_files_follow_sorted_ones() {
        let (group, mut records) = axial_series(&[10.0, 99.0, 0.0, 99.0, 5.0]);
        records.get_mut(&1).unwrap().position = None;
        records.get_mut(&3).unwrap().position = None;

        let sorted = VolumeGeometrySorter::default().sort(group, &records);

        assert_eq!(sorted.files, [2, 4, 0, 1, 3]);
        assert_eq!(
            sorted.warning,
            Some(VolumeWarning::MissingSlicePositions { count: 2 })
        );
    }

    #[test]
    fn non_finite_positions_are_treated_as_missing() {
        let (group, mut records) = axial_series(&[2.0, 0.0, 1.0, 3.0]);
        records.get_mut(&1).unwrap().position = Some(Vec3::new(0.0, 0.0, f64::NAN));
        records.get_mut(&3).unwrap().position = Some(Vec3::new(0.0, f64::INFINITY, 3.0));

        let sorted = VolumeGeometrySorter::default().sort(group, &records);

        assert_eq!(sorted.files, [2, 0, 1, 3]);
        assert_eq!(
            sorted.warning,
            Some(VolumeWarning::MissingSlicePositions { count: 2 })
        );
    }

    #[test]
    fn empty_group_is_returned_unchanged() {
        let group = VolumeGroup::<usize>::new("empty", Vec::new(), false);
        let sorted = VolumeGeometrySorter::default().sort(group.clone(), &HashMap::new());
        assert_eq!(sorted, group);
    }

    #[test]
    fn every_group_is_sorted() {
        let (first, records) = axial_series(&[2.0, 1.0, 0.0, 3.0]);
        let second = VolumeGroup::new("subset", vec![3, 0, 1], false);

        let sorted = VolumeGeometrySorter::default().sort_all(vec![first, second], &records);

        assert_eq!(sorted[0].files, [2, 1, 0, 3]);
        assert_eq!(sorted[1].files, [1, 0, 3]);
        assert_eq!(sorted[0].warning, None);
        assert_eq!(sorted[1].warning, None);
    }
}
