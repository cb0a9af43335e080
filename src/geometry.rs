use derive_more::{Constructor, Sub};

/// Point or direction in patient coordinates (millimetres).
#[derive(Sub, Constructor, Default, PartialEq, Debug, Copy, Clone)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Right-handed cross product
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Vec3 { x, y, z }
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

/// Direction cosines of the row and column axes of an image plane, as
/// stored in ImageOrientationPatient.
pub type Orientation = [f64; 6];

/// Through-plane direction of a slice: row axis crossed with column axis.
///
/// The result is not normalized, so distances projected onto it are scaled
/// by its length. That scale is the same for every slice of a volume.
pub fn scan_axis(orientation: &Orientation) -> Vec3 {
    let row = Vec3::new(orientation[0], orientation[1], orientation[2]);
    let column = Vec3::new(orientation[3], orientation[4], orientation[5]);
    row.cross(column)
}

/// Signed distance of `position` from `origin` along `axis`
pub fn signed_distance(position: Vec3, origin: Vec3, axis: Vec3) -> f64 {
    (position - origin).dot(axis)
}
