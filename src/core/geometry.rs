// Helpers turning the outward normals supplied by the geometry provider into the
// tilt and horizontal orientation values the SAP Appendix P calculations are keyed on.

use nalgebra::{Vector2, Vector3};
use thiserror::Error;

/// North is the +Y axis unless the input says otherwise.
pub const DEFAULT_NORTH: [f64; 2] = [0., 1.];

// below this length a projected normal is treated as pointing straight up or down
const HORIZONTAL_PROJECTION_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("A surface normal of zero length was provided")]
    ZeroLengthNormal,
    #[error("The north reference vector must have a non-zero length")]
    ZeroLengthNorth,
}

/// North reference direction on the horizontal plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct North(Vector2<f64>);

impl North {
    pub fn new(x: f64, y: f64) -> Result<Self, GeometryError> {
        let vector = Vector2::new(x, y);
        if vector.norm() == 0. {
            return Err(GeometryError::ZeroLengthNorth);
        }

        Ok(Self(vector))
    }

    pub(crate) fn as_vector3(&self) -> Vector3<f64> {
        Vector3::new(self.0.x, self.0.y, 0.)
    }

    /// Clockwise angle in degrees (0 to 360) from north to the horizontal projection of
    /// `normal`. A normal with no horizontal component is given an orientation of 0.
    pub fn horizontal_orientation(&self, normal: &SurfaceNormal) -> f64 {
        let projected = Vector2::new(normal.0.x, normal.0.y);
        if projected.norm() < HORIZONTAL_PROJECTION_TOLERANCE {
            return 0.;
        }

        // z component of north x projected is positive when turning anticlockwise
        let cross = self.0.x * projected.y - self.0.y * projected.x;
        let anticlockwise = cross.atan2(self.0.dot(&projected)).to_degrees();

        (-anticlockwise).rem_euclid(360.)
    }

    /// Unsigned angle in degrees (0 to 180) between the full 3D normal and north.
    pub fn angle_to(&self, normal: &SurfaceNormal) -> f64 {
        self.as_vector3().angle(&normal.0).to_degrees()
    }
}

impl Default for North {
    fn default() -> Self {
        Self(Vector2::new(DEFAULT_NORTH[0], DEFAULT_NORTH[1]))
    }
}

/// Outward normal of an exterior surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceNormal(Vector3<f64>);

impl SurfaceNormal {
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self, GeometryError> {
        let vector = Vector3::new(x, y, z);
        if vector.norm() == 0. {
            return Err(GeometryError::ZeroLengthNormal);
        }

        Ok(Self(vector))
    }

    /// Angle between the normal and the upward vertical, in degrees. 0 is a flat roof,
    /// 90 a vertical wall and 180 a floor.
    pub fn tilt(&self) -> f64 {
        self.0.angle(&Vector3::z()).to_degrees()
    }
}

impl TryFrom<[f64; 3]> for SurfaceNormal {
    type Error = GeometryError;

    fn try_from(value: [f64; 3]) -> Result<Self, Self::Error> {
        Self::new(value[0], value[1], value[2])
    }
}

impl TryFrom<[f64; 2]> for North {
    type Error = GeometryError;

    fn try_from(value: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(value[0], value[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    #[case([0., 1., 0.], 0.)]
    #[case([1., 0., 0.], 90.)]
    #[case([0., -1., 0.], 180.)]
    #[case([-1., 0., 0.], 270.)]
    #[case([1., 1., 0.5], 45.)]
    #[case([-1., 1., 0.], 315.)]
    fn test_horizontal_orientation_with_default_north(
        #[case] normal: [f64; 3],
        #[case] expected: f64,
    ) {
        let normal = SurfaceNormal::try_from(normal).unwrap();
        assert_relative_eq!(
            North::default().horizontal_orientation(&normal),
            expected,
            epsilon = 1e-9
        );
    }

    #[rstest]
    fn test_horizontal_orientation_with_rotated_north() {
        // north pointing along +X puts a +Y facing surface due west
        let north = North::new(1., 0.).unwrap();
        let normal = SurfaceNormal::new(0., 1., 0.).unwrap();
        assert_relative_eq!(north.horizontal_orientation(&normal), 270., epsilon = 1e-9);
    }

    #[rstest]
    fn test_horizontal_surface_has_zero_orientation() {
        let roof = SurfaceNormal::new(0., 0., 1.).unwrap();
        assert_eq!(North::default().horizontal_orientation(&roof), 0.);
    }

    #[rstest]
    #[case([0., 0., 1.], 0.)]
    #[case([0., 1., 0.], 90.)]
    #[case([0., 0., -1.], 180.)]
    #[case([0., 1., 1.], 45.)]
    fn test_tilt(#[case] normal: [f64; 3], #[case] expected: f64) {
        let normal = SurfaceNormal::try_from(normal).unwrap();
        assert_relative_eq!(normal.tilt(), expected, epsilon = 1e-9);
    }

    #[rstest]
    fn test_angle_to_north_is_unsigned() {
        let north = North::default();
        let east = SurfaceNormal::new(1., 0., 0.).unwrap();
        let west = SurfaceNormal::new(-1., 0., 0.).unwrap();
        assert_relative_eq!(north.angle_to(&east), 90., epsilon = 1e-9);
        assert_relative_eq!(north.angle_to(&west), 90., epsilon = 1e-9);
    }

    #[rstest]
    fn test_zero_length_vectors_are_rejected() {
        assert_eq!(
            SurfaceNormal::new(0., 0., 0.),
            Err(GeometryError::ZeroLengthNormal)
        );
        assert_eq!(North::new(0., 0.), Err(GeometryError::ZeroLengthNorth));
    }
}
