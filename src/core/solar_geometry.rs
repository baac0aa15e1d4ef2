// Conversion of horizontal solar flux to flux on an inclined surface, following
// SAP 2012 Appendix U3.2 as applied by Appendix P for the summer months.

use crate::core::geometry::{North, SurfaceNormal};
use serde::Deserialize;
use strum::EnumIter;
use thiserror::Error;

/// Compass direction a surface faces, in eight 45 degree sectors.
#[derive(Clone, Copy, Debug, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Orientation {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Orientation {
    /// Arguments:
    /// * `horizontal_orientation` - clockwise angle from north of the surface normal's
    ///                              horizontal projection, 0 to 360, in degrees
    pub fn from_horizontal_orientation(horizontal_orientation: f64) -> Self {
        const SECTORS: [(f64, Orientation); 7] = [
            (22.5, Orientation::North),
            (67.5, Orientation::NorthEast),
            (112.5, Orientation::East),
            (157.5, Orientation::SouthEast),
            (202.5, Orientation::South),
            (247.5, Orientation::SouthWest),
            (292.5, Orientation::West),
        ];

        SECTORS
            .iter()
            .find(|(upper_bound, _)| horizontal_orientation < *upper_bound)
            .map(|(_, orientation)| *orientation)
            .unwrap_or(if horizontal_orientation < 337.5 {
                Orientation::NorthWest
            } else {
                Orientation::North
            })
    }

    /// The tables in Appendix P are symmetrical about the north-south axis, so westerly
    /// orientations use the coefficients of their easterly mirror.
    pub fn reduced(&self) -> ReducedOrientation {
        match self {
            Orientation::North => ReducedOrientation::North,
            Orientation::NorthEast | Orientation::NorthWest => ReducedOrientation::NorthEast,
            Orientation::East | Orientation::West => ReducedOrientation::East,
            Orientation::SouthEast | Orientation::SouthWest => ReducedOrientation::SouthEast,
            Orientation::South => ReducedOrientation::South,
        }
    }
}

/// Orientation bucket used to key coefficient and overhang tables.
#[derive(Clone, Copy, Debug, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ReducedOrientation {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
}

impl ReducedOrientation {
    /// Bucket from the unsigned angle between a surface normal and north, in five 36
    /// degree bands.
    pub fn from_angle_to_north(angle: f64) -> Self {
        match angle {
            a if a < 36. => ReducedOrientation::North,
            a if a < 72. => ReducedOrientation::NorthEast,
            a if a < 108. => ReducedOrientation::East,
            a if a < 144. => ReducedOrientation::SouthEast,
            _ => ReducedOrientation::South,
        }
    }

    /// Coefficients k1 to k9 of SAP 2012 Table U5.
    fn k_coefficients(&self) -> [f64; 9] {
        match self {
            ReducedOrientation::North => {
                [26.3, -38.5, 14.8, -16.5, 27.3, -11.9, -1.06, 0.0872, -0.191]
            }
            ReducedOrientation::NorthEast => {
                [0.165, -3.68, 3.0, 6.38, -4.53, -0.405, -4.38, 4.89, -1.99]
            }
            ReducedOrientation::East => {
                [1.44, -2.36, 1.07, -0.514, 1.89, -1.64, -0.542, -0.757, 0.604]
            }
            ReducedOrientation::SouthEast => {
                [-2.95, 2.89, 1.17, 5.67, -3.54, -4.28, -2.72, -0.25, 3.07]
            }
            ReducedOrientation::South => {
                [-0.66, -0.106, 2.93, 3.63, -0.374, -7.4, -2.71, -0.991, 4.59]
            }
        }
    }
}

/// Summer month the assessment is made for.
#[derive(Clone, Copy, Debug, Default, Deserialize, EnumIter, Eq, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(try_from = "u8")]
pub enum SummerMonth {
    June,
    #[default]
    July,
    August,
}

impl SummerMonth {
    /// Solar declination for the month, in degrees
    pub fn solar_declination(&self) -> f64 {
        match self {
            SummerMonth::June => 23.1,
            SummerMonth::July => 21.2,
            SummerMonth::August => 13.7,
        }
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("Month code {0} is not a summer month (expected 0 for June, 1 for July or 2 for August)")]
pub struct UnknownMonthError(u8);

impl TryFrom<u8> for SummerMonth {
    type Error = UnknownMonthError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SummerMonth::June),
            1 => Ok(SummerMonth::July),
            2 => Ok(SummerMonth::August),
            _ => Err(UnknownMonthError(value)),
        }
    }
}

/// How a surface normal is turned into an orientation bucket.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum OrientationScheme {
    /// Eight compass sectors of the horizontally projected normal, folded onto the
    /// five easterly buckets.
    CardinalSectors,
    /// Five 36 degree bands of the unsigned angle between the 3D normal and north.
    NorthAngleBands,
}

impl OrientationScheme {
    pub fn bucket_for(&self, north: &North, normal: &SurfaceNormal) -> ReducedOrientation {
        match self {
            OrientationScheme::CardinalSectors => {
                Orientation::from_horizontal_orientation(north.horizontal_orientation(normal))
                    .reduced()
            }
            OrientationScheme::NorthAngleBands => {
                ReducedOrientation::from_angle_to_north(north.angle_to(normal))
            }
        }
    }
}

/// Factor Rh converting horizontal solar flux to flux on a surface of the given tilt
/// and orientation.
///
/// Only the cubic term is taken on the sine of the half tilt; the square and linear
/// terms use the half tilt in radians directly.
pub fn rh_factor(
    tilt: f64,
    orientation: ReducedOrientation,
    latitude: f64,
    month: SummerMonth,
) -> f64 {
    let k = orientation.k_coefficients();
    let half_tilt = (tilt / 2.).to_radians();
    let sin_cubed = half_tilt.sin().powi(3);
    let squared = half_tilt.powi(2);

    let a = k[0] * sin_cubed + k[1] * squared + k[2] * half_tilt;
    let b = k[3] * sin_cubed + k[4] * squared + k[5] * half_tilt;
    let c = k[6] * sin_cubed + k[7] * squared + k[8] * half_tilt + 1.;

    let delta = (latitude - month.solar_declination()).to_radians();

    a * delta.cos().powi(2) + b * delta.cos() + c
}

/// Solar flux on a surface, in W/m2, together with the orientation bucket used.
///
/// Surfaces at or below `flat_surface_cutoff` (degrees of tilt) are treated as
/// horizontal: the flux is returned unchanged and no bucket is assigned.
pub fn compute_flux(
    horizontal_flux: f64,
    tilt: f64,
    orientation: ReducedOrientation,
    latitude: f64,
    month: SummerMonth,
    flat_surface_cutoff: Option<f64>,
) -> (f64, Option<ReducedOrientation>) {
    match flat_surface_cutoff {
        Some(cutoff) if tilt <= cutoff => (horizontal_flux, None),
        _ => (
            horizontal_flux * rh_factor(tilt, orientation, latitude, month),
            Some(orientation),
        ),
    }
}
