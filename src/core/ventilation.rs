// Effective summer air change rates of SAP 2012 Table P1 and the ventilation heat loss
// that follows from them.

use serde::Deserialize;
use strum::EnumIter;
use thiserror::Error;

/// Volumetric heat capacity of air, in Wh/(m3.K)
pub const VOLUMETRIC_HEAT_CAPACITY_OF_AIR: f64 = 0.33;
/// Air change rate, in ach, for a zone whose ventilation cannot be categorised
pub const MINIMUM_AIR_CHANGE_RATE: f64 = 0.01;
/// Building type code asking for the minimum air change rate whatever the opening type
pub const MINIMUM_VENTILATION_BUILDING_TYPE: i64 = -1;

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum VentilationLookupError {
    #[error("Ventilation opening type code {0} is not in SAP Table P1 (expected 0 to 3)")]
    UnknownOpeningType(i64),
    #[error("Building type code {0} is not in SAP Table P1 (expected 0 to 3)")]
    UnknownBuildingType(i64),
}

#[derive(Clone, Copy, Debug, EnumIter, Eq, Hash, PartialEq)]
pub enum OpeningType {
    TrickleVentsOnly,
    /// windows slightly open (50 mm)
    WindowsSlightlyOpen,
    WindowsOpenHalfTheTime,
    WindowsFullyOpen,
}

impl TryFrom<i64> for OpeningType {
    type Error = VentilationLookupError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OpeningType::TrickleVentsOnly),
            1 => Ok(OpeningType::WindowsSlightlyOpen),
            2 => Ok(OpeningType::WindowsOpenHalfTheTime),
            3 => Ok(OpeningType::WindowsFullyOpen),
            _ => Err(VentilationLookupError::UnknownOpeningType(value)),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Storeys {
    Single,
    Multiple,
}

/// Building type columns of Table P1: storey count combined with whether cross
/// ventilation is possible.
#[derive(Clone, Copy, Debug, EnumIter, Eq, Hash, PartialEq)]
pub enum CrossVentilation {
    SingleStoreyPossible,
    SingleStoreyNotPossible,
    MultiStoreyPossible,
    MultiStoreyNotPossible,
}

impl CrossVentilation {
    /// Category for a zone from the number of distinct directions its operable windows
    /// face. Returns None when there are no operable windows.
    pub fn for_window_directions(storeys: Storeys, distinct_directions: usize) -> Option<Self> {
        match (storeys, distinct_directions) {
            (_, 0) => None,
            (Storeys::Single, 1) => Some(CrossVentilation::SingleStoreyNotPossible),
            (Storeys::Single, _) => Some(CrossVentilation::SingleStoreyPossible),
            (Storeys::Multiple, 1) => Some(CrossVentilation::MultiStoreyNotPossible),
            (Storeys::Multiple, _) => Some(CrossVentilation::MultiStoreyPossible),
        }
    }

    pub fn storeys(&self) -> Storeys {
        match self {
            CrossVentilation::SingleStoreyPossible | CrossVentilation::SingleStoreyNotPossible => {
                Storeys::Single
            }
            CrossVentilation::MultiStoreyPossible | CrossVentilation::MultiStoreyNotPossible => {
                Storeys::Multiple
            }
        }
    }
}

impl TryFrom<i64> for CrossVentilation {
    type Error = VentilationLookupError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CrossVentilation::SingleStoreyPossible),
            1 => Ok(CrossVentilation::SingleStoreyNotPossible),
            2 => Ok(CrossVentilation::MultiStoreyPossible),
            3 => Ok(CrossVentilation::MultiStoreyNotPossible),
            _ => Err(VentilationLookupError::UnknownBuildingType(value)),
        }
    }
}

/// Table P1 air change rate, in ach.
pub fn air_change_rate(opening_type: OpeningType, category: CrossVentilation) -> f64 {
    use CrossVentilation::*;
    use OpeningType::*;

    match (opening_type, category) {
        (TrickleVentsOnly, SingleStoreyPossible) => 0.1,
        (TrickleVentsOnly, SingleStoreyNotPossible) => 0.1,
        (TrickleVentsOnly, MultiStoreyPossible) => 0.2,
        (TrickleVentsOnly, MultiStoreyNotPossible) => 0.1,
        (WindowsSlightlyOpen, SingleStoreyPossible) => 0.8,
        (WindowsSlightlyOpen, SingleStoreyNotPossible) => 0.5,
        (WindowsSlightlyOpen, MultiStoreyPossible) => 1.0,
        (WindowsSlightlyOpen, MultiStoreyNotPossible) => 0.6,
        (WindowsOpenHalfTheTime, SingleStoreyPossible) => 3.0,
        (WindowsOpenHalfTheTime, SingleStoreyNotPossible) => 2.0,
        (WindowsOpenHalfTheTime, MultiStoreyPossible) => 4.0,
        (WindowsOpenHalfTheTime, MultiStoreyNotPossible) => 2.5,
        (WindowsFullyOpen, SingleStoreyPossible) => 6.0,
        (WindowsFullyOpen, SingleStoreyNotPossible) => 4.0,
        (WindowsFullyOpen, MultiStoreyPossible) => 8.0,
        (WindowsFullyOpen, MultiStoreyNotPossible) => 5.0,
    }
}

/// Table P1 lookup from the raw input codes. Unknown codes are reported, never defaulted.
/// A building type of -1 gives the minimum air change rate without reading the opening type.
pub fn air_change_rate_for_codes(
    opening_type: i64,
    category: i64,
) -> Result<f64, VentilationLookupError> {
    if category == MINIMUM_VENTILATION_BUILDING_TYPE {
        return Ok(MINIMUM_AIR_CHANGE_RATE);
    }

    Ok(air_change_rate(
        OpeningType::try_from(opening_type)?,
        CrossVentilation::try_from(category)?,
    ))
}

/// Ventilation heat loss coefficient, in W/K
pub fn ventilation_heat_loss(air_change_rate: f64, zone_volume: f64) -> f64 {
    VOLUMETRIC_HEAT_CAPACITY_OF_AIR * air_change_rate * zone_volume
}

/// What to do with a zone that has no operable windows.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum SealedZoneVentilation {
    /// leave ventilation out of the zone's heat loss
    #[default]
    Omit,
    /// apply the minimum air change rate
    Minimum,
}

impl SealedZoneVentilation {
    pub fn air_change_rate(&self) -> Option<f64> {
        match self {
            SealedZoneVentilation::Omit => None,
            SealedZoneVentilation::Minimum => Some(MINIMUM_AIR_CHANGE_RATE),
        }
    }
}
