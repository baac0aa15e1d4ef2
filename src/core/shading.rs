// This module provides the summer solar access factor Z_summer of SAP 2012 Appendix P,
// combining sky obstruction (Table P2), overhangs (Table P4) and curtains, blinds or
// shutters (Table P3).

use crate::core::solar_geometry::ReducedOrientation;
use serde::Deserialize;
use strum::EnumIter;
use thiserror::Error;

/// Factor for the percentage of sky blocked by obstacles around the dwelling.
///
/// Arguments:
/// * `sky_obstruction` - percentage of sky blocked, 0 to 100
pub fn sky_obstruction_factor(sky_obstruction: f64) -> f64 {
    match sky_obstruction {
        s if s > 80. => 0.5, // heavy
        s if s > 60. => 0.7, // more than average
        s if s > 20. => 0.9, // average or unknown
        _ => 1.0,            // very little
    }
}

/// Ratio of overhang depth to window height, in the classes tabulated by SAP.
#[derive(Clone, Copy, Debug, EnumIter, Eq, Hash, PartialEq)]
pub enum OverhangDepthClass {
    BelowPointOne,
    PointTwo,
    PointFour,
    PointSix,
    PointEight,
    One,
    OnePointTwoOrMore,
}

impl OverhangDepthClass {
    pub fn from_depth_ratio(depth_ratio: f64) -> Self {
        match depth_ratio {
            r if r < 0.1 => OverhangDepthClass::BelowPointOne,
            r if r < 0.3 => OverhangDepthClass::PointTwo,
            r if r < 0.5 => OverhangDepthClass::PointFour,
            r if r < 0.7 => OverhangDepthClass::PointSix,
            r if r < 0.9 => OverhangDepthClass::PointEight,
            r if r < 1.1 => OverhangDepthClass::One,
            _ => OverhangDepthClass::OnePointTwoOrMore,
        }
    }
}

/// Which Table P4 column set applies, from the ratio of overhang depth to window width.
#[derive(Clone, Copy, Debug, EnumIter, Eq, PartialEq)]
pub enum OverhangExtent {
    Narrow,
    Wide,
}

impl OverhangExtent {
    pub fn from_depth_to_width_ratio(depth_to_width: f64) -> Self {
        if depth_to_width < 2. {
            OverhangExtent::Narrow
        } else {
            OverhangExtent::Wide
        }
    }
}

// rows follow the non-zero depth classes, columns N, NE, E, SE, S
const NARROW_OVERHANG_FACTORS: [[f64; 5]; 6] = [
    [0.94, 0.91, 0.89, 0.84, 0.79],
    [0.90, 0.85, 0.79, 0.72, 0.64],
    [0.88, 0.81, 0.72, 0.62, 0.53],
    [0.86, 0.79, 0.66, 0.55, 0.50],
    [0.85, 0.77, 0.61, 0.52, 0.49],
    [0.84, 0.76, 0.57, 0.50, 0.48],
];

const WIDE_OVERHANG_FACTORS: [[f64; 5]; 6] = [
    [0.92, 0.89, 0.88, 0.83, 0.79],
    [0.85, 0.80, 0.76, 0.67, 0.55],
    [0.79, 0.72, 0.66, 0.54, 0.38],
    [0.73, 0.65, 0.58, 0.43, 0.32],
    [0.69, 0.59, 0.51, 0.36, 0.30],
    [0.66, 0.55, 0.46, 0.31, 0.29],
];

/// Table P4 factor for an overhang.
pub fn overhang_factor(
    orientation: ReducedOrientation,
    depth_class: OverhangDepthClass,
    extent: OverhangExtent,
) -> f64 {
    let row = match depth_class {
        OverhangDepthClass::BelowPointOne => return 1.,
        OverhangDepthClass::PointTwo => 0,
        OverhangDepthClass::PointFour => 1,
        OverhangDepthClass::PointSix => 2,
        OverhangDepthClass::PointEight => 3,
        OverhangDepthClass::One => 4,
        OverhangDepthClass::OnePointTwoOrMore => 5,
    };
    let column = match orientation {
        ReducedOrientation::North => 0,
        ReducedOrientation::NorthEast => 1,
        ReducedOrientation::East => 2,
        ReducedOrientation::SouthEast => 3,
        ReducedOrientation::South => 4,
    };

    match extent {
        OverhangExtent::Narrow => NARROW_OVERHANG_FACTORS[row][column],
        OverhangExtent::Wide => WIDE_OVERHANG_FACTORS[row][column],
    }
}

/// Curtain, blind or shutter types of SAP 2012 Table P3, identified on input by their
/// row number.
#[derive(Clone, Copy, Debug, Deserialize, EnumIter, Eq, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(try_from = "u8")]
pub enum BlindType {
    NetCurtainWholeWindow,
    NetCurtainHalfWindow,
    DarkCurtainOrRollerBlind,
    LightCurtainOrRollerBlind,
    DarkVenetianBlind,
    LightVenetianBlind,
    DarkExternalShutterClosed,
    WhiteExternalShutterClosed,
    DarkExternalShutterOpen,
    WhiteExternalShutterOpen,
}

impl BlindType {
    pub fn shading_factor(&self) -> f64 {
        match self {
            BlindType::NetCurtainWholeWindow => 0.8,
            BlindType::NetCurtainHalfWindow => 0.9,
            BlindType::DarkCurtainOrRollerBlind => 0.85,
            BlindType::LightCurtainOrRollerBlind => 0.6,
            BlindType::DarkVenetianBlind => 0.88,
            BlindType::LightVenetianBlind => 0.7,
            BlindType::DarkExternalShutterClosed => 0.27,
            BlindType::WhiteExternalShutterClosed => 0.24,
            BlindType::DarkExternalShutterOpen => 0.85,
            BlindType::WhiteExternalShutterOpen => 0.65,
        }
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("Blind type code {0} is not in SAP Table P3 (expected 0 to 9)")]
pub struct UnknownBlindTypeError(u8);

impl TryFrom<u8> for BlindType {
    type Error = UnknownBlindTypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => BlindType::NetCurtainWholeWindow,
            1 => BlindType::NetCurtainHalfWindow,
            2 => BlindType::DarkCurtainOrRollerBlind,
            3 => BlindType::LightCurtainOrRollerBlind,
            4 => BlindType::DarkVenetianBlind,
            5 => BlindType::LightVenetianBlind,
            6 => BlindType::DarkExternalShutterClosed,
            7 => BlindType::WhiteExternalShutterClosed,
            8 => BlindType::DarkExternalShutterOpen,
            9 => BlindType::WhiteExternalShutterOpen,
            _ => return Err(UnknownBlindTypeError(value)),
        })
    }
}

/// Overhang above a window, all dimensions in metres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Overhang {
    pub depth: f64,
    pub window_height: f64,
    pub window_width: f64,
}

impl Overhang {
    pub fn factor(&self, orientation: ReducedOrientation) -> f64 {
        overhang_factor(
            orientation,
            OverhangDepthClass::from_depth_ratio(self.depth / self.window_height),
            OverhangExtent::from_depth_to_width_ratio(self.depth / self.window_width),
        )
    }
}

/// Building-wide shading assumptions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadingConfig {
    /// percentage of sky blocked by obstacles
    pub sky_obstruction: f64,
    pub blind: Option<BlindType>,
    /// fraction of daylight hours the blinds are in use
    pub time_fraction: Option<f64>,
}

impl ShadingConfig {
    /// Factor for curtains, blinds or shutters. Without a time fraction the blind is
    /// assumed to be in use all the time.
    pub fn blind_factor(&self) -> f64 {
        match (self.blind, self.time_fraction) {
            (Some(blind), Some(fraction)) => fraction * blind.shading_factor() + (1. - fraction),
            (Some(blind), None) => blind.shading_factor(),
            (None, _) => 1.,
        }
    }

    /// Summer solar access factor for a window.
    ///
    /// Arguments:
    /// * `orientation` - orientation bucket of the window, or None for a window treated
    ///                   as horizontal (overhangs then have no effect)
    /// * `overhang` - overhang above the window, if any
    pub fn shading_factor(
        &self,
        orientation: Option<ReducedOrientation>,
        overhang: Option<&Overhang>,
    ) -> f64 {
        let sky_factor = sky_obstruction_factor(self.sky_obstruction);

        // nothing beyond sky obstruction to account for
        if overhang.is_none() && self.blind.is_none() && self.time_fraction.is_none() {
            return sky_factor;
        }

        let overhang_value = match (overhang, orientation) {
            (Some(overhang), Some(orientation)) => overhang.factor(orientation),
            _ => 1.,
        };

        // additive combination of obstruction and overhang is as tabulated in Appendix P
        self.blind_factor() * (sky_factor + overhang_value - 1.)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use strum::IntoEnumIterator;

    #[fixture]
    fn unshaded_config() -> ShadingConfig {
        ShadingConfig {
            sky_obstruction: 40.,
            blind: None,
            time_fraction: None,
        }
    }

    #[rstest]
    #[case(100., 0.5)]
    #[case(80.1, 0.5)]
    #[case(80., 0.7)]
    #[case(60.1, 0.7)]
    #[case(60., 0.9)]
    #[case(20.1, 0.9)]
    #[case(20., 1.0)]
    #[case(0., 1.0)]
    fn test_sky_obstruction_factor(#[case] sky_obstruction: f64, #[case] expected: f64) {
        assert_eq!(sky_obstruction_factor(sky_obstruction), expected);
    }

    #[rstest]
    #[case(0., OverhangDepthClass::BelowPointOne)]
    #[case(0.09, OverhangDepthClass::BelowPointOne)]
    #[case(0.1, OverhangDepthClass::PointTwo)]
    #[case(0.3, OverhangDepthClass::PointFour)]
    #[case(0.5, OverhangDepthClass::PointSix)]
    #[case(0.7, OverhangDepthClass::PointEight)]
    #[case(0.9, OverhangDepthClass::One)]
    #[case(1.1, OverhangDepthClass::OnePointTwoOrMore)]
    #[case(5., OverhangDepthClass::OnePointTwoOrMore)]
    fn test_overhang_depth_class(#[case] ratio: f64, #[case] expected: OverhangDepthClass) {
        assert_eq!(OverhangDepthClass::from_depth_ratio(ratio), expected);
    }

    #[rstest]
    fn test_shallow_overhang_has_no_effect_for_any_orientation() {
        for orientation in ReducedOrientation::iter() {
            for extent in OverhangExtent::iter() {
                assert_eq!(
                    overhang_factor(orientation, OverhangDepthClass::BelowPointOne, extent),
                    1.
                );
            }
        }
    }

    #[rstest]
    fn test_overhang_factors_do_not_increase_with_depth() {
        let classes = OverhangDepthClass::iter().collect::<Vec<_>>();
        for orientation in ReducedOrientation::iter() {
            for extent in OverhangExtent::iter() {
                for pair in classes.windows(2) {
                    assert!(
                        overhang_factor(orientation, pair[1], extent)
                            <= overhang_factor(orientation, pair[0], extent)
                    );
                }
            }
        }
    }

    #[rstest]
    #[case(ReducedOrientation::South, OverhangDepthClass::PointFour, OverhangExtent::Narrow, 0.64)]
    #[case(ReducedOrientation::North, OverhangDepthClass::PointTwo, OverhangExtent::Narrow, 0.94)]
    #[case(ReducedOrientation::SouthEast, OverhangDepthClass::One, OverhangExtent::Wide, 0.36)]
    #[case(ReducedOrientation::East, OverhangDepthClass::PointEight, OverhangExtent::Wide, 0.58)]
    #[case(ReducedOrientation::South, OverhangDepthClass::OnePointTwoOrMore, OverhangExtent::Wide, 0.29)]
    fn test_overhang_factor_lookup(
        #[case] orientation: ReducedOrientation,
        #[case] depth_class: OverhangDepthClass,
        #[case] extent: OverhangExtent,
        #[case] expected: f64,
    ) {
        assert_eq!(overhang_factor(orientation, depth_class, extent), expected);
    }

    #[rstest]
    fn test_no_overhang_and_no_blind_gives_sky_obstruction_factor(
        unshaded_config: ShadingConfig,
    ) {
        for sky_obstruction in [90., 70., 40., 10.] {
            let config = ShadingConfig {
                sky_obstruction,
                ..unshaded_config
            };
            for orientation in ReducedOrientation::iter() {
                assert_eq!(
                    config.shading_factor(Some(orientation), None),
                    sky_obstruction_factor(sky_obstruction)
                );
            }
        }
    }

    #[rstest]
    fn test_blind_factor_with_time_fraction() {
        let config = ShadingConfig {
            sky_obstruction: 10.,
            blind: Some(BlindType::DarkExternalShutterClosed),
            time_fraction: Some(0.5),
        };
        assert_relative_eq!(config.blind_factor(), 0.635, max_relative = 1e-12);
        assert_relative_eq!(
            config.shading_factor(Some(ReducedOrientation::South), None),
            0.635,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_blind_without_time_fraction_is_in_use_all_the_time(unshaded_config: ShadingConfig) {
        let config = ShadingConfig {
            blind: Some(BlindType::LightVenetianBlind),
            ..unshaded_config
        };
        assert_eq!(config.blind_factor(), 0.7);
        assert_relative_eq!(
            config.shading_factor(Some(ReducedOrientation::East), None),
            0.7 * 0.9,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_time_fraction_without_blind_has_no_effect(unshaded_config: ShadingConfig) {
        let config = ShadingConfig {
            time_fraction: Some(0.3),
            ..unshaded_config
        };
        assert_eq!(config.blind_factor(), 1.);
        assert_relative_eq!(
            config.shading_factor(Some(ReducedOrientation::South), None),
            0.9,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_narrow_overhang_combines_additively_with_sky_obstruction(
        unshaded_config: ShadingConfig,
    ) {
        let overhang = Overhang {
            depth: 0.4,
            window_height: 1.0,
            window_width: 1.2,
        };
        assert_relative_eq!(
            unshaded_config.shading_factor(Some(ReducedOrientation::South), Some(&overhang)),
            0.9 + 0.64 - 1.,
            max_relative = 1e-12
        );

        let config = ShadingConfig {
            blind: Some(BlindType::DarkCurtainOrRollerBlind),
            ..unshaded_config
        };
        assert_relative_eq!(
            config.shading_factor(Some(ReducedOrientation::South), Some(&overhang)),
            0.85 * (0.9 + 0.64 - 1.),
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_wide_overhang(unshaded_config: ShadingConfig) {
        let overhang = Overhang {
            depth: 2.5,
            window_height: 2.0,
            window_width: 1.0,
        };
        let config = ShadingConfig {
            sky_obstruction: 10.,
            ..unshaded_config
        };
        assert_relative_eq!(
            config.shading_factor(Some(ReducedOrientation::South), Some(&overhang)),
            0.29,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_overhang_on_horizontal_window_is_ignored(unshaded_config: ShadingConfig) {
        let overhang = Overhang {
            depth: 1.0,
            window_height: 1.0,
            window_width: 1.0,
        };
        assert_relative_eq!(
            unshaded_config.shading_factor(None, Some(&overhang)),
            0.9,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_blind_type_codes() {
        assert_eq!(
            BlindType::try_from(6),
            Ok(BlindType::DarkExternalShutterClosed)
        );
        assert!(BlindType::try_from(10).is_err());
        for blind in BlindType::iter() {
            let factor = blind.shading_factor();
            assert!((0.24..=0.9).contains(&factor));
        }
    }
}
