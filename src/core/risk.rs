use std::fmt::{Display, Formatter};
use strum::{Display as StrumDisplay, EnumIter};

pub const DEFAULT_THERMAL_MASS_PARAMETER: f64 = 220.;

/// Likelihood of high internal temperature during hot weather, SAP 2012 Table P5.
#[derive(Clone, Copy, Debug, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd, StrumDisplay)]
pub enum RiskCategory {
    #[strum(to_string = "Not significant")]
    NotSignificant,
    Slight,
    Medium,
    High,
}

impl RiskCategory {
    /// Each band includes its lower bound.
    pub fn from_threshold_temperature(threshold_temperature: f64) -> Self {
        match threshold_temperature {
            t if t < 20.5 => RiskCategory::NotSignificant,
            t if t < 22. => RiskCategory::Slight,
            t if t < 23.5 => RiskCategory::Medium,
            _ => RiskCategory::High,
        }
    }

    pub fn colour(&self) -> SeverityColour {
        match self {
            RiskCategory::NotSignificant => SeverityColour::new(3, 166, 90),
            RiskCategory::Slight => SeverityColour::new(242, 191, 39),
            RiskCategory::Medium => SeverityColour::new(217, 121, 4),
            RiskCategory::High => SeverityColour::new(191, 4, 4),
        }
    }
}

/// RGB colour a visualisation should use for a risk category.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SeverityColour {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl SeverityColour {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

impl Display for SeverityColour {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.red, self.green, self.blue)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiskResult {
    pub category: RiskCategory,
    pub severity: SeverityColour,
    pub threshold_temperature: f64,
}

/// Temperature increment for a dwelling of low thermal mass, in K
pub fn thermal_mass_temperature_increment(thermal_mass_parameter: f64) -> f64 {
    if thermal_mass_parameter < 285. {
        (2.0 - 0.007 * thermal_mass_parameter).max(0.)
    } else {
        0.
    }
}

/// Classify a zone's overheating risk.
///
/// Arguments:
/// * `thermal_mass_parameter` - TMP in kJ/(m2.K), defaulting to 220
/// * `ratio` - summer heat balance ratio of solar gain to heat loss, in K
/// * `external_temperature` - mean external temperature for the month, in deg C
pub fn classify(
    thermal_mass_parameter: Option<f64>,
    ratio: f64,
    external_temperature: f64,
) -> RiskResult {
    let delta_mass = thermal_mass_temperature_increment(
        thermal_mass_parameter.unwrap_or(DEFAULT_THERMAL_MASS_PARAMETER),
    );
    let threshold_temperature = external_temperature + ratio + delta_mass;
    let category = RiskCategory::from_threshold_temperature(threshold_temperature);

    RiskResult {
        category,
        severity: category.colour(),
        threshold_temperature,
    }
}
