use crate::core::geometry::GeometryError;
use crate::core::ventilation::VentilationLookupError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverheatingError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Error writing out overheating results: {0}")]
    ErrorWritingOutput(anyhow::Error),
}

/// Reasons a single zone could not be assessed. Other zones in the same building are
/// assessed regardless.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ZoneAssessmentError {
    #[error(transparent)]
    VentilationLookup(#[from] VentilationLookupError),
    #[error("Surface '{surface}' could not be oriented: {source}")]
    Geometry {
        surface: String,
        source: GeometryError,
    },
    #[error("Aperture '{aperture}' has an overhang but is missing the height or width needed to size it")]
    MissingApertureDimensions { aperture: String },
    #[error("Apertures in wall '{wall}' have a total area of {glazed_area} m2, larger than the wall's {wall_area} m2")]
    ApertureAreaExceedsWall {
        wall: String,
        glazed_area: f64,
        wall_area: f64,
    },
    #[error("Roof faces are included but no roof U-value was given")]
    MissingRoofUValue,
    #[error("Zone has no heat loss, so its heat balance ratio is undefined")]
    NoHeatLoss,
}
