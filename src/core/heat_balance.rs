// Summer heat balance of a zone: solar gains through glazing against fabric,
// structural and ventilation heat losses (SAP 2012 Appendix P, P3 and P4).

use crate::core::geometry::{North, SurfaceNormal};
use crate::core::shading::{Overhang, ShadingConfig};
use crate::core::solar_geometry::{
    compute_flux, Orientation, OrientationScheme, ReducedOrientation, SummerMonth,
};
use crate::core::ventilation::ventilation_heat_loss;
use indexmap::IndexSet;

/// Heat loss allowance for thermal bridging and structure per m2 of exposed element, in W/(m2.K)
pub const STRUCTURAL_HEAT_LOSS_FACTOR: f64 = 0.15;
/// Glazed fraction of a window opening when none is given
pub const DEFAULT_FRAME_FACTOR: f64 = 0.7;
// converts the normal-incidence g-value to the summer average
const G_VALUE_ANGLE_FACTOR: f64 = 0.9;

/// Direction an exterior surface faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceDirection {
    /// angle from the upward vertical, in degrees
    pub tilt: f64,
    /// compass sector, used to tell whether cross ventilation is possible
    pub orientation: Orientation,
    /// bucket keying the solar and overhang tables
    pub bucket: ReducedOrientation,
}

impl SurfaceDirection {
    pub fn resolve(normal: &SurfaceNormal, north: &North, scheme: OrientationScheme) -> Self {
        Self {
            tilt: normal.tilt(),
            orientation: Orientation::from_horizontal_orientation(
                north.horizontal_orientation(normal),
            ),
            bucket: scheme.bucket_for(north, normal),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Aperture {
    pub area: f64,
    pub u_value: f64,
    /// total solar energy transmittance at normal incidence
    pub g_value: f64,
    pub frame_factor: Option<f64>,
    pub direction: SurfaceDirection,
    pub is_operable: bool,
    pub overhang: Option<Overhang>,
}

/// A floor a zone's results point at, for colouring the risk onto the model.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceFloor {
    pub name: String,
    /// m2
    pub area: f64,
}

/// An exterior-facing element of a zone, as seen by the heat balance.
#[derive(Clone, Debug, PartialEq)]
pub enum ExteriorSurface {
    Wall {
        area: f64,
        u_value: f64,
        apertures: Vec<Aperture>,
    },
    RoofCeiling {
        area: f64,
        u_value: f64,
    },
    /// Not part of the balance; kept so results can point at a surface to colour.
    Floor(ReferenceFloor),
}

/// Climate and building-wide assumptions that solar gains are calculated under.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolarConditions {
    pub latitude: f64,
    pub month: SummerMonth,
    /// solar flux on a horizontal surface, in W/m2
    pub horizontal_flux: f64,
    pub flat_surface_cutoff: Option<f64>,
    pub shading: ShadingConfig,
    pub frame_factor: f64,
}

impl SolarConditions {
    /// Solar gain through a window, in W
    pub fn window_solar_gain(&self, aperture: &Aperture) -> f64 {
        let (flux, bucket) = compute_flux(
            self.horizontal_flux,
            aperture.direction.tilt,
            aperture.direction.bucket,
            self.latitude,
            self.month,
            self.flat_surface_cutoff,
        );
        let shading_factor = self
            .shading
            .shading_factor(bucket, aperture.overhang.as_ref());
        let frame_factor = aperture.frame_factor.unwrap_or(self.frame_factor);

        G_VALUE_ANGLE_FACTOR * aperture.area * frame_factor * flux * shading_factor
            * aperture.g_value
    }
}

/// Running totals for one zone while its surfaces are visited.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneTally {
    /// in W
    pub solar_gain: f64,
    /// in W/K
    pub heat_loss: f64,
    pub operable_directions: IndexSet<Orientation>,
    pub reference_floors: Vec<ReferenceFloor>,
}

impl ZoneTally {
    pub fn add_surface(mut self, surface: &ExteriorSurface, conditions: &SolarConditions) -> Self {
        match surface {
            ExteriorSurface::Wall {
                area,
                u_value,
                apertures,
            } => {
                let glazed_area: f64 = apertures.iter().map(|aperture| aperture.area).sum();
                self.heat_loss += (area - glazed_area) * u_value;
                self.heat_loss += STRUCTURAL_HEAT_LOSS_FACTOR * area;

                for aperture in apertures {
                    if aperture.is_operable {
                        self.operable_directions
                            .insert(aperture.direction.orientation);
                    }
                    self.heat_loss += aperture.area * aperture.u_value;
                    self.solar_gain += conditions.window_solar_gain(aperture);
                }
            }
            ExteriorSurface::RoofCeiling { area, u_value } => {
                self.heat_loss += area * u_value + STRUCTURAL_HEAT_LOSS_FACTOR * area;
            }
            ExteriorSurface::Floor(floor) => {
                self.reference_floors.push(floor.clone());
            }
        }

        self
    }

    pub fn add_ventilation(mut self, air_change_rate: f64, zone_volume: f64) -> Self {
        self.heat_loss += ventilation_heat_loss(air_change_rate, zone_volume);
        self
    }

    /// Ratio of solar gain to heat loss, in K. None when the zone loses no heat, as the
    /// ratio is then undefined.
    pub fn ratio(&self) -> Option<f64> {
        (self.heat_loss > 0.).then(|| self.solar_gain / self.heat_loss)
    }
}

/// Gains and fabric losses of a zone's surfaces, before ventilation.
pub fn tally_surfaces(surfaces: &[ExteriorSurface], conditions: &SolarConditions) -> ZoneTally {
    surfaces
        .iter()
        .fold(ZoneTally::default(), |tally, surface| {
            tally.add_surface(surface, conditions)
        })
}
