use crate::core::geometry::{North, SurfaceNormal};
use crate::core::heat_balance::{
    tally_surfaces, Aperture, ExteriorSurface, ReferenceFloor, SolarConditions,
    SurfaceDirection, DEFAULT_FRAME_FACTOR,
};
use crate::core::risk::{classify, RiskResult};
use crate::core::shading::{Overhang, ShadingConfig};
use crate::core::solar_geometry::OrientationScheme;
use crate::core::ventilation::{
    air_change_rate, CrossVentilation, OpeningType, SealedZoneVentilation,
    MINIMUM_AIR_CHANGE_RATE, MINIMUM_VENTILATION_BUILDING_TYPE,
};
use crate::errors::ZoneAssessmentError;
use crate::input::{
    BoundaryCondition, BuildingInput, Input, MassGlazingInput, MassZoneInput, RoomZoneInput,
    SurfaceInput,
};
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

/// Tilt in degrees at or above which a massing face is taken to be a floor.
const MASS_FLOOR_TILT: f64 = 170.;
/// Default tilt at or below which a massing face is taken to be a roof.
const MASS_FLAT_SURFACE_CUTOFF: f64 = 1.;

pub type ZoneOutcome = Result<ZoneAssessment, ZoneAssessmentError>;

/// Where a zone's Table P1 building type column comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CrossVentilationSource {
    /// The building type code is the column, taken as given.
    BuildingType,
    /// The building type code gives the storey count only; whether cross ventilation is
    /// possible follows from how many directions the operable windows face.
    WindowDirections {
        sealed_zones: SealedZoneVentilation,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ZoneVentilation {
    /// ach
    pub air_change_rate: f64,
    pub cross_ventilation: Option<CrossVentilation>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ZoneAssessment {
    /// W
    pub solar_gain: f64,
    /// W/K
    pub heat_loss: f64,
    /// K
    pub ratio: f64,
    pub ventilation: Option<ZoneVentilation>,
    pub risk: RiskResult,
    pub reference_floors: Vec<ReferenceFloor>,
}

impl ZoneAssessment {
    /// m2
    pub fn reference_floor_area(&self) -> f64 {
        self.reference_floors.iter().map(|floor| floor.area).sum()
    }
}

#[derive(Debug)]
pub struct OverheatingResults {
    pub zones: IndexMap<String, ZoneOutcome>,
}

impl OverheatingResults {
    pub fn failed_zones(&self) -> impl Iterator<Item = (&String, &ZoneAssessmentError)> {
        self.zones
            .iter()
            .filter_map(|(name, outcome)| outcome.as_ref().err().map(|err| (name, err)))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    /// m3
    pub volume: f64,
    pub opening_type: i64,
    pub building_type: i64,
    pub surfaces: Vec<ExteriorSurface>,
}

/// Building-wide values every zone is assessed against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssessmentSettings {
    pub solar_conditions: SolarConditions,
    pub external_temperature: f64,
    pub thermal_mass_parameter: Option<f64>,
    pub cross_ventilation_source: CrossVentilationSource,
}

#[derive(Debug)]
pub struct Corpus {
    pub settings: AssessmentSettings,
    /// Zones in input order. A zone whose geometry could not be read carries the error
    /// so the remaining zones are still assessed.
    pub zones: IndexMap<String, Result<Zone, ZoneAssessmentError>>,
}

impl Corpus {
    pub fn from_input(input: &Input) -> anyhow::Result<Self> {
        let north = match input.north {
            Some(north) => North::try_from(north)?,
            None => North::default(),
        };

        let (scheme, flat_surface_cutoff, cross_ventilation_source) = match &input.building {
            BuildingInput::Rooms { .. } => (
                input
                    .orientation_scheme
                    .unwrap_or(OrientationScheme::CardinalSectors),
                input.flat_surface_cutoff,
                CrossVentilationSource::WindowDirections {
                    sealed_zones: input.ventilation.sealed_zones,
                },
            ),
            BuildingInput::Masses { .. } => (
                input
                    .orientation_scheme
                    .unwrap_or(OrientationScheme::NorthAngleBands),
                Some(
                    input
                        .flat_surface_cutoff
                        .unwrap_or(MASS_FLAT_SURFACE_CUTOFF),
                ),
                CrossVentilationSource::BuildingType,
            ),
        };

        let settings = AssessmentSettings {
            solar_conditions: SolarConditions {
                latitude: input.latitude,
                month: input.month,
                horizontal_flux: input.horizontal_solar_flux,
                flat_surface_cutoff,
                shading: ShadingConfig {
                    sky_obstruction: input.solar_access,
                    blind: input.shading.blind,
                    time_fraction: input.shading.time_fraction,
                },
                frame_factor: input.frame_factor.unwrap_or(DEFAULT_FRAME_FACTOR),
            },
            external_temperature: input.external_temperature,
            thermal_mass_parameter: input.thermal_mass_parameter,
            cross_ventilation_source,
        };

        let geometry = SurfaceGeometry { north, scheme };
        let default_opening_type = input.ventilation.opening_type;
        let default_building_type = input.ventilation.building_type;

        let zones = match &input.building {
            BuildingInput::Rooms { zones } => zones
                .iter()
                .map(|(name, zone)| {
                    let zone = room_zone_surfaces(zone, &geometry).map(|surfaces| Zone {
                        volume: zone.volume,
                        opening_type: zone.opening_type.unwrap_or(default_opening_type),
                        building_type: zone.building_type.unwrap_or(default_building_type),
                        surfaces,
                    });
                    (name.clone(), zone)
                })
                .collect(),
            BuildingInput::Masses { glazing, zones } => zones
                .iter()
                .map(|(name, zone)| {
                    let zone =
                        mass_zone_surfaces(zone, glazing, &geometry, flat_surface_cutoff).map(
                            |surfaces| Zone {
                                volume: zone.volume,
                                opening_type: zone.opening_type.unwrap_or(default_opening_type),
                                building_type: zone
                                    .building_type
                                    .unwrap_or(default_building_type),
                                surfaces,
                            },
                        );
                    (name.clone(), zone)
                })
                .collect(),
        };

        Ok(Self { settings, zones })
    }

    /// Assess every zone. Zones are independent, so they are assessed in parallel; the
    /// results keep the input order.
    pub fn run(&self) -> OverheatingResults {
        let zones = self
            .zones
            .par_iter()
            .map(|(name, zone)| {
                let outcome = match zone {
                    Ok(zone) => assess_zone(name, zone, &self.settings),
                    Err(err) => Err(err.clone()),
                };
                (name.clone(), outcome)
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<IndexMap<_, _>>();

        let results = OverheatingResults { zones };
        for (name, err) in results.failed_zones() {
            warn!(zone = %name, error = %err, "zone could not be assessed");
        }
        info!(
            zones = results.zones.len(),
            failed = results.failed_zones().count(),
            "overheating assessment complete"
        );

        results
    }
}

#[instrument(skip(zone, settings))]
pub fn assess_zone(
    name: &str,
    zone: &Zone,
    settings: &AssessmentSettings,
) -> Result<ZoneAssessment, ZoneAssessmentError> {
    let tally = tally_surfaces(&zone.surfaces, &settings.solar_conditions);

    let ventilation = match settings.cross_ventilation_source {
        _ if zone.building_type == MINIMUM_VENTILATION_BUILDING_TYPE => {
            debug!("minimum ventilation requested");
            Some(ZoneVentilation {
                air_change_rate: MINIMUM_AIR_CHANGE_RATE,
                cross_ventilation: None,
            })
        }
        CrossVentilationSource::BuildingType => {
            let cross_ventilation = CrossVentilation::try_from(zone.building_type)?;
            Some(ZoneVentilation {
                air_change_rate: air_change_rate(
                    OpeningType::try_from(zone.opening_type)?,
                    cross_ventilation,
                ),
                cross_ventilation: Some(cross_ventilation),
            })
        }
        CrossVentilationSource::WindowDirections { sealed_zones } => {
            if tally.operable_directions.is_empty() {
                debug!("no operable windows");
                sealed_zones
                    .air_change_rate()
                    .map(|air_change_rate| ZoneVentilation {
                        air_change_rate,
                        cross_ventilation: None,
                    })
            } else {
                let storeys = CrossVentilation::try_from(zone.building_type)?.storeys();
                let cross_ventilation = CrossVentilation::for_window_directions(
                    storeys,
                    tally.operable_directions.len(),
                );
                match cross_ventilation {
                    Some(category) => Some(ZoneVentilation {
                        air_change_rate: air_change_rate(
                            OpeningType::try_from(zone.opening_type)?,
                            category,
                        ),
                        cross_ventilation,
                    }),
                    None => None,
                }
            }
        }
    };

    let tally = match &ventilation {
        Some(ventilation) => tally.add_ventilation(ventilation.air_change_rate, zone.volume),
        None => tally,
    };
    let ratio = tally.ratio().ok_or(ZoneAssessmentError::NoHeatLoss)?;
    let risk = classify(
        settings.thermal_mass_parameter,
        ratio,
        settings.external_temperature,
    );

    debug!(
        solar_gain = tally.solar_gain,
        heat_loss = tally.heat_loss,
        ratio,
        threshold_temperature = risk.threshold_temperature,
        category = %risk.category,
        "zone assessed"
    );

    Ok(ZoneAssessment {
        solar_gain: tally.solar_gain,
        heat_loss: tally.heat_loss,
        ratio,
        ventilation,
        risk,
        reference_floors: tally.reference_floors,
    })
}

struct SurfaceGeometry {
    north: North,
    scheme: OrientationScheme,
}

impl SurfaceGeometry {
    fn normal(&self, surface: &str, normal: [f64; 3]) -> Result<SurfaceNormal, ZoneAssessmentError> {
        SurfaceNormal::try_from(normal).map_err(|source| ZoneAssessmentError::Geometry {
            surface: surface.to_owned(),
            source,
        })
    }

    fn direction(&self, normal: &SurfaceNormal) -> SurfaceDirection {
        SurfaceDirection::resolve(normal, &self.north, self.scheme)
    }
}

/// Exterior surfaces of a zone described surface by surface. Only outdoor-facing walls
/// and roofs take part in the balance; floors are kept whatever they face.
fn room_zone_surfaces(
    zone: &RoomZoneInput,
    geometry: &SurfaceGeometry,
) -> Result<Vec<ExteriorSurface>, ZoneAssessmentError> {
    let mut surfaces = vec![];

    for (surface_name, surface) in &zone.surfaces {
        match surface {
            SurfaceInput::Wall(wall) if wall.boundary_condition == BoundaryCondition::Outdoors => {
                let wall_normal = geometry.normal(surface_name, wall.normal)?;

                let apertures = wall
                    .apertures
                    .iter()
                    .map(|(aperture_name, aperture)| {
                        let normal = match aperture.normal {
                            Some(normal) => geometry.normal(aperture_name, normal)?,
                            None => wall_normal,
                        };
                        let overhang = match (aperture.overhang_depth, aperture.height, aperture.width)
                        {
                            (None, ..) => None,
                            (Some(depth), Some(window_height), Some(window_width)) => {
                                Some(Overhang {
                                    depth,
                                    window_height,
                                    window_width,
                                })
                            }
                            (Some(_), ..) => {
                                return Err(ZoneAssessmentError::MissingApertureDimensions {
                                    aperture: aperture_name.clone(),
                                })
                            }
                        };

                        Ok(Aperture {
                            area: aperture.area,
                            u_value: aperture.u_value,
                            g_value: aperture.g_value,
                            frame_factor: aperture.frame_factor,
                            direction: geometry.direction(&normal),
                            is_operable: aperture.is_operable,
                            overhang,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                let glazed_area: f64 = apertures.iter().map(|aperture| aperture.area).sum();
                if glazed_area > wall.area {
                    return Err(ZoneAssessmentError::ApertureAreaExceedsWall {
                        wall: surface_name.clone(),
                        glazed_area,
                        wall_area: wall.area,
                    });
                }

                surfaces.push(ExteriorSurface::Wall {
                    area: wall.area,
                    u_value: wall.u_value,
                    apertures,
                });
            }
            SurfaceInput::RoofCeiling(roof)
                if roof.boundary_condition == BoundaryCondition::Outdoors =>
            {
                surfaces.push(ExteriorSurface::RoofCeiling {
                    area: roof.area,
                    u_value: roof.u_value,
                });
            }
            SurfaceInput::Floor(floor) => {
                surfaces.push(ExteriorSurface::Floor(ReferenceFloor {
                    name: surface_name.clone(),
                    area: floor.area,
                }))
            }
            // interior walls and ceilings exchange no heat with outside
            SurfaceInput::Wall(_) | SurfaceInput::RoofCeiling(_) => {}
        }
    }

    Ok(surfaces)
}

/// Exterior surfaces of a massing zone. Faces are told apart by tilt: near-horizontal
/// faces are roofs, faces turned at least 170 degrees from vertical are floors and every
/// other face is a wall glazed at the window-to-wall ratio.
fn mass_zone_surfaces(
    zone: &MassZoneInput,
    glazing: &MassGlazingInput,
    geometry: &SurfaceGeometry,
    flat_surface_cutoff: Option<f64>,
) -> Result<Vec<ExteriorSurface>, ZoneAssessmentError> {
    let cutoff = flat_surface_cutoff.unwrap_or(MASS_FLAT_SURFACE_CUTOFF);
    let mut surfaces = vec![];

    for (face_name, face) in &zone.faces {
        let normal = geometry.normal(face_name, face.normal)?;
        let tilt = normal.tilt();

        if tilt <= cutoff {
            if glazing.roof {
                surfaces.push(ExteriorSurface::RoofCeiling {
                    area: face.area,
                    u_value: glazing.u_roof.ok_or(ZoneAssessmentError::MissingRoofUValue)?,
                });
            }
        } else if tilt < MASS_FLOOR_TILT {
            let overhang = glazing.overhang_depth.map(|depth| Overhang {
                depth,
                window_height: glazing.window_height.unwrap_or(face.area.sqrt()),
                window_width: face.width.unwrap_or(face.area.sqrt()),
            });

            surfaces.push(ExteriorSurface::Wall {
                area: face.area,
                u_value: glazing.u_wall,
                apertures: vec![Aperture {
                    area: face.area * glazing.window_to_wall_ratio,
                    u_value: glazing.u_window,
                    g_value: glazing.g_value,
                    frame_factor: None,
                    direction: geometry.direction(&normal),
                    is_operable: true,
                    overhang,
                }],
            });
        } else {
            surfaces.push(ExteriorSurface::Floor(ReferenceFloor {
                name: face_name.clone(),
                area: face.area,
            }));
        }
    }

    Ok(surfaces)
}
