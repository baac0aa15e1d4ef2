use crate::core::shading::BlindType;
use crate::core::solar_geometry::{OrientationScheme, SummerMonth};
use crate::core::ventilation::SealedZoneVentilation;
use anyhow::anyhow;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_valid::Validate;
use std::io::{BufReader, Read};

pub fn ingest_for_processing(json: impl Read) -> anyhow::Result<Input> {
    let reader = BufReader::new(json);

    let input: Input = serde_json::from_reader(reader)?;
    input.check()?;

    Ok(input)
}

fn default_solar_access() -> f64 {
    40.
}

fn latitude_in_range(latitude: &f64) -> Result<(), serde_valid::validation::Error> {
    if (-90. ..=90.).contains(latitude) {
        Ok(())
    } else {
        Err(serde_valid::validation::Error::Custom(format!(
            "latitude must be between -90 and 90 degrees, but {latitude} was given"
        )))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct Input {
    /// north reference vector on the horizontal plane, +Y when absent
    pub north: Option<[f64; 2]>,
    /// degrees
    #[validate(custom = latitude_in_range)]
    pub latitude: f64,
    /// 0 for June, 1 for July, 2 for August
    #[serde(default)]
    pub month: SummerMonth,
    /// W/m2
    #[validate(minimum = 0.)]
    pub horizontal_solar_flux: f64,
    /// mean external temperature for the month, in deg C
    pub external_temperature: f64,
    /// percentage of sky blocked by obstacles
    #[serde(default = "default_solar_access")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 100.)]
    pub solar_access: f64,
    #[serde(default)]
    pub shading: ShadingInput,
    pub ventilation: VentilationInput,
    /// kJ/(m2.K)
    #[validate(minimum = 0.)]
    pub thermal_mass_parameter: Option<f64>,
    #[validate(exclusive_minimum = 0.)]
    #[validate(maximum = 1.)]
    pub frame_factor: Option<f64>,
    /// tilt in degrees at or below which a surface is treated as horizontal
    #[validate(minimum = 0.)]
    #[validate(maximum = 180.)]
    pub flat_surface_cutoff: Option<f64>,
    pub orientation_scheme: Option<OrientationScheme>,
    pub building: BuildingInput,
}

impl Input {
    /// Value checks that go beyond what deserialisation enforces.
    fn check(&self) -> anyhow::Result<()> {
        self.validate().map_err(invalid("input"))?;
        self.shading.validate().map_err(invalid("shading"))?;

        match &self.building {
            BuildingInput::Rooms { zones } => {
                for (zone_name, zone) in zones {
                    zone.validate().map_err(invalid(zone_name))?;
                    for (surface_name, surface) in &zone.surfaces {
                        surface.check(surface_name)?;
                    }
                }
            }
            BuildingInput::Masses { glazing, zones } => {
                glazing.validate().map_err(invalid("glazing"))?;
                for (zone_name, zone) in zones {
                    zone.validate().map_err(invalid(zone_name))?;
                    for (face_name, face) in &zone.faces {
                        face.validate().map_err(invalid(face_name))?;
                    }
                }
            }
        }

        Ok(())
    }
}

fn invalid(name: &str) -> impl Fn(serde_valid::validation::Errors) -> anyhow::Error + '_ {
    move |errors| anyhow!("Invalid values for '{name}': {errors}")
}

#[derive(Debug, Default, Deserialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ShadingInput {
    /// SAP Table P3 curtain, blind or shutter code (0 to 9)
    pub blind: Option<BlindType>,
    /// fraction of daylight hours the blinds are in use
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub time_fraction: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct VentilationInput {
    /// SAP Table P1 window opening code (0 to 3)
    pub opening_type: i64,
    /// SAP Table P1 building type code (0 to 3), or -1 for minimum ventilation (0.01 ach)
    /// whatever the opening type.
    ///
    /// For `Rooms` buildings only the storey count is taken from the code: 0 and 1 are
    /// single storey, 2 and 3 multi storey. This is not a 0/1 single/multi storey flag, so
    /// a multi storey dwelling needs 2 or 3. Cross ventilation is then decided by the
    /// directions of the operable windows. For `Masses` buildings the code selects the
    /// Table P1 column directly.
    pub building_type: i64,
    #[serde(default)]
    pub sealed_zones: SealedZoneVentilation,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(tag = "type", deny_unknown_fields)]
pub enum BuildingInput {
    /// Zones described surface by surface, with glazing placed explicitly.
    Rooms { zones: IndexMap<String, RoomZoneInput> },
    /// Zones described by their outer faces, glazed at a fixed window-to-wall ratio.
    Masses {
        glazing: MassGlazingInput,
        zones: IndexMap<String, MassZoneInput>,
    },
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct RoomZoneInput {
    /// m3
    #[validate(exclusive_minimum = 0.)]
    pub volume: f64,
    /// overrides the building-wide opening type for this zone
    pub opening_type: Option<i64>,
    /// overrides the building-wide building type for this zone, read for its storey count
    pub building_type: Option<i64>,
    pub surfaces: IndexMap<String, SurfaceInput>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum BoundaryCondition {
    #[default]
    Outdoors,
    Ground,
    Adiabatic,
    Surface,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(tag = "type")]
pub enum SurfaceInput {
    Wall(WallInput),
    RoofCeiling(RoofCeilingInput),
    Floor(FloorInput),
}

impl SurfaceInput {
    fn check(&self, surface_name: &str) -> anyhow::Result<()> {
        match self {
            SurfaceInput::Wall(wall) => {
                wall.validate().map_err(invalid(surface_name))?;
                for (aperture_name, aperture) in &wall.apertures {
                    aperture.validate().map_err(invalid(aperture_name))?;
                }
            }
            SurfaceInput::RoofCeiling(roof) => roof.validate().map_err(invalid(surface_name))?,
            SurfaceInput::Floor(floor) => floor.validate().map_err(invalid(surface_name))?,
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct WallInput {
    /// m2
    #[validate(minimum = 0.)]
    pub area: f64,
    /// W/(m2.K)
    #[validate(minimum = 0.)]
    pub u_value: f64,
    pub normal: [f64; 3],
    #[serde(default)]
    pub boundary_condition: BoundaryCondition,
    #[serde(default)]
    pub apertures: IndexMap<String, ApertureInput>,
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct RoofCeilingInput {
    /// m2
    #[validate(minimum = 0.)]
    pub area: f64,
    /// W/(m2.K)
    #[validate(minimum = 0.)]
    pub u_value: f64,
    #[serde(default)]
    pub boundary_condition: BoundaryCondition,
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct FloorInput {
    /// m2
    #[validate(minimum = 0.)]
    pub area: f64,
    #[serde(default)]
    pub boundary_condition: BoundaryCondition,
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ApertureInput {
    /// m2
    #[validate(exclusive_minimum = 0.)]
    pub area: f64,
    /// W/(m2.K)
    #[validate(minimum = 0.)]
    pub u_value: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub g_value: f64,
    /// outward normal, taken from the parent wall when absent
    pub normal: Option<[f64; 3]>,
    #[serde(default)]
    pub is_operable: bool,
    /// m
    #[validate(exclusive_minimum = 0.)]
    pub height: Option<f64>,
    /// m
    #[validate(exclusive_minimum = 0.)]
    pub width: Option<f64>,
    /// depth of an overhang directly above the window, in m
    #[validate(minimum = 0.)]
    pub overhang_depth: Option<f64>,
    #[validate(exclusive_minimum = 0.)]
    #[validate(maximum = 1.)]
    pub frame_factor: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct MassGlazingInput {
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub window_to_wall_ratio: f64,
    /// W/(m2.K)
    #[validate(minimum = 0.)]
    pub u_wall: f64,
    /// W/(m2.K)
    #[validate(minimum = 0.)]
    pub u_window: f64,
    /// W/(m2.K), required when `roof` is set
    #[validate(minimum = 0.)]
    pub u_roof: Option<f64>,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub g_value: f64,
    /// whether near-horizontal faces count as exposed roof
    #[serde(default)]
    pub roof: bool,
    /// m, the square root of the face area when absent
    #[validate(exclusive_minimum = 0.)]
    pub window_height: Option<f64>,
    /// m
    #[validate(minimum = 0.)]
    pub overhang_depth: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct MassZoneInput {
    /// m3
    #[validate(exclusive_minimum = 0.)]
    pub volume: f64,
    pub opening_type: Option<i64>,
    /// the Table P1 column for this zone, or -1 for minimum ventilation
    pub building_type: Option<i64>,
    pub faces: IndexMap<String, MassFaceInput>,
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct MassFaceInput {
    /// m2
    #[validate(minimum = 0.)]
    pub area: f64,
    pub normal: [f64; 3],
    /// horizontal extent of the face in m, used to size overhangs
    #[validate(exclusive_minimum = 0.)]
    pub width: Option<f64>,
}
