pub mod geometry;
pub mod heat_balance;
pub mod risk;
pub mod shading;
pub mod solar_geometry;
pub mod ventilation;
