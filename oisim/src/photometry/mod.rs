//! Radiometric and photometric conversions

pub mod colorimetry;
pub mod quanta;

pub use colorimetry::{
    cie_x_bar, cie_y_bar, cie_z_bar, illuminance_from_energy, photopic_luminosity,
    xyz_from_energy, xyz_matching_table,
};
pub use quanta::{energy_to_quanta, photon_energy_joules, quanta_to_energy, SI};
