//! Derivation of `npp_grid`.

use crate::cube::{Cube, CubeList};
use crate::derive::shared::grid_area_correction;
use crate::derive::{DeriveError, DerivedVariable, Requirement};

/// Net primary production per grid-cell area, via the land fraction.
pub struct NppGrid;

impl NppGrid {
    pub(crate) fn boxed() -> Box<dyn DerivedVariable> {
        Box::new(Self)
    }
}

impl DerivedVariable for NppGrid {
    fn short_name(&self) -> &'static str {
        "npp_grid"
    }

    fn required(&self, _archive: &str) -> Vec<Requirement> {
        vec![Requirement::source("npp"), Requirement::ancillary("sftlf")]
    }

    fn calculate(&self, cubes: &CubeList) -> Result<Cube, DeriveError> {
        grid_area_correction(cubes, "net_primary_productivity_of_carbon", "sftlf")
    }
}
