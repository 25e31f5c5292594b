//! Derivation of `lai_grid`.

use crate::cube::{Cube, CubeList};
use crate::derive::shared::grid_area_correction;
use crate::derive::{DeriveError, DerivedVariable, Requirement};

/// Leaf area index per grid-cell area, via the land fraction.
pub struct LaiGrid;

impl LaiGrid {
    pub(crate) fn boxed() -> Box<dyn DerivedVariable> {
        Box::new(Self)
    }
}

impl DerivedVariable for LaiGrid {
    fn short_name(&self) -> &'static str {
        "lai_grid"
    }

    fn required(&self, _archive: &str) -> Vec<Requirement> {
        vec![Requirement::source("lai"), Requirement::ancillary("sftlf")]
    }

    fn calculate(&self, cubes: &CubeList) -> Result<Cube, DeriveError> {
        grid_area_correction(cubes, "leaf_area_index", "sftlf")
    }
}
