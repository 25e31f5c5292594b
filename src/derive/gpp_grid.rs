//! Derivation of `gpp_grid`.

use crate::cube::{Cube, CubeList};
use crate::derive::shared::grid_area_correction;
use crate::derive::{DeriveError, DerivedVariable, Requirement};

/// Gross primary production per grid-cell area.
///
/// `gpp` is defined per land area by convention; multiplying by the land
/// area fraction re-expresses it per grid-cell area so it can be
/// spatially integrated. Only coastal cells actually change.
pub struct GppGrid;

impl GppGrid {
    pub(crate) fn boxed() -> Box<dyn DerivedVariable> {
        Box::new(Self)
    }
}

impl DerivedVariable for GppGrid {
    fn short_name(&self) -> &'static str {
        "gpp_grid"
    }

    fn required(&self, _archive: &str) -> Vec<Requirement> {
        vec![Requirement::source("gpp"), Requirement::ancillary("sftlf")]
    }

    fn calculate(&self, cubes: &CubeList) -> Result<Cube, DeriveError> {
        grid_area_correction(cubes, "gross_primary_productivity_of_carbon", "sftlf")
    }
}
