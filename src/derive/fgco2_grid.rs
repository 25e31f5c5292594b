//! Derivation of `fgco2_grid`.

use crate::cube::{Cube, CubeList};
use crate::derive::shared::grid_area_correction;
use crate::derive::{DeriveError, DerivedVariable, Requirement};

/// Ocean CO2 flux per grid-cell area, via the ocean fraction.
pub struct Fgco2Grid;

impl Fgco2Grid {
    pub(crate) fn boxed() -> Box<dyn DerivedVariable> {
        Box::new(Self)
    }
}

impl DerivedVariable for Fgco2Grid {
    fn short_name(&self) -> &'static str {
        "fgco2_grid"
    }

    fn required(&self, _archive: &str) -> Vec<Requirement> {
        vec![Requirement::source("fgco2"), Requirement::ancillary("sftof")]
    }

    fn calculate(&self, cubes: &CubeList) -> Result<Cube, DeriveError> {
        grid_area_correction(
            cubes,
            "surface_downward_mass_flux_of_carbon_dioxide_expressed_as_carbon",
            "sftof",
        )
    }
}
