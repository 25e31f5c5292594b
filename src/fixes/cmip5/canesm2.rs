//! Fixes for CanESM2.

use crate::cube::Cube;
use crate::facets::ExtraFacets;
use crate::fixes::{Fix, FixError, FixRegistry};

use super::ARCHIVE;

const DATASET: &str = "CanESM2";

pub(crate) fn register(registry: &mut FixRegistry) {
    registry.register_class(ARCHIVE, "CanESM2.Fgco2", Fgco2::boxed);
    registry.register_variable(ARCHIVE, DATASET, "fgco2", "CanESM2.Fgco2");
}

/// `fgco2` is reported as mass of CO2 instead of mass of carbon; rescale
/// by the molar mass ratio C/CO2.
pub struct Fgco2 {
    extra_facets: ExtraFacets,
}

impl Fgco2 {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for Fgco2 {
    fn name(&self) -> &'static str {
        "CanESM2.Fgco2"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_data(&self, cube: Cube) -> Result<Cube, FixError> {
        Ok(cube.map_data(|x| x * 12.0 / 44.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::Coord;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn fgco2_rescales_to_carbon_mass() {
        let cube = Cube::new(
            "fgco2",
            "kg m-2 s-1",
            vec![Coord::new("latitude", "degrees_north", vec![0.0])],
            ArrayD::from_elem(IxDyn(&[1]), 44.0),
        )
        .unwrap();
        let fix = Fgco2::boxed(ExtraFacets::new());
        let fixed = fix.fix_data(cube).unwrap();
        assert_eq!(fixed.data[IxDyn(&[0])], 12.0);
    }
}
