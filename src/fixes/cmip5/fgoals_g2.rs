//! Fixes for FGOALS-g2.

use crate::cube::CubeList;
use crate::facets::ExtraFacets;
use crate::fixes::shared::fix_time_reference;
use crate::fixes::{Fix, FixError, FixRegistry};

use super::ARCHIVE;

const DATASET: &str = "FGOALS-g2";

pub(crate) fn register(registry: &mut FixRegistry) {
    registry.register_class(ARCHIVE, "FGOALS-g2.AllVars", AllVars::boxed);
    registry.register_all_vars(ARCHIVE, DATASET, "FGOALS-g2.AllVars");
}

/// Every FGOALS-g2 variable carries a one-digit time reference
/// (`days since 1-1-1`); normalise it on whatever time coordinate a cube
/// has.
pub struct AllVars {
    extra_facets: ExtraFacets,
}

impl AllVars {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for AllVars {
    fn name(&self) -> &'static str {
        "FGOALS-g2.AllVars"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_metadata(&self, mut cubes: CubeList) -> Result<CubeList, FixError> {
        for cube in cubes.iter_mut() {
            if cube.has_coord("time") {
                fix_time_reference(cube.coord_mut("time")?)?;
            }
        }
        Ok(cubes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::{Coord, Cube, Units};
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn time_reference_is_zero_padded() {
        let cube = Cube::new(
            "tas",
            "K",
            vec![Coord::new("time", "days since 1-1-1", vec![0.0, 1.0])],
            ArrayD::from_elem(IxDyn(&[2]), 280.0),
        )
        .unwrap();
        let fix = AllVars::boxed(ExtraFacets::new());
        let cubes = fix.fix_metadata(CubeList::from(vec![cube])).unwrap();
        assert_eq!(
            cubes[0].coord("time").unwrap().units,
            Units::new("days since 0001-01-01")
        );
    }
}
