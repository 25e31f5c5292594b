//! Fixes for GFDL-CM3.

use crate::cube::{Cube, CubeList, Units};
use crate::facets::ExtraFacets;
use crate::fixes::shared::mask_outside_range;
use crate::fixes::{Fix, FixError, FixRegistry};

use super::ARCHIVE;

const DATASET: &str = "GFDL-CM3";

pub(crate) fn register(registry: &mut FixRegistry) {
    registry.register_class(ARCHIVE, "GFDL-CM3.Sftof", Sftof::boxed);
    registry.register_class(ARCHIVE, "GFDL-CM3.Areacello", Areacello::boxed);
    registry.register_variable(ARCHIVE, DATASET, "sftof", "GFDL-CM3.Sftof");
    registry.register_variable(ARCHIVE, DATASET, "areacello", "GFDL-CM3.Areacello");
}

/// `sftof` is stored as a 0–1 ratio although the declared convention is
/// percent. Rescale and mask anything a percentage cannot be.
pub struct Sftof {
    extra_facets: ExtraFacets,
}

impl Sftof {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for Sftof {
    fn name(&self) -> &'static str {
        "GFDL-CM3.Sftof"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_data(&self, cube: Cube) -> Result<Cube, FixError> {
        let cube = cube.map_data(|x| x * 100.0);
        Ok(mask_outside_range(cube, 0.0, 100.0))
    }
}

/// `areacello` declares `m-2` where cell areas are plainly `m2`.
pub struct Areacello {
    extra_facets: ExtraFacets,
}

impl Areacello {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for Areacello {
    fn name(&self) -> &'static str {
        "GFDL-CM3.Areacello"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_metadata(&self, mut cubes: CubeList) -> Result<CubeList, FixError> {
        for cube in cubes.iter_mut() {
            if cube.var_name == "areacello" && cube.units == Units::new("m-2") {
                cube.units = Units::new("m2");
            }
        }
        Ok(cubes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::Coord;
    use ndarray::{ArrayD, IxDyn};

    fn cube(var_name: &str, units: &str, value: f64) -> Cube {
        Cube::new(
            var_name,
            units,
            vec![Coord::new("latitude", "degrees_north", vec![0.0, 1.0])],
            ArrayD::from_elem(IxDyn(&[2]), value),
        )
        .unwrap()
    }

    #[test]
    fn sftof_becomes_percent() {
        let fix = Sftof::boxed(ExtraFacets::new());
        let fixed = fix.fix_data(cube("sftof", "%", 0.25)).unwrap();
        assert!(fixed.data.iter().all(|&x| x == 25.0));
    }

    #[test]
    fn sftof_masks_impossible_fractions() {
        let fix = Sftof::boxed(ExtraFacets::new());
        let fixed = fix.fix_data(cube("sftof", "%", 1.5)).unwrap();
        assert!(fixed.data.iter().all(|x| x.is_nan()));
    }

    #[test]
    fn areacello_relabelled_only_when_wrong() {
        let fix = Areacello::boxed(ExtraFacets::new());
        let cubes = fix
            .fix_metadata(CubeList::from(vec![cube("areacello", "m-2", 1.0)]))
            .unwrap();
        assert_eq!(cubes[0].units, Units::new("m2"));

        let cubes = fix
            .fix_metadata(CubeList::from(vec![cube("areacello", "m2", 1.0)]))
            .unwrap();
        assert_eq!(cubes[0].units, Units::new("m2"));
    }
}
