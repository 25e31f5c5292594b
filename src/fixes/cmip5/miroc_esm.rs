//! Fixes for MIROC-ESM.

use crate::cube::{Cube, CubeList, Units};
use crate::facets::ExtraFacets;
use crate::fixes::shared::fix_time_reference;
use crate::fixes::{Fix, FixError, FixRegistry};

use super::ARCHIVE;

const DATASET: &str = "MIROC-ESM";

pub(crate) fn register(registry: &mut FixRegistry) {
    registry.register_class(ARCHIVE, "MIROC-ESM.AllVars", AllVars::boxed);
    registry.register_class(ARCHIVE, "MIROC-ESM.Tro3", Tro3::boxed);
    registry.register_class(ARCHIVE, "MIROC-ESM.Co2", Co2::boxed);
    registry.register_all_vars(ARCHIVE, DATASET, "MIROC-ESM.AllVars");
    registry.register_variable(ARCHIVE, DATASET, "tro3", "MIROC-ESM.Tro3");
    registry.register_variable(ARCHIVE, DATASET, "co2", "MIROC-ESM.Co2");
}

/// Dataset-wide bugs: the pressure dimension is labelled with the table
/// name `AR5PL35` instead of `air_pressure`, and time references count
/// from year zero.
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
        "MIROC-ESM.AllVars"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_metadata(&self, mut cubes: CubeList) -> Result<CubeList, FixError> {
        for cube in cubes.iter_mut() {
            if cube.has_coord("AR5PL35") {
                cube.rename_coord("AR5PL35", "air_pressure")?;
                let pressure = cube.coord_mut("air_pressure")?;
                pressure.units = Units::new("Pa");
                pressure.long_name = Some("pressure".to_string());
            }
            if cube.has_coord("time") {
                fix_time_reference(cube.coord_mut("time")?)?;
            }
        }
        Ok(cubes)
    }
}

/// `tro3` is a factor 1000 too small (mole fraction instead of ppb scale).
pub struct Tro3 {
    extra_facets: ExtraFacets,
}

impl Tro3 {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for Tro3 {
    fn name(&self) -> &'static str {
        "MIROC-ESM.Tro3"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_data(&self, cube: Cube) -> Result<Cube, FixError> {
        Ok(cube.map_data(|x| x * 1000.0))
    }
}

/// `co2` declares bare `1` although the values are ppm; relabel without
/// touching the data.
pub struct Co2 {
    extra_facets: ExtraFacets,
}

impl Co2 {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for Co2 {
    fn name(&self) -> &'static str {
        "MIROC-ESM.Co2"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_metadata(&self, mut cubes: CubeList) -> Result<CubeList, FixError> {
        for cube in cubes.iter_mut() {
            if cube.var_name == "co2" {
                cube.units = Units::new("1e-6");
            }
        }
        Ok(cubes)
    }
}
