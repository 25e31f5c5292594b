//! Fixes for CESM2.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::cube::CubeList;
use crate::facets::ExtraFacets;
use crate::fixes::common::fix_hybrid_pressure_levels;
use crate::fixes::shared::{add_scalar_height_coord, repair_json_file};
use crate::fixes::{Fix, FixError, FixRegistry};

use super::ARCHIVE;

const DATASET: &str = "CESM2";

pub(crate) fn register(registry: &mut FixRegistry) {
    registry.register_class(ARCHIVE, "CESM2.Cl", Cl::boxed);
    registry.register_class(ARCHIVE, "CESM2.Tas", Tas::boxed);
    registry.register_variable(ARCHIVE, DATASET, "cl", "CESM2.Cl");
    registry.register_variable(ARCHIVE, DATASET, "tas", "CESM2.Tas");
}

/// Raw `cl` files omit the units field entirely, which the loader rejects,
/// so the file itself is patched before loading; the hybrid level
/// coordinate is then repaired in memory like everywhere else.
pub struct Cl {
    extra_facets: ExtraFacets,
}

impl Cl {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for Cl {
    fn name(&self) -> &'static str {
        "CESM2.Cl"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_file(&self, path: &Path, output_dir: &Path) -> Result<PathBuf, FixError> {
        repair_json_file(path, output_dir, |variables| {
            for variable in variables.iter_mut() {
                if variable.get("var_name").and_then(Value::as_str) != Some("cl") {
                    continue;
                }
                let missing = match variable.get("units") {
                    None | Some(Value::Null) => true,
                    Some(Value::String(units)) => units.is_empty(),
                    Some(_) => false,
                };
                if missing {
                    variable["units"] = Value::String("%".to_string());
                }
            }
            Ok(())
        })
    }

    fn fix_metadata(&self, cubes: CubeList) -> Result<CubeList, FixError> {
        fix_hybrid_pressure_levels(cubes)
    }
}

/// `tas` lacks its scalar 2 m height coordinate.
pub struct Tas {
    extra_facets: ExtraFacets,
}

impl Tas {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for Tas {
    fn name(&self) -> &'static str {
        "CESM2.Tas"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_metadata(&self, mut cubes: CubeList) -> Result<CubeList, FixError> {
        for cube in cubes.iter_mut() {
            if cube.var_name == "tas" {
                add_scalar_height_coord(cube, 2.0);
            }
        }
        Ok(cubes)
    }
}
