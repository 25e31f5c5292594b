//! Fixes for inmcm4.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::cube::Cube;
use crate::facets::ExtraFacets;
use crate::fixes::shared::repair_json_file;
use crate::fixes::{Fix, FixError, FixRegistry};

use super::ARCHIVE;

const DATASET: &str = "inmcm4";

pub(crate) fn register(registry: &mut FixRegistry) {
    registry.register_class(ARCHIVE, "inmcm4.Gpp", Gpp::boxed);
    registry.register_class(ARCHIVE, "inmcm4.Lai", Lai::boxed);
    registry.register_class(ARCHIVE, "inmcm4.Nbp", Nbp::boxed);
    registry.register_variable(ARCHIVE, DATASET, "gpp", "inmcm4.Gpp");
    registry.register_variable(ARCHIVE, DATASET, "lai", "inmcm4.Lai");
    registry.register_variable(ARCHIVE, DATASET, "nbp", "inmcm4.Nbp");
}

/// `gpp` is stored with the opposite sign convention.
pub struct Gpp {
    extra_facets: ExtraFacets,
}

impl Gpp {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for Gpp {
    fn name(&self) -> &'static str {
        "inmcm4.Gpp"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_data(&self, cube: Cube) -> Result<Cube, FixError> {
        Ok(cube.map_data(|x| -x))
    }
}

/// `lai` is stored a factor 100 too large.
pub struct Lai {
    extra_facets: ExtraFacets,
}

impl Lai {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for Lai {
    fn name(&self) -> &'static str {
        "inmcm4.Lai"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_data(&self, cube: Cube) -> Result<Cube, FixError> {
        Ok(cube.map_data(|x| x / 100.0))
    }
}

const NBP_STANDARD_NAME: &str =
    "surface_net_downward_mass_flux_of_carbon_dioxide_expressed_as_carbon_due_to_all_land_processes";

/// Raw `nbp` files carry a free-text `standard_name` the loader rejects,
/// so the repair has to happen before loading.
pub struct Nbp {
    extra_facets: ExtraFacets,
}

impl Nbp {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for Nbp {
    fn name(&self) -> &'static str {
        "inmcm4.Nbp"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_file(&self, path: &Path, output_dir: &Path) -> Result<PathBuf, FixError> {
        repair_json_file(path, output_dir, |variables| {
            let mut patched = false;
            for variable in variables.iter_mut() {
                if variable.get("var_name").and_then(Value::as_str) == Some("nbp") {
                    variable["standard_name"] = Value::String(NBP_STANDARD_NAME.to_string());
                    patched = true;
                }
            }
            if patched {
                Ok(())
            } else {
                Err("no `nbp` variable in file".to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::Coord;
    use ndarray::{ArrayD, IxDyn};

    fn land_cube(var_name: &str, value: f64) -> Cube {
        Cube::new(
            var_name,
            "kg m-2 s-1",
            vec![Coord::new("latitude", "degrees_north", vec![0.0])],
            ArrayD::from_elem(IxDyn(&[1]), value),
        )
        .unwrap()
    }

    #[test]
    fn gpp_sign_is_flipped() {
        let fix = Gpp::boxed(ExtraFacets::new());
        let fixed = fix.fix_data(land_cube("gpp", -3.0)).unwrap();
        assert_eq!(fixed.data[IxDyn(&[0])], 3.0);
    }

    #[test]
    fn lai_is_descaled() {
        let fix = Lai::boxed(ExtraFacets::new());
        let fixed = fix.fix_data(land_cube("lai", 250.0)).unwrap();
        assert_eq!(fixed.data[IxDyn(&[0])], 2.5);
    }

    #[test]
    fn nbp_repair_requires_the_variable() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("tas.json");
        std::fs::write(&raw, "[{\"var_name\": \"tas\"}]").unwrap();
        let fix = Nbp::boxed(ExtraFacets::new());
        let err = fix.fix_file(&raw, dir.path()).unwrap_err();
        assert!(matches!(err, FixError::FileRepair { .. }));
    }
}
