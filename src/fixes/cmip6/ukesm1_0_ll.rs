//! Fixes for UKESM1-0-LL.

use crate::cube::{CubeList, Units};
use crate::facets::ExtraFacets;
use crate::fixes::{Fix, FixError, FixRegistry};

use super::ARCHIVE;

const DATASET: &str = "UKESM1-0-LL";

pub(crate) fn register(registry: &mut FixRegistry) {
    registry.register_class(ARCHIVE, "UKESM1-0-LL.AllVars", AllVars::boxed);
    registry.register_all_vars(ARCHIVE, DATASET, "UKESM1-0-LL.AllVars");
    // The UM atmosphere stacks its levels on height, not pressure.
    registry.register_variable(ARCHIVE, DATASET, "cl", "ClFixHybridHeightCoord");
}

/// The `parent_time_units` attribute spells its datetime with dashes
/// (`days since 1850-01-01-00-00-00`), which downstream time parsing
/// chokes on. Rewrite it in canonical form.
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
        "UKESM1-0-LL.AllVars"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_metadata(&self, mut cubes: CubeList) -> Result<CubeList, FixError> {
        for cube in cubes.iter_mut() {
            let Some(parent_units) = cube.attributes.get("parent_time_units") else {
                continue;
            };
            if let Some(reference) = Units::new(parent_units.as_str()).time_reference() {
                cube.attributes.insert(
                    "parent_time_units".to_string(),
                    reference.canonical().as_str().to_string(),
                );
            }
        }
        Ok(cubes)
    }
}
