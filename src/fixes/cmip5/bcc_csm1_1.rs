//! Fixes for bcc-csm1-1.
//!
//! Both hybrid-level `cl` and native-grid `tos` are repaired by the
//! shared classes; this dataset registers no classes of its own.

use crate::fixes::FixRegistry;

use super::ARCHIVE;

const DATASET: &str = "bcc-csm1-1";

pub(crate) fn register(registry: &mut FixRegistry) {
    registry.register_variable(ARCHIVE, DATASET, "cl", "ClFixHybridPressureCoord");
    registry.register_variable(ARCHIVE, DATASET, "tos", "OceanFixGrid");
}
