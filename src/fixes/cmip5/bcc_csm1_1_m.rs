//! Fixes for bcc-csm1-1-m, identical in substance to bcc-csm1-1.

use crate::fixes::FixRegistry;

use super::ARCHIVE;

const DATASET: &str = "bcc-csm1-1-m";

pub(crate) fn register(registry: &mut FixRegistry) {
    registry.register_variable(ARCHIVE, DATASET, "cl", "ClFixHybridPressureCoord");
    registry.register_variable(ARCHIVE, DATASET, "tos", "OceanFixGrid");
}
