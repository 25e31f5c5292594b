//! Fixes for CESM2-WACCM, which inherits the CESM2 atmosphere and with it
//! the CESM2 bugs. The CESM2 classes are reused unchanged.

use crate::fixes::FixRegistry;

use super::ARCHIVE;

const DATASET: &str = "CESM2-WACCM";

pub(crate) fn register(registry: &mut FixRegistry) {
    registry.register_variable(ARCHIVE, DATASET, "cl", "CESM2.Cl");
    registry.register_variable(ARCHIVE, DATASET, "tas", "CESM2.Tas");
}
