//! CMIP6 dataset fix corpus.

mod cesm2;
mod cesm2_waccm;
mod ukesm1_0_ll;

use crate::fixes::common::ClFixHybridHeightCoord;
use crate::fixes::FixRegistry;

const ARCHIVE: &str = "CMIP6";

pub(crate) fn register(registry: &mut FixRegistry) {
    registry.register_class(ARCHIVE, "ClFixHybridHeightCoord", ClFixHybridHeightCoord::boxed);

    cesm2::register(registry);
    cesm2_waccm::register(registry);
    ukesm1_0_ll::register(registry);
}
