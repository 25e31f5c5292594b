//! CMIP5 dataset fix corpus.
//!
//! One file per dataset. Each file registers its classes into the CMIP5
//! archive namespace and assigns them to the dataset's lookup slots;
//! classes shared across datasets live in [`crate::fixes::common`] and
//! are registered here once.

mod bcc_csm1_1;
mod bcc_csm1_1_m;
mod canesm2;
mod fgoals_g2;
mod gfdl_cm3;
mod inmcm4;
mod miroc_esm;

use crate::fixes::common::{ClFixHybridPressureCoord, OceanFixGrid};
use crate::fixes::FixRegistry;

const ARCHIVE: &str = "CMIP5";

pub(crate) fn register(registry: &mut FixRegistry) {
    registry.register_class(ARCHIVE, "ClFixHybridPressureCoord", ClFixHybridPressureCoord::boxed);
    registry.register_class(ARCHIVE, "OceanFixGrid", OceanFixGrid::boxed);

    bcc_csm1_1::register(registry);
    bcc_csm1_1_m::register(registry);
    canesm2::register(registry);
    fgoals_g2::register(registry);
    gfdl_cm3::register(registry);
    inmcm4::register(registry);
    miroc_esm::register(registry);
}
