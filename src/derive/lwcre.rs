//! Derivation of `lwcre`.

use crate::cube::{Cube, CubeList};
use crate::derive::shared::extract_var;
use crate::derive::{DeriveError, DerivedVariable, Requirement};

/// Longwave cloud radiative effect: clear-sky minus all-sky outgoing
/// longwave at the top of the atmosphere.
pub struct Lwcre;

impl Lwcre {
    pub(crate) fn boxed() -> Box<dyn DerivedVariable> {
        Box::new(Self)
    }
}

impl DerivedVariable for Lwcre {
    fn short_name(&self) -> &'static str {
        "lwcre"
    }

    fn required(&self, _archive: &str) -> Vec<Requirement> {
        vec![Requirement::source("rlutcs"), Requirement::source("rlut")]
    }

    fn calculate(&self, cubes: &CubeList) -> Result<Cube, DeriveError> {
        let rlutcs = extract_var(cubes, "rlutcs")?;
        let rlut = extract_var(cubes, "rlut")?;
        Ok(rlutcs.checked_sub(rlut)?)
    }
}
