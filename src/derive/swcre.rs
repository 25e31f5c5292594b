//! Derivation of `swcre`.

use crate::cube::{Cube, CubeList};
use crate::derive::shared::extract_var;
use crate::derive::{DeriveError, DerivedVariable, Requirement};

/// Shortwave cloud radiative effect: clear-sky minus all-sky outgoing
/// shortwave at the top of the atmosphere.
pub struct Swcre;

impl Swcre {
    pub(crate) fn boxed() -> Box<dyn DerivedVariable> {
        Box::new(Self)
    }
}

impl DerivedVariable for Swcre {
    fn short_name(&self) -> &'static str {
        "swcre"
    }

    fn required(&self, _archive: &str) -> Vec<Requirement> {
        vec![Requirement::source("rsutcs"), Requirement::source("rsut")]
    }

    fn calculate(&self, cubes: &CubeList) -> Result<Cube, DeriveError> {
        let rsutcs = extract_var(cubes, "rsutcs")?;
        let rsut = extract_var(cubes, "rsut")?;
        Ok(rsutcs.checked_sub(rsut)?)
    }
}
