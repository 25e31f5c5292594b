//! Derivation of `rtnt`.

use crate::cube::{Cube, CubeList};
use crate::derive::shared::extract_var;
use crate::derive::{DeriveError, DerivedVariable, Requirement};

/// Net downward radiation at the top of the atmosphere: incoming
/// shortwave minus outgoing shortwave and longwave.
pub struct Rtnt;

impl Rtnt {
    pub(crate) fn boxed() -> Box<dyn DerivedVariable> {
        Box::new(Self)
    }
}

impl DerivedVariable for Rtnt {
    fn short_name(&self) -> &'static str {
        "rtnt"
    }

    fn required(&self, _archive: &str) -> Vec<Requirement> {
        vec![
            Requirement::source("rsdt"),
            Requirement::source("rsut"),
            Requirement::source("rlut"),
        ]
    }

    fn calculate(&self, cubes: &CubeList) -> Result<Cube, DeriveError> {
        let rsdt = extract_var(cubes, "rsdt")?;
        let rsut = extract_var(cubes, "rsut")?;
        let rlut = extract_var(cubes, "rlut")?;
        Ok(rsdt.checked_sub(rsut)?.checked_sub(rlut)?)
    }
}
