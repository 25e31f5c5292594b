//! Derivation of `alb`.

use crate::cube::{Cube, CubeList};
use crate::derive::shared::extract_var;
use crate::derive::{DeriveError, DerivedVariable, Requirement};

/// Surface albedo: upwelling over downwelling shortwave. Night-side
/// cells (zero downwelling flux) are masked.
pub struct Alb;

impl Alb {
    pub(crate) fn boxed() -> Box<dyn DerivedVariable> {
        Box::new(Self)
    }
}

impl DerivedVariable for Alb {
    fn short_name(&self) -> &'static str {
        "alb"
    }

    fn required(&self, _archive: &str) -> Vec<Requirement> {
        vec![Requirement::source("rsus"), Requirement::source("rsds")]
    }

    fn calculate(&self, cubes: &CubeList) -> Result<Cube, DeriveError> {
        let rsus = extract_var(cubes, "rsus")?;
        let rsds = extract_var(cubes, "rsds")?;
        Ok(rsus.checked_div(rsds)?)
    }
}
