//! Derived variables: synthesis of variables no dataset provides directly.
//!
//! Each derived variable is one unit declaring which source variables it
//! needs and a pure formula from those cubes to one output cube. The
//! registry is a single flat namespace keyed by short name; unlike fixes
//! there is no per-dataset layer, because a formula is dataset-independent
//! and any dataset irregularity is repaired upstream on the source
//! variables before derivation runs. Requesting an unregistered name is a
//! hard error, never a silent passthrough.

mod alb;
mod fgco2_grid;
mod gpp_grid;
mod lai_grid;
mod lwcre;
mod npp_grid;
mod rtnt;
pub mod shared;
mod swcre;

use std::collections::BTreeMap;
use std::fmt;

use lazy_static::lazy_static;
use thiserror::Error;
use tracing::debug;

use crate::cube::{Cube, CubeError, CubeList, Units};
use crate::error::{CmorError, CmorResult};

pub use alb::Alb;
pub use fgco2_grid::Fgco2Grid;
pub use gpp_grid::GppGrid;
pub use lai_grid::LaiGrid;
pub use lwcre::Lwcre;
pub use npp_grid::NppGrid;
pub use rtnt::Rtnt;
pub use swcre::Swcre;

#[derive(Debug, Error)]
pub enum DeriveError {
    /// An input cube the formula needs is not in the gathered list.
    #[error("required cube `{0}` is missing")]
    MissingCube(String),

    /// Inputs are present but unusable: wrong grid, units or shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error(transparent)]
    Cube(#[from] CubeError),
}

/// One input a derived variable declares.
///
/// Ancillary requirements (area and land-sea fractions) travel the same
/// acquisition path as ordinary variables, fix chain included, but are
/// not recorded as provenance inputs of the derived product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub short_name: &'static str,
    pub ancillary: bool,
    pub optional: bool,
}

impl Requirement {
    /// A primary source variable.
    pub fn source(short_name: &'static str) -> Self {
        Self {
            short_name,
            ancillary: false,
            optional: false,
        }
    }

    /// A supporting field needed only for the computation.
    pub fn ancillary(short_name: &'static str) -> Self {
        Self {
            short_name,
            ancillary: true,
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// One derivation unit: declared inputs plus a pure formula.
pub trait DerivedVariable: Send + Sync {
    /// The short name this unit is registered under.
    fn short_name(&self) -> &'static str;

    /// Ordered input declarations. Takes the archive because requirements
    /// may differ between archives; the built-in corpus is
    /// archive-invariant.
    fn required(&self, archive: &str) -> Vec<Requirement>;

    /// Compute the output cube from the gathered inputs. Must not mutate
    /// the input cubes; anything touched is cloned first.
    fn calculate(&self, cubes: &CubeList) -> Result<Cube, DeriveError>;
}

impl fmt::Debug for dyn DerivedVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

type DeriveFactory = fn() -> Box<dyn DerivedVariable>;

lazy_static! {
    static ref REGISTRY: BTreeMap<&'static str, DeriveFactory> = {
        let mut table: BTreeMap<&'static str, DeriveFactory> = BTreeMap::new();
        let factories: &[DeriveFactory] = &[
            Alb::boxed,
            Fgco2Grid::boxed,
            GppGrid::boxed,
            LaiGrid::boxed,
            Lwcre::boxed,
            NppGrid::boxed,
            Rtnt::boxed,
            Swcre::boxed,
        ];
        for factory in factories {
            let name = factory().short_name();
            if table.insert(name, *factory).is_some() {
                panic!("derived variable `{name}` registered twice");
            }
        }
        table
    };
}

/// Look up the derivation unit for `short_name`. A fresh instance per
/// call; the registry holds factories, not instances.
pub fn get_derived_variable(short_name: &str) -> CmorResult<Box<dyn DerivedVariable>> {
    REGISTRY
        .get(short_name)
        .map(|factory| factory())
        .ok_or_else(|| CmorError::UnknownDerivedVariable {
            short_name: short_name.to_string(),
        })
}

/// Input declarations of a derived variable, without computing anything.
pub fn get_required(short_name: &str, archive: &str) -> CmorResult<Vec<Requirement>> {
    Ok(get_derived_variable(short_name)?.required(archive))
}

/// All registered derived-variable short names, for discovery and
/// diagnostics.
pub fn registered_short_names() -> Vec<&'static str> {
    REGISTRY.keys().copied().collect()
}

/// Derive `short_name` from the gathered `cubes` and stamp the requested
/// output metadata.
///
/// When the first cube already carries the requested short name the
/// variable is its own single implicit source and is passed through.
/// The result is converted to `units`; a formula whose output cannot be
/// expressed in the requested units is a derivation error.
pub fn derive(
    cubes: &CubeList,
    short_name: &str,
    long_name: &str,
    units: &Units,
    standard_name: Option<&str>,
) -> CmorResult<Cube> {
    let failure = |source: DeriveError| CmorError::Derivation {
        short_name: short_name.to_string(),
        source,
    };

    let mut cube = match cubes.first() {
        Some(first) if first.var_name == short_name => first.clone(),
        _ => {
            let unit = get_derived_variable(short_name)?;
            unit.calculate(cubes).map_err(failure)?
        }
    };

    cube.var_name = short_name.to_string();
    cube.standard_name = standard_name.map(str::to_string);
    cube.long_name = Some(long_name.to_string());
    cube.convert_units(units)
        .map_err(|source| failure(DeriveError::Cube(source)))?;
    debug!(short_name, units = %units, "derived variable");
    Ok(cube)
}
