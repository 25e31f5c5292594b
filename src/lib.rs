//! Normalisation of heterogeneous climate-model output.
//!
//! Two registries do the work:
//!
//! - **Fixes**: per-dataset correction units resolved by
//!   (archive, dataset, mip, variable) at four specificity levels and
//!   applied as an ordered chain, most specific last.
//! - **Derived variables**: units declaring required source variables and
//!   a pure formula, looked up in a single flat namespace.
//!
//! Both registries are built once at startup, store factories rather than
//! instances, and are safe to resolve from concurrent tasks. Cubes
//! themselves are plain mutable values; sharing one cube across tasks is
//! the caller's problem to serialise.

pub mod cube;
pub mod derive;
pub mod error;
pub mod facets;
pub mod fixes;

pub use cube::{Coord, Cube, CubeError, CubeList, Units};
pub use derive::{
    derive, get_derived_variable, get_required, DeriveError, DerivedVariable, Requirement,
};
pub use error::{CmorError, CmorResult, FixHook};
pub use facets::{ExtraFacets, FacetValue, FacetsTable};
pub use fixes::{get_fixes, Fix, FixChain, FixError, FixRegistry, GenericFix, VariableId};
