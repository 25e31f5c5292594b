//! Crate-level error type.
//!
//! Subsystem errors (`CubeError`, `FixError`, `DeriveError`) live next to
//! the code that raises them; this module wraps them with enough context
//! to identify the offending archive/dataset/variable and lifecycle hook.

use std::fmt;

use thiserror::Error;

use crate::cube::CubeError;
use crate::derive::DeriveError;
use crate::fixes::{FixError, VariableId};

pub type CmorResult<T> = Result<T, CmorError>;

/// The lifecycle hook a fix was running when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixHook {
    File,
    Metadata,
    Data,
}

impl fmt::Display for FixHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixHook::File => write!(f, "fix_file"),
            FixHook::Metadata => write!(f, "fix_metadata"),
            FixHook::Data => write!(f, "fix_data"),
        }
    }
}

/// Top-level error for fix application and variable derivation.
#[derive(Debug, Error)]
pub enum CmorError {
    /// A fix hook failed while a chain was being applied.
    #[error("fix `{fix}` failed in {hook} for {id}: {source}")]
    Fix {
        id: VariableId,
        fix: &'static str,
        hook: FixHook,
        #[source]
        source: FixError,
    },

    /// Requested derived variable has no registered unit.
    #[error("no derived variable registered under `{short_name}`")]
    UnknownDerivedVariable { short_name: String },

    /// A registered derivation unit failed to compute its output.
    #[error("derivation of `{short_name}` failed: {source}")]
    Derivation {
        short_name: String,
        #[source]
        source: DeriveError,
    },

    /// Cube manipulation outside any fix or derivation context.
    #[error(transparent)]
    Cube(#[from] CubeError),
}
