//! Dataset fixes: resolution and application.
//!
//! Raw model output rarely satisfies the conventions downstream code
//! assumes. Each irregularity gets one small correction unit (a [`Fix`]),
//! and this module answers the question "which fixes apply to this
//! variable, in what order?". Fixes are registered at four specificity
//! levels (archive default, dataset-wide, per-mip, per-variable) and the
//! resolved chain runs most-specific last, so a variable fix can rely on
//! invariants the dataset-wide fix already established.
//!
//! The registry stores factories, never instances: every resolution
//! request constructs fresh, stateless fix objects carrying only the
//! caller's [`ExtraFacets`].

pub mod common;
pub mod shared;

pub mod cmip5;
pub mod cmip6;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use thiserror::Error;
use tracing::debug;

use crate::cube::{Cube, CubeError, CubeList};
use crate::error::{CmorError, CmorResult, FixHook};
use crate::facets::ExtraFacets;

#[derive(Debug, Error)]
pub enum FixError {
    /// A hook received cubes it cannot repair: wrong shape, missing
    /// coordinate, unexpected units.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// `fix_file` could not produce a loadable file.
    #[error("file repair failed for `{path}`: {reason}")]
    FileRepair { path: String, reason: String },

    #[error(transparent)]
    Cube(#[from] CubeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Canonical form of a dataset name: lowercase, `-` and `.` folded to `_`.
///
/// Real-world spellings of dataset names genuinely vary
/// (`bcc-csm1-1-m`, `BCC_CSM1_1_M`); both must resolve to the same chain.
pub fn canonical_dataset_name(dataset: &str) -> String {
    dataset
        .to_lowercase()
        .replace(['-', '.'], "_")
}

fn canonical_archive_name(archive: &str) -> String {
    archive.to_uppercase().replace(['-', '.'], "_")
}

/// The (archive, dataset, variable-group, variable) 4-tuple a fix chain is
/// resolved for. Archive and dataset names are canonicalised for equality
/// and hashing; mip and short name compare verbatim.
#[derive(Debug, Clone, Eq)]
pub struct VariableId {
    pub archive: String,
    pub dataset: String,
    pub mip: String,
    pub short_name: String,
}

impl VariableId {
    pub fn new(
        archive: impl Into<String>,
        dataset: impl Into<String>,
        mip: impl Into<String>,
        short_name: impl Into<String>,
    ) -> Self {
        Self {
            archive: archive.into(),
            dataset: dataset.into(),
            mip: mip.into(),
            short_name: short_name.into(),
        }
    }
}

impl PartialEq for VariableId {
    fn eq(&self, other: &Self) -> bool {
        canonical_archive_name(&self.archive) == canonical_archive_name(&other.archive)
            && canonical_dataset_name(&self.dataset) == canonical_dataset_name(&other.dataset)
            && self.mip == other.mip
            && self.short_name == other.short_name
    }
}

impl std::hash::Hash for VariableId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        canonical_archive_name(&self.archive).hash(state);
        canonical_dataset_name(&self.dataset).hash(state);
        self.mip.hash(state);
        self.short_name.hash(state);
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.archive, self.dataset, self.mip, self.short_name
        )
    }
}

/// One correction unit. All three lifecycle hooks default to identity;
/// concrete fixes override only what they need.
///
/// Hooks take their subject by value and return it. A fix may hand back
/// the same object or a replacement; either way the caller must use the
/// return value, which ownership makes impossible to forget.
pub trait Fix: Send + Sync {
    /// Class name, unique within the archive namespace the fix is
    /// registered in. Dataset-specific classes are qualified
    /// (`"inmcm4.Gpp"`); shared classes are not.
    fn name(&self) -> &'static str;

    /// The facets this instance was constructed with.
    fn extra_facets(&self) -> &ExtraFacets;

    /// Repair a raw on-disk file before loading. Only hook allowed disk
    /// access. The returned path (possibly a corrected copy under
    /// `output_dir`) is the one to load from.
    fn fix_file(&self, path: &Path, _output_dir: &Path) -> Result<PathBuf, FixError> {
        Ok(path.to_path_buf())
    }

    /// Repair names, units, coordinates, attributes or cube count of the
    /// cubes one logical variable loaded as.
    fn fix_metadata(&self, cubes: CubeList) -> Result<CubeList, FixError> {
        Ok(cubes)
    }

    /// Repair numeric values of one metadata-fixed cube.
    fn fix_data(&self, cube: Cube) -> Result<Cube, FixError> {
        Ok(cube)
    }
}

// Structural equality: same concrete class, equal facets. Class names are
// unique per archive namespace, so the name stands in for the type.
impl PartialEq for dyn Fix {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.extra_facets() == other.extra_facets()
    }
}

impl fmt::Debug for dyn Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.name(), self.extra_facets())
    }
}

/// Identity fix, the always-present base of every chain.
pub struct GenericFix {
    extra_facets: ExtraFacets,
}

impl GenericFix {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for GenericFix {
    fn name(&self) -> &'static str {
        "GenericFix"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }
}

/// Constructor for a registered fix class.
pub type FixFactory = fn(ExtraFacets) -> Box<dyn Fix>;

#[derive(Default)]
struct DatasetTable {
    all_vars: Option<&'static str>,
    mips: BTreeMap<String, &'static str>,
    variables: BTreeMap<String, &'static str>,
}

#[derive(Default)]
struct ArchiveTable {
    /// Per-archive namespace of fix classes, keyed by exact class name.
    classes: BTreeMap<&'static str, FixFactory>,
    default: Option<&'static str>,
    datasets: BTreeMap<String, DatasetTable>,
}

/// The four-level lookup table mapping identifiers to fix chains.
///
/// Built once at startup and read-only afterwards. Registering a
/// duplicate slot or referencing an unknown class is a programming error
/// and panics during construction.
#[derive(Default)]
pub struct FixRegistry {
    archives: BTreeMap<String, ArchiveTable>,
}

impl FixRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fix class in an archive's namespace. Each class name is
    /// registered exactly once; shared classes are registered by the
    /// archive module and only referenced by name from dataset slots.
    pub fn register_class(&mut self, archive: &str, name: &'static str, factory: FixFactory) {
        let table = self.archive_mut(archive);
        if table.classes.insert(name, factory).is_some() {
            panic!("fix class `{name}` registered twice in archive `{archive}`");
        }
    }

    /// Replace `GenericFix` as the base of every chain in this archive.
    pub fn register_default(&mut self, archive: &str, class: &'static str) {
        self.require_class(archive, class);
        let table = self.archive_mut(archive);
        if table.default.is_some() {
            panic!("archive `{archive}` already has a default fix");
        }
        table.default = Some(class);
    }

    /// Register a fix applying to every variable of one dataset.
    pub fn register_all_vars(&mut self, archive: &str, dataset: &str, class: &'static str) {
        self.require_class(archive, class);
        let slot = &mut self.dataset_mut(archive, dataset).all_vars;
        if slot.is_some() {
            panic!("dataset `{dataset}` in `{archive}` already has an all-variables fix");
        }
        *slot = Some(class);
    }

    /// Register a fix scoped to one variable group of one dataset.
    pub fn register_mip(&mut self, archive: &str, dataset: &str, mip: &str, class: &'static str) {
        self.require_class(archive, class);
        let mips = &mut self.dataset_mut(archive, dataset).mips;
        if mips.insert(mip.to_string(), class).is_some() {
            panic!("dataset `{dataset}` in `{archive}` already has a fix for mip `{mip}`");
        }
    }

    /// Register a fix targeting one exact variable of one dataset.
    pub fn register_variable(
        &mut self,
        archive: &str,
        dataset: &str,
        short_name: &str,
        class: &'static str,
    ) {
        self.require_class(archive, class);
        let variables = &mut self.dataset_mut(archive, dataset).variables;
        if variables.insert(short_name.to_string(), class).is_some() {
            panic!("dataset `{dataset}` in `{archive}` already has a fix for `{short_name}`");
        }
    }

    /// Resolve the ordered fix chain for one identifier.
    ///
    /// Never fails: an unknown archive or dataset yields the base-only
    /// chain. The same `extra_facets` are cloned into every fix so
    /// context discovered once is visible at all levels.
    pub fn resolve(&self, id: &VariableId, extra_facets: &ExtraFacets) -> FixChain {
        let mut fixes: Vec<Box<dyn Fix>> = Vec::new();

        let archive = self.archives.get(&canonical_archive_name(&id.archive));
        match archive.and_then(|table| self.factory(table, table.default?)) {
            Some(factory) => fixes.push(factory(extra_facets.clone())),
            None => fixes.push(GenericFix::boxed(extra_facets.clone())),
        }

        if let Some(table) = archive {
            if let Some(dataset) = table.datasets.get(&canonical_dataset_name(&id.dataset)) {
                let levels = [
                    dataset.all_vars,
                    dataset.mips.get(&id.mip).copied(),
                    dataset.variables.get(&id.short_name).copied(),
                ];
                for class in levels.into_iter().flatten() {
                    if let Some(factory) = self.factory(table, class) {
                        fixes.push(factory(extra_facets.clone()));
                    }
                }
            }
        }

        let chain = FixChain {
            id: id.clone(),
            fixes,
        };
        debug!(id = %id, fixes = ?chain.names(), "resolved fix chain");
        chain
    }

    fn factory(&self, table: &ArchiveTable, class: &'static str) -> Option<FixFactory> {
        // Slot registration validated the class, so this cannot miss.
        table.classes.get(class).copied()
    }

    fn require_class(&self, archive: &str, class: &'static str) {
        let registered = self
            .archives
            .get(&canonical_archive_name(archive))
            .map(|table| table.classes.contains_key(class))
            .unwrap_or(false);
        if !registered {
            panic!("fix class `{class}` is not registered in archive `{archive}`");
        }
    }

    fn archive_mut(&mut self, archive: &str) -> &mut ArchiveTable {
        self.archives
            .entry(canonical_archive_name(archive))
            .or_default()
    }

    fn dataset_mut(&mut self, archive: &str, dataset: &str) -> &mut DatasetTable {
        self.archive_mut(archive)
            .datasets
            .entry(canonical_dataset_name(dataset))
            .or_default()
    }
}

lazy_static! {
    static ref REGISTRY: FixRegistry = {
        let mut registry = FixRegistry::new();
        cmip5::register(&mut registry);
        cmip6::register(&mut registry);
        registry
    };
}

/// Resolve the fix chain for `id` against the built-in corpus.
pub fn get_fixes(id: &VariableId, extra_facets: &ExtraFacets) -> FixChain {
    REGISTRY.resolve(id, extra_facets)
}

/// The ordered fixes applying to one identifier, base first, most
/// specific last. Application helpers run every fix's hook in order,
/// rebinding the subject between fixes; the first hook failure aborts the
/// chain.
#[derive(Debug, PartialEq)]
pub struct FixChain {
    id: VariableId,
    fixes: Vec<Box<dyn Fix>>,
}

impl FixChain {
    pub fn id(&self) -> &VariableId {
        &self.id
    }

    pub fn fixes(&self) -> &[Box<dyn Fix>] {
        &self.fixes
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    /// Class names in application order.
    pub fn names(&self) -> Vec<&'static str> {
        self.fixes.iter().map(|fix| fix.name()).collect()
    }

    /// Run every `fix_file` hook, threading the path through the chain.
    pub fn fix_file(&self, path: &Path, output_dir: &Path) -> CmorResult<PathBuf> {
        let mut current = path.to_path_buf();
        for fix in &self.fixes {
            current = fix
                .fix_file(&current, output_dir)
                .map_err(|source| self.failure(fix.name(), FixHook::File, source))?;
        }
        Ok(current)
    }

    /// Run every `fix_metadata` hook in order.
    pub fn fix_metadata(&self, cubes: CubeList) -> CmorResult<CubeList> {
        let mut current = cubes;
        for fix in &self.fixes {
            current = fix
                .fix_metadata(current)
                .map_err(|source| self.failure(fix.name(), FixHook::Metadata, source))?;
        }
        Ok(current)
    }

    /// Run every `fix_data` hook in order.
    pub fn fix_data(&self, cube: Cube) -> CmorResult<Cube> {
        let mut current = cube;
        for fix in &self.fixes {
            current = fix
                .fix_data(current)
                .map_err(|source| self.failure(fix.name(), FixHook::Data, source))?;
        }
        Ok(current)
    }

    fn failure(&self, fix: &'static str, hook: FixHook, source: FixError) -> CmorError {
        CmorError::Fix {
            id: self.id.clone(),
            fix,
            hook,
            source,
        }
    }
}
