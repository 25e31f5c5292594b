//! Extra facets: free-form key/value context threaded into fixes.
//!
//! Facets originate in the caller's dataset-discovery layer (auxiliary file
//! hints, grid labels, institute names). The engine treats every key as
//! opaque pass-through; fixes read the few they understand and ignore the
//! rest. Facets can also be bulk-loaded from per-archive YAML tables that
//! map dataset/mip/variable patterns to facet blocks.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::fixes::canonical_dataset_name;

/// A single facet value. YAML/JSON scalars only; nested structures are not
/// facets and are rejected at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FacetValue {
    /// String form of the value, for facets used as file names or labels.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FacetValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FacetValue {
    fn from(value: &str) -> Self {
        FacetValue::Str(value.to_string())
    }
}

impl From<String> for FacetValue {
    fn from(value: String) -> Self {
        FacetValue::Str(value)
    }
}

impl From<i64> for FacetValue {
    fn from(value: i64) -> Self {
        FacetValue::Int(value)
    }
}

impl From<f64> for FacetValue {
    fn from(value: f64) -> Self {
        FacetValue::Float(value)
    }
}

impl From<bool> for FacetValue {
    fn from(value: bool) -> Self {
        FacetValue::Bool(value)
    }
}

/// Open key→value mapping supplied at fix construction.
///
/// Ordered (BTreeMap) so that two facet sets with the same content are
/// structurally equal regardless of insertion order, which the fix equality
/// contract depends on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtraFacets(BTreeMap<String, FacetValue>);

impl ExtraFacets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FacetValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert, for literal facet sets in registrations and tests.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FacetValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FacetValue> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FacetValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FacetValue)> {
        self.0.iter()
    }

    /// Merge `other` into `self`; on key collision the incoming value wins.
    pub fn merge(&mut self, other: &ExtraFacets) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }
}

impl FromIterator<(String, FacetValue)> for ExtraFacets {
    fn from_iter<T: IntoIterator<Item = (String, FacetValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Error)]
pub enum FacetsError {
    #[error("failed to read facets file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse facets file `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// One facets table, usually loaded per archive.
///
/// The YAML layout matches the original convention:
///
/// ```yaml
/// CanESM2:            # dataset (canonicalised for matching)
///   "*":              # mip pattern
///     fgco2:          # variable pattern
///       area_file: areacello_fx_CanESM2.json
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetsTable {
    datasets: Vec<DatasetFacets>,
}

#[derive(Debug, Clone, PartialEq)]
struct DatasetFacets {
    dataset: String,
    blocks: Vec<FacetBlock>,
}

#[derive(Debug, Clone, PartialEq)]
struct FacetBlock {
    mip_pattern: String,
    var_pattern: String,
    facets: ExtraFacets,
}

type RawTable = BTreeMap<String, BTreeMap<String, BTreeMap<String, ExtraFacets>>>;

impl FacetsTable {
    /// Load a table from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FacetsError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| FacetsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::parse(&text).map_err(|source| FacetsError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        debug!(
            path = %path.display(),
            datasets = table.datasets.len(),
            "loaded extra-facets table"
        );
        Ok(table)
    }

    /// Parse a table from YAML text.
    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        let raw: RawTable = serde_yaml::from_str(text)?;
        let mut datasets = Vec::new();
        for (dataset, mips) in raw {
            let mut blocks = Vec::new();
            for (mip_pattern, vars) in mips {
                for (var_pattern, facets) in vars {
                    blocks.push(FacetBlock {
                        mip_pattern: mip_pattern.clone(),
                        var_pattern,
                        facets,
                    });
                }
            }
            datasets.push(DatasetFacets {
                dataset: canonical_dataset_name(&dataset),
                blocks,
            });
        }
        Ok(Self { datasets })
    }

    /// Collect the facets applying to one variable of one dataset.
    ///
    /// Every block whose patterns match contributes; blocks listed later in
    /// the file override earlier ones on key collision.
    pub fn for_variable(&self, dataset: &str, mip: &str, short_name: &str) -> ExtraFacets {
        let dataset = canonical_dataset_name(dataset);
        let mut facets = ExtraFacets::new();
        for entry in &self.datasets {
            if entry.dataset != dataset {
                continue;
            }
            for block in &entry.blocks {
                if pattern_matches(&block.mip_pattern, mip)
                    && pattern_matches(&block.var_pattern, short_name)
                {
                    facets.merge(&block.facets);
                }
            }
        }
        facets
    }
}

/// `*`-wildcard match used by facets tables (`*`, `ta*`, `*day*`, ...).
fn pattern_matches(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if !pattern.contains('*') {
        return pattern == value;
    }
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    let anchored = format!("^{escaped}$");
    Regex::new(&anchored).map(|re| re.is_match(value)).unwrap_or(false)
}
