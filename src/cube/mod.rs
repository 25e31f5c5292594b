//! Scientific data cubes.
//!
//! A cube couples an n-dimensional payload with named dimension
//! coordinates, units and free-form attributes. It is a plain mutable
//! value: fix hooks receive cubes by value and hand them back, so "use the
//! return value, never assume in-place" is enforced by ownership rather
//! than convention. Missing data is NaN.

pub mod io;
mod units;

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use ndarray::{Array1, Array2, ArrayD};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use units::{Conversion, TimeReference, Units};

#[derive(Debug, Error)]
pub enum CubeError {
    #[error("cube `{cube}` has no coordinate `{coord}`")]
    CoordNotFound { cube: String, coord: String },

    #[error("units `{from}` are not convertible to `{to}`")]
    UnitsNotConvertible { from: String, to: String },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("invalid cube: {0}")]
    Invalid(String),

    #[error("failed to read cubes from `{path}`: {reason}")]
    Load { path: String, reason: String },

    #[error("failed to write cubes to `{path}`: {reason}")]
    Save { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

lazy_static! {
    /// CF standard names are lowercase words joined by underscores.
    static ref STANDARD_NAME: Regex =
        Regex::new(r"^[a-z][a-z0-9_]*$").expect("standard-name pattern");
}

/// One named coordinate: points, optional `(n, 2)` bounds, units,
/// attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    pub units: Units,
    pub points: Array1<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Array2<f64>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Coord {
    pub fn new(name: impl Into<String>, units: impl Into<Units>, points: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            long_name: None,
            units: units.into(),
            points: Array1::from(points),
            bounds: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Scalar coordinate (single point, no dimension), e.g. a 2 m height.
    pub fn scalar(name: impl Into<String>, units: impl Into<Units>, value: f64) -> Self {
        Self::new(name, units, vec![value])
    }

    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    pub fn with_bounds(mut self, bounds: Array2<f64>) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_bounds(&self) -> bool {
        self.bounds.is_some()
    }

    /// Contiguous midpoint bounds. Does nothing when bounds already exist
    /// or there are fewer than two points to interpolate between.
    pub fn guess_bounds(&mut self) {
        if self.bounds.is_some() || self.points.len() < 2 {
            return;
        }
        let n = self.points.len();
        let mut bounds = Array2::zeros((n, 2));
        for i in 0..n {
            let lower = if i == 0 {
                self.points[0] - (self.points[1] - self.points[0]) / 2.0
            } else {
                (self.points[i - 1] + self.points[i]) / 2.0
            };
            let upper = if i == n - 1 {
                self.points[n - 1] + (self.points[n - 1] - self.points[n - 2]) / 2.0
            } else {
                (self.points[i] + self.points[i + 1]) / 2.0
            };
            bounds[(i, 0)] = lower;
            bounds[(i, 1)] = upper;
        }
        self.bounds = Some(bounds);
    }

    /// Strictly monotonic, in either direction. Scalar coords count.
    pub fn is_monotonic(&self) -> bool {
        let p = &self.points;
        if p.len() < 2 {
            return true;
        }
        let increasing = p.windows(2).into_iter().all(|w| w[0] < w[1]);
        let decreasing = p.windows(2).into_iter().all(|w| w[0] > w[1]);
        increasing || decreasing
    }
}

/// N-dimensional variable payload plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    pub var_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    pub units: Units,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// One coordinate per data dimension, in dimension order.
    pub dim_coords: Vec<Coord>,
    /// Scalar and auxiliary coordinates (heights, hybrid coefficients).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aux_coords: Vec<Coord>,
    pub data: ArrayD<f64>,
}

impl Cube {
    pub fn new(
        var_name: impl Into<String>,
        units: impl Into<Units>,
        dim_coords: Vec<Coord>,
        data: ArrayD<f64>,
    ) -> Result<Self, CubeError> {
        let cube = Self {
            var_name: var_name.into(),
            standard_name: None,
            long_name: None,
            units: units.into(),
            attributes: BTreeMap::new(),
            dim_coords,
            aux_coords: Vec::new(),
            data,
        };
        cube.validate()?;
        Ok(cube)
    }

    pub fn with_standard_name(mut self, standard_name: impl Into<String>) -> Self {
        self.standard_name = Some(standard_name.into());
        self
    }

    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    /// Best human-readable name: standard name, else long name, else the
    /// variable name. Used in error messages.
    pub fn name(&self) -> &str {
        self.standard_name
            .as_deref()
            .or(self.long_name.as_deref())
            .unwrap_or(&self.var_name)
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Check the structural invariants the loader relies on.
    pub fn validate(&self) -> Result<(), CubeError> {
        if self.units.as_str().is_empty() {
            return Err(CubeError::Invalid(format!(
                "variable `{}` declares no units (use `1` for dimensionless)",
                self.var_name
            )));
        }
        if let Some(name) = &self.standard_name {
            if !STANDARD_NAME.is_match(name) {
                return Err(CubeError::Invalid(format!(
                    "variable `{}` has malformed standard_name `{}`",
                    self.var_name, name
                )));
            }
        }
        if self.dim_coords.len() != self.data.ndim() {
            return Err(CubeError::Invalid(format!(
                "variable `{}` has {} dimension coordinates for {} data dimensions",
                self.var_name,
                self.dim_coords.len(),
                self.data.ndim()
            )));
        }
        for (axis, coord) in self.dim_coords.iter().enumerate() {
            if coord.len() != self.data.shape()[axis] {
                return Err(CubeError::Invalid(format!(
                    "coordinate `{}` has {} points for a dimension of size {}",
                    coord.name,
                    coord.len(),
                    self.data.shape()[axis]
                )));
            }
            if !coord.is_monotonic() {
                return Err(CubeError::Invalid(format!(
                    "dimension coordinate `{}` is not monotonic",
                    coord.name
                )));
            }
        }
        for coord in self.dim_coords.iter().chain(self.aux_coords.iter()) {
            if let Some(bounds) = &coord.bounds {
                if bounds.shape() != [coord.len(), 2] {
                    return Err(CubeError::Invalid(format!(
                        "coordinate `{}` has bounds of shape {:?}, expected ({}, 2)",
                        coord.name,
                        bounds.shape(),
                        coord.len()
                    )));
                }
            }
        }
        let mut seen = std::collections::BTreeSet::new();
        for coord in self.dim_coords.iter().chain(self.aux_coords.iter()) {
            if !seen.insert(coord.name.as_str()) {
                return Err(CubeError::Invalid(format!(
                    "duplicate coordinate name `{}`",
                    coord.name
                )));
            }
        }
        Ok(())
    }

    pub fn has_coord(&self, name: &str) -> bool {
        self.dim_coords
            .iter()
            .chain(self.aux_coords.iter())
            .any(|c| c.name == name)
    }

    pub fn coord(&self, name: &str) -> Result<&Coord, CubeError> {
        self.dim_coords
            .iter()
            .chain(self.aux_coords.iter())
            .find(|c| c.name == name)
            .ok_or_else(|| CubeError::CoordNotFound {
                cube: self.name().to_string(),
                coord: name.to_string(),
            })
    }

    pub fn coord_mut(&mut self, name: &str) -> Result<&mut Coord, CubeError> {
        let cube_name = self.name().to_string();
        self.dim_coords
            .iter_mut()
            .chain(self.aux_coords.iter_mut())
            .find(|c| c.name == name)
            .ok_or(CubeError::CoordNotFound {
                cube: cube_name,
                coord: name.to_string(),
            })
    }

    /// Axis of the named dimension coordinate.
    pub fn dim_index(&self, name: &str) -> Option<usize> {
        self.dim_coords.iter().position(|c| c.name == name)
    }

    pub fn add_aux_coord(&mut self, coord: Coord) {
        self.aux_coords.push(coord);
    }

    pub fn rename_coord(&mut self, from: &str, to: &str) -> Result<(), CubeError> {
        self.coord_mut(from)?.name = to.to_string();
        Ok(())
    }

    /// Apply `f` to every element, consuming and returning the cube.
    pub fn map_data(mut self, f: impl Fn(f64) -> f64) -> Cube {
        self.data.mapv_inplace(f);
        self
    }

    /// Convert data and units to `target`, in place.
    pub fn convert_units(&mut self, target: &Units) -> Result<(), CubeError> {
        let conversion =
            self.units
                .conversion_to(target)
                .ok_or_else(|| CubeError::UnitsNotConvertible {
                    from: self.units.as_str().to_string(),
                    to: target.as_str().to_string(),
                })?;
        if conversion != Conversion::IDENTITY {
            self.data.mapv_inplace(|x| conversion.apply(x));
        }
        self.units = target.clone();
        Ok(())
    }

    /// Element-wise difference, requiring identical grids and units.
    /// Metadata is taken from `self`.
    pub fn checked_sub(&self, other: &Cube) -> Result<Cube, CubeError> {
        self.require_same_grid(other)?;
        self.require_same_units(other)?;
        let mut out = self.clone();
        out.data = &self.data - &other.data;
        Ok(out)
    }

    /// Element-wise ratio of two same-unit cubes; the result is
    /// dimensionless. Zero denominators become NaN.
    pub fn checked_div(&self, other: &Cube) -> Result<Cube, CubeError> {
        self.require_same_grid(other)?;
        self.require_same_units(other)?;
        let mut out = self.clone();
        ndarray::Zip::from(&mut out.data)
            .and(&other.data)
            .for_each(|num, &den| {
                *num = if den == 0.0 { f64::NAN } else { *num / den };
            });
        out.units = Units::new("1");
        Ok(out)
    }

    fn require_same_grid(&self, other: &Cube) -> Result<(), CubeError> {
        if self.shape() != other.shape() {
            return Err(CubeError::ShapeMismatch(format!(
                "`{}` has shape {:?} but `{}` has shape {:?}",
                self.var_name,
                self.shape(),
                other.var_name,
                other.shape()
            )));
        }
        for (a, b) in self.dim_coords.iter().zip(other.dim_coords.iter()) {
            if a.name != b.name || a.points != b.points {
                return Err(CubeError::ShapeMismatch(format!(
                    "coordinate `{}` of `{}` does not match `{}` of `{}`",
                    a.name, self.var_name, b.name, other.var_name
                )));
            }
        }
        Ok(())
    }

    fn require_same_units(&self, other: &Cube) -> Result<(), CubeError> {
        if self.units != other.units {
            return Err(CubeError::UnitsNotConvertible {
                from: other.units.as_str().to_string(),
                to: self.units.as_str().to_string(),
            });
        }
        Ok(())
    }
}

/// An ordered collection of cubes, as loaded from one file or gathered for
/// one derivation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubeList(pub Vec<Cube>);

impl CubeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extract_var_name(&self, var_name: &str) -> Option<&Cube> {
        self.0.iter().find(|c| c.var_name == var_name)
    }

    pub fn extract_standard_name(&self, standard_name: &str) -> Option<&Cube> {
        self.0
            .iter()
            .find(|c| c.standard_name.as_deref() == Some(standard_name))
    }
}

impl std::ops::Deref for CubeList {
    type Target = Vec<Cube>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for CubeList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Cube>> for CubeList {
    fn from(cubes: Vec<Cube>) -> Self {
        Self(cubes)
    }
}

impl FromIterator<Cube> for CubeList {
    fn from_iter<T: IntoIterator<Item = Cube>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for CubeList {
    type Item = Cube;
    type IntoIter = std::vec::IntoIter<Cube>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
