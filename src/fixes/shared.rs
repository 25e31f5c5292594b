//! Helpers shared by concrete fixes.
//!
//! Nothing here is a fix on its own; these are the small repairs several
//! datasets need in identical form, pulled out so each fix file stays a
//! thin declaration of *which* repair applies.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::cube::{Coord, Cube, CubeList};
use crate::fixes::FixError;

/// Round coordinate points and bounds to `decimals` places.
///
/// `coord_names` restricts the rounding; `None` rounds every coordinate.
pub fn round_coordinates(
    mut cubes: CubeList,
    decimals: i32,
    coord_names: Option<&[&str]>,
) -> CubeList {
    let factor = 10f64.powi(decimals);
    let round = move |x: f64| (x * factor).round() / factor;
    for cube in cubes.iter_mut() {
        for coord in cube.dim_coords.iter_mut().chain(cube.aux_coords.iter_mut()) {
            if let Some(names) = coord_names {
                if !names.contains(&coord.name.as_str()) {
                    continue;
                }
            }
            coord.points.mapv_inplace(round);
            if let Some(bounds) = &mut coord.bounds {
                bounds.mapv_inplace(round);
            }
        }
    }
    cubes
}

/// Attach a scalar `height` coordinate (default 2 m for near-surface
/// variables). No-op when the cube already has one.
pub fn add_scalar_height_coord(cube: &mut Cube, height: f64) {
    if cube.has_coord("height") {
        return;
    }
    let mut coord = Coord::scalar("height", "m", height).with_long_name("height");
    coord.attributes.insert("positive".into(), "up".into());
    cube.add_aux_coord(coord);
}

/// Attach a scalar `depth` coordinate (default 0 m for surface fields).
pub fn add_scalar_depth_coord(cube: &mut Cube, depth: f64) {
    if cube.has_coord("depth") {
        return;
    }
    let mut coord = Coord::scalar("depth", "m", depth).with_long_name("depth");
    coord.attributes.insert("positive".into(), "down".into());
    cube.add_aux_coord(coord);
}

/// Midpoint-guess bounds for the named coordinates where missing.
pub fn guess_coord_bounds(cube: &mut Cube, names: &[&str]) {
    for name in names {
        if let Ok(coord) = cube.coord_mut(name) {
            coord.guess_bounds();
        }
    }
}

/// Normalise a malformed CF time reference on `coord`.
///
/// Handles one-digit date fields, a year-zero reference (relabelled to
/// year 1; producers writing year 0 mean the first proleptic year) and
/// datetime tails spelled with dashes. Returns whether the units changed.
/// A reference date that does not exist in the calendar is unfixable.
pub fn fix_time_reference(coord: &mut Coord) -> Result<bool, FixError> {
    let Some(mut reference) = coord.units.time_reference() else {
        return Ok(false);
    };
    if reference.year == 0 {
        reference.year = 1;
    }
    if !reference.has_valid_date() {
        return Err(FixError::MalformedInput(format!(
            "time coordinate `{}` has unfixable reference `{}`",
            coord.name, coord.units
        )));
    }
    let canonical = reference.canonical();
    if canonical == coord.units {
        return Ok(false);
    }
    coord.units = canonical;
    Ok(true)
}

/// NaN-mask values outside the physically possible `[min, max]` range.
pub fn mask_outside_range(cube: Cube, min: f64, max: f64) -> Cube {
    cube.map_data(move |x| if x < min || x > max { f64::NAN } else { x })
}

/// Patch a raw JSON cube file and write the repaired copy to
/// `output_dir`, returning the new path.
///
/// `patch` receives the file's variable objects and reports what is wrong
/// when the file cannot be repaired. The original file is never touched.
pub fn repair_json_file(
    path: &Path,
    output_dir: &Path,
    patch: impl FnOnce(&mut Vec<Value>) -> Result<(), String>,
) -> Result<PathBuf, FixError> {
    let failure = |reason: String| FixError::FileRepair {
        path: path.display().to_string(),
        reason,
    };

    let text = fs::read_to_string(path).map_err(|err| failure(err.to_string()))?;
    let mut value: Value =
        serde_json::from_str(&text).map_err(|err| failure(format!("not valid JSON: {err}")))?;
    let variables = value
        .as_array_mut()
        .ok_or_else(|| failure("top level is not a cube array".to_string()))?;
    patch(variables).map_err(failure)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| failure("path has no file name".to_string()))?;
    fs::create_dir_all(output_dir).map_err(|err| failure(err.to_string()))?;
    let repaired = output_dir.join(file_name);
    let text = serde_json::to_string_pretty(&value).map_err(|err| failure(err.to_string()))?;
    fs::write(&repaired, text).map_err(|err| failure(err.to_string()))?;
    info!(from = %path.display(), to = %repaired.display(), "repaired raw file");
    Ok(repaired)
}
