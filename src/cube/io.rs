//! JSON cube interchange.
//!
//! A file holds one JSON array of cubes. Loading validates every cube's
//! structural invariants; files that fail here are exactly the ones a
//! `fix_file` hook exists to repair before loading is retried.

use std::fs;
use std::path::Path;

use tracing::debug;

use super::{CubeError, CubeList};

/// Read and validate a cube file.
pub fn read_cubes(path: impl AsRef<Path>) -> Result<CubeList, CubeError> {
    let path = path.as_ref();
    let failure = |reason: String| CubeError::Load {
        path: path.display().to_string(),
        reason,
    };

    let text = fs::read_to_string(path).map_err(|err| failure(err.to_string()))?;
    let cubes: CubeList = serde_json::from_str(&text).map_err(|err| failure(err.to_string()))?;
    for cube in cubes.iter() {
        cube.validate().map_err(|err| failure(err.to_string()))?;
    }
    debug!(path = %path.display(), cubes = cubes.len(), "read cube file");
    Ok(cubes)
}

/// Write a cube file, overwriting any existing one at `path`.
pub fn write_cubes(cubes: &CubeList, path: impl AsRef<Path>) -> Result<(), CubeError> {
    let path = path.as_ref();
    let failure = |reason: String| CubeError::Save {
        path: path.display().to_string(),
        reason,
    };

    for cube in cubes.iter() {
        cube.validate().map_err(|err| failure(err.to_string()))?;
    }
    let text = serde_json::to_string_pretty(cubes).map_err(|err| failure(err.to_string()))?;
    fs::write(path, text).map_err(|err| failure(err.to_string()))?;
    debug!(path = %path.display(), cubes = cubes.len(), "wrote cube file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::{Coord, Cube};
    use ndarray::{ArrayD, IxDyn};

    fn sample_cubes() -> CubeList {
        CubeList::from(vec![Cube::new(
            "tas",
            "K",
            vec![
                Coord::new("latitude", "degrees_north", vec![-45.0, 45.0]),
                Coord::new("longitude", "degrees_east", vec![0.0, 180.0]),
            ],
            ArrayD::from_elem(IxDyn(&[2, 2]), 285.0),
        )
        .unwrap()
        .with_standard_name("air_temperature")])
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tas.json");
        let cubes = sample_cubes();
        write_cubes(&cubes, &path).unwrap();
        assert_eq!(read_cubes(&path).unwrap(), cubes);
    }

    #[test]
    fn loading_validates_structure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        // Two coordinate points for a three-element dimension.
        std::fs::write(
            &path,
            serde_json::json!([{
                "var_name": "tas",
                "units": "K",
                "dim_coords": [{
                    "name": "latitude",
                    "units": "degrees_north",
                    "points": {"v": 1, "dim": [2], "data": [0.0, 1.0]},
                }],
                "data": {"v": 1, "dim": [3], "data": [1.0, 2.0, 3.0]},
            }])
            .to_string(),
        )
        .unwrap();
        let err = read_cubes(&path).unwrap_err();
        assert!(matches!(err, CubeError::Load { .. }));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = read_cubes("/no/such/file.json").unwrap_err();
        assert!(matches!(err, CubeError::Load { .. }));
    }
}
