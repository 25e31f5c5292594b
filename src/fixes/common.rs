//! Concrete fixes shared by several datasets.
//!
//! The same structural bugs recur across models: hybrid vertical level
//! coordinates missing their proper name, units and bounds, and native
//! ocean grids with unlabelled latitude/longitude. These classes are
//! registered once per archive namespace and referenced from every
//! dataset that needs them.

use crate::cube::{CubeList, Units};
use crate::facets::ExtraFacets;
use crate::fixes::{Fix, FixError};

/// Reference surface pressure (Pa) used to place hybrid sigma-pressure
/// bounds on the dimensionless level scale.
const P0: f64 = 100_000.0;

/// Repair a hybrid sigma-pressure `lev` coordinate: canonical long name
/// and units, and bounds reconstructed from the `ap`/`b` coefficient
/// bounds when they carry any, midpoint-guessed otherwise.
pub(crate) fn fix_hybrid_pressure_levels(mut cubes: CubeList) -> Result<CubeList, FixError> {
    for cube in cubes.iter_mut() {
        if !cube.has_coord("lev") {
            continue;
        }
        let ap_bounds = cube.coord("ap").ok().and_then(|c| c.bounds.clone());
        let b_bounds = cube.coord("b").ok().and_then(|c| c.bounds.clone());
        let lev = cube.coord_mut("lev")?;
        lev.units = Units::new("1");
        lev.long_name = Some("hybrid sigma pressure coordinate".to_string());
        lev.attributes.insert(
            "standard_name".to_string(),
            "atmosphere_hybrid_sigma_pressure_coordinate".to_string(),
        );
        if lev.bounds.is_none() {
            match (ap_bounds, b_bounds) {
                (Some(ap), Some(b))
                    if ap.shape() == [lev.len(), 2] && b.shape() == [lev.len(), 2] =>
                {
                    lev.bounds = Some(ap / P0 + &b);
                }
                _ => lev.guess_bounds(),
            }
        }
    }
    Ok(cubes)
}

/// Height-based analogue: `lev` is in metres and its bounds come from the
/// `a` coefficient bounds (the offset term of `z = a + b * orog`).
pub(crate) fn fix_hybrid_height_levels(mut cubes: CubeList) -> Result<CubeList, FixError> {
    for cube in cubes.iter_mut() {
        if !cube.has_coord("lev") {
            continue;
        }
        let a_bounds = cube.coord("a").ok().and_then(|c| c.bounds.clone());
        let lev = cube.coord_mut("lev")?;
        lev.units = Units::new("m");
        lev.long_name = Some("hybrid height coordinate".to_string());
        lev.attributes.insert(
            "standard_name".to_string(),
            "atmosphere_hybrid_height_coordinate".to_string(),
        );
        if lev.bounds.is_none() {
            match a_bounds {
                Some(a) if a.shape() == [lev.len(), 2] => lev.bounds = Some(a),
                _ => lev.guess_bounds(),
            }
        }
    }
    Ok(cubes)
}

/// Hybrid sigma-pressure level repair for `cl` and friends.
pub struct ClFixHybridPressureCoord {
    extra_facets: ExtraFacets,
}

impl ClFixHybridPressureCoord {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for ClFixHybridPressureCoord {
    fn name(&self) -> &'static str {
        "ClFixHybridPressureCoord"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_metadata(&self, cubes: CubeList) -> Result<CubeList, FixError> {
        fix_hybrid_pressure_levels(cubes)
    }
}

/// Hybrid height level repair.
pub struct ClFixHybridHeightCoord {
    extra_facets: ExtraFacets,
}

impl ClFixHybridHeightCoord {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

impl Fix for ClFixHybridHeightCoord {
    fn name(&self) -> &'static str {
        "ClFixHybridHeightCoord"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_metadata(&self, cubes: CubeList) -> Result<CubeList, FixError> {
        fix_hybrid_height_levels(cubes)
    }
}

/// Canonicalise a native ocean grid: label the spatial coordinates
/// `latitude`/`longitude` with degree units and guess their bounds.
pub struct OceanFixGrid {
    extra_facets: ExtraFacets,
}

impl OceanFixGrid {
    pub fn boxed(extra_facets: ExtraFacets) -> Box<dyn Fix> {
        Box::new(Self { extra_facets })
    }
}

/// Spellings of ocean-grid spatial coordinates seen in the wild.
const OCEAN_COORD_NAMES: &[(&str, &str)] = &[
    ("rlat", "latitude"),
    ("rlon", "longitude"),
    ("nav_lat", "latitude"),
    ("nav_lon", "longitude"),
    ("lat", "latitude"),
    ("lon", "longitude"),
];

impl Fix for OceanFixGrid {
    fn name(&self) -> &'static str {
        "OceanFixGrid"
    }

    fn extra_facets(&self) -> &ExtraFacets {
        &self.extra_facets
    }

    fn fix_metadata(&self, mut cubes: CubeList) -> Result<CubeList, FixError> {
        for cube in cubes.iter_mut() {
            for (from, to) in OCEAN_COORD_NAMES {
                if cube.has_coord(from) && !cube.has_coord(to) {
                    cube.rename_coord(from, to)?;
                }
            }
            for (name, units) in [("latitude", "degrees_north"), ("longitude", "degrees_east")] {
                if let Ok(coord) = cube.coord_mut(name) {
                    coord.units = Units::new(units);
                    coord.guess_bounds();
                }
            }
        }
        Ok(cubes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::{Coord, Cube};
    use ndarray::{arr2, ArrayD, IxDyn};

    fn cl_cube() -> Cube {
        let mut cube = Cube::new(
            "cl",
            "%",
            vec![
                Coord::new("lev", "unknown", vec![0.99, 0.9, 0.5]),
                Coord::new("latitude", "degrees_north", vec![-45.0, 45.0]),
            ],
            ArrayD::from_elem(IxDyn(&[3, 2]), 20.0),
        )
        .unwrap();
        cube.add_aux_coord(
            Coord::new("ap", "Pa", vec![0.0, 5_000.0, 20_000.0])
                .with_bounds(arr2(&[[0.0, 2_500.0], [2_500.0, 12_500.0], [12_500.0, 30_000.0]])),
        );
        cube.add_aux_coord(
            Coord::new("b", "1", vec![0.99, 0.85, 0.3])
                .with_bounds(arr2(&[[1.0, 0.95], [0.95, 0.6], [0.6, 0.1]])),
        );
        cube
    }

    #[test]
    fn hybrid_pressure_bounds_come_from_coefficients() {
        let cubes = fix_hybrid_pressure_levels(CubeList::from(vec![cl_cube()])).unwrap();
        let lev = cubes[0].coord("lev").unwrap();
        assert_eq!(lev.units, Units::new("1"));
        assert_eq!(
            lev.attributes.get("standard_name").map(String::as_str),
            Some("atmosphere_hybrid_sigma_pressure_coordinate")
        );
        let bounds = lev.bounds.as_ref().unwrap();
        // ap / P0 + b
        assert_eq!(bounds[(0, 0)], 1.0);
        assert_eq!(bounds[(1, 1)], 12_500.0 / P0 + 0.6);
    }

    #[test]
    fn hybrid_pressure_guesses_bounds_without_coefficients() {
        let mut cube = cl_cube();
        cube.aux_coords.clear();
        let cubes = fix_hybrid_pressure_levels(CubeList::from(vec![cube])).unwrap();
        assert!(cubes[0].coord("lev").unwrap().has_bounds());
    }

    #[test]
    fn hybrid_height_bounds_come_from_the_offset_term() {
        let mut cube = Cube::new(
            "cl",
            "%",
            vec![Coord::new("lev", "unknown", vec![20.0, 80.0])],
            ArrayD::from_elem(IxDyn(&[2]), 10.0),
        )
        .unwrap();
        cube.add_aux_coord(
            Coord::new("a", "m", vec![20.0, 80.0])
                .with_bounds(arr2(&[[0.0, 50.0], [50.0, 120.0]])),
        );
        let cubes = fix_hybrid_height_levels(CubeList::from(vec![cube])).unwrap();
        let lev = cubes[0].coord("lev").unwrap();
        assert_eq!(lev.units, Units::new("m"));
        assert_eq!(lev.bounds.as_ref().unwrap()[(1, 1)], 120.0);
    }

    #[test]
    fn cubes_without_lev_pass_through() {
        let cube = Cube::new(
            "tas",
            "K",
            vec![Coord::new("latitude", "degrees_north", vec![0.0, 1.0])],
            ArrayD::from_elem(IxDyn(&[2]), 280.0),
        )
        .unwrap();
        let cubes = fix_hybrid_pressure_levels(CubeList::from(vec![cube.clone()])).unwrap();
        assert_eq!(cubes[0], cube);
    }

    #[test]
    fn ocean_grid_relabels_and_bounds() {
        let cube = Cube::new(
            "tos",
            "K",
            vec![
                Coord::new("rlat", "1", vec![-40.0, 0.0, 40.0]),
                Coord::new("rlon", "1", vec![0.0, 120.0, 240.0]),
            ],
            ArrayD::from_elem(IxDyn(&[3, 3]), 290.0),
        )
        .unwrap();
        let fix = OceanFixGrid::boxed(ExtraFacets::new());
        let cubes = fix.fix_metadata(CubeList::from(vec![cube])).unwrap();
        let lat = cubes[0].coord("latitude").unwrap();
        assert_eq!(lat.units, Units::new("degrees_north"));
        assert!(lat.has_bounds());
        assert!(cubes[0].has_coord("longitude"));
    }
}
