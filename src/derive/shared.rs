//! Helpers shared by derivation formulas.

use crate::cube::{Cube, CubeList, Units};
use crate::derive::DeriveError;

/// Pull a required cube out of the gathered list by variable name.
pub fn extract_var<'a>(cubes: &'a CubeList, var_name: &str) -> Result<&'a Cube, DeriveError> {
    cubes
        .extract_var_name(var_name)
        .ok_or_else(|| DeriveError::MissingCube(var_name.to_string()))
}

/// Pull a required cube out of the gathered list by standard name.
pub fn extract_standard<'a>(
    cubes: &'a CubeList,
    standard_name: &str,
) -> Result<&'a Cube, DeriveError> {
    cubes
        .extract_standard_name(standard_name)
        .ok_or_else(|| DeriveError::MissingCube(standard_name.to_string()))
}

/// Rescale a per-sub-area quantity to a per-grid-cell-area quantity.
///
/// The primary cube (looked up by `standard_name`) is defined per unit of
/// land or ocean area by convention; multiplying by the area fraction
/// (`fraction_var`, a 0–1 ratio or percentage of the grid cell) yields the
/// same quantity per total cell area. A whole family of flux variables
/// needs exactly this step, so the arithmetic lives here once.
///
/// The fraction's dimensions must be exactly the trailing spatial
/// dimensions of the primary, with identical coordinate points; a grid
/// mismatch is malformed input, never silently regridded. Dimensions the
/// fraction lacks (time, levels) broadcast.
pub fn grid_area_correction(
    cubes: &CubeList,
    standard_name: &str,
    fraction_var: &str,
) -> Result<Cube, DeriveError> {
    let primary = extract_standard(cubes, standard_name)?;
    let fraction = extract_var(cubes, fraction_var)?;

    let fraction_units = fraction.units.clone();
    let mut fraction = fraction.clone();
    fraction.convert_units(&Units::new("1")).map_err(|_| {
        DeriveError::MalformedInput(format!(
            "fraction field `{fraction_var}` has units `{fraction_units}`, expected a fraction or percentage"
        ))
    })?;

    if fraction.ndim() > primary.ndim() {
        return Err(DeriveError::MalformedInput(format!(
            "fraction field `{fraction_var}` has {} dimensions but `{}` only has {}",
            fraction.ndim(),
            primary.var_name,
            primary.ndim()
        )));
    }
    let offset = primary.ndim() - fraction.ndim();
    for (axis, fraction_coord) in fraction.dim_coords.iter().enumerate() {
        let primary_coord = &primary.dim_coords[offset + axis];
        if primary_coord.name != fraction_coord.name
            || primary_coord.points != fraction_coord.points
        {
            return Err(DeriveError::MalformedInput(format!(
                "fraction field `{fraction_var}` is on a different grid: its `{}` does not match `{}` of `{}`",
                fraction_coord.name, primary_coord.name, primary.var_name
            )));
        }
    }

    let mut out = primary.clone();
    out.data = &primary.data * &fraction.data;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::Coord;
    use ndarray::{ArrayD, IxDyn};

    fn spatial_coords() -> Vec<Coord> {
        vec![
            Coord::new("latitude", "degrees_north", vec![-45.0, 0.0, 45.0]),
            Coord::new("longitude", "degrees_east", vec![0.0, 120.0, 240.0]),
        ]
    }

    fn gpp_with_time() -> Cube {
        let mut coords = vec![Coord::new(
            "time",
            "days since 1850-01-01",
            vec![15.0, 45.0],
        )];
        coords.extend(spatial_coords());
        Cube::new(
            "gpp",
            "kg m-2 s-1",
            coords,
            ArrayD::from_elem(IxDyn(&[2, 3, 3]), 4.0),
        )
        .unwrap()
        .with_standard_name("gross_primary_productivity_of_carbon")
    }

    fn sftlf_percent() -> Cube {
        Cube::new(
            "sftlf",
            "%",
            spatial_coords(),
            ArrayD::from_elem(IxDyn(&[3, 3]), 50.0),
        )
        .unwrap()
    }

    #[test]
    fn fraction_broadcasts_over_time() {
        let cubes = CubeList::from(vec![gpp_with_time(), sftlf_percent()]);
        let out =
            grid_area_correction(&cubes, "gross_primary_productivity_of_carbon", "sftlf").unwrap();
        assert_eq!(out.shape(), &[2, 3, 3]);
        assert!(out.data.iter().all(|&x| x == 2.0));
        assert_eq!(out.units, Units::new("kg m-2 s-1"));
    }

    #[test]
    fn grid_mismatch_is_malformed_input() {
        let mut sftlf = sftlf_percent();
        sftlf.dim_coords[0].points = ndarray::Array1::from(vec![-44.0, 0.0, 44.0]);
        let cubes = CubeList::from(vec![gpp_with_time(), sftlf]);
        let err = grid_area_correction(&cubes, "gross_primary_productivity_of_carbon", "sftlf")
            .unwrap_err();
        assert!(matches!(err, DeriveError::MalformedInput(_)));
    }

    #[test]
    fn non_fraction_units_are_rejected() {
        let mut sftlf = sftlf_percent();
        sftlf.units = Units::new("m2");
        let cubes = CubeList::from(vec![gpp_with_time(), sftlf]);
        let err = grid_area_correction(&cubes, "gross_primary_productivity_of_carbon", "sftlf")
            .unwrap_err();
        assert!(matches!(err, DeriveError::MalformedInput(_)));
    }

    #[test]
    fn missing_inputs_are_reported_by_name() {
        let cubes = CubeList::from(vec![gpp_with_time()]);
        let err = grid_area_correction(&cubes, "gross_primary_productivity_of_carbon", "sftlf")
            .unwrap_err();
        assert!(matches!(err, DeriveError::MissingCube(name) if name == "sftlf"));
    }

    #[test]
    fn extracted_cube_borrows_the_list_not_the_name() {
        let cubes = CubeList::from(vec![gpp_with_time(), sftlf_percent()]);
        let cube = {
            let lookup = String::from("sftlf");
            extract_var(&cubes, &lookup).unwrap()
        };
        assert_eq!(cube.var_name, "sftlf");
        let cube = {
            let lookup = String::from("gross_primary_productivity_of_carbon");
            extract_standard(&cubes, &lookup).unwrap()
        };
        assert_eq!(cube.var_name, "gpp");
    }

    #[test]
    fn inputs_are_not_mutated() {
        let cubes = CubeList::from(vec![gpp_with_time(), sftlf_percent()]);
        grid_area_correction(&cubes, "gross_primary_productivity_of_carbon", "sftlf").unwrap();
        assert_eq!(cubes[1].units, Units::new("%"));
        assert!(cubes[1].data.iter().all(|&x| x == 50.0));
    }
}
