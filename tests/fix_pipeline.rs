//! End-to-end fix pipeline: file repair, loading, metadata and data
//! correction, in the order a caller is expected to run the hooks.

use rust_cmor::cube::io::{read_cubes, write_cubes};
use rust_cmor::cube::{Coord, Cube, CubeList, Units};
use rust_cmor::fixes::{get_fixes, VariableId};
use rust_cmor::ExtraFacets;

use ndarray::{ArrayD, IxDyn};

#[test]
fn inmcm4_nbp_file_is_repaired_then_loadable() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("nbp.json");
    // The malformed standard_name makes the file unloadable as-is.
    std::fs::write(
        &raw,
        serde_json::json!([{
            "var_name": "nbp",
            "standard_name": "Net Biome Production",
            "units": "kg m-2 s-1",
            "dim_coords": [{
                "name": "latitude",
                "units": "degrees_north",
                "points": {"v": 1, "dim": [2], "data": [-45.0, 45.0]},
            }],
            "data": {"v": 1, "dim": [2], "data": [1.0, 2.0]},
        }])
        .to_string(),
    )
    .unwrap();
    assert!(read_cubes(&raw).is_err());

    let id = VariableId::new("CMIP5", "inmcm4", "Lmon", "nbp");
    let chain = get_fixes(&id, &ExtraFacets::new());
    assert_eq!(chain.names(), vec!["GenericFix", "inmcm4.Nbp"]);

    let output_dir = dir.path().join("fixed");
    let repaired = chain.fix_file(&raw, &output_dir).unwrap();
    assert_ne!(repaired, raw);

    let cubes = read_cubes(&repaired).unwrap();
    let cubes = chain.fix_metadata(cubes).unwrap();
    assert!(cubes[0]
        .standard_name
        .as_deref()
        .unwrap()
        .starts_with("surface_net_downward_mass_flux"));
}

#[test]
fn canesm2_fgco2_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fgco2.json");
    let cube = Cube::new(
        "fgco2",
        "kg m-2 s-1",
        vec![Coord::new("latitude", "degrees_north", vec![-45.0, 45.0])],
        ArrayD::from_elem(IxDyn(&[2]), 44.0),
    )
    .unwrap();
    write_cubes(&CubeList::from(vec![cube]), &path).unwrap();

    let id = VariableId::new("CMIP5", "CanESM2", "Omon", "fgco2");
    let chain = get_fixes(&id, &ExtraFacets::new());

    // A healthy file passes fix_file untouched.
    let loadable = chain.fix_file(&path, dir.path()).unwrap();
    assert_eq!(loadable, path);

    let cubes = chain.fix_metadata(read_cubes(&loadable).unwrap()).unwrap();
    let mut fixed = CubeList::new();
    for cube in cubes {
        fixed.push(chain.fix_data(cube).unwrap());
    }
    assert!(fixed[0].data.iter().all(|&x| x == 12.0));
}

#[test]
fn miroc_esm_all_vars_runs_before_the_variable_fix() {
    let cube = Cube::new(
        "tro3",
        "1e-9",
        vec![
            Coord::new("time", "days since 0000-1-1", vec![15.0, 45.0]),
            Coord::new("AR5PL35", "unknown", vec![100_000.0, 50_000.0]),
        ],
        ArrayD::from_elem(IxDyn(&[2, 2]), 0.05),
    )
    .unwrap();

    let id = VariableId::new("CMIP5", "MIROC-ESM", "Amon", "tro3");
    let chain = get_fixes(&id, &ExtraFacets::new());
    assert_eq!(
        chain.names(),
        vec!["GenericFix", "MIROC-ESM.AllVars", "MIROC-ESM.Tro3"]
    );

    let cubes = chain.fix_metadata(CubeList::from(vec![cube])).unwrap();
    let cube = chain.fix_data(cubes.0.into_iter().next().unwrap()).unwrap();
    assert!(cube.has_coord("air_pressure"));
    assert_eq!(
        cube.coord("time").unwrap().units,
        Units::new("days since 0001-01-01")
    );
    assert!(cube.data.iter().all(|&x| x == 50.0));
}

#[test]
fn cesm2_waccm_reuses_cesm2_classes() {
    let id = VariableId::new("CMIP6", "CESM2-WACCM", "Amon", "tas");
    let chain = get_fixes(&id, &ExtraFacets::new());
    assert_eq!(chain.names(), vec!["GenericFix", "CESM2.Tas"]);

    let cube = Cube::new(
        "tas",
        "K",
        vec![Coord::new("latitude", "degrees_north", vec![0.0])],
        ArrayD::from_elem(IxDyn(&[1]), 285.0),
    )
    .unwrap();
    let cubes = chain.fix_metadata(CubeList::from(vec![cube])).unwrap();
    assert_eq!(cubes[0].coord("height").unwrap().points[0], 2.0);
}
