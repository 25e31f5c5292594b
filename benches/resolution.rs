//! Benchmarks for chain resolution and the grid-area correction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::IxDyn;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use rust_cmor::cube::{Coord, Cube, CubeList};
use rust_cmor::derive::shared::grid_area_correction;
use rust_cmor::fixes::{get_fixes, VariableId};
use rust_cmor::ExtraFacets;

fn bench_resolution(c: &mut Criterion) {
    let registered = VariableId::new("CMIP5", "MIROC-ESM", "Amon", "tro3");
    let fallback = VariableId::new("CMIP5", "NoSuchModel", "Amon", "tas");
    let facets = ExtraFacets::new().with("area_file", "areacella.json");

    c.bench_function("resolve registered chain", |b| {
        b.iter(|| get_fixes(black_box(&registered), black_box(&facets)))
    });
    c.bench_function("resolve fallback chain", |b| {
        b.iter(|| get_fixes(black_box(&fallback), black_box(&facets)))
    });
}

fn bench_grid_area_correction(c: &mut Criterion) {
    let (time, lat, lon) = (12, 96, 144);
    let lat_points: Vec<f64> = (0..lat).map(|i| -90.0 + 180.0 * i as f64 / lat as f64).collect();
    let lon_points: Vec<f64> = (0..lon).map(|i| 360.0 * i as f64 / lon as f64).collect();
    let spatial = vec![
        Coord::new("latitude", "degrees_north", lat_points),
        Coord::new("longitude", "degrees_east", lon_points),
    ];

    let mut gpp_coords = vec![Coord::new(
        "time",
        "days since 1850-01-01",
        (0..time).map(|i| 15.0 + 30.0 * i as f64).collect(),
    )];
    gpp_coords.extend(spatial.clone());

    let gpp = Cube::new(
        "gpp",
        "kg m-2 s-1",
        gpp_coords,
        ndarray::ArrayD::random(IxDyn(&[time, lat, lon]), Uniform::new(0.0, 1e-6)),
    )
    .unwrap()
    .with_standard_name("gross_primary_productivity_of_carbon");

    let sftlf = Cube::new(
        "sftlf",
        "%",
        spatial,
        ndarray::ArrayD::random(IxDyn(&[lat, lon]), Uniform::new(0.0, 100.0)),
    )
    .unwrap();

    let cubes = CubeList::from(vec![gpp, sftlf]);
    c.bench_function("grid area correction 12x96x144", |b| {
        b.iter(|| {
            grid_area_correction(
                black_box(&cubes),
                "gross_primary_productivity_of_carbon",
                "sftlf",
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_resolution, bench_grid_area_correction);
criterion_main!(benches);
