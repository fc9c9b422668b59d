//! End-to-end tests for the scalar -> RTG -> RTS materialization flow
//!
//! Each test builds a site directory with an RTI header in a temp dir, runs
//! the materializer against it, and decodes the produced binary files.

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use tempfile::tempdir;
use topoflow_adapter_core::{
    assign_parameters, ByteOrder, Environment, GridMaterializer, MaterializeError, Raster, Value,
};

const ROWS: usize = 3;
const COLUMNS: usize = 4;
const N_STEPS: usize = 3;

fn write_rti(dir: &Path, byte_order: &str) {
    fs::write(
        dir.join("site.rti"),
        format!(
            "RiverTools file type: RTI\n\
             Number of columns: {COLUMNS} ; grid width\n\
             Number of rows: {ROWS}\n\
             Byte order: {byte_order}\n"
        ),
    )
    .unwrap();
}

fn base_env() -> Environment {
    let mut env = Environment::new();
    env.insert("site_prefix", "site");
    env.insert("case_prefix", "case");
    env.insert("n_steps", N_STEPS);
    env
}

fn read_cells(path: &Path, byte_order: ByteOrder) -> Vec<f32> {
    fs::read(path)
        .unwrap()
        .chunks_exact(4)
        .map(|chunk| byte_order.decode([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[test]
fn test_scalar_to_grid_writes_uniform_rtg() {
    let dir = tempdir().unwrap();
    write_rti(dir.path(), "LSB");

    let mut env = base_env();
    env.insert("rain", 5.0);

    let materializer = GridMaterializer::in_dir(dir.path());
    let env = materializer.scalar_to_grid("rain", env).unwrap();

    let path = dir.path().join("case_rain.rtg");
    let cells = read_cells(&path, ByteOrder::Lsb);
    assert_eq!(cells.len(), ROWS * COLUMNS);
    for cell in cells {
        assert_relative_eq!(cell, 5.0);
    }

    // Environment invariant after materialization
    assert_eq!(env.get("rain"), Some(&Value::from("case_rain.rtg")));
    assert_eq!(env.get("rain_file"), Some(&Value::from("case_rain.rtg")));
    assert_eq!(env.get("rain_ptype"), Some(&Value::from("Grid")));
    assert_eq!(env.get("rain_dtype"), Some(&Value::from("string")));
}

#[test]
fn test_scalar_to_grid_honors_msb_header() {
    let dir = tempdir().unwrap();
    write_rti(dir.path(), "MSB");

    let mut env = base_env();
    env.insert("rain", 2.5);

    let materializer = GridMaterializer::in_dir(dir.path());
    materializer.scalar_to_grid("rain", env).unwrap();

    let bytes = fs::read(dir.path().join("case_rain.rtg")).unwrap();
    assert_eq!(bytes.len(), ROWS * COLUMNS * 4);
    assert_eq!(&bytes[..4], 2.5_f32.to_be_bytes().as_slice());
}

#[test]
fn test_sequence_from_scalar() {
    let dir = tempdir().unwrap();
    write_rti(dir.path(), "LSB");

    let mut env = base_env();
    env.insert("temp", 20.0);
    env.insert("temp_ptype", "Scalar");

    let materializer = GridMaterializer::in_dir(dir.path());
    let env = materializer.to_grid_sequence("temp", env).unwrap();

    let cells = read_cells(&dir.path().join("case_temp.rts"), ByteOrder::Lsb);
    assert_eq!(cells.len(), N_STEPS * ROWS * COLUMNS);
    for cell in cells {
        assert_relative_eq!(cell, 20.0);
    }

    assert_eq!(env.get("temp"), Some(&Value::from("case_temp.rts")));
    assert_eq!(env.get("temp_ptype"), Some(&Value::from("Grid_Sequence")));
    assert_eq!(env.get("temp_dtype"), Some(&Value::from("string")));
}

#[test]
fn test_sequence_from_time_series_broadcasts_each_step() {
    let dir = tempdir().unwrap();
    write_rti(dir.path(), "LSB");
    // One extra value: only the first n_steps are used
    fs::write(dir.path().join("series.txt"), "1.0 2.0\n3.0 4.0\n").unwrap();

    let mut env = base_env();
    env.insert("temp", "series.txt");
    env.insert("temp_ptype", "Time_Series");

    let materializer = GridMaterializer::in_dir(dir.path());
    materializer.to_grid_sequence("temp", env).unwrap();

    let cells = read_cells(&dir.path().join("case_temp.rts"), ByteOrder::Lsb);
    assert_eq!(cells.len(), N_STEPS * ROWS * COLUMNS);
    for (step, slice) in cells.chunks_exact(ROWS * COLUMNS).enumerate() {
        let expected = (step + 1) as f32;
        for &cell in slice {
            assert_relative_eq!(cell, expected);
        }
    }
}

#[test]
fn test_sequence_from_short_series_fails() {
    let dir = tempdir().unwrap();
    write_rti(dir.path(), "LSB");
    fs::write(dir.path().join("series.txt"), "1.0 2.0\n").unwrap();

    let mut env = base_env();
    env.insert("temp", "series.txt");
    env.insert("temp_ptype", "Time_Series");

    let materializer = GridMaterializer::in_dir(dir.path());
    let err = materializer.to_grid_sequence("temp", env).unwrap_err();
    assert!(matches!(
        err,
        MaterializeError::SeriesTooShort {
            needed: N_STEPS,
            found: 2,
            ..
        }
    ));
    // No truncated artifact left behind
    assert!(!dir.path().join("case_temp.rts").exists());
}

#[test]
fn test_sequence_from_grid_repeats_every_step() {
    let dir = tempdir().unwrap();
    write_rti(dir.path(), "MSB");

    let source: Vec<f32> = (0..ROWS * COLUMNS).map(|i| i as f32 * 0.25).collect();
    Raster::from_cells(ROWS, COLUMNS, source.clone())
        .write_rtg(dir.path().join("elev.rtg"), ByteOrder::Msb)
        .unwrap();

    let mut env = base_env();
    env.insert("elev", "elev.rtg");
    env.insert("elev_ptype", "Grid");

    let materializer = GridMaterializer::in_dir(dir.path());
    materializer.to_grid_sequence("elev", env).unwrap();

    let cells = read_cells(&dir.path().join("case_elev.rts"), ByteOrder::Msb);
    assert_eq!(cells.len(), N_STEPS * ROWS * COLUMNS);
    for slice in cells.chunks_exact(ROWS * COLUMNS) {
        assert_eq!(slice, source.as_slice());
    }
}

#[test]
fn test_sequence_rejects_unknown_ptype() {
    let dir = tempdir().unwrap();
    write_rti(dir.path(), "LSB");

    let mut env = base_env();
    env.insert("temp", 20.0);
    env.insert("temp_ptype", "Bogus");

    let materializer = GridMaterializer::in_dir(dir.path());
    let err = materializer.to_grid_sequence("temp", env).unwrap_err();
    assert!(matches!(
        err,
        MaterializeError::InvalidParameterType(inner) if inner.0 == "Bogus"
    ));
}

#[test]
fn test_sequence_rejects_grid_sequence_input() {
    let dir = tempdir().unwrap();
    write_rti(dir.path(), "LSB");

    let mut env = base_env();
    env.insert("temp", "case_temp.rts");
    env.insert("temp_ptype", "Grid_Sequence");

    let materializer = GridMaterializer::in_dir(dir.path());
    let err = materializer.to_grid_sequence("temp", env).unwrap_err();
    assert!(matches!(err, MaterializeError::InvalidParameterType(_)));
}

#[test]
fn test_full_flow_from_json_request() {
    let dir = tempdir().unwrap();
    write_rti(dir.path(), "LSB");

    let mut env = Environment::from_json(
        r#"{"rain_ptype": "Scalar", "rain_scalar": 5.0,
            "snow_ptype": "Grid", "snow_file": "snow.rtg"}"#,
    )
    .unwrap();
    env.insert("site_prefix", "site");
    env.insert("case_prefix", "case");
    env.insert("n_steps", N_STEPS);

    let assignment = assign_parameters(env).unwrap();
    assert_eq!(assignment.files, vec!["snow".to_string()]);
    assert_eq!(assignment.env.get("rain"), Some(&Value::Number(5.0)));
    assert_eq!(
        assignment.env.get("rain_dtype"),
        Some(&Value::from("float"))
    );
    assert_eq!(assignment.env.get("snow"), Some(&Value::from("snow.rtg")));

    let materializer = GridMaterializer::in_dir(dir.path());
    let env = materializer.scalar_to_grid("rain", assignment.env).unwrap();
    let env = materializer.to_grid_sequence("rain", env).unwrap();

    let cells = read_cells(&dir.path().join("case_rain.rts"), ByteOrder::Lsb);
    assert_eq!(cells.len(), N_STEPS * ROWS * COLUMNS);
    for cell in cells {
        assert_relative_eq!(cell, 5.0);
    }
    assert_eq!(env.get("rain"), Some(&Value::from("case_rain.rts")));
}
