// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use serde_json::Value;
use tempfile::TempDir;

use crate::{foci_cmd, get_cmd_output, write_job, POINTS_JOB};
use foci::{c64, constants::UAS_TO_RAD};

/// The visibility of `POINTS_JOB`'s image.
fn expected(u: f64, v: f64) -> c64 {
    let (l, m) = (10.0 * UAS_TO_RAD, -10.0 * UAS_TO_RAD);
    let phase = -std::f64::consts::TAU * (u * l + v * m);
    c64::new(1.0, 0.0) + 0.5 * c64::new(phase.cos(), phase.sin())
}

fn read_records(path: &std::path::Path) -> Vec<Value> {
    let contents = std::fs::read_to_string(path).unwrap();
    match serde_json::from_str::<Value>(&contents).unwrap() {
        Value::Array(records) => records,
        other => panic!("Expected an array of records, got {other}"),
    }
}

fn check_records(records: &[Value], epsilon: f64) {
    assert_eq!(records.len(), 4);
    for record in &records[..3] {
        assert_eq!(record["status"], "ok", "{record}");
        let u = record["u"].as_f64().unwrap();
        let v = record["v"].as_f64().unwrap();
        let vis = c64::new(
            record["re"].as_f64().unwrap(),
            record["im"].as_f64().unwrap(),
        );
        assert_abs_diff_eq!(vis, expected(u, v), epsilon = epsilon);
    }
    assert_eq!(records[3]["status"], "out-of-band");
    assert_eq!(records[3]["index"], 3);
}

#[test]
fn test_direct_synthesis_to_json() {
    let tmp_dir = TempDir::new().unwrap();
    let job = write_job(tmp_dir.path(), "job.toml", POINTS_JOB);
    let output = tmp_dir.path().join("vis.json");

    #[rustfmt::skip]
    let cmd = foci_cmd()
        .args([
            "vis-synthesize",
            "--job", &format!("{}", job.display()),
            "--output", &format!("{}", output.display()),
            "--strategy", "direct",
            "--chunk-size", "2",
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "vis-synthesize failed: {}", cmd.err().unwrap());

    check_records(&read_records(&output), 1e-10);
}

#[test]
fn test_grid_synthesis_to_json() {
    let tmp_dir = TempDir::new().unwrap();
    let job = write_job(tmp_dir.path(), "job.toml", POINTS_JOB);
    let output = tmp_dir.path().join("vis.json");

    #[rustfmt::skip]
    let cmd = foci_cmd()
        .args([
            "vis-synthesize",
            "--job", &format!("{}", job.display()),
            "--output", &format!("{}", output.display()),
            "--interpolation", "cubic",
            "--padding", "8",
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "vis-synthesize failed: {}", cmd.err().unwrap());

    check_records(&read_records(&output), 1e-2);
}

#[test]
fn test_dry_run_writes_nothing() {
    let tmp_dir = TempDir::new().unwrap();
    let job = write_job(tmp_dir.path(), "job.toml", POINTS_JOB);
    let output = tmp_dir.path().join("vis.json");

    #[rustfmt::skip]
    let cmd = foci_cmd()
        .args([
            "vis-synthesize",
            "--job", &format!("{}", job.display()),
            "--output", &format!("{}", output.display()),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "dry run failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run"), "{stdout}");
    assert!(!output.exists());
}

#[test]
fn test_saved_toml_reproduces_run() {
    let tmp_dir = TempDir::new().unwrap();
    let job = write_job(tmp_dir.path(), "job.toml", POINTS_JOB);
    let output = tmp_dir.path().join("vis.json");
    let args_toml = tmp_dir.path().join("args.toml");

    #[rustfmt::skip]
    let cmd = foci_cmd()
        .args([
            "vis-synthesize",
            "--job", &format!("{}", job.display()),
            "--output", &format!("{}", output.display()),
            "--strategy", "direct",
            "--seed", "99",
            "--sefds", "3000", "4000",
            "--bandwidth", "4GHz",
            "--integration-time", "12s",
            "--save-toml", &format!("{}", args_toml.display()),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "vis-synthesize failed: {}", cmd.err().unwrap());
    assert!(args_toml.exists());
    let first = read_records(&output);
    assert!(first[0]["sigma"].as_f64().unwrap() > 0.0);

    // Running again from the saved arguments gives identical visibilities.
    std::fs::remove_file(&output).unwrap();
    let cmd = foci_cmd()
        .args([
            "vis-synthesize",
            &format!("{}", args_toml.display()),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "vis-synthesize failed: {}", cmd.err().unwrap());
    assert_eq!(read_records(&output), first);
}

#[test]
fn test_movie_to_csv() {
    let tmp_dir = TempDir::new().unwrap();
    let job = write_job(
        tmp_dir.path(),
        "movie.json",
        r#"{
            "frames": [
                {"pixel-scale": "1uas", "gps-time": 100.0, "data": [[0, 0], [0, 1]]},
                {"pixel-scale": "1uas", "gps-time": 200.0, "data": [[0, 0], [0, 2]]}
            ],
            "requests": [
                {"u": 1e6, "v": 0, "gps-time": 110.0},
                {"u": 1e6, "v": 0, "gps-time": 190.0}
            ]
        }"#,
    );
    let output = tmp_dir.path().join("vis.csv");

    #[rustfmt::skip]
    let cmd = foci_cmd()
        .args([
            "vis-synthesize",
            "--job", &format!("{}", job.display()),
            "--output", &format!("{}", output.display()),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "vis-synthesize failed: {}", cmd.err().unwrap());

    let contents = std::fs::read_to_string(&output).unwrap();
    let res: Vec<f64> = contents
        .lines()
        .skip(1)
        .map(|line| line.split(',').nth(3).unwrap().parse().unwrap())
        .collect();
    assert_eq!(res.len(), 2);
    assert_abs_diff_eq!(res[0], 1.0, epsilon = 1e-10);
    assert_abs_diff_eq!(res[1], 2.0, epsilon = 1e-10);
}

#[test]
fn test_bad_output_extension_fails() {
    let tmp_dir = TempDir::new().unwrap();
    let job = write_job(tmp_dir.path(), "job.toml", POINTS_JOB);
    let output = tmp_dir.path().join("vis.uvfits");

    #[rustfmt::skip]
    let cmd = foci_cmd()
        .args([
            "vis-synthesize",
            "--job", &format!("{}", job.display()),
            "--output", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error:"), "{stderr}");
    assert!(stderr.contains("vis.uvfits"), "{stderr}");
}

#[test]
fn test_missing_job_fails() {
    let tmp_dir = TempDir::new().unwrap();
    let cmd = foci_cmd()
        .args([
            "vis-synthesize",
            "--job",
            &format!("{}", tmp_dir.path().join("nope.toml").display()),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("doesn't exist"), "{stderr}");
}
