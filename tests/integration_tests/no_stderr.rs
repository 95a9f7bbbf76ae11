// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{foci_cmd, get_cmd_output, write_job, POINTS_JOB};

#[test]
fn test_vis_synthesize_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let job = write_job(tmp_dir.path(), "job.toml", POINTS_JOB);
    let output = tmp_dir.path().join("vis.json");

    #[rustfmt::skip]
    let cmd = foci_cmd()
        .args([
            "vis-synthesize",
            "--job", &format!("{}", job.display()),
            "--output", &format!("{}", output.display()),
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "vis-synthesize failed on simple test data: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
