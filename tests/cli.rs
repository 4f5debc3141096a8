use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_mesh(contents: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp mesh");
    tmp.write_all(contents.as_bytes()).expect("write mesh");
    tmp
}

#[test]
fn lists_every_lesson() {
    let mut cmd = Command::cargo_bin("render-lessons").expect("binary exists");
    cmd.arg("--list");
    cmd.assert()
        .success()
        .stdout(contains("1. clear"))
        .stdout(contains("5. camera    First-person camera"))
        .stdout(contains("6. model     Loading an OBJ mesh"));
}

#[test]
fn summary_reports_loaded_mesh() {
    let mesh = write_mesh(
        "# square\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1 4//1\n",
    );
    let assets = tempfile::tempdir().expect("temp assets");
    let mut cmd = Command::cargo_bin("render-lessons").expect("binary exists");
    cmd.arg("model")
        .arg("--assets")
        .arg(assets.path())
        .arg("--mesh")
        .arg(mesh.path())
        .arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Lesson 6: Loading an OBJ mesh (model)"))
        .stdout(contains("Shader: lit.wgsl"))
        .stdout(contains("Geometry: 4 vertices, 2 triangles"));
}

#[test]
fn summary_for_textured_room_uses_fallback_texture() {
    let assets = tempfile::tempdir().expect("temp assets");
    let mut cmd = Command::cargo_bin("render-lessons").expect("binary exists");
    cmd.arg("4").arg("--assets").arg(assets.path()).arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Lesson 4: Texturing a cube room (room)"))
        .stdout(contains("Texture: 256x256"));
}

#[test]
fn malformed_mesh_fails_with_line_number() {
    let mesh = write_mesh("v 0 0 0\nv 1 0 0\nv 0 one 0\n");
    let mut cmd = Command::cargo_bin("render-lessons").expect("binary exists");
    cmd.arg("model")
        .arg("--mesh")
        .arg(mesh.path())
        .arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("line 3: `one` is not a number"));
}

#[test]
fn mesh_without_faces_is_rejected() {
    let mesh = write_mesh("v 0 0 0\nv 1 0 0\nv 0 1 0\n");
    let mut cmd = Command::cargo_bin("render-lessons").expect("binary exists");
    cmd.arg("model")
        .arg("--mesh")
        .arg(mesh.path())
        .arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("OBJ file does not define any faces"));
}

#[test]
fn unknown_lesson_is_rejected() {
    let mut cmd = Command::cargo_bin("render-lessons").expect("binary exists");
    cmd.arg("teapot");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown lesson: teapot"));
}

#[test]
fn config_file_values_feed_the_lesson() {
    let mut config = NamedTempFile::new().expect("temp config");
    let assets = tempfile::tempdir().expect("temp assets");
    write!(
        config,
        "<lesson><assets>{}</assets><width>640</width></lesson>",
        assets.path().display()
    )
    .expect("write config");
    let mut cmd = Command::cargo_bin("render-lessons").expect("binary exists");
    cmd.arg("model")
        .arg("--config")
        .arg(config.path())
        .arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Geometry: 24 vertices, 12 triangles (built-in cube)"));
}
