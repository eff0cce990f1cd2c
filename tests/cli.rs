use assert_cmd::prelude::*;
use image::{GrayImage, Rgb, RgbImage, Rgba, RgbaImage};
use predicates::str::contains;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::{tempdir, TempDir};

fn build_assets() -> TempDir {
    let dir = tempdir().expect("temp asset dir");
    RgbImage::from_pixel(16, 8, Rgb([120, 80, 40]))
        .save(dir.path().join("desk.png"))
        .expect("write desk texture");
    RgbaImage::from_pixel(4, 4, Rgba([250, 250, 250, 255]))
        .save(dir.path().join("mug.png"))
        .expect("write mug texture");
    RgbImage::from_pixel(2, 2, Rgb([20, 20, 20]))
        .save(dir.path().join("keyboard.png"))
        .expect("write keyboard texture");
    dir
}

fn summary_command(assets: &Path) -> Command {
    let mut cmd = Command::cargo_bin("desk-scene").expect("binary exists");
    cmd.arg("--summary-only").arg("--assets").arg(assets);
    cmd
}

#[test]
fn summary_lists_meshes_textures_and_lamp() {
    let assets = build_assets();
    summary_command(assets.path())
        .assert()
        .success()
        .stdout(contains(" - desk: 6 vertices"))
        .stdout(contains(" - mug: 48 vertices"))
        .stdout(contains(" - keyboard: 30 vertices"))
        .stdout(contains(" - desk.png: 16x8, 3 channel(s), 5 mip level(s)"))
        .stdout(contains(" - mug.png: 4x4, 4 channel(s), 3 mip level(s)"))
        .stdout(contains("Object color: (1.00, 0.90, 1.15)"))
        .stdout(contains("Lamp: mug mesh at (1.50, 0.50, 3.00), scale (0.30, 0.30, 0.30)"));
}

#[test]
fn unknown_argument_fails() {
    let mut cmd = Command::cargo_bin("desk-scene").expect("binary exists");
    cmd.arg("--wireframe")
        .assert()
        .failure()
        .stderr(contains("Unknown argument: --wireframe"));
}

#[test]
fn missing_texture_is_fatal() {
    let assets = build_assets();
    fs::remove_file(assets.path().join("keyboard.png")).expect("remove texture");
    summary_command(assets.path())
        .assert()
        .failure()
        .stderr(contains("failed to load texture"))
        .stderr(contains("keyboard.png"));
}

#[test]
fn single_channel_texture_is_rejected() {
    let assets = build_assets();
    GrayImage::new(2, 2)
        .save(assets.path().join("mug.png"))
        .expect("overwrite mug texture");
    summary_command(assets.path())
        .assert()
        .failure()
        .stderr(contains("unsupported channel layout: 1 channel(s)"));
}

#[test]
fn scene_file_moves_the_light() {
    let assets = build_assets();
    let scene = assets.path().join("scene.xml");
    fs::write(
        &scene,
        "<scene>\n  <lightPosition>-2 1 0.5</lightPosition>\n  <lightScale>0.5 0.5 0.5</lightScale>\n</scene>\n",
    )
    .expect("write scene file");
    summary_command(assets.path())
        .arg("--scene")
        .arg(&scene)
        .assert()
        .success()
        .stdout(contains("Lamp: mug mesh at (-2.00, 1.00, 0.50), scale (0.50, 0.50, 0.50)"));
}

#[test]
fn malformed_scene_file_fails() {
    let assets = build_assets();
    let scene = assets.path().join("scene.xml");
    fs::write(&scene, "<scene><objectColor>1 0</objectColor></scene>").expect("write scene file");
    summary_command(assets.path())
        .arg("--scene")
        .arg(&scene)
        .assert()
        .failure()
        .stderr(contains("failed to parse scene file"));
}
