//! Common test utilities for segment-dl integration tests

use segment_dl::Config;
#[cfg(unix)]
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointing at a mock server, with segments landing in `dir`
pub fn config_for(server: &MockServer, dir: &TempDir) -> Config {
    Config {
        output_dir: dir.path().to_path_buf(),
        ..Config::new(format!("{}/", server.uri()))
    }
}

/// Mount a segment that responds 200 with the given body
pub async fn mount_segment(server: &MockServer, index: u64, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/video{index}.ts")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Mount a segment that responds with the given non-success status
pub async fn mount_missing(server: &MockServer, index: u64, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/video{index}.ts")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mount a segment that must never be requested
#[allow(dead_code)]
pub async fn mount_forbidden(server: &MockServer, index: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/video{index}.ts")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

/// Write an executable shell script standing in for the ffmpeg binary
///
/// The script receives ffmpeg's argument list; the body decides the exit
/// status and any diagnostic output.
#[cfg(unix)]
#[allow(dead_code)]
pub fn fake_ffmpeg(dir: &TempDir, script_body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.path().join("fake-ffmpeg");
    std::fs::write(&script, format!("#!/bin/sh\n{script_body}\n"))
        .expect("failed to write fake ffmpeg script");
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
        .expect("failed to mark fake ffmpeg executable");
    script
}
