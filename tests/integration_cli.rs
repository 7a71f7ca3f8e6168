// Anim64 - Delta-compressed animation scripts for C64 playback engines
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! End-to-end CLI integration tests.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const WALK: &str = "\
# object x y angle
0 24 50 0
0 25 50 0
0 26 50 0
0 26 50 0
1 400 80 0
1 300 80 1
";

fn cargo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_anim64"))
}

fn run(args: &[&str], dir: &Path) -> Output {
    cargo_bin()
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to execute command")
}

fn workspace(recording: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("walk.txt"), recording).unwrap();
    dir
}

/// Test --help flag.
#[test]
fn test_help_flag() {
    let output = cargo_bin()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("anim64"));
    assert!(stdout.contains("--output"));
    assert!(stdout.contains("--bin"));
    assert!(stdout.contains("--watch"));
}

/// Test --version flag.
#[test]
fn test_version_flag() {
    let output = cargo_bin()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("anim64"));
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_compile_to_prg() {
    let dir = workspace(WALK);
    let output = run(&["walk.txt", "-o", "walk.prg"], dir.path());

    assert!(
        output.status.success(),
        "Compilation failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Compiled walk.txt -> walk.prg"), "{}", stdout);

    let prg = std::fs::read(dir.path().join("walk.prg")).unwrap();
    assert_eq!(&prg[..2], &[0x00, 0xC0]);
}

#[test]
fn test_compile_raw_with_base() {
    let dir = workspace(WALK);
    let output = run(&["walk.txt", "-o", "walk.bin", "--base", "$4000"], dir.path());
    assert!(output.status.success());

    let raw = std::fs::read(dir.path().join("walk.bin")).unwrap();
    // Scripts start right after the 10 byte header.
    assert_eq!(&raw[..2], &[0x0A, 0x11]);
    assert_eq!(&raw[2..4], &[0x40, 0x40]);
}

#[test]
fn test_raw_flag_overrides_extension() {
    let dir = workspace(WALK);
    let output = run(&["walk.txt", "-o", "walk.prg", "--raw"], dir.path());
    assert!(output.status.success());

    let prg = std::fs::read(dir.path().join("walk.prg")).unwrap();
    let raw_header_low = prg[0];
    assert_eq!(raw_header_low, 0x0A);
}

#[test]
fn test_symbols_file() {
    let dir = workspace(WALK);
    let output = run(
        &["walk.txt", "-o", "walk.prg", "--symbols", "walk.inc"],
        dir.path(),
    );
    assert!(output.status.success());

    let symbols = std::fs::read_to_string(dir.path().join("walk.inc")).unwrap();
    insta::assert_snapshot!(symbols, @r"
    ANIM_HEADER          = $C000 ; 10 bytes
    ANIM_DELTA_0         = $C018 ; 2 bytes
    ANIM_DELTA_1         = $C01A ; 2 bytes
    ANIM_DELTA_2         = $C01C ; 2 bytes
    ANIM_SCRIPT_0        = $C00A ; 7 bytes
    ANIM_SCRIPT_1        = $C011 ; 7 bytes
    ");
}

#[test]
fn test_chunked_output_files() {
    let dir = workspace(WALK);
    let output = run(
        &[
            "walk.txt", "-o", "walk.prg", "--bin", "$0C00-$0C0F", "--bin", "$C000-$C0FF",
        ],
        dir.path(),
    );
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert!(dir.path().join("walk-0c00.prg").exists());
    assert!(dir.path().join("walk-c000.prg").exists());
    assert!(!dir.path().join("walk.prg").exists());
}

#[test]
fn test_chunked_merge() {
    let dir = workspace(WALK);
    let output = run(
        &[
            "walk.txt", "-o", "walk.prg", "--bin", "$C000-$C00F", "--bin", "$C020-$C0FF",
            "--merge", "--fill", "$EA",
        ],
        dir.path(),
    );
    assert!(output.status.success());

    let prg = std::fs::read(dir.path().join("walk.prg")).unwrap();
    assert_eq!(&prg[..2], &[0x00, 0xC0]);
    assert!(prg[2..].contains(&0xEA));
    assert!(!dir.path().join("walk-c020.prg").exists());
}

#[test]
fn test_verbose_prints_listing() {
    let dir = workspace(WALK);
    let output = run(&["walk.txt", "-o", "walk.prg", "-v"], dir.path());
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("; object 0"), "{}", stdout);
    assert!(stdout.contains("state 24,50,0"), "{}", stdout);
    assert!(stdout.contains("Primary delta table at $C018"), "{}", stdout);
}

#[test]
fn test_unknown_extension() {
    let dir = workspace(WALK);
    let output = run(&["walk.txt", "-o", "walk.d64"], dir.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_bad_bin_flag() {
    let dir = workspace(WALK);
    let output = run(&["walk.txt", "-o", "walk.prg", "--bin", "$C000"], dir.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_modulo_for_missing_attribute() {
    let dir = workspace(WALK);
    let output = run(&["walk.txt", "-o", "walk.prg", "--modulo", "5=32"], dir.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_recording() {
    let dir = TempDir::new().unwrap();
    let output = run(&["missing.txt", "-o", "walk.prg"], dir.path());
    assert_eq!(output.status.code(), Some(3));
    assert!(!dir.path().join("walk.prg").exists());
}

#[test]
fn test_invalid_recording_reports_location() {
    let dir = workspace("0 1 2 3\n0 1 zz 3\n");
    let output = run(&["walk.txt", "-o", "walk.prg"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error[E040]"), "{}", stderr);
    assert!(stderr.contains("walk.txt:2:5"), "{}", stderr);
    assert!(!dir.path().join("walk.prg").exists());
}

#[test]
fn test_never_visible_object() {
    let dir = workspace("0 10 20 0\n1 500 20 0\n");
    let output = run(&["walk.txt", "-o", "walk.prg"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error[E020]"), "{}", stderr);
    assert!(stderr.contains("object: 1"), "{}", stderr);
}

#[test]
fn test_bins_too_small_write_nothing() {
    let dir = workspace(WALK);
    let output = run(
        &["walk.txt", "-o", "walk.prg", "--bin", "$C000-$C00F", "--bin", "$D000-$D003"],
        dir.path(),
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error[E030]"), "{}", stderr);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
