//! Shared test utilities for integration tests
//!
//! Provides fixture encoders and an isolated `led` command used across
//! multiple test files.
#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;

/// Supported on-disk flavors used by the round-trip tests.
#[derive(Debug, Clone, Copy)]
pub enum Flavor
{
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
}

pub const ALL_FLAVORS: [Flavor; 6] = [
    Flavor::Utf8,
    Flavor::Utf8Bom,
    Flavor::Utf16Le,
    Flavor::Utf16Be,
    Flavor::Utf32Le,
    Flavor::Utf32Be,
];

/// Encode `text` the way an editor saving in `flavor` would.
pub fn encode(
    text: &str,
    flavor: Flavor,
) -> Vec<u8>
{
    match flavor
    {
        Flavor::Utf8 => text
            .as_bytes()
            .to_vec(),
        Flavor::Utf8Bom =>
        {
            let mut v = vec![0xEF, 0xBB, 0xBF];
            v.extend_from_slice(text.as_bytes());
            v
        }
        Flavor::Utf16Le =>
        {
            let mut v = vec![0xFF, 0xFE];
            v.extend(
                text.encode_utf16()
                    .flat_map(u16::to_le_bytes),
            );
            v
        }
        Flavor::Utf16Be =>
        {
            let mut v = vec![0xFE, 0xFF];
            v.extend(
                text.encode_utf16()
                    .flat_map(u16::to_be_bytes),
            );
            v
        }
        Flavor::Utf32Le =>
        {
            let mut v = vec![0xFF, 0xFE, 0x00, 0x00];
            v.extend(
                text.chars()
                    .flat_map(|c| (c as u32).to_le_bytes()),
            );
            v
        }
        Flavor::Utf32Be =>
        {
            let mut v = vec![0x00, 0x00, 0xFE, 0xFF];
            v.extend(
                text.chars()
                    .flat_map(|c| (c as u32).to_be_bytes()),
            );
            v
        }
    }
}

/// `led` running in `dir` with a private HOME and no LINEEDIT_* overrides.
pub fn led(dir: &Path) -> Command
{
    let mut cmd = Command::cargo_bin("led").expect("led binary");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("LINEEDIT_LOG");
    for (key, _) in std::env::vars()
    {
        if key.starts_with("LINEEDIT_")
        {
            cmd.env_remove(key);
        }
    }
    cmd
}
