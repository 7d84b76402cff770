//! Embeds a human-readable version string as `BUILD_INFO_HUMAN`.
//!
//! The string is `<crate version> (<git version>) <rustc version>`, where the
//! git version is `git describe --tags --always --dirty` when a tag is
//! reachable, and otherwise a pseudo-version
//! `v<crate version>-<timestamp>-<12 char commit>[+dirty]`. Clean trees use
//! the commit timestamp so a given commit always yields the same string.
//! Parts that cannot be determined are left out.

use std::{env, process::Command};

use chrono::{DateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

fn main() {
    for path in ["src", "build.rs", "Cargo.toml", "Cargo.lock"] {
        println!("cargo:rerun-if-changed={path}");
    }

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", build_info());
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn git(args: &[&str]) -> Option<String> {
    command_output("git", args)
}

/// `None` outside a git checkout. `.cargo-ok` is written by `cargo install
/// --git` and does not count as a local modification.
fn is_dirty() -> Option<bool> {
    git(&["status", "--porcelain"]).map(|status| {
        status
            .lines()
            .filter_map(|line| line.get(3..))
            .any(|path| path != ".cargo-ok")
    })
}

fn commit_time() -> Option<DateTime<Utc>> {
    git(&["log", "-1", "--format=%ct"])
        .and_then(|secs| secs.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

fn pseudo_version() -> String {
    let commit = git(&["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".into());
    let dirty = is_dirty();

    let timestamp = match dirty {
        Some(false) => commit_time().unwrap_or_else(Utc::now),
        _ => Utc::now(),
    }
    .format(TIMESTAMP_FORMAT);
    let suffix = if dirty == Some(true) { "+dirty" } else { "" };

    format!("v{}-{timestamp}-{commit}{suffix}", env!("CARGO_PKG_VERSION"))
}

fn git_version() -> String {
    match git(&["describe", "--tags", "--always", "--dirty"]) {
        // A bare hash means no tag is reachable.
        Some(desc) if desc.contains('v') || desc.contains("-g") => desc,
        _ => pseudo_version(),
    }
}

fn build_info() -> String {
    let mut parts = vec![env!("CARGO_PKG_VERSION").to_string()];
    parts.push(format!("({})", git_version()));
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".into());
    if let Some(version) = command_output(&rustc, &["--version"]) {
        parts.push(version);
    }
    parts.join(" ")
}
