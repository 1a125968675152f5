// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-env-changed=DEPTH_RECORDER_VERSION");

    // Packagers may pin the version string explicitly
    let version = std::env::var("DEPTH_RECORDER_VERSION").unwrap_or_else(|_| {
        let pkg = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
        match commit_hash() {
            Some(hash) => format!("{}-{}", pkg, hash),
            None => pkg,
        }
    });

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

fn commit_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!hash.is_empty()).then_some(hash)
}
