use std::env;
use std::process::Command;

/// Run a command and return its trimmed stdout if it succeeded
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn set_env(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

fn report_repository_version() {
    let version = env::var("CI_BUILD_REF")
        .ok()
        .filter(|val| !val.is_empty())
        .or_else(|| command_output("git", &["describe", "--always", "--dirty", "--long", "--tags"]))
        .or_else(|| command_output("git", &["rev-parse", "--short", "HEAD"]))
        .or_else(|| env::var("CARGO_PKG_VERSION").ok())
        .unwrap_or_else(|| "unknown".to_string());
    set_env("REPO_VERSION", &version);
}

fn report_enabled_features() {
    let features: Vec<String> = env::vars()
        .filter_map(|(key, _)| key.strip_prefix("CARGO_FEATURE_").map(|f| f.to_lowercase()))
        .collect();
    if features.is_empty() {
        set_env("BUILD_FEATURES", "none");
    } else {
        set_env("BUILD_FEATURES", &features.join(","));
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    set_env(
        "BUILD_PROFILE",
        &env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
    );
    report_enabled_features();
    report_repository_version();
    set_env("BUILD_TIMESTAMP", &chrono::Utc::now().to_rfc3339());
    set_env(
        "RUST_VERSION",
        &command_output("rustc", &["--version"]).unwrap_or_else(|| "unknown".to_string()),
    );
}
