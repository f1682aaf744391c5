//! Common test utilities shared across integration tests.

use std::path::Path;
use std::process::{Command, Output};

/// Path of the s3sift binary built for this test run
pub fn s3sift_binary() -> &'static Path {
    Path::new(env!("CARGO_BIN_EXE_s3sift"))
}

/// Run the s3sift binary with the given arguments.
///
/// AWS environment variables that could reach a real account are cleared so
/// tests never talk to a live service.
pub fn run_s3sift(args: &[&str]) -> Output {
    Command::new(s3sift_binary())
        .args(args)
        .env_remove("AWS_REGION")
        .env_remove("AWS_DEFAULT_REGION")
        .env_remove("AWS_PROFILE")
        .env("AWS_CONFIG_FILE", "/nonexistent/s3sift-test-config")
        .env("AWS_SHARED_CREDENTIALS_FILE", "/nonexistent/s3sift-test-credentials")
        .env("AWS_EC2_METADATA_DISABLED", "true")
        .output()
        .expect("Failed to execute s3sift binary")
}

/// Stdout of a finished command as a string
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a finished command as a string
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
