use std::path::Path;
use std::process::{Command, Output};

use url::Url;

pub const EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "test-password";

/// `file://` URL of a local gateway directory.
pub fn file_gateway_url(path: &Path) -> String {
    Url::from_directory_path(path)
        .expect("Failed to convert path to file URL")
        .to_string()
}

/// Run the CLI with a custom HOME so session storage stays isolated.
pub fn run_cli_with_env(args: &[&str], home: &Path, gateway_url: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_marquee"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("MARQUEE_API_KEY");
    cmd.env_remove("MARQUEE_PASSWORD");
    match gateway_url {
        Some(url) => cmd.env("MARQUEE_GATEWAY", url),
        None => cmd.env_remove("MARQUEE_GATEWAY"),
    };
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI with a custom HOME and expect success.
pub fn run_cli_with_env_success(args: &[&str], home: &Path, gateway_url: Option<&str>) -> String {
    let output = run_cli_with_env(args, home, gateway_url);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}
