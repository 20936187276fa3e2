//! Build script for tft-setup-config
//!
//! Validates user_setup.toml at compile time so a bad setup never reaches
//! the firmware image. The file goes through the same parser the firmware
//! uses at runtime.

use std::fs;
use std::path::Path;

#[allow(dead_code)]
#[path = "src/toml.rs"]
mod setup_toml;

fn main() {
    println!("cargo:rerun-if-changed=user_setup.toml");
    println!("cargo:rerun-if-changed=src/toml.rs");
    println!("cargo:rerun-if-changed=build.rs");

    validate_setup();
}

/// Validate user_setup.toml
fn validate_setup() {
    let setup_path = Path::new("user_setup.toml");

    if !setup_path.exists() {
        fail(
            "user_setup.toml not found!",
            &["The crate bundles user_setup.toml as its built-in display setup.".to_string()],
        );
    }

    let content = match fs::read_to_string(setup_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read user_setup.toml", &[e.to_string()]),
    };

    // Full TOML first for line/column diagnostics on syntax errors
    if let Err(e) = toml::from_str::<toml::Table>(&content) {
        fail(
            "Invalid TOML syntax in user_setup.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        );
    }

    match setup_toml::parse_setup(&content) {
        Ok(setup) => println!(
            "cargo:warning=user_setup.toml validated successfully ({} on {})",
            setup.controller().name(),
            setup.target().key()
        ),
        Err(e) => fail("Rejected display setup in user_setup.toml", &[e.to_string()]),
    }
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| format!("║  • {:<62} ║", truncate(line)))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn truncate(line: &str) -> String {
    if line.chars().count() > 62 {
        format!("{}...", line.chars().take(59).collect::<String>())
    } else {
        line.to_string()
    }
}
