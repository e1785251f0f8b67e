//! Build script for sweepscan-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates scanner.toml at compile time
//! - Generates the `ScanConfig` constant compiled into the firmware

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    let config = validate_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Values extracted from scanner.toml
struct ScannerToml {
    steps_per_revolution: u16,
    max_speed: f64,
    acceleration: f64,
    period_ms: u32,
    baudrate: u32,
}

/// Validate scanner.toml and extract its values
fn validate_config() -> ScannerToml {
    println!("cargo:rerun-if-changed=scanner.toml");

    let config_path = Path::new("scanner.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: scanner.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a scanner.toml configuration file.        ║\n\
            ║  Please create one in the sweepscan-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read scanner.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in scanner.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    let steps = integer(&config, "motor", "steps_per_revolution", &mut errors);
    let max_speed = number(&config, "motor", "max_speed", &mut errors);
    let acceleration = number(&config, "motor", "acceleration", &mut errors);
    let period_ms = integer(&config, "sampling", "period_ms", &mut errors);
    let baudrate = integer(&config, "serial", "baudrate", &mut errors);

    let steps_per_revolution = match steps {
        Some(s) if (1..=i64::from(u16::MAX)).contains(&s) => s as u16,
        Some(_) => {
            errors.push("[motor] steps_per_revolution must be 1-65535".to_string());
            0
        }
        None => 0,
    };
    if matches!(max_speed, Some(v) if v <= 0.0) {
        errors.push("[motor] max_speed must be greater than 0".to_string());
    }
    if matches!(acceleration, Some(v) if v <= 0.0) {
        errors.push("[motor] acceleration must be greater than 0".to_string());
    }
    let period_ms = positive_u32(period_ms, "[sampling] period_ms", &mut errors);
    let baudrate = positive_u32(baudrate, "[serial] baudrate", &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid scanner configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=scanner.toml validated successfully");

    ScannerToml {
        steps_per_revolution,
        max_speed: max_speed.unwrap_or_default(),
        acceleration: acceleration.unwrap_or_default(),
        period_ms,
        baudrate,
    }
}

/// Look up `[section] key`, recording an error if it is missing
fn field<'a>(
    config: &'a toml::Value,
    section: &str,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<&'a toml::Value> {
    let value = config.get(section).and_then(|s| s.get(key));
    if value.is_none() {
        errors.push(format!("[{}] missing '{}'", section, key));
    }
    value
}

fn integer(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    match field(config, section, key, errors)? {
        toml::Value::Integer(i) => Some(*i),
        _ => {
            errors.push(format!("[{}] '{}' must be an integer", section, key));
            None
        }
    }
}

/// Integers are accepted where a float is expected
fn number(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> Option<f64> {
    match field(config, section, key, errors)? {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        _ => {
            errors.push(format!("[{}] '{}' must be a number", section, key));
            None
        }
    }
}

fn positive_u32(value: Option<i64>, name: &str, errors: &mut Vec<String>) -> u32 {
    match value {
        Some(v) if v > 0 && v <= i64::from(u32::MAX) => v as u32,
        Some(_) => {
            errors.push(format!("{} must be 1-{}", name, u32::MAX));
            0
        }
        None => 0,
    }
}

/// Write the generated `SCAN_CONFIG` constant into OUT_DIR
fn generate_config(config: &ScannerToml) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("scanner_config.rs")).unwrap();

    writeln!(f, "/// Scanner configuration from scanner.toml").unwrap();
    writeln!(f, "pub const SCAN_CONFIG: ScanConfig = ScanConfig {{").unwrap();
    writeln!(f, "    steps_per_revolution: {},", config.steps_per_revolution).unwrap();
    writeln!(f, "    max_speed: {:?}_f32,", config.max_speed).unwrap();
    writeln!(f, "    acceleration: {:?}_f32,", config.acceleration).unwrap();
    writeln!(f, "    sample_period_ms: {},", config.period_ms).unwrap();
    writeln!(f, "    baudrate: {},", config.baudrate).unwrap();
    writeln!(f, "}};").unwrap();
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
