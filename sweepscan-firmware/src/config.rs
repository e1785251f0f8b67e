//! Compile-time scanner configuration
//!
//! `SCAN_CONFIG` is generated by build.rs from scanner.toml.

use sweepscan_core::config::ScanConfig;

include!(concat!(env!("OUT_DIR"), "/scanner_config.rs"));
