//! Embassy async tasks

pub mod scan;

pub use scan::{scan_task, FirmwareScanner};
