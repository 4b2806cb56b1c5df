//! Logging and span setup shared by the finvision binaries.
//!
//! - **Logging**: human-readable or JSON output via `tracing-subscriber`,
//!   written to stderr so command output on stdout stays clean
//! - **Tracing**: one span per user-level operation, tagged with a generated
//!   trace id for correlating log lines

pub mod logging;
pub mod tracing_setup;
