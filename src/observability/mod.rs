//! File-based logging.
//!
//! `tracing` events and spans are formatted by `tracing-subscriber`'s fmt
//! layer and written to a size-rotated log file in the data directory:
//!
//! ```text
//! tracing macros → EnvFilter → fmt layer → FileWriter → pokedex.log
//! ```
//!
//! # Configuration
//!
//! The level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` in the config file or `POKEDEX_TRACE_LEVEL`
//! 3. Default: `"info"`
//!
//! # Modules
//!
//! - [`init`]: subscriber setup
//! - [`file_writer`]: rotating file writer

pub mod file_writer;
pub mod init;

pub use file_writer::FileWriter;
pub use init::{init_tracing, LOG_FILE_NAME};
