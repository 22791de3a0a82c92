//! Decoding and formatting of backup console job, volume and file-tree data.
//!
//! The [`core`] module is pure: registries for status/type/level codes, size
//! and age formatters, the POSIX mode decoder, volume expiration and job
//! action availability. [`console`] pulls records out of console responses
//! and [`rpc`] exposes rendering to other front-ends over JSON-RPC.

pub mod config;
pub mod console;
pub mod context;
pub mod core;
pub mod error;
pub mod logging;
pub mod rpc;
