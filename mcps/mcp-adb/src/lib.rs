//! MCP server for Android Debug Bridge operations
//!
//! Every tool shells out to the `adb` executable through [`adb::Adb`]; the
//! server layer maps results onto MCP responses.

pub mod adb;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod handlers;
pub mod params;
pub mod server;
pub mod validation;

pub use adb::Adb;
pub use config::Config;
pub use error::{AdbError, AdbResult};
pub use server::AdbMcpServer;
