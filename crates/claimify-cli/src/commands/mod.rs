//! Command implementations.

pub mod config;
pub mod extract;
pub mod segment;

pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::segment::execute_segment;

use crate::error::Result;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Read the answer from `path`, or from stdin when no path is given.
pub(crate) fn read_answer(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
