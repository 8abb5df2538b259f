// error.rs - Engine error type
//
// The particle core is in-memory arithmetic; the only failures are bad
// arguments from a loosely typed control surface and settings I/O.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A count or range that the engine cannot represent
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Settings could not be parsed or failed validation
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
