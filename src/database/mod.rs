pub mod connection;
pub use connection::*;

pub mod config;
pub use config::*;

#[cfg(test)]
pub use _tests::fixtures;
