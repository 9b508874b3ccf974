mod config;
pub use config::*;

mod context;
pub use context::*;

mod errors;
pub use errors::*;

pub mod read;

mod repository;
pub use repository::*;

#[cfg(test)]
pub mod testing;
