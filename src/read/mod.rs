mod orders;
pub use orders::*;
mod filters;
pub use filters::*;
mod paged;
pub use paged::*;
mod query_parser;
pub use query_parser::*;
mod list_query;
pub use list_query::*;
mod paginator;
pub use paginator::*;

mod memory;
pub use memory::*;

#[cfg(feature = "mongodb")]
pub mod mongodb;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod storage;
