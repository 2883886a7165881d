pub mod db;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod queries;
pub mod schema;
pub mod store;

mod error;

pub use error::Error;
pub use memory::MemoryStore;
pub use store::{BoxFuture, ClientScope, DateRange, RecordStore};

pub type Result<T, E = Error> = std::result::Result<T, E>;
