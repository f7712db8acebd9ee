pub mod catalog;
pub mod manager;

pub use catalog::{PgCatalog, SchemaCatalog};
pub use manager::{DatabaseError, DatabaseManager};
