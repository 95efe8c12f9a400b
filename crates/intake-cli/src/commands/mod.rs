//! Command implementations.

pub mod config;
pub mod ingest;
pub mod records;

pub use self::config::execute_config;
pub use self::ingest::execute_ingest;
pub use self::records::{execute_delete, execute_list, execute_show, execute_update};
