pub mod config_io;
pub mod scenario;
pub mod sidebar_store;
