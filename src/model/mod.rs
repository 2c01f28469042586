pub mod config;
pub mod entity;
pub mod folder;
pub mod label;
pub mod registry;
pub mod sidebar;
pub mod task;

pub use config::*;
pub use entity::*;
pub use folder::*;
pub use label::*;
pub use registry::*;
pub use sidebar::*;
pub use task::*;
