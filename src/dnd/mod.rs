pub mod collision;
pub mod engine;
pub mod executor;
pub mod fetch;
pub mod geometry;
pub mod gesture;
pub mod notify;
pub mod transition;
pub mod zone;

pub use engine::{Engine, EngineError};
pub use fetch::{FetchOutcome, FetchToken, ListingView};
pub use geometry::{Point, Rect};
pub use notify::Notification;
pub use transition::{Detach, Transition};
