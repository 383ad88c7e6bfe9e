pub mod geometry;
pub mod node_id;
pub mod score;
pub mod time_interval;

pub use geometry::{Bbox, Geometry, LocationFilter};
pub use node_id::EoKind;
pub use time_interval::TimeInterval;
