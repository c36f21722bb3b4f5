pub mod canon;
pub mod log;
pub mod marker;
pub mod types;

pub use log::{RecordedLog, Step};
pub use marker::{Marker, ValueError, MAX_TREE_DEPTH};
pub use types::*;
