pub mod compat;
mod delta;
mod describe;
mod flatten;

pub use delta::{compute_delta, Delta};
pub use describe::{describe, DescribedDelta, UNRECOGNIZED_MARKER};
pub use flatten::{
    flat_map_to_value, flatten, join_path, serialize_flat_map, FlatMap, PATH_FORMAT_VERSION,
    PATH_SEPARATOR,
};
