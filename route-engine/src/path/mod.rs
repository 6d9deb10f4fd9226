//! Path and distance primitives shared by every search.

mod distance;
mod edge_path;

pub use distance::TentativeDistance;
pub use edge_path::{EdgeCost, EdgePath, Path};
