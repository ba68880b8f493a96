pub mod classify;
pub mod lattice;
pub mod partition;
pub mod sites;
pub mod types;

pub use classify::{classify, nearest_site_index};
pub use lattice::{carve_block_roads, on_lattice};
pub use partition::{partition_grid, thicken_roads, BorderRules};
pub use sites::generate_sites;
pub use types::{Category, Cell, Coord, DistanceMetric, Site};
