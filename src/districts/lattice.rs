use crate::tilemap::Tilemap;

use super::types::{Category, Cell};

/// True for cells on the regular block lattice: positive multiples of
/// `block_size` on either axis. Row 0 and column 0 are the city edge, not a
/// street between blocks. This departs from a plain `x % block_size == 0`
/// test, which would also carve index 0: a grid smaller than one block gets no
/// lattice roads at all.
pub fn on_lattice(x: usize, y: usize, block_size: usize) -> bool {
    (x > 0 && x % block_size == 0) || (y > 0 && y % block_size == 0)
}

/// Overlay a road lattice every `block_size` cells.
///
/// Lattice cells turn into road unless they are park, so green space is never
/// split by block roads. Existing roads are kept. Returns a new grid; applying
/// it again changes nothing.
pub fn carve_block_roads(grid: &Tilemap<Cell>, block_size: usize) -> Tilemap<Cell> {
    assert!(block_size > 0, "block size must be positive");

    grid.map(|x, y, &cell| {
        if on_lattice(x, y, block_size) && cell.category != Category::Park {
            cell.as_road()
        } else {
            cell
        }
    })
}
