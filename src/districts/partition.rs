use crate::tilemap::Tilemap;

use super::classify::classify;
use super::types::{Cell, Coord, DistanceMetric, Site};

/// Rules for marking district borders as road.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BorderRules {
    /// Leave a cell alone when one of its backward neighbours is already road.
    pub suppress_near_road: bool,
}

/// Partition a `width` x `height` grid into districts and carve border roads.
///
/// Every cell takes the category of its nearest site. A cell becomes road when
/// the district of any existing backward neighbour (west, north, northwest)
/// differs from its own. Neighbours off the grid are skipped, so row 0 and
/// column 0 only compare along the axis they have.
///
/// The grid is built in a fresh buffer in raster order (x outer, y inner).
pub fn partition_grid(
    width: usize,
    height: usize,
    sites: &[Site],
    metric: DistanceMetric,
    rules: BorderRules,
) -> Tilemap<Cell> {
    assert!(!sites.is_empty(), "partitioning needs at least one site");

    let districts = Tilemap::from_raster_fn(width, height, Cell::default(), |_, x, y| {
        Cell::new(classify(Coord::new(x, y), sites, metric))
    });

    Tilemap::from_raster_fn(width, height, Cell::default(), |built, x, y| {
        let cell = *districts.get(x, y);
        let neighbours = districts.backward_neighbors(x, y);

        let on_border = neighbours
            .iter()
            .flatten()
            .any(|&(nx, ny)| districts.get(nx, ny).district != cell.district);
        if !on_border {
            return cell;
        }

        // Road status of backward neighbours is already final in `built`.
        if rules.suppress_near_road
            && neighbours.iter().flatten().any(|&(nx, ny)| built.get(nx, ny).is_road())
        {
            return cell;
        }

        cell.as_road()
    })
}

/// Widen existing roads by one cell towards +x / +y.
///
/// A non-road cell becomes road when any backward neighbour was road in
/// `grid`. Reads only the input, so one pass never cascades.
pub fn thicken_roads(grid: &Tilemap<Cell>) -> Tilemap<Cell> {
    grid.map(|x, y, &cell| {
        if cell.is_road() {
            return cell;
        }
        let touches_road = grid
            .backward_neighbors(x, y)
            .iter()
            .flatten()
            .any(|&(nx, ny)| grid.get(nx, ny).is_road());
        if touches_road {
            cell.as_road()
        } else {
            cell
        }
    })
}
