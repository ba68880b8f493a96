use super::types::{Category, Coord, DistanceMetric, Site};

/// Index of the site nearest to `coord`, or `None` for an empty site list.
///
/// Linear scan with a strict `<`: on equal distances the earliest site wins.
pub fn nearest_site_index(coord: Coord, sites: &[Site], metric: DistanceMetric) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, site) in sites.iter().enumerate() {
        let d = metric.distance(coord, site.coord);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((i, d));
        }
    }

    best.map(|(i, _)| i)
}

/// Category of the district owning `coord`.
///
/// Panics on an empty site list; validated configs always produce at least one site.
pub fn classify(coord: Coord, sites: &[Site], metric: DistanceMetric) -> Category {
    let idx = nearest_site_index(coord, sites, metric)
        .unwrap_or_else(|| panic!("cannot classify ({}, {}) without sites", coord.x, coord.y));
    sites[idx].category
}
