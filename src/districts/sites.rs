use std::collections::HashSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use crate::config::SiteCount;

use super::types::{Category, Coord, Site};

impl SiteCount {
    /// Resolve to a concrete count. Draws one value only for a non-degenerate range.
    pub fn sample(&self, rng: &mut ChaCha8Rng) -> usize {
        match *self {
            SiteCount::Fixed(n) => n,
            SiteCount::Range { min, max } if min < max => rng.gen_range(min..max),
            SiteCount::Range { min, .. } => min,
        }
    }
}

/// Scatter district sites uniformly over a `width` x `height` grid.
///
/// Random draws happen in a fixed order: the site count (if ranged), then for
/// each site its x, its y and its category. Coordinates are drawn with
/// replacement, so two sites may share a cell; the later one can never win a
/// nearest-site comparison and is simply wasted.
pub fn generate_sites(
    count: SiteCount,
    width: usize,
    height: usize,
    allow_parks: bool,
    rng: &mut ChaCha8Rng,
) -> Vec<Site> {
    let palette: &[Category] = if allow_parks {
        &Category::DISTRICTS
    } else {
        &Category::DISTRICTS_WITHOUT_PARKS
    };

    let num_sites = count.sample(rng);

    let sites: Vec<Site> = (0..num_sites)
        .map(|_| {
            let x = rng.gen_range(0..width);
            let y = rng.gen_range(0..height);
            let category = palette[rng.gen_range(0..palette.len())];
            Site::new(Coord::new(x, y), category)
        })
        .collect();

    let distinct: HashSet<Coord> = sites.iter().map(|s| s.coord).collect();
    if distinct.len() < sites.len() {
        warn!(
            duplicates = sites.len() - distinct.len(),
            "Some sites share a cell and will never own a district"
        );
    }

    sites
}
