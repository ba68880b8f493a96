//! City generation pipeline.
//!
//! `CityGenerator` owns the validated configuration and the random source.
//! Each call to `generate` runs site scattering, partitioning, road
//! thickening, the block lattice and building selection, in that order,
//! into fresh buffers. The finished `City` replaces the previous one only
//! once every phase has completed.

use std::collections::HashMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::buildings::{
    reachable_archetypes, select_building, Archetype, BuildingChoice, Placement,
};
use crate::config::{CityConfig, ConfigError};
use crate::districts::{
    carve_block_roads, generate_sites, partition_grid, thicken_roads, BorderRules, Category, Cell,
    Coord, DistanceMetric, Site,
};
use crate::tilemap::Tilemap;

/// Receives the placements of a generation pass (renderer, scene builder, file writer, ...).
pub trait PlacementConsumer {
    /// Discard everything placed by earlier passes.
    fn clear(&mut self);

    /// Place one structure.
    fn place(&mut self, placement: &Placement);
}

/// A consumer that simply records what it was given.
#[derive(Clone, Debug, Default)]
pub struct PlacementLog {
    pub placements: Vec<Placement>,
    pub clears: usize,
}

impl PlacementConsumer for PlacementLog {
    fn clear(&mut self) {
        self.placements.clear();
        self.clears += 1;
    }

    fn place(&mut self, placement: &Placement) {
        self.placements.push(placement.clone());
    }
}

/// Result of one generation pass.
#[derive(Clone, Debug)]
pub struct City {
    /// 1-based index of the pass that produced this city.
    pub generation: u64,
    pub seed: u64,
    pub metric: DistanceMetric,
    pub sites: Vec<Site>,
    pub grid: Tilemap<Cell>,
    /// Emissions in raster order (x outer, y inner).
    pub placements: Vec<Placement>,
}

impl City {
    pub fn width(&self) -> usize {
        self.grid.width
    }

    pub fn height(&self) -> usize {
        self.grid.height
    }

    pub fn category_counts(&self) -> HashMap<Category, usize> {
        let mut counts = HashMap::new();
        for (_, _, cell) in self.grid.iter() {
            *counts.entry(cell.category).or_insert(0) += 1;
        }
        counts
    }

    pub fn archetype_counts(&self) -> HashMap<Archetype, usize> {
        let mut counts = HashMap::new();
        for placement in &self.placements {
            *counts.entry(placement.archetype).or_insert(0) += 1;
        }
        counts
    }

    pub fn road_count(&self) -> usize {
        self.grid.iter().filter(|(_, _, c)| c.is_road()).count()
    }
}

/// Errors raised at the start of a generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// An archetype that can be emitted has no handle in the configured table
    MissingArchetype(Archetype),
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::MissingArchetype(archetype) => {
                write!(f, "No archetype handle configured for '{}'", archetype)
            }
        }
    }
}

impl std::error::Error for GenerationError {}

/// Drives city generation. Single owner of the config and the random source.
pub struct CityGenerator {
    config: CityConfig,
    rng: ChaCha8Rng,
    city: Option<City>,
    generations: u64,
}

impl CityGenerator {
    /// Validate `config` and seed the random source.
    pub fn configure(config: CityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        debug!(
            width = config.width,
            height = config.height,
            seed = config.seed,
            "City generator configured"
        );
        Ok(Self {
            config,
            rng,
            city: None,
            generations: 0,
        })
    }

    pub fn metric(&self) -> DistanceMetric {
        self.config.metric
    }

    /// Change the metric for subsequent passes. The current city is untouched.
    pub fn set_metric(&mut self, metric: DistanceMetric) {
        self.config.metric = metric;
    }

    /// Flip between Euclidean and Manhattan; returns the new metric.
    pub fn toggle_metric(&mut self) -> DistanceMetric {
        self.config.metric = self.config.metric.toggled();
        info!(metric = %self.config.metric, "Distance metric switched");
        self.config.metric
    }

    /// The most recently completed city, if any.
    pub fn city(&self) -> Option<&City> {
        self.city.as_ref()
    }

    /// Run a full generation pass and publish the result.
    pub fn generate(&mut self) -> Result<&City, GenerationError> {
        self.check_archetypes()?;

        let city = self.build_city();
        self.generations = city.generation;
        let city: &City = self.city.insert(city);
        Ok(city)
    }

    /// Run a generation pass, then clear `consumer` and feed it every placement.
    pub fn generate_into<C: PlacementConsumer + ?Sized>(
        &mut self,
        consumer: &mut C,
    ) -> Result<&City, GenerationError> {
        let city = self.generate()?;
        consumer.clear();
        for placement in &city.placements {
            consumer.place(placement);
        }
        Ok(city)
    }

    /// Every archetype that can be emitted must have a handle when a table is set.
    fn check_archetypes(&self) -> Result<(), GenerationError> {
        let Some(table) = &self.config.archetypes else {
            return Ok(());
        };
        let required = reachable_archetypes(self.config.allow_parks, self.config.emit_roads);
        match table.first_missing(&required) {
            Some(archetype) => Err(GenerationError::MissingArchetype(archetype)),
            None => Ok(()),
        }
    }

    fn build_city(&mut self) -> City {
        let config = &self.config;
        let generation = self.generations + 1;
        info!(
            generation,
            seed = config.seed,
            metric = %config.metric,
            "Generating city {}x{}",
            config.width,
            config.height
        );

        let sites = generate_sites(
            config.sites,
            config.width,
            config.height,
            config.allow_parks,
            &mut self.rng,
        );
        debug!(count = sites.len(), "Placed district sites");

        let rules = BorderRules {
            suppress_near_road: config.suppress_border_road_near_road,
        };
        let mut grid = partition_grid(config.width, config.height, &sites, config.metric, rules);
        debug!(roads = count_roads(&grid), "Partitioned grid");

        for _ in 0..config.major_road_thickness {
            grid = thicken_roads(&grid);
        }
        if config.major_road_thickness > 0 {
            debug!(
                passes = config.major_road_thickness,
                roads = count_roads(&grid),
                "Thickened border roads"
            );
        }

        let grid = carve_block_roads(&grid, config.block_size);
        debug!(roads = count_roads(&grid), "Carved block lattice");

        let placements = place_buildings(&grid, config, &mut self.rng);
        info!(placements = placements.len(), "City generated");

        City {
            generation,
            seed: config.seed,
            metric: config.metric,
            sites,
            grid,
            placements,
        }
    }
}

fn count_roads(grid: &Tilemap<Cell>) -> usize {
    grid.iter().filter(|(_, _, c)| c.is_road()).count()
}

/// Resolve every finished cell into placements, in raster order.
fn place_buildings(grid: &Tilemap<Cell>, config: &CityConfig, rng: &mut ChaCha8Rng) -> Vec<Placement> {
    let scale = config.scale_divisor.map_or(1.0, |d| 1.0 / d);
    let handle = |archetype: Archetype| {
        config
            .archetypes
            .as_ref()
            .and_then(|t| t.get(archetype))
            .map(str::to_owned)
    };

    let mut placements = Vec::with_capacity(grid.len());
    for (x, y) in grid.coords() {
        let cell = grid.get(x, y);
        let coord = Coord::new(x, y);

        if cell.is_road() {
            if config.emit_roads {
                let choice = BuildingChoice {
                    archetype: Archetype::Road,
                    height: None,
                };
                placements.push(Placement::new(coord, cell.category, choice, handle(Archetype::Road), scale));
            }
            continue;
        }

        if let Some(choice) = select_building(cell, config.height_jitter.as_ref(), rng) {
            placements.push(Placement::new(
                coord,
                cell.category,
                choice,
                handle(choice.archetype),
                scale,
            ));
        }
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::ArchetypeTable;
    use crate::config::SiteCount;
    use crate::districts::on_lattice;

    fn small_config() -> CityConfig {
        CityConfig {
            width: 24,
            height: 18,
            sites: SiteCount::Range { min: 3, max: 9 },
            seed: 1234,
            block_size: 6,
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = CityConfig { block_size: 0, ..small_config() };
        assert!(matches!(CityGenerator::configure(config), Err(ConfigError::ZeroBlockSize)));
    }

    #[test]
    fn test_same_seed_same_city() {
        let mut a = CityGenerator::configure(small_config()).unwrap();
        let mut b = CityGenerator::configure(small_config()).unwrap();

        for _ in 0..3 {
            let ca = a.generate().unwrap().clone();
            let cb = b.generate().unwrap();
            assert_eq!(ca.sites, cb.sites);
            assert_eq!(ca.grid, cb.grid);
            assert_eq!(ca.placements, cb.placements);
        }
    }

    #[test]
    fn test_regeneration_continues_the_stream() {
        let mut generator = CityGenerator::configure(CityConfig {
            sites: SiteCount::Fixed(6),
            ..small_config()
        })
        .unwrap();
        let first = generator.generate().unwrap().clone();
        let second = generator.generate().unwrap();
        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_ne!(first.sites, second.sites);
    }

    #[test]
    fn test_every_cell_classified_once() {
        let mut generator = CityGenerator::configure(small_config()).unwrap();
        let city = generator.generate().unwrap();
        assert_eq!(city.grid.len(), 24 * 18);
        assert_eq!(city.category_counts().values().sum::<usize>(), 24 * 18);

        // One emission per cell with road emission on, in raster order.
        assert_eq!(city.placements.len(), 24 * 18);
        let coords: Vec<Coord> = city.placements.iter().map(|p| p.coord).collect();
        let expected: Vec<Coord> = city.grid.coords().map(Coord::from).collect();
        assert_eq!(coords, expected);
    }

    #[test]
    fn test_single_residential_site_example() {
        // 4x4, one Residential site, Manhattan, lattice spacing beyond the grid.
        let config = CityConfig {
            width: 4,
            height: 4,
            sites: SiteCount::Fixed(1),
            metric: DistanceMetric::Manhattan,
            block_size: 100,
            allow_parks: false,
            height_jitter: None,
            ..Default::default()
        };
        let mut generator = CityGenerator::configure(config).unwrap();
        let city = generator.generate().unwrap();

        let district = city.sites[0].category;
        assert_eq!(city.road_count(), 0);
        for (_, _, cell) in city.grid.iter() {
            assert_eq!(cell.category, district);
        }

        // Hand-built equivalent with a Residential site resolves every cell to Residential.
        let sites = [Site::new(Coord::new(0, 0), Category::Residential)];
        let grid = partition_grid(4, 4, &sites, DistanceMetric::Manhattan, BorderRules::default());
        let grid = carve_block_roads(&grid, 100);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for (_, _, cell) in grid.iter() {
            assert_eq!(cell.category, Category::Residential);
            let choice = select_building(cell, None, &mut rng).unwrap();
            assert_eq!(choice.archetype, Archetype::Residential);
        }
    }

    #[test]
    fn test_set_metric_only_affects_next_pass() {
        let mut generator = CityGenerator::configure(small_config()).unwrap();
        let before = generator.generate().unwrap().clone();
        assert_eq!(before.metric, DistanceMetric::Euclidean);

        assert_eq!(generator.toggle_metric(), DistanceMetric::Manhattan);
        assert_eq!(generator.city().unwrap().grid, before.grid);
        assert_eq!(generator.city().unwrap().metric, DistanceMetric::Euclidean);

        let after = generator.generate().unwrap();
        assert_eq!(after.metric, DistanceMetric::Manhattan);

        generator.set_metric(DistanceMetric::Euclidean);
        assert_eq!(generator.metric(), DistanceMetric::Euclidean);
    }

    #[test]
    fn test_roads_can_be_silent() {
        let config = CityConfig { emit_roads: false, ..small_config() };
        let mut generator = CityGenerator::configure(config).unwrap();
        let city = generator.generate().unwrap();
        assert!(city.road_count() > 0);
        assert_eq!(city.placements.len(), city.grid.len() - city.road_count());
        assert!(city.placements.iter().all(|p| p.archetype != Archetype::Road));
    }

    #[test]
    fn test_missing_handle_is_reported_before_generation() {
        let table = ArchetypeTable::new()
            .with(Archetype::Road, "road")
            .with(Archetype::Residential, "house")
            .with(Archetype::Industrial, "factory")
            .with(Archetype::Market, "stall")
            .with(Archetype::Business, "tower");
        let config = CityConfig { archetypes: Some(table.clone()), ..small_config() };
        let mut generator = CityGenerator::configure(config).unwrap();
        assert_eq!(
            generator.generate().unwrap_err(),
            GenerationError::MissingArchetype(Archetype::Park)
        );
        assert!(generator.city().is_none());

        // Without parks the same table is complete, and no draws were consumed above.
        let config = CityConfig {
            archetypes: Some(table),
            allow_parks: false,
            ..small_config()
        };
        let mut fresh = CityGenerator::configure(config.clone()).unwrap();
        let mut failed_first = CityGenerator::configure(config).unwrap();
        failed_first.config.allow_parks = true;
        assert!(failed_first.generate().is_err());
        failed_first.config.allow_parks = false;
        assert_eq!(
            failed_first.generate().unwrap().placements,
            fresh.generate().unwrap().placements
        );
        let city = fresh.city().unwrap();
        assert!(city.placements.iter().all(|p| p.handle.is_some()));
    }

    #[test]
    fn test_consumer_is_cleared_then_fed() {
        let mut generator = CityGenerator::configure(small_config()).unwrap();
        let mut log = PlacementLog::default();

        generator.generate_into(&mut log).unwrap();
        let first_len = log.placements.len();
        generator.generate_into(&mut log).unwrap();

        assert_eq!(log.clears, 2);
        assert_eq!(log.placements.len(), first_len);
        assert_eq!(log.placements, generator.city().unwrap().placements);
    }

    #[test]
    fn test_heights_and_scale() {
        let config = CityConfig {
            scale_divisor: Some(2.0),
            ..small_config()
        };
        let mut generator = CityGenerator::configure(config).unwrap();
        let city = generator.generate().unwrap();
        for p in &city.placements {
            assert_eq!(p.scale, 0.5);
            match p.archetype {
                Archetype::Road | Archetype::Park => assert_eq!(p.height, None),
                _ => {
                    let h = p.height.unwrap();
                    assert!((0.5..=5.0).contains(&h));
                    assert_eq!(p.vertical_offset, h / 2.0);
                }
            }
        }
    }

    #[test]
    fn test_park_lattice_cells_are_road_only_on_borders() {
        let config = CityConfig {
            sites: SiteCount::Fixed(12),
            block_size: 2,
            ..small_config()
        };
        let mut generator = CityGenerator::configure(config).unwrap();
        let mut park_lattice_cells = 0;
        for _ in 0..4 {
            let city = generator.generate().unwrap();
            for (x, y, cell) in city.grid.iter() {
                if cell.district != Category::Park || !on_lattice(x, y, 2) {
                    continue;
                }
                park_lattice_cells += 1;
                let on_border = city
                    .grid
                    .backward_neighbors(x, y)
                    .iter()
                    .flatten()
                    .any(|&(nx, ny)| city.grid.get(nx, ny).district != Category::Park);
                assert_eq!(cell.is_road(), on_border, "park cell ({x},{y})");
            }
        }
        assert!(park_lattice_cells > 0);
    }
}
