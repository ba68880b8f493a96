//! Procedural city generation library
//!
//! Partitions a bounded grid into districts around random sites, carves
//! border and block roads, and resolves every remaining cell into a building
//! archetype for an external placement consumer.

pub mod ascii;
pub mod buildings;
pub mod config;
pub mod districts;
pub mod export;
pub mod generator;
pub mod tilemap;

pub use buildings::{Archetype, ArchetypeTable, HeightJitter, Placement};
pub use config::{CityConfig, ConfigError, SiteCount};
pub use districts::{Category, Cell, Coord, DistanceMetric, Site};
pub use generator::{City, CityGenerator, GenerationError, PlacementConsumer, PlacementLog};
