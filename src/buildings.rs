//! Building selection.
//!
//! Resolves a finished cell's category into the concrete archetype handed to the
//! placement consumer. Residential, Park and Industrial map one-to-one; Market
//! and Business are mixed-use and roll against a weighted table.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::districts::{Category, Cell, Coord};

/// Concrete structure type placed on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Road,
    Residential,
    Park,
    Industrial,
    Market,
    Business,
}

impl Archetype {
    pub fn all() -> &'static [Self] {
        &[
            Self::Road,
            Self::Residential,
            Self::Park,
            Self::Industrial,
            Self::Market,
            Self::Business,
        ]
    }

    /// The archetype a category resolves to when no roll is involved.
    pub fn primary(category: Category) -> Self {
        match category {
            Category::Road => Self::Road,
            Category::Residential => Self::Residential,
            Category::Park => Self::Park,
            Category::Industrial => Self::Industrial,
            Category::Market => Self::Market,
            Category::Business => Self::Business,
        }
    }

    /// Parks and roads lie flat; everything else can be stretched vertically.
    pub fn has_height(&self) -> bool {
        !matches!(self, Self::Road | Self::Park)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Road => "Road",
            Self::Residential => "Residential",
            Self::Park => "Park",
            Self::Industrial => "Industrial",
            Self::Market => "Market",
            Self::Business => "Business",
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name().to_lowercase())
    }
}

/// Cumulative thresholds: a roll `r` picks the first entry with `r <= threshold`.
const MARKET_MIX: [(f32, Archetype); 3] = [
    (0.75, Archetype::Market),
    (0.90, Archetype::Residential),
    (1.00, Archetype::Business),
];

const BUSINESS_MIX: [(f32, Archetype); 3] = [
    (0.75, Archetype::Business),
    (0.90, Archetype::Market),
    (1.00, Archetype::Residential),
];

fn pick_from_mix(roll: f32, mix: &[(f32, Archetype)]) -> Archetype {
    mix.iter()
        .find(|(threshold, _)| roll <= *threshold)
        .map(|&(_, archetype)| archetype)
        .unwrap_or(mix[mix.len() - 1].1)
}

/// Resolve a district category into an archetype.
///
/// Draws exactly one uniform `[0, 1)` value for Market and Business and none
/// otherwise. Road has no building and returns `None`.
pub fn select_archetype<R: Rng>(category: Category, rng: &mut R) -> Option<Archetype> {
    if category.is_road() {
        return None;
    }
    if !category.is_mixed_use() {
        return Some(Archetype::primary(category));
    }

    let mix: &[(f32, Archetype)] = match category {
        Category::Business => &BUSINESS_MIX,
        _ => &MARKET_MIX,
    };
    Some(pick_from_mix(rng.gen::<f32>(), mix))
}

/// Random vertical stretch applied to placed buildings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightJitter {
    pub min: f32,
    pub max: f32,
}

impl Default for HeightJitter {
    fn default() -> Self {
        Self { min: 1.0, max: 10.0 }
    }
}

impl HeightJitter {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.min < self.max {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }
}

/// Outcome of building selection for one non-road cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingChoice {
    pub archetype: Archetype,
    /// Height multiplier, present only when jitter is on and the archetype has height.
    pub height: Option<f32>,
}

/// Select the building for a finished cell.
///
/// Draw order per non-road cell: the height multiplier first (when jitter is
/// enabled, including for parks, which then discard it), then the mixed-use roll.
/// Road cells draw nothing. The cell itself is never modified.
pub fn select_building<R: Rng>(
    cell: &Cell,
    jitter: Option<&HeightJitter>,
    rng: &mut R,
) -> Option<BuildingChoice> {
    if cell.is_road() {
        return None;
    }

    let height = jitter.map(|j| j.sample(rng));
    let archetype = select_archetype(cell.category, rng)?;

    Some(BuildingChoice {
        archetype,
        height: height.filter(|_| archetype.has_height()),
    })
}

/// Archetypes that can be emitted given the district palette and road emission.
pub fn reachable_archetypes(allow_parks: bool, emit_roads: bool) -> Vec<Archetype> {
    Archetype::all()
        .iter()
        .copied()
        .filter(|a| match a {
            Archetype::Road => emit_roads,
            Archetype::Park => allow_parks,
            _ => true,
        })
        .collect()
}

/// Handles the placement consumer uses to instantiate each archetype
/// (asset names, prefab paths, glyphs, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchetypeTable(BTreeMap<Archetype, String>);

impl ArchetypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, archetype: Archetype, handle: impl Into<String>) -> Self {
        self.0.insert(archetype, handle.into());
        self
    }

    pub fn get(&self, archetype: Archetype) -> Option<&str> {
        self.0.get(&archetype).map(String::as_str)
    }

    /// First archetype in `required` without a handle.
    pub fn first_missing(&self, required: &[Archetype]) -> Option<Archetype> {
        required.iter().copied().find(|a| !self.0.contains_key(a))
    }
}

/// One emission to the placement consumer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub coord: Coord,
    /// Final category of the cell (Road for road emissions).
    pub category: Category,
    pub archetype: Archetype,
    /// Handle from the archetype table, when one is configured.
    pub handle: Option<String>,
    /// Vertical extent after scaling, for jittered buildings.
    pub height: Option<f32>,
    /// Uniform scale (1 / scale divisor).
    pub scale: f32,
    /// Lift that keeps the building's base on the ground (height / 2).
    pub vertical_offset: f32,
}

impl Placement {
    pub fn new(
        coord: Coord,
        category: Category,
        choice: BuildingChoice,
        handle: Option<String>,
        scale: f32,
    ) -> Self {
        let height = choice.height.map(|h| h * scale);
        Self {
            coord,
            category,
            archetype: choice.archetype,
            handle,
            height,
            scale,
            vertical_offset: height.map_or(0.0, |h| h / 2.0),
        }
    }
}
