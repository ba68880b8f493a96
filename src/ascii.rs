//! ASCII rendering and export module for city maps
//!
//! Provides functions to render a generated city as ASCII text and export a
//! plain-text report.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;

use crate::buildings::Archetype;
use crate::districts::Category;
use crate::generator::City;
use crate::tilemap::Tilemap;

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AsciiMode {
    /// Final category of every cell, roads included
    Category,
    /// Underlying nearest-site district, ignoring roads
    District,
    /// Archetype placed on every cell
    Archetype,
}

impl AsciiMode {
    pub fn name(&self) -> &'static str {
        match self {
            AsciiMode::Category => "Category",
            AsciiMode::District => "District",
            AsciiMode::Archetype => "Archetype",
        }
    }

    /// Parse from string (for CLI)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "category" | "categories" => Some(AsciiMode::Category),
            "district" | "districts" => Some(AsciiMode::District),
            "archetype" | "archetypes" | "buildings" => Some(AsciiMode::Archetype),
            _ => None,
        }
    }

    pub fn all() -> &'static [AsciiMode] {
        &[AsciiMode::Category, AsciiMode::District, AsciiMode::Archetype]
    }
}

/// Get ASCII character for a category
pub fn category_char(category: Category) -> char {
    match category {
        Category::Road => '#',
        Category::Residential => 'h',
        Category::Park => '"',
        Category::Industrial => 'i',
        Category::Market => 'm',
        Category::Business => 'b',
    }
}

/// Get ASCII character for an archetype. Buildings use capitals so a mixed-use
/// district reads differently from its category view.
pub fn archetype_char(archetype: Archetype) -> char {
    match archetype {
        Archetype::Road => '#',
        Archetype::Residential => 'H',
        Archetype::Park => '"',
        Archetype::Industrial => 'I',
        Archetype::Market => 'M',
        Archetype::Business => 'B',
    }
}

/// Character for cells without a placement (silent roads).
const EMPTY_CHAR: char = '.';

/// Render the city as rows of characters, one row per y.
pub fn render_ascii_map(city: &City, mode: AsciiMode) -> String {
    let chars: Tilemap<char> = match mode {
        AsciiMode::Category => city.grid.map(|_, _, cell| category_char(cell.category)),
        AsciiMode::District => city.grid.map(|_, _, cell| category_char(cell.district)),
        AsciiMode::Archetype => {
            let mut map = Tilemap::new_with(city.width(), city.height(), EMPTY_CHAR);
            for placement in &city.placements {
                map.set(placement.coord.x, placement.coord.y, archetype_char(placement.archetype));
            }
            map
        }
    };

    let mut output = String::with_capacity((chars.width + 1) * chars.height);
    for y in 0..chars.height {
        for x in 0..chars.width {
            output.push(*chars.get(x, y));
        }
        output.push('\n');
    }
    output
}

/// Legend for category and district views
pub fn category_legend() -> String {
    let mut legend = String::from("Legend:\n");
    for &category in Category::all() {
        legend.push_str(&format!("  {} {}\n", category_char(category), category.display_name()));
    }
    legend
}

/// Legend for the archetype view
pub fn archetype_legend() -> String {
    let mut legend = String::from("Legend:\n");
    for &archetype in Archetype::all() {
        legend.push_str(&format!("  {} {}\n", archetype_char(archetype), archetype.display_name()));
    }
    legend.push_str(&format!("  {} (nothing placed)\n", EMPTY_CHAR));
    legend
}

/// Export a city report to a text file
pub fn export_city_report<P: AsRef<Path>>(city: &City, path: P, mode: AsciiMode) -> io::Result<()> {
    let mut file = File::create(path)?;
    let total = city.grid.len();

    // Header
    writeln!(file, "=== CITY GENERATOR REPORT ===")?;
    writeln!(file, "Seed: {}", city.seed)?;
    writeln!(file, "Generation: {}", city.generation)?;
    writeln!(file, "Size: {}x{}", city.width(), city.height())?;
    writeln!(file, "Metric: {}", city.metric)?;
    writeln!(file, "Sites: {}", city.sites.len())?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file)?;

    writeln!(file, "=== MAP ({} View) ===", mode.name())?;
    write!(file, "{}", render_ascii_map(city, mode))?;
    writeln!(file)?;

    match mode {
        AsciiMode::Archetype => write!(file, "{}", archetype_legend())?,
        _ => write!(file, "{}", category_legend())?,
    }
    writeln!(file)?;

    writeln!(file, "=== STATISTICS ===")?;
    writeln!(file, "Total cells: {}", total)?;
    writeln!(file, "Category Distribution:")?;
    let stats = city.category_counts();
    let mut sorted_stats: Vec<_> = stats.iter().collect();
    sorted_stats.sort_by(|a, b| b.1.cmp(a.1).then(a.0.display_name().cmp(b.0.display_name())));
    for (category, count) in sorted_stats {
        let pct = 100.0 * *count as f64 / total as f64;
        writeln!(file, "  {:12} {} {:>6} ({:>5.1}%)", category.display_name(), category_char(*category), count, pct)?;
    }
    writeln!(file)?;

    writeln!(file, "Archetype Distribution:")?;
    let stats = city.archetype_counts();
    let placed = city.placements.len().max(1);
    let mut sorted_stats: Vec<_> = stats.iter().collect();
    sorted_stats.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (archetype, count) in sorted_stats {
        let pct = 100.0 * *count as f64 / placed as f64;
        writeln!(file, "  {:12} {} {:>6} ({:>5.1}%)", archetype.display_name(), archetype_char(*archetype), count, pct)?;
    }

    writeln!(file)?;
    writeln!(file, "Sites:")?;
    for (i, site) in city.sites.iter().enumerate() {
        writeln!(file, "  {:>3}: ({}, {}) {}", i, site.coord.x, site.coord.y, site.category.display_name())?;
    }

    Ok(())
}
