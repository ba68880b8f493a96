use serde::{Deserialize, Serialize};

/// District classification of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Carved street. Never chosen as a site category.
    Road,
    Residential,
    Park,
    Industrial,
    Market,
    Business,
}

impl Category {
    /// Every district category a site may carry, in draw order.
    pub const DISTRICTS: [Category; 5] = [
        Category::Residential,
        Category::Park,
        Category::Industrial,
        Category::Market,
        Category::Business,
    ];

    /// District categories when parks are disabled, in draw order.
    pub const DISTRICTS_WITHOUT_PARKS: [Category; 4] = [
        Category::Residential,
        Category::Industrial,
        Category::Market,
        Category::Business,
    ];

    /// Parse from string (for CLI)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "road" | "street" => Some(Self::Road),
            "residential" | "housing" => Some(Self::Residential),
            "park" | "green" => Some(Self::Park),
            "industrial" | "industry" => Some(Self::Industrial),
            "market" => Some(Self::Market),
            "business" | "office" => Some(Self::Business),
            _ => None,
        }
    }

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

    pub fn is_road(&self) -> bool {
        *self == Self::Road
    }

    /// Mixed-use districts resolve to one of several archetypes.
    pub fn is_mixed_use(&self) -> bool {
        matches!(self, Self::Market | Self::Business)
    }

    /// Map colour used by the PNG exporter.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Road => [0, 0, 0],
            Self::Residential => [255, 255, 255],
            Self::Park => [0, 255, 0],
            Self::Industrial => [255, 0, 0],
            Self::Market => [255, 235, 4],
            Self::Business => [128, 128, 128],
        }
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

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name().to_lowercase())
    }
}

/// A position on the city grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for Coord {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

/// Distance function used to find the nearest site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Straight-line distance.
    #[default]
    Euclidean,
    /// Sum of absolute coordinate differences.
    Manhattan,
}

impl DistanceMetric {
    /// Parse from string (for CLI)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "euclidean" | "euclid" | "l2" => Some(Self::Euclidean),
            "manhattan" | "taxicab" | "l1" => Some(Self::Manhattan),
            _ => None,
        }
    }

    pub fn distance(&self, a: Coord, b: Coord) -> f64 {
        let dx = a.x.abs_diff(b.x) as f64;
        let dy = a.y.abs_diff(b.y) as f64;
        match self {
            Self::Euclidean => (dx * dx + dy * dy).sqrt(),
            Self::Manhattan => dx + dy,
        }
    }

    /// The other metric.
    pub fn toggled(&self) -> Self {
        match self {
            Self::Euclidean => Self::Manhattan,
            Self::Manhattan => Self::Euclidean,
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Euclidean => write!(f, "euclidean"),
            Self::Manhattan => write!(f, "manhattan"),
        }
    }
}

/// Seed point defining one district's centre of influence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub coord: Coord,
    pub category: Category,
}

impl Site {
    pub fn new(coord: Coord, category: Category) -> Self {
        debug_assert!(!category.is_road(), "sites never carry the road category");
        Self { coord, category }
    }
}

/// One classified grid position.
///
/// `district` is the nearest site's category and never changes after
/// partitioning. `category` is the published classification: either the
/// district or `Road`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub district: Category,
    pub category: Category,
}

impl Cell {
    pub fn new(district: Category) -> Self {
        Self {
            district,
            category: district,
        }
    }

    pub fn is_road(&self) -> bool {
        self.category.is_road()
    }

    pub fn as_road(self) -> Self {
        Self {
            category: Category::Road,
            ..self
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(Category::Residential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let a = Coord::new(1, 1);
        let b = Coord::new(4, 5);
        assert_eq!(DistanceMetric::Manhattan.distance(a, b), 7.0);
        assert!((DistanceMetric::Euclidean.distance(a, b) - 5.0).abs() < 1e-9);
        assert_eq!(DistanceMetric::Euclidean.distance(b, a), DistanceMetric::Euclidean.distance(a, b));
        assert_eq!(DistanceMetric::Manhattan.distance(a, a), 0.0);
    }

    #[test]
    fn test_metric_toggle_and_parse() {
        assert_eq!(DistanceMetric::Euclidean.toggled(), DistanceMetric::Manhattan);
        assert_eq!(DistanceMetric::Manhattan.toggled(), DistanceMetric::Euclidean);
        assert_eq!(DistanceMetric::from_str("L1"), Some(DistanceMetric::Manhattan));
        assert_eq!(DistanceMetric::from_str("chebyshev"), None);
    }

    #[test]
    fn test_district_sets_exclude_road() {
        assert!(!Category::DISTRICTS.contains(&Category::Road));
        assert!(!Category::DISTRICTS_WITHOUT_PARKS.contains(&Category::Park));
        assert_eq!(Category::from_str("Park"), Some(Category::Park));
    }

    #[test]
    fn test_cell_as_road_keeps_district() {
        let cell = Cell::new(Category::Market).as_road();
        assert!(cell.is_road());
        assert_eq!(cell.district, Category::Market);
    }
}
