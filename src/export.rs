use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::buildings::Placement;
use crate::generator::City;

/// Largest image the exporters will produce.
const MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// Marker colour for district sites on the district map.
const SITE_COLOR: [u8; 3] = [255, 0, 255];

/// Export errors
#[derive(Debug)]
pub enum ExportError {
    /// Image dimensions would exceed maximum allowed
    ImageTooLarge {
        requested_width: u32,
        requested_height: u32,
        max_pixels: u64,
    },
    /// Pixels per cell must be at least one
    ZeroScale,
    /// Failed to save image
    SaveFailed(String),
    /// Failed to write a text or JSON file
    Io(std::io::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::ImageTooLarge { requested_width, requested_height, max_pixels } => {
                write!(
                    f,
                    "Requested image size {}x{} ({} pixels) exceeds maximum {} pixels",
                    requested_width, requested_height,
                    *requested_width as u64 * *requested_height as u64,
                    max_pixels
                )
            }
            ExportError::ZeroScale => write!(f, "Image scale must be at least one pixel per cell"),
            ExportError::SaveFailed(msg) => write!(f, "Failed to save image: {}", msg),
            ExportError::Io(e) => write!(f, "Failed to write file: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

fn image_size(city: &City, scale: u32) -> Result<(u32, u32), ExportError> {
    if scale == 0 {
        return Err(ExportError::ZeroScale);
    }
    let scale = scale as u64;
    let w = city.width() as u64 * scale;
    let h = city.height() as u64 * scale;
    if w * h > MAX_PIXELS || w > u32::MAX as u64 || h > u32::MAX as u64 {
        return Err(ExportError::ImageTooLarge {
            requested_width: w.min(u32::MAX as u64) as u32,
            requested_height: h.min(u32::MAX as u64) as u32,
            max_pixels: MAX_PIXELS,
        });
    }
    Ok((w as u32, h as u32))
}

fn fill_cell(img: &mut RgbImage, x: usize, y: usize, scale: u32, color: [u8; 3]) {
    let cell_x = x as u32 * scale;
    let cell_y = y as u32 * scale;
    for py in 0..scale {
        for px in 0..scale {
            img.put_pixel(cell_x + px, cell_y + py, Rgb(color));
        }
    }
}

/// Render the final category map: each cell painted with its category colour
/// (roads black). `scale` is the number of pixels per cell side.
pub fn render_city_map(city: &City, scale: u32) -> Result<RgbImage, ExportError> {
    let (w, h) = image_size(city, scale)?;
    let mut img: RgbImage = ImageBuffer::new(w, h);

    for (x, y, cell) in city.grid.iter() {
        fill_cell(&mut img, x, y, scale, cell.category.color());
    }

    Ok(img)
}

/// Render the underlying districts (ignoring roads) with each site marked.
pub fn render_district_map(city: &City, scale: u32) -> Result<RgbImage, ExportError> {
    let (w, h) = image_size(city, scale)?;
    let mut img: RgbImage = ImageBuffer::new(w, h);

    for (x, y, cell) in city.grid.iter() {
        let color = cell.district.color();
        // Roads are drawn as a darker shade of their district
        let color = if cell.is_road() {
            [
                (color[0] as f32 * 0.6) as u8,
                (color[1] as f32 * 0.6) as u8,
                (color[2] as f32 * 0.6) as u8,
            ]
        } else {
            color
        };
        fill_cell(&mut img, x, y, scale, color);
    }

    for site in &city.sites {
        fill_cell(&mut img, site.coord.x, site.coord.y, scale, SITE_COLOR);
    }

    Ok(img)
}

/// Export the category map as a PNG.
pub fn export_city_map<P: AsRef<Path>>(city: &City, path: P, scale: u32) -> Result<(u32, u32), ExportError> {
    let img = render_city_map(city, scale)?;
    img.save(path.as_ref())
        .map_err(|e| ExportError::SaveFailed(e.to_string()))?;
    Ok(img.dimensions())
}

/// Export the district map as a PNG.
pub fn export_district_map<P: AsRef<Path>>(city: &City, path: P, scale: u32) -> Result<(u32, u32), ExportError> {
    let img = render_district_map(city, scale)?;
    img.save(path.as_ref())
        .map_err(|e| ExportError::SaveFailed(e.to_string()))?;
    Ok(img.dimensions())
}

/// Write the placement list as a JSON array.
pub fn export_placements_json<P: AsRef<Path>>(placements: &[Placement], path: P) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, placements)
        .map_err(|e| ExportError::Io(e.into()))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CityConfig, SiteCount};
    use crate::generator::CityGenerator;

    fn city() -> City {
        let config = CityConfig {
            width: 10,
            height: 7,
            sites: SiteCount::Fixed(4),
            seed: 5,
            block_size: 4,
            ..Default::default()
        };
        let mut generator = CityGenerator::configure(config).unwrap();
        generator.generate().unwrap().clone()
    }

    #[test]
    fn test_city_map_colors() {
        let city = city();
        let img = render_city_map(&city, 3).unwrap();
        assert_eq!(img.dimensions(), (30, 21));
        for (x, y, cell) in city.grid.iter() {
            let px = img.get_pixel(x as u32 * 3 + 1, y as u32 * 3 + 2);
            assert_eq!(px.0, cell.category.color());
        }
    }

    #[test]
    fn test_district_map_marks_sites() {
        let city = city();
        let img = render_district_map(&city, 1).unwrap();
        for site in &city.sites {
            assert_eq!(img.get_pixel(site.coord.x as u32, site.coord.y as u32).0, SITE_COLOR);
        }
    }

    #[test]
    fn test_rejects_huge_images() {
        let city = city();
        assert!(matches!(
            render_city_map(&city, 100_000),
            Err(ExportError::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_scale() {
        let city = city();
        assert!(matches!(render_city_map(&city, 0), Err(ExportError::ZeroScale)));
        assert!(matches!(render_district_map(&city, 0), Err(ExportError::ZeroScale)));
    }

    #[test]
    fn test_placements_json() {
        let city = city();
        let path = std::env::temp_dir().join(format!("city_placements_{}.json", std::process::id()));
        export_placements_json(&city.placements, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let parsed: Vec<Placement> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), city.placements.len());
        assert_eq!(parsed[0].coord, city.placements[0].coord);
    }
}
