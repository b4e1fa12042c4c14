//! # Texture Designer
//!
//! A 16×16 raster editor producing reusable fill-pattern assets. The grid
//! matches the engine's native texture dimension, so a designed pattern
//! encodes directly to the RGBA layout the renderers consume.
//!
//! Tools: brush (set one pixel), fill (4-connected flood over the seed's
//! color), eyedropper (read one pixel back). Designed textures live in a
//! name-keyed library; inserting under an existing name silently replaces
//! the entry.

use std::collections::HashMap;
use std::io::Cursor;

use image::{ImageBuffer, Rgba};
use serde::{Deserialize, Serialize};

/// Side length of every designed texture, in pixels.
pub const TEXTURE_DIMENSION: usize = 16;

/// A 16×16 grid of RGBA pixels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelGrid {
    pixels: Vec<[u8; 4]>,
}

impl PixelGrid {
    /// Creates a grid filled with a single color.
    pub fn filled(color: [u8; 4]) -> Self {
        Self {
            pixels: vec![color; TEXTURE_DIMENSION * TEXTURE_DIMENSION],
        }
    }

    /// Creates a fully transparent grid.
    pub fn new() -> Self {
        Self::filled([0, 0, 0, 0])
    }

    /// Reads the pixel at (x, y); the eyedropper tool.
    ///
    /// # Panics
    /// Panics if the coordinates are outside the grid.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        assert!(x < TEXTURE_DIMENSION && y < TEXTURE_DIMENSION);
        self.pixels[y * TEXTURE_DIMENSION + x]
    }

    /// Sets the pixel at (x, y); the brush tool. Out-of-bounds strokes are
    /// ignored.
    pub fn brush(&mut self, x: usize, y: usize, color: [u8; 4]) {
        if x < TEXTURE_DIMENSION && y < TEXTURE_DIMENSION {
            self.pixels[y * TEXTURE_DIMENSION + x] = color;
        }
    }

    /// Flood-fills the 4-connected region containing (x, y); the fill
    /// tool. Filling with the region's existing color is a no-op.
    pub fn fill(&mut self, x: usize, y: usize, color: [u8; 4]) {
        if x >= TEXTURE_DIMENSION || y >= TEXTURE_DIMENSION {
            return;
        }
        let seed_color = self.pixel(x, y);
        if seed_color == color {
            return;
        }

        let mut frontier = vec![(x, y)];
        while let Some((px, py)) = frontier.pop() {
            if self.pixel(px, py) != seed_color {
                continue;
            }
            self.pixels[py * TEXTURE_DIMENSION + px] = color;
            if px > 0 {
                frontier.push((px - 1, py));
            }
            if px + 1 < TEXTURE_DIMENSION {
                frontier.push((px + 1, py));
            }
            if py > 0 {
                frontier.push((px, py - 1));
            }
            if py + 1 < TEXTURE_DIMENSION {
                frontier.push((px, py + 1));
            }
        }
    }

    /// Row-major RGBA bytes, the fill-pattern encoding both renderers
    /// consume.
    pub fn rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    /// The average color of the grid, used where a pattern has to resolve
    /// to a single material color.
    pub fn average_color(&self) -> [u8; 4] {
        let mut sums = [0u32; 4];
        for pixel in &self.pixels {
            for channel in 0..4 {
                sums[channel] += pixel[channel] as u32;
            }
        }
        let count = self.pixels.len() as u32;
        [
            (sums[0] / count) as u8,
            (sums[1] / count) as u8,
            (sums[2] / count) as u8,
            (sums[3] / count) as u8,
        ]
    }
}

impl Default for PixelGrid {
    fn default() -> Self {
        Self::new()
    }
}

/// A named designed texture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignedTexture {
    /// The library key.
    pub name: String,
    /// The pixel data.
    pub grid: PixelGrid,
}

impl DesignedTexture {
    /// Creates a texture with a uniformly filled grid.
    pub fn filled(name: &str, color: [u8; 4]) -> Self {
        Self {
            name: name.to_string(),
            grid: PixelGrid::filled(color),
        }
    }

    /// Encodes the grid as a PNG for export.
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let size = TEXTURE_DIMENSION as u32;
        let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_raw(size, size, self.grid.rgba_bytes())
                .expect("grid byte length matches dimensions");
        let mut bytes = Vec::new();
        buffer.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// The name-keyed registry of designed textures.
///
/// Owned by the engine with an explicit lifecycle; name collisions
/// overwrite the existing entry silently.
#[derive(Debug, Default)]
pub struct TextureLibrary {
    textures: HashMap<String, DesignedTexture>,
}

impl TextureLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a texture under its name, replacing any existing entry.
    pub fn insert(&mut self, texture: DesignedTexture) {
        self.textures.insert(texture.name.clone(), texture);
    }

    /// Looks up a texture by name.
    pub fn get(&self, name: &str) -> Option<&DesignedTexture> {
        self.textures.get(name)
    }

    /// Removes the entry with the given name.
    ///
    /// # Returns
    /// `true` if an entry was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.textures.remove(name).is_some()
    }

    /// The number of stored textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether the library is empty.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Iterates over the stored textures in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &DesignedTexture> {
        self.textures.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    #[test]
    fn brush_sets_one_pixel() {
        let mut grid = PixelGrid::filled(BLUE);
        grid.brush(3, 4, RED);
        assert_eq!(grid.pixel(3, 4), RED);
        assert_eq!(grid.pixel(4, 3), BLUE);
    }

    #[test]
    fn out_of_bounds_brush_is_ignored() {
        let mut grid = PixelGrid::filled(BLUE);
        grid.brush(TEXTURE_DIMENSION, 0, RED);
        assert!(grid.rgba_bytes().chunks(4).all(|p| p == BLUE));
    }

    #[test]
    fn fill_floods_connected_region_only() {
        let mut grid = PixelGrid::filled(BLUE);
        // Wall off the left column.
        for y in 0..TEXTURE_DIMENSION {
            grid.brush(1, y, RED);
        }
        grid.fill(8, 8, RED);

        // Right region flooded, left column sealed off but untouched.
        assert_eq!(grid.pixel(8, 8), RED);
        assert_eq!(grid.pixel(15, 0), RED);
        assert_eq!(grid.pixel(0, 0), BLUE);
    }

    #[test]
    fn fill_with_same_color_terminates() {
        let mut grid = PixelGrid::filled(BLUE);
        grid.fill(0, 0, BLUE);
        assert_eq!(grid.pixel(0, 0), BLUE);
    }

    #[test]
    fn library_overwrites_on_name_collision() {
        let mut library = TextureLibrary::new();
        library.insert(DesignedTexture::filled("bricks", RED));
        library.insert(DesignedTexture::filled("bricks", BLUE));
        assert_eq!(library.len(), 1);
        assert_eq!(library.get("bricks").unwrap().grid.pixel(0, 0), BLUE);
    }

    #[test]
    fn remove_by_name() {
        let mut library = TextureLibrary::new();
        library.insert(DesignedTexture::filled("bricks", RED));
        assert!(library.remove("bricks"));
        assert!(!library.remove("bricks"));
        assert!(library.is_empty());
    }

    #[test]
    fn average_color_of_uniform_grid_is_that_color() {
        let grid = PixelGrid::filled(RED);
        assert_eq!(grid.average_color(), RED);
    }

    #[test]
    fn png_export_produces_nonempty_encoding() {
        let texture = DesignedTexture::filled("bricks", RED);
        let png = texture.to_png().unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
