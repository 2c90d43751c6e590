//! Slippy-map tile addressing and the square tile grid rendered around a point.

use serde::{Deserialize, Serialize};

/// Tile edge length in pixels.
pub const TILE_SIZE: u32 = 256;

/// A tile coordinate (z/x/y).
///
/// Columns and rows are signed: a grid centred near the edge of the world
/// can address tiles that do not exist, and those simply fail to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: i64,
    /// Row (y)
    pub y: i64,
}

impl TileCoord {
    pub fn new(z: u32, x: i64, y: i64) -> Self {
        Self { z, x, y }
    }

    /// "z/x/y" path fragment used by XYZ tile URL templates.
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }

    /// Fill a URL template containing `{z}`, `{x}` and `{y}` placeholders.
    pub fn fill_template(&self, template: &str) -> String {
        template
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

/// A tile of a [`TileGrid`] together with where it lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTile {
    pub coord: TileCoord,
    /// Left edge of the destination rectangle in canvas pixels
    pub dest_x: u32,
    /// Top edge of the destination rectangle in canvas pixels
    pub dest_y: u32,
}

/// Square grid of `(2 * radius + 1)²` tiles centred on one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub center: TileCoord,
    /// Number of tiles to expand in each direction (1 = 3x3 grid, 2 = 5x5 grid)
    pub radius: u32,
}

impl TileGrid {
    pub fn new(center: TileCoord, radius: u32) -> Self {
        Self { center, radius }
    }

    /// Tiles along one side of the grid.
    pub fn side_tiles(&self) -> u32 {
        2 * self.radius + 1
    }

    /// Side length of the rendered canvas in pixels.
    pub fn canvas_size(&self) -> u32 {
        canvas_size(self.radius)
    }

    /// All tiles in row-major order (rows outer, columns inner).
    ///
    /// Cells whose tile coordinate falls outside `i64` are left out; their
    /// canvas area stays blank.
    pub fn tiles(&self) -> Vec<GridTile> {
        let r = self.radius as i64;
        let mut tiles = Vec::with_capacity((self.side_tiles() * self.side_tiles()) as usize);
        for dy in -r..=r {
            let Some(y) = self.center.y.checked_add(dy) else {
                continue;
            };
            for dx in -r..=r {
                let Some(x) = self.center.x.checked_add(dx) else {
                    continue;
                };
                tiles.push(GridTile {
                    coord: TileCoord {
                        z: self.center.z,
                        x,
                        y,
                    },
                    dest_x: ((dx + r) as u32) * TILE_SIZE,
                    dest_y: ((dy + r) as u32) * TILE_SIZE,
                });
            }
        }
        tiles
    }
}

/// Canvas side length for a tile radius: `(2 * radius + 1) * 256`.
pub fn canvas_size(tile_radius: u32) -> u32 {
    (2 * tile_radius + 1) * TILE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_size() {
        assert_eq!(canvas_size(0), 256);
        assert_eq!(canvas_size(1), 768);
        assert_eq!(canvas_size(2), 1280);
    }

    #[test]
    fn test_fill_template() {
        let coord = TileCoord::new(10, 909, 403);
        assert_eq!(
            coord.fill_template("https://tile.openstreetmap.org/{z}/{x}/{y}.png"),
            "https://tile.openstreetmap.org/10/909/403.png"
        );
        assert_eq!(coord.path(), "10/909/403");
    }

    #[test]
    fn test_grid_tiles_row_major() {
        let grid = TileGrid::new(TileCoord::new(10, 909, 403), 1);
        let tiles = grid.tiles();
        assert_eq!(tiles.len(), 9);

        assert_eq!(tiles[0].coord, TileCoord::new(10, 908, 402));
        assert_eq!((tiles[0].dest_x, tiles[0].dest_y), (0, 0));

        assert_eq!(tiles[1].coord, TileCoord::new(10, 909, 402));
        assert_eq!((tiles[1].dest_x, tiles[1].dest_y), (256, 0));

        assert_eq!(tiles[4].coord, grid.center);
        assert_eq!((tiles[4].dest_x, tiles[4].dest_y), (256, 256));

        assert_eq!(tiles[8].coord, TileCoord::new(10, 910, 404));
        assert_eq!((tiles[8].dest_x, tiles[8].dest_y), (512, 512));
    }

    #[test]
    fn test_grid_drops_tiles_past_i64_range() {
        let grid = TileGrid::new(TileCoord::new(10, i64::MAX, 5), 1);
        let tiles = grid.tiles();
        assert_eq!(tiles.len(), 6);
        assert_eq!(tiles[0].coord, TileCoord::new(10, i64::MAX - 1, 4));
        assert_eq!((tiles[0].dest_x, tiles[0].dest_y), (0, 0));
        assert_eq!(tiles[1].coord, TileCoord::new(10, i64::MAX, 4));
        assert_eq!((tiles[1].dest_x, tiles[1].dest_y), (256, 0));

        let grid = TileGrid::new(TileCoord::new(10, 0, i64::MIN), 2);
        let tiles = grid.tiles();
        assert_eq!(tiles.len(), 15);
        assert!(tiles.iter().all(|t| t.dest_y >= 512));
        assert_eq!(tiles[0].coord, TileCoord::new(10, -2, i64::MIN));
    }

    #[test]
    fn test_grid_radius_zero() {
        let grid = TileGrid::new(TileCoord::new(3, 0, 0), 0);
        let tiles = grid.tiles();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].dest_x, 0);
        assert_eq!(grid.canvas_size(), 256);
    }

    #[test]
    fn test_grid_can_address_negative_tiles() {
        let grid = TileGrid::new(TileCoord::new(0, 0, 0), 1);
        assert!(grid.tiles().iter().any(|t| t.coord.x == -1 && t.coord.y == -1));
    }
}
