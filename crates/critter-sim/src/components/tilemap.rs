//! Static tile grid that agents collide with.
//!
//! Tiles are stored in row-major order: index = y * width + x. World y grows
//! downward, so a tile's top surface is its smallest y. The grid is built once
//! from level data and only read while the simulation runs.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::api::config::ConfigError;

/// A single tile in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Tile id from the level data (index into the tile atlas).
    pub id: u32,
    /// Whether agents land on this tile.
    pub solid: bool,
}

impl Tile {
    pub fn solid(id: u32) -> Self {
        Self { id, solid: true }
    }

    pub fn decoration(id: u32) -> Self {
        Self { id, solid: false }
    }
}

/// Axis-aligned rectangle in world pixels, half-open: `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub min: IVec2,
    pub max: IVec2,
}

impl Rect {
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    pub fn from_pos_size(pos: IVec2, size: IVec2) -> Self {
        Self {
            min: pos,
            max: pos.saturating_add(size),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Result of a collision query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionInfo {
    /// World y of the top surface of the topmost overlapping solid tile.
    pub surface_y: i32,
    /// Grid coordinates of the tile that produced the surface (leftmost on that row).
    pub tile: (u32, u32),
}

/// Inclusive range of tile ids treated as solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidRange {
    pub first: u32,
    pub last: u32,
}

impl SolidRange {
    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    pub fn contains(&self, id: u32) -> bool {
        id >= self.first && id <= self.last
    }
}

/// Level data as authored: flat tile-id layers plus the solid id ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDesc {
    /// Tiles per row in every layer.
    pub columns: u32,
    /// Edge length of a tile in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: i32,
    /// World position of the top-left corner of tile (0, 0).
    #[serde(default)]
    pub origin: [i32; 2],
    /// Row-major tile ids; 0 is empty. Later layers draw over earlier ones.
    pub layers: Vec<Vec<u32>>,
    #[serde(default)]
    pub solid: Vec<SolidRange>,
}

fn default_tile_size() -> i32 {
    16
}

impl LevelDesc {
    /// Parse level data from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the collision grid for this level.
    pub fn build(&self) -> Result<TileGrid, ConfigError> {
        TileGrid::from_layers(&self.layers, self.columns, self.tile_size, &self.solid)
            .map(|grid| grid.with_origin(IVec2::from(self.origin)))
    }
}

/// Grid of tiles answering collision queries.
#[derive(Debug, Clone)]
pub struct TileGrid {
    /// Width of the grid in tiles.
    pub width: u32,
    /// Height of the grid in tiles.
    pub height: u32,
    /// Edge length of each tile in pixels.
    pub tile_size: i32,
    /// World position of the top-left corner of tile (0, 0).
    pub origin: IVec2,
    tiles: Vec<Option<Tile>>,
}

impl TileGrid {
    /// Create an empty grid.
    pub fn new(width: u32, height: u32, tile_size: i32) -> Self {
        let count = (width * height) as usize;
        Self {
            width,
            height,
            tile_size: tile_size.max(1),
            origin: IVec2::ZERO,
            tiles: vec![None; count],
        }
    }

    /// Set the world-space origin (top-left corner).
    pub fn with_origin(mut self, origin: IVec2) -> Self {
        self.origin = origin;
        self
    }

    /// Build a grid from flat layers of tile ids.
    ///
    /// All layers share `columns`; the grid is as tall as the tallest layer.
    /// Id 0 leaves a cell untouched, so a later layer only overrides the
    /// cells it actually paints.
    pub fn from_layers(
        layers: &[Vec<u32>],
        columns: u32,
        tile_size: i32,
        solid: &[SolidRange],
    ) -> Result<Self, ConfigError> {
        if columns == 0 {
            return Err(ConfigError::Invalid("level must have at least one column"));
        }
        if tile_size <= 0 {
            return Err(ConfigError::Invalid("tile_size must be positive"));
        }
        for (layer, ids) in layers.iter().enumerate() {
            if ids.len() % columns as usize != 0 {
                return Err(ConfigError::Layer { layer, len: ids.len(), columns });
            }
        }

        let rows = layers
            .iter()
            .map(|ids| ids.len() / columns as usize)
            .max()
            .unwrap_or(0) as u32;
        let mut grid = Self::new(columns, rows, tile_size);
        for ids in layers {
            for (i, &id) in ids.iter().enumerate() {
                if id == 0 {
                    continue;
                }
                let x = i as u32 % columns;
                let y = i as u32 / columns;
                let is_solid = solid.iter().any(|range| range.contains(id));
                grid.set(x, y, Some(Tile { id, solid: is_solid }));
            }
        }

        log::info!(
            "tile grid built: {}x{} tiles, {} solid",
            grid.width,
            grid.height,
            grid.solid_count()
        );
        Ok(grid)
    }

    /// Get a tile at grid position (x, y).
    pub fn get(&self, x: u32, y: u32) -> Option<&Tile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles[(y * self.width + x) as usize].as_ref()
    }

    /// Set a tile at grid position (x, y). World building only.
    pub fn set(&mut self, x: u32, y: u32, tile: Option<Tile>) {
        if x < self.width && y < self.height {
            self.tiles[(y * self.width + x) as usize] = tile;
        }
    }

    /// Fill a rectangular region with a tile.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, tile: Option<Tile>) {
        for ty in y..(y + h).min(self.height) {
            for tx in x..(x + w).min(self.width) {
                self.set(tx, ty, tile);
            }
        }
    }

    /// World rectangle covered by the cell at (x, y).
    pub fn tile_rect(&self, x: u32, y: u32) -> Rect {
        let min = self.origin + IVec2::new(x as i32, y as i32) * self.tile_size;
        Rect::from_pos_size(min, IVec2::splat(self.tile_size))
    }

    /// World-space bounds of the grid.
    pub fn bounds(&self) -> Rect {
        let size = IVec2::new(self.width as i32, self.height as i32) * self.tile_size;
        Rect::from_pos_size(self.origin, size)
    }

    /// Column range `[start, end)` and row range of cells a rectangle touches,
    /// clipped to the grid.
    fn cell_span(&self, bounds: &Rect) -> Option<((u32, u32), (u32, u32))> {
        if bounds.is_empty() {
            return None;
        }
        let ts = self.tile_size;
        let local_min = bounds.min.saturating_sub(self.origin);
        let local_max = bounds.max.saturating_sub(self.origin);

        let clip = |v: i32, limit: u32| v.clamp(0, limit as i32) as u32;
        let x0 = clip(local_min.x.div_euclid(ts), self.width);
        let y0 = clip(local_min.y.div_euclid(ts), self.height);
        let x1 = clip(local_max.x.saturating_add(ts - 1).div_euclid(ts), self.width);
        let y1 = clip(local_max.y.saturating_add(ts - 1).div_euclid(ts), self.height);

        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(((x0, x1), (y0, y1)))
    }

    /// Test a rectangle against every solid tile it overlaps.
    ///
    /// When several solid tiles overlap, the topmost surface wins, so an agent
    /// straddling a step is lifted onto the higher tile rather than sinking.
    pub fn collides(&self, bounds: &Rect) -> Option<CollisionInfo> {
        let ((x0, x1), (y0, y1)) = self.cell_span(bounds)?;
        // Rows are scanned top-down, the first solid row is the topmost surface.
        for ty in y0..y1 {
            for tx in x0..x1 {
                if self.get(tx, ty).is_some_and(|t| t.solid) {
                    return Some(CollisionInfo {
                        surface_y: self.tile_rect(tx, ty).min.y,
                        tile: (tx, ty),
                    });
                }
            }
        }
        None
    }

    /// Top surface of the first solid tile in the column under `x`, at or below `from_y`.
    pub fn surface_below(&self, x: i32, from_y: i32) -> Option<i32> {
        let probe = Rect::new(
            IVec2::new(x, from_y),
            IVec2::new(
                x.saturating_add(1),
                self.bounds().max.y.max(from_y.saturating_add(1)),
            ),
        );
        let ((x0, x1), (y0, y1)) = self.cell_span(&probe)?;
        (y0..y1).find_map(|ty| {
            (x0..x1)
                .any(|tx| self.get(tx, ty).is_some_and(|t| t.solid))
                .then(|| self.tile_rect(x0, ty).min.y)
        })
    }

    /// Count of solid tiles.
    pub fn solid_count(&self) -> usize {
        self.tiles.iter().flatten().filter(|t| t.solid).count()
    }

    /// Count of non-empty tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }
}
