//! Infinite scrolling background from a fixed pool of tiles
//!
//! A small R×C grid of square tiles is positioned around the camera. As the
//! camera moves, every tile shifts the opposite way (scaled by the layer's
//! parallax ratio). When an outer column or row drifts past the edge of the
//! viewport it is rotated to the opposite side of the grid. Tiles are only
//! ever permuted and repositioned, never created or dropped, so the scroll
//! distance is unbounded while the tile count stays fixed.
//!
//! Coordinates are display units relative to the camera, y up. Row 0 is the
//! top row, column 0 the leftmost.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::check_finite;
use crate::error::{ConfigError, SimError};

/// Stable identity of a tile. Assigned row-major at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u32);

/// A background tile. Only its position is managed here; the host draws
/// whatever texture it associates with the id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub position: Vec2,
}

/// Which rotations fired during one `advance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapReport {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl WrapReport {
    pub fn any(&self) -> bool {
        self.left || self.right || self.up || self.down
    }

    pub fn count(&self) -> usize {
        [self.left, self.right, self.up, self.down]
            .iter()
            .filter(|&&b| b)
            .count()
    }
}

/// Visible area the grid must cover (display units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Result<Self, ConfigError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(ConfigError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width, self.height) / 2.0
    }
}

/// Toroidal grid of background tiles for one parallax layer
#[derive(Debug, Clone, Serialize)]
pub struct ScrollGrid {
    /// tiles[row][col]
    tiles: Vec<Vec<Tile>>,
    tile_size: f32,
    viewport: Viewport,
    scroll_ratio: f32,
}

impl ScrollGrid {
    /// Build a `rows`×`cols` grid centered on the anchor.
    ///
    /// Tile `[r][c]` starts at `((c - center_col) * S, (center_row - r) * S)`.
    /// A grid whose outer ring already lies past the wrap threshold would
    /// rotate while standing still, so it is rejected.
    pub fn new(
        rows: usize,
        cols: usize,
        tile_size: f32,
        viewport: Viewport,
        scroll_ratio: f32,
    ) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        validate_params(tile_size, scroll_ratio)?;

        let center_row = (rows - 1) as f32 / 2.0;
        let center_col = (cols - 1) as f32 / 2.0;

        let mut next_id = 0u32;
        let tiles = (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| {
                        let id = TileId(next_id);
                        next_id += 1;
                        Tile {
                            id,
                            position: Vec2::new(
                                (c as f32 - center_col) * tile_size,
                                (center_row - r as f32) * tile_size,
                            ),
                        }
                    })
                    .collect()
            })
            .collect();

        let grid = Self {
            tiles,
            tile_size,
            viewport,
            scroll_ratio,
        };
        grid.check_at_rest()?;

        log::debug!(
            "Built {rows}x{cols} scroll grid (tile {tile_size}, ratio {scroll_ratio})"
        );
        Ok(grid)
    }

    /// Build a grid from explicit tile positions (row-major, row 0 on top).
    ///
    /// Every position must be finite and inside the wrap threshold, the
    /// same resting condition [`ScrollGrid::new`] guarantees.
    pub fn from_positions(
        positions: Vec<Vec<Vec2>>,
        tile_size: f32,
        viewport: Viewport,
        scroll_ratio: f32,
    ) -> Result<Self, ConfigError> {
        let cols = positions.first().map(Vec::len).unwrap_or(0);
        if cols == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if let Some((row, found)) = positions
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != cols)
        {
            return Err(ConfigError::RaggedGrid {
                row,
                expected: cols,
                found,
            });
        }
        validate_params(tile_size, scroll_ratio)?;

        let mut next_id = 0u32;
        let tiles = positions
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|position| {
                        let id = TileId(next_id);
                        next_id += 1;
                        Tile { id, position }
                    })
                    .collect()
            })
            .collect();

        let grid = Self {
            tiles,
            tile_size,
            viewport,
            scroll_ratio,
        };
        grid.check_at_rest()?;
        Ok(grid)
    }

    /// Half extents past which an outer column or row wraps
    #[inline]
    fn wrap_limit(&self) -> Vec2 {
        self.viewport.half_extents() + Vec2::splat(self.tile_size / 2.0)
    }

    /// A zero advance must never rotate the grid.
    fn check_at_rest(&self) -> Result<(), ConfigError> {
        let limit = self.wrap_limit();
        for (row, col, tile) in self.tiles() {
            let p = tile.position;
            if !p.is_finite() {
                return Err(ConfigError::NonFiniteTilePosition { row, col });
            }
            if p.x.abs() > limit.x || p.y.abs() > limit.y {
                return Err(ConfigError::UnstableGrid {
                    row,
                    col,
                    x: p.x,
                    y: p.y,
                    width: self.viewport.width,
                    height: self.viewport.height,
                });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.tiles[0].len()
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    #[inline]
    pub fn scroll_ratio(&self) -> f32 {
        self.scroll_ratio
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn tile_at(&self, row: usize, col: usize) -> Option<&Tile> {
        self.tiles.get(row).and_then(|r| r.get(col))
    }

    /// All tiles in grid order: `(row, col, tile)`
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, &Tile)> {
        self.tiles
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, t)| (r, c, t)))
    }

    /// Tile ids in grid order
    pub fn ids(&self) -> Vec<TileId> {
        self.tiles().map(|(_, _, t)| t.id).collect()
    }

    /// Positions for the renderer, indexed by `TileId`
    pub fn positions(&self) -> Vec<Vec2> {
        let mut out = vec![Vec2::ZERO; self.rows() * self.cols()];
        for (_, _, tile) in self.tiles() {
            out[tile.id.0 as usize] = tile.position;
        }
        out
    }

    /// Scroll by the anchor's frame-to-frame displacement.
    ///
    /// Shifts every tile by `-delta * scroll_ratio`, then runs the four wrap
    /// checks in order: left, right, up, down. Each check sees the positions
    /// left by the previous one and fires at most once per call.
    ///
    /// A delta that would leave any tile non-finite is rejected before the
    /// grid is touched.
    pub fn advance(&mut self, delta: Vec2) -> Result<WrapReport, SimError> {
        let shift = self.checked_shift(delta)?;
        for tile in self.tiles.iter_mut().flatten() {
            tile.position += shift;
        }

        let limit = self.wrap_limit();
        let last_col = self.cols() - 1;
        let last_row = self.rows() - 1;
        let mut report = WrapReport::default();

        if self.tiles[0][0].position.x < -limit.x {
            report.left = self.rotate_left();
        }
        if self.tiles[0][last_col].position.x > limit.x {
            report.right = self.rotate_right();
        }
        if self.tiles[0][0].position.y > limit.y {
            report.up = self.rotate_up();
        }
        if self.tiles[last_row][0].position.y < -limit.y {
            report.down = self.rotate_down();
        }

        if report.any() {
            log::trace!("Scroll grid wrapped: {report:?}");
        }
        Ok(report)
    }

    /// Per-tile shift for `delta`
    fn checked_shift(&self, delta: Vec2) -> Result<Vec2, SimError> {
        check_finite("scroll delta", delta)?;
        let shift = -delta * self.scroll_ratio;
        for tile in self.tiles.iter().flatten() {
            check_finite("tile position", tile.position + shift)?;
        }
        Ok(shift)
    }

    /// Leftmost column moves to the right edge.
    fn rotate_left(&mut self) -> bool {
        let cols = self.cols();
        if cols < 2 {
            return false;
        }
        for row in &mut self.tiles {
            row.rotate_left(1);
            let x = row[cols - 2].position.x + self.tile_size;
            row[cols - 1].position.x = x;
        }
        true
    }

    /// Rightmost column moves to the left edge.
    fn rotate_right(&mut self) -> bool {
        if self.cols() < 2 {
            return false;
        }
        for row in &mut self.tiles {
            row.rotate_right(1);
            let x = row[1].position.x - self.tile_size;
            row[0].position.x = x;
        }
        true
    }

    /// Top row moves below the bottom row.
    fn rotate_up(&mut self) -> bool {
        let rows = self.rows();
        if rows < 2 {
            return false;
        }
        self.tiles.rotate_left(1);
        let y = self.tiles[rows - 2][0].position.y - self.tile_size;
        for tile in &mut self.tiles[rows - 1] {
            tile.position.y = y;
        }
        true
    }

    /// Bottom row moves above the top row.
    fn rotate_down(&mut self) -> bool {
        if self.rows() < 2 {
            return false;
        }
        self.tiles.rotate_right(1);
        let y = self.tiles[1][0].position.y + self.tile_size;
        for tile in &mut self.tiles[0] {
            tile.position.y = y;
        }
        true
    }
}

fn validate_params(tile_size: f32, scroll_ratio: f32) -> Result<(), ConfigError> {
    if !tile_size.is_finite() || tile_size <= 0.0 {
        return Err(ConfigError::NonPositiveTileSize(tile_size));
    }
    if !scroll_ratio.is_finite() || scroll_ratio < 0.0 {
        return Err(ConfigError::InvalidScrollRatio(scroll_ratio));
    }
    Ok(())
}

/// Which wraps fired per layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallaxWraps {
    pub mid: WrapReport,
    pub close: WrapReport,
}

/// Two background layers scrolling at different rates for depth
#[derive(Debug, Clone, Serialize)]
pub struct ParallaxBackground {
    pub mid: ScrollGrid,
    pub close: ScrollGrid,
}

impl ParallaxBackground {
    pub fn new(
        rows: usize,
        cols: usize,
        tile_size: f32,
        viewport: Viewport,
        ratio_mid: f32,
        ratio_close: f32,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            mid: ScrollGrid::new(rows, cols, tile_size, viewport, ratio_mid)?,
            close: ScrollGrid::new(rows, cols, tile_size, viewport, ratio_close)?,
        })
    }

    /// Whether `advance(delta)` would succeed on both layers
    pub fn check_advance(&self, delta: Vec2) -> Result<(), SimError> {
        self.mid.checked_shift(delta)?;
        self.close.checked_shift(delta)?;
        Ok(())
    }

    /// Scroll both layers, or neither if either would reject `delta`
    pub fn advance(&mut self, delta: Vec2) -> Result<ParallaxWraps, SimError> {
        self.check_advance(delta)?;
        Ok(ParallaxWraps {
            mid: self.mid.advance(delta)?,
            close: self.close.advance(delta)?,
        })
    }
}
