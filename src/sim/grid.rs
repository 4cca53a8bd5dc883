//! Dirt/tunnel tile field
//!
//! The grid is the leaf of the simulation: every entity reads it, the player
//! carves it, and a level reset refills it. Coordinates are signed so that
//! neighbour candidates can step off the edge and be filtered with
//! [`Grid::contains`] before any read.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{GRID_HEIGHT, GRID_WIDTH};

/// Cardinal facing / movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step (dx, dy); y grows downward
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// A tile coordinate (column, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell `distance` tiles away along `dir`
    pub fn step(self, dir: Direction, distance: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx * distance, self.y + dy * distance)
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Cell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// King-move distance (diagonal steps allowed)
    pub fn chebyshev(self, other: Cell) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Tile origin as a continuous position (render space)
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    /// Tile containing a continuous position
    pub fn floor_of(pos: Vec2) -> Self {
        Self::new(pos.x.floor() as i32, pos.y.floor() as i32)
    }
}

/// Fixed-size dirt field: `true` means the tile still holds dirt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: Vec<bool>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub const WIDTH: i32 = GRID_WIDTH;
    pub const HEIGHT: i32 = GRID_HEIGHT;

    /// A grid full of dirt
    pub fn new() -> Self {
        Self {
            cells: vec![true; (GRID_WIDTH * GRID_HEIGHT) as usize],
        }
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < GRID_WIDTH && cell.y >= 0 && cell.y < GRID_HEIGHT
    }

    #[inline]
    fn index(cell: Cell) -> usize {
        (cell.y * GRID_WIDTH + cell.x) as usize
    }

    /// Whether the tile holds dirt. Callers bounds-check first.
    pub fn has_dirt(&self, cell: Cell) -> bool {
        debug_assert!(self.contains(cell), "grid read out of bounds: {cell:?}");
        if !self.contains(cell) {
            return false;
        }
        self.cells[Self::index(cell)]
    }

    /// Whether the tile is a carved tunnel. Callers bounds-check first.
    pub fn is_tunnel(&self, cell: Cell) -> bool {
        !self.has_dirt(cell)
    }

    /// Dig out a tile. Returns true if it held dirt.
    pub fn clear(&mut self, cell: Cell) -> bool {
        debug_assert!(self.contains(cell), "grid write out of bounds: {cell:?}");
        if !self.contains(cell) {
            return false;
        }
        let idx = Self::index(cell);
        std::mem::replace(&mut self.cells[idx], false)
    }

    /// Refill every tile with dirt
    pub fn reset_full(&mut self) {
        self.cells.fill(true);
    }

    /// Number of carved tiles
    pub fn tunnel_count(&self) -> usize {
        self.cells.iter().filter(|&&dirt| !dirt).count()
    }

    /// All in-bounds cells, row-major
    pub fn cells() -> impl Iterator<Item = Cell> {
        (0..GRID_HEIGHT).flat_map(|y| (0..GRID_WIDTH).map(move |x| Cell::new(x, y)))
    }

    /// In-bounds cardinal neighbours of a cell, with the direction that reaches them
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = (Direction, Cell)> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |dir| (dir, cell.step(dir, 1)))
            .filter(|&(_, n)| self.contains(n))
    }

    /// Carve a horizontal run of `length` tiles centred on `center`, clipped to the grid
    pub fn carve_horizontal(&mut self, center: Cell, length: i32) {
        if center.y < 0 || center.y >= GRID_HEIGHT {
            return;
        }
        let start = (center.x - length / 2).max(0);
        let end = (start + length - 1).min(GRID_WIDTH - 1);
        for x in start..=end {
            self.clear(Cell::new(x, center.y));
        }
    }

    /// Carve a vertical run of `length` tiles centred on `center`, clipped to the grid
    pub fn carve_vertical(&mut self, center: Cell, length: i32) {
        if center.x < 0 || center.x >= GRID_WIDTH {
            return;
        }
        let start = (center.y - length / 2).max(0);
        let end = (start + length - 1).min(GRID_HEIGHT - 1);
        for y in start..=end {
            self.clear(Cell::new(center.x, y));
        }
    }
}
