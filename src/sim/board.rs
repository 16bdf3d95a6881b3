//! Pixel Board
//!
//! Fixed 80x80 grid of colors, the only mutable simulation state. Coordinates are
//! signed so rule footprints can hang past any edge; reads there yield the background.

use crate::model::{Color, BACKGROUND};

pub const WIDTH: usize = 80;
pub const HEIGHT: usize = 80;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pixels: Vec<Color>, // [HEIGHT * WIDTH], row-major, y = 0 is the top row
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Board {
            pixels: vec![BACKGROUND; WIDTH * HEIGHT],
        }
    }

    #[inline(always)]
    pub fn in_bounds(x: i32, y: i32) -> bool {
        (0..WIDTH as i32).contains(&x) && (0..HEIGHT as i32).contains(&y)
    }

    #[inline(always)]
    fn index(x: i32, y: i32) -> usize {
        y as usize * WIDTH + x as usize
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Color {
        if Self::in_bounds(x, y) {
            self.pixels[Self::index(x, y)]
        } else {
            BACKGROUND
        }
    }

    /// Write one pixel. Out-of-range writes are dropped; returns whether it landed.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Color) -> bool {
        if !Self::in_bounds(x, y) {
            return false;
        }
        let i = Self::index(x, y);
        self.pixels[i] = color;
        true
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Every cell as `(x, y, color)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Color)> + '_ {
        self.pixels
            .iter()
            .enumerate()
            .map(|(i, &c)| (i % WIDTH, i / WIDTH, c))
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }
}
