//! Grid Resource
//!
//! Single-occupancy toroidal grid holding one agent per cell.

use bevy_ecs::prelude::*;

/// Resource: the cell layout of the model
#[derive(Resource, Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    /// Row-major, index = y * width + x
    cells: Vec<Option<Entity>>,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    /// Put an agent in an empty cell; returns false when the cell is taken
    /// or out of bounds
    pub fn place(&mut self, x: u32, y: u32, entity: Entity) -> bool {
        match self.index(x, y) {
            Some(i) if self.cells[i].is_none() => {
                self.cells[i] = Some(entity);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Entity> {
        self.index(x, y).and_then(|i| self.cells[i])
    }

    /// Moore neighborhood of radius 1 with wrap-around on both axes
    ///
    /// Visits dx in -1..=1 (outer) and dy in -1..=1 (inner). A coordinate
    /// reached twice on a narrow grid is kept once, at its first position.
    pub fn neighborhood(&self, x: u32, y: u32, include_center: bool) -> Vec<(u32, u32)> {
        let width = self.width as i64;
        let height = self.height as i64;
        let mut coords: Vec<(u32, u32)> = Vec::with_capacity(9);

        for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                if dx == 0 && dy == 0 && !include_center {
                    continue;
                }
                let nx = (x as i64 + dx).rem_euclid(width) as u32;
                let ny = (y as i64 + dy).rem_euclid(height) as u32;
                if !include_center && nx == x && ny == y {
                    continue;
                }
                if !coords.contains(&(nx, ny)) {
                    coords.push((nx, ny));
                }
            }
        }
        coords
    }

    /// Agents occupying the neighborhood, in neighborhood order
    pub fn neighbors(&self, x: u32, y: u32, include_center: bool) -> Vec<Entity> {
        self.neighborhood(x, y, include_center)
            .into_iter()
            .filter_map(|(nx, ny)| self.get(nx, ny))
            .collect()
    }
}
