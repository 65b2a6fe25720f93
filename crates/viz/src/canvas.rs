//! Grid canvas: one sprite per cell, coloured by move.

use bevy::prelude::*;

use pd_records::{CellSnapshot, Move};

use crate::controls::GRID_SIZE;
use crate::model_runner::{DashboardView, ModelRefreshed};

/// Canvas side length in pixels.
pub const CANVAS_PX: f32 = 500.0;
/// Canvas centre in world coordinates.
pub const CANVAS_CENTER: Vec2 = Vec2::new(-340.0, 0.0);

/// Plugin for the grid canvas.
pub struct CanvasPlugin;

impl Plugin for CanvasPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_cells)
            .add_systems(Update, paint_cells);
    }
}

/// Component for the sprite of one grid cell.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSprite {
    pub x: u32,
    pub y: u32,
}

/// Side length of a cell so the larger grid dimension fills the canvas
pub fn cell_size(width: u32, height: u32) -> f32 {
    CANVAS_PX / width.max(height).max(1) as f32
}

/// Centre of cell (x, y); y grows upwards
pub fn cell_translation(x: u32, y: u32, width: u32, height: u32) -> Vec2 {
    let size = cell_size(width, height);
    let half = Vec2::new(width as f32, height as f32) * size / 2.0;
    CANVAS_CENTER - half + Vec2::new((x as f32 + 0.5) * size, (y as f32 + 0.5) * size)
}

pub fn cell_color(cell: &CellSnapshot) -> Color {
    if !cell.alive {
        return Color::srgb(0.2, 0.2, 0.2);
    }
    match cell.current_move {
        Move::Cooperate => Color::srgb(0.2, 0.4, 0.9),
        Move::Defect => Color::srgb(0.9, 0.2, 0.2),
    }
}

fn spawn_cells(mut commands: Commands) {
    let size = cell_size(GRID_SIZE, GRID_SIZE);
    for x in 0..GRID_SIZE {
        for y in 0..GRID_SIZE {
            let position = cell_translation(x, y, GRID_SIZE, GRID_SIZE);
            commands.spawn((
                SpriteBundle {
                    sprite: Sprite {
                        color: Color::srgb(0.2, 0.2, 0.2),
                        // One pixel gap between cells
                        custom_size: Some(Vec2::splat(size - 1.0)),
                        ..default()
                    },
                    transform: Transform::from_xyz(position.x, position.y, 0.0),
                    ..default()
                },
                CellSprite { x, y },
            ));
        }
    }
}

/// System to recolour cells after the model changes.
fn paint_cells(
    view: Res<DashboardView>,
    mut events: EventReader<ModelRefreshed>,
    mut cells: Query<(&CellSprite, &mut Sprite)>,
) {
    if events.read().next().is_none() {
        return;
    }
    let Some(snapshot) = &view.snapshot else {
        return;
    };

    for (cell, mut sprite) in cells.iter_mut() {
        if let Some(state) = snapshot.cell(cell.x, cell.y) {
            sprite.color = cell_color(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_fill_canvas() {
        assert_eq!(cell_size(50, 50), 10.0);
        assert_eq!(cell_size(25, 50), 10.0);

        let first = cell_translation(0, 0, 50, 50);
        assert_eq!(first, Vec2::new(-585.0, -245.0));
        let last = cell_translation(49, 49, 50, 50);
        assert_eq!(last, Vec2::new(-95.0, 245.0));
    }

    #[test]
    fn test_cell_colors() {
        let mut cell = CellSnapshot {
            x: 0,
            y: 0,
            current_move: Move::Cooperate,
            score: 0.0,
            alive: true,
            friendly_neighbors: 0,
        };
        let blue = cell_color(&cell);
        cell.current_move = Move::Defect;
        let red = cell_color(&cell);
        cell.alive = false;
        let grey = cell_color(&cell);

        assert_ne!(blue, red);
        assert_ne!(red, grey);
        assert_eq!(grey, Color::srgb(0.2, 0.2, 0.2));
    }
}
