//! Model Setup
//!
//! Spawns one agent per grid cell and links each agent to its neighbors.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;

use pd_records::Move;

use crate::components::{AgentBundle, Grid, GridPos, Neighborhood};

/// Pick a starting move with equal odds
pub fn random_move(rng: &mut SmallRng) -> Move {
    if rng.gen_bool(0.5) {
        Move::Cooperate
    } else {
        Move::Defect
    }
}

/// Spawn agents over the whole grid, x outer and y inner
///
/// Returns the entities in creation order, which is the sequential
/// activation order.
pub fn spawn_agents(
    world: &mut World,
    width: u32,
    height: u32,
    mut initial_move: impl FnMut(u32, u32) -> Move,
) -> Vec<Entity> {
    let mut grid = Grid::new(width, height);
    let mut order = Vec::with_capacity(width as usize * height as usize);

    for x in 0..width {
        for y in 0..height {
            let entity = world.spawn(AgentBundle::new(x, y, initial_move(x, y))).id();
            // Fresh grid, every cell is visited once
            grid.place(x, y, entity);
            order.push(entity);
        }
    }

    world.insert_resource(grid);
    link_neighborhoods(world);
    order
}

/// Fill every agent's cached neighborhood from the grid
pub fn link_neighborhoods(world: &mut World) {
    let Some(grid) = world.get_resource::<Grid>().cloned() else {
        return;
    };

    let mut query = world.query::<(&GridPos, &mut Neighborhood)>();
    for (position, mut neighborhood) in query.iter_mut(world) {
        neighborhood.with_center = grid.neighbors(position.x, position.y, true);
        neighborhood.around = grid.neighbors(position.x, position.y, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_fills_grid_in_order() {
        let mut world = World::new();
        let order = spawn_agents(&mut world, 3, 2, |_, _| Move::Cooperate);
        assert_eq!(order.len(), 6);

        let grid = world.resource::<Grid>();
        assert_eq!(grid.get(0, 0), Some(order[0]));
        assert_eq!(grid.get(0, 1), Some(order[1]));
        assert_eq!(grid.get(1, 0), Some(order[2]));

        let position = world.get::<GridPos>(order[5]).unwrap();
        assert_eq!(*position, GridPos::new(2, 1));
    }

    #[test]
    fn test_neighborhoods_are_linked() {
        let mut world = World::new();
        let order = spawn_agents(&mut world, 3, 3, |_, _| Move::Defect);

        let neighborhood = world.get::<Neighborhood>(order[4]).unwrap();
        assert_eq!(neighborhood.with_center.len(), 9);
        assert_eq!(neighborhood.around.len(), 8);
        assert!(neighborhood.with_center.contains(&order[4]));
        assert!(!neighborhood.around.contains(&order[4]));
    }

    #[test]
    fn test_random_move_is_seeded() {
        let mut rng1 = SmallRng::seed_from_u64(5);
        let mut rng2 = SmallRng::seed_from_u64(5);
        let a: Vec<Move> = (0..32).map(|_| random_move(&mut rng1)).collect();
        let b: Vec<Move> = (0..32).map(|_| random_move(&mut rng2)).collect();
        assert_eq!(a, b);
        assert!(a.contains(&Move::Cooperate));
        assert!(a.contains(&Move::Defect));
    }
}
