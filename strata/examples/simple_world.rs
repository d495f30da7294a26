//! A few turns of a tiny arena: movers drift across a spatial grid, enemies standing in the
//! same cell as the player lose health, and dead enemies are despawned.
//!
//! Run with `RUST_LOG=debug` to see the world's own logging.

use strata::{
    Component, World, slice,
    store::{CacheStore, Cell, MapStore, SetStore, Spatial, SpatialIndexStore, Store},
};

#[derive(Component, Clone, Copy, Debug, PartialEq)]
#[component(storage = SpatialIndexStore<MapStore<Self>>)]
struct Position {
    x: f32,
    y: f32,
}

impl Spatial for Position {
    fn location(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

#[derive(Component, Clone, Copy, Debug)]
#[component(storage = CacheStore<MapStore<Self>, 8>)]
struct Velocity {
    dx: f32,
    dy: f32,
}

#[derive(Component, Clone, Copy, Debug)]
struct Health(i32);

#[derive(Component, Clone, Copy, Default, Debug)]
#[component(storage = SetStore<Self>)]
struct Enemy;

#[derive(Component, Clone, Copy, Default, Debug)]
#[component(storage = SetStore<Self>)]
struct Player;

fn main() {
    pretty_env_logger::init();

    let world = World::builder()
        .with::<Position>(SpatialIndexStore::with_cell_size(MapStore::new(), 4.0))
        .with::<Velocity>(CacheStore::new(MapStore::new()))
        .with_default::<Health>()
        .with_default::<Enemy>()
        .with_default::<Player>()
        .require::<Position>()
        .build()
        .unwrap_or_else(|err| panic!("bad world wiring: {err}"));

    let player = world.spawn();
    world.store::<Player>().clone().write(player, Player);
    world
        .store::<Position>()
        .clone()
        .write(player, Position { x: 10.0, y: 10.0 });

    for i in 0..6 {
        let enemy = world.spawn();
        let offset = i as f32 * 3.0;
        world.store::<Enemy>().clone().write(enemy, Enemy);
        world.store::<Health>().clone().write(enemy, Health(3));
        world
            .store::<Position>()
            .clone()
            .write(enemy, Position { x: offset, y: 10.0 });
        world.store::<Velocity>().clone().write(enemy, Velocity { dx: 1.5, dy: 0.0 });
    }

    let mut movers = world.composite::<(Position, Velocity)>();
    let mut health = world.store::<Health>().clone();

    for turn in 1..=5 {
        // Everything with both a position and a velocity moves.
        let moving = slice::owners(&movers);
        slice::map_strict(&moving, &mut movers, |(p, v)| {
            (Position { x: p.x + v.dx, y: p.y + v.dy }, v)
        });

        // Enemies sharing the player's cell take damage.
        let Some(cell) = world.store::<Position>().borrow().cell_of(player) else {
            break;
        };
        let nearby = world.store::<Position>().borrow().entities_near(cell);
        let hit = slice::filter(&nearby, world.store::<Enemy>());
        slice::map_safe(&hit, &mut health, |_, hp| hp.map(|Health(hp)| Health(hp - 1)));

        // Despawn the dead.
        let enemies = slice::owners(world.store::<Enemy>());
        let mut dead = Vec::new();
        slice::for_each_safe(&enemies, &health, |e, hp| {
            if matches!(hp, Some(Health(hp)) if hp <= 0) {
                dead.push(e);
            }
        });
        for e in &dead {
            world.despawn(*e);
        }

        report(&world, turn, cell, dead.len());
    }

    let stats = world.store::<Velocity>().borrow().stats();
    println!(
        "velocity cache: {} hits, {} misses, {} evictions, hit rate {:.2}",
        stats.hits,
        stats.misses,
        stats.evictions,
        stats.hit_rate()
    );
}

fn report(world: &World, turn: u32, player_cell: Cell, despawned: usize) {
    let positions = world.store::<Position>().borrow();
    println!(
        "turn {turn}: player cell ({}, {}), {} enemies left, {despawned} despawned, occupied cells {:?}",
        player_cell.x,
        player_cell.y,
        world.store::<Enemy>().len(),
        positions
            .occupied_cells()
            .iter()
            .map(|c| (c.x, c.y))
            .collect::<Vec<_>>()
    );
}
