//! Arena benchmark scenario.
//!
//! Simulates a bounded arena with:
//! - NPCs that wander, with health and team affiliation
//! - Enemies, a tagged subset of the NPCs
//! - Projectiles with short lifetimes that damage everything in their grid cell
//!
//! This scenario tests:
//! - Composite iteration over stores of very different sizes
//! - Spatial index upkeep under constant movement
//! - Cache behavior of a frequently written component
//! - Despawn and id reuse churn

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata::{Entity, World, slice, store::Store};

use crate::components::{Enemy, Health, Lifetime, Position, Projectile, Team, Velocity};
use crate::scenarios::Scenario;

/// Half the arena's side length.
const EXTENT: f32 = 500.0;

/// System: Apply velocity to position, bouncing off the arena walls.
fn system_movement(world: &World, dt: f32) {
    let mut movers = world.composite::<(Position, Velocity)>();
    let moving = slice::owners(&movers);
    slice::map_strict(&moving, &mut movers, |(mut pos, mut vel)| {
        pos.x += vel.x * dt;
        pos.y += vel.y * dt;
        if pos.x.abs() > EXTENT {
            vel.x = -vel.x;
            pos.x = pos.x.clamp(-EXTENT, EXTENT);
        }
        if pos.y.abs() > EXTENT {
            vel.y = -vel.y;
            pos.y = pos.y.clamp(-EXTENT, EXTENT);
        }
        (pos, vel)
    });
}

/// System: Projectiles damage every other entity with health in their cell.
fn system_combat(world: &World) {
    let projectiles = slice::owners(world.store::<Projectile>());
    let positions = world.store::<Position>();
    let mut health = world.store::<Health>().clone();

    for projectile in projectiles {
        let Some(cell) = positions.borrow().cell_of(projectile) else {
            continue;
        };
        let targets = slice::filter(&positions.borrow().entities_near(cell), &health);
        slice::map_safe(&targets, &mut health, |target, hp| {
            if target == projectile {
                return None;
            }
            hp.map(|hp| Health {
                current: hp.current - 1.0,
                ..hp
            })
        });
    }
}

/// System: Decay lifetimes and collect what expired or died.
fn system_expire(world: &World, dt: f32) -> Vec<Entity> {
    let mut dead = Vec::new();

    let mut lifetimes = world.store::<Lifetime>().clone();
    let aging = slice::owners(&lifetimes);
    slice::map_strict(&aging, &mut lifetimes, |lifetime| Lifetime {
        remaining: lifetime.remaining - dt,
    });
    slice::for_each_strict(&aging, &lifetimes, |entity, lifetime| {
        if lifetime.remaining <= 0.0 {
            dead.push(entity);
        }
    });

    let living = slice::owners(world.store::<Health>());
    slice::for_each_strict(&living, world.store::<Health>(), |entity, health| {
        if health.current <= 0.0 {
            dead.push(entity);
        }
    });

    dead
}

/// Configuration for the arena benchmark.
#[derive(Clone)]
pub struct ArenaConfig {
    /// Number of NPC entities.
    pub npc_count: usize,
    /// Every `enemy_every`-th NPC is tagged as an enemy.
    pub enemy_every: usize,
    /// Number of live projectiles, replenished every frame.
    pub projectile_count: usize,
    /// Spatial grid cell size.
    pub cell_size: f32,
    /// Simulated delta time per frame.
    pub delta_time: f32,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            npc_count: 5_000,
            enemy_every: 10,
            projectile_count: 500,
            cell_size: 25.0,
            delta_time: 1.0 / 60.0,
            seed: 54321,
        }
    }
}

/// Arena benchmark scenario.
pub struct ArenaScenario {
    config: ArenaConfig,
    world: World,
    rng: ChaCha8Rng,
}

impl ArenaScenario {
    /// Create a new arena scenario with default config.
    pub fn new() -> Self {
        Self::with_config(ArenaConfig::default())
    }

    /// Create a new arena scenario with custom config.
    pub fn with_config(config: ArenaConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            world: build_world(config.cell_size),
            config,
        }
    }

    /// The world under test.
    pub fn world(&self) -> &World {
        &self.world
    }

    fn random_position(&mut self) -> Position {
        Position {
            x: self.rng.gen_range(-EXTENT..EXTENT),
            y: self.rng.gen_range(-EXTENT..EXTENT),
        }
    }

    fn random_velocity(&mut self, speed: f32) -> Velocity {
        Velocity {
            x: self.rng.gen_range(-speed..speed),
            y: self.rng.gen_range(-speed..speed),
        }
    }

    fn spawn_npc(&mut self, enemy: bool) -> Entity {
        let entity = self.world.spawn();
        let pos = self.random_position();
        let vel = self.random_velocity(10.0);
        let team = Team {
            id: self.rng.gen_range(0..4),
        };

        self.world.store::<Position>().clone().write(entity, pos);
        self.world.store::<Velocity>().clone().write(entity, vel);
        self.world.store::<Health>().clone().write(
            entity,
            Health {
                current: 100.0,
                max: 100.0,
            },
        );
        self.world.store::<Team>().clone().write(entity, team);
        if enemy {
            self.world.store::<Enemy>().clone().write(entity, Enemy);
        }
        entity
    }

    fn spawn_projectile(&mut self) -> Entity {
        let entity = self.world.spawn();
        let pos = self.random_position();
        let vel = self.random_velocity(50.0);
        let lifetime = Lifetime {
            remaining: self.rng.gen_range(0.5..2.0),
        };

        self.world.store::<Position>().clone().write(entity, pos);
        self.world.store::<Velocity>().clone().write(entity, vel);
        self.world.store::<Lifetime>().clone().write(entity, lifetime);
        self.world
            .store::<Projectile>()
            .clone()
            .write(entity, Projectile);
        entity
    }

    /// Total live entity count.
    pub fn total_count(&self) -> usize {
        self.world.registry().live_count()
    }
}

fn build_world(cell_size: f32) -> World {
    use strata::store::{CacheStore, MapStore, SpatialIndexStore};

    World::builder()
        .with::<Position>(SpatialIndexStore::with_cell_size(MapStore::new(), cell_size))
        .with::<Velocity>(CacheStore::new(MapStore::new()))
        .with_default::<Health>()
        .with_default::<Team>()
        .with_default::<Lifetime>()
        .with_default::<Enemy>()
        .with_default::<Projectile>()
        .build()
        .unwrap_or_else(|err| panic!("arena world wiring: {err}"))
}

impl Default for ArenaScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for ArenaScenario {
    fn name(&self) -> &'static str {
        "arena"
    }

    fn description(&self) -> &'static str {
        "Wandering NPCs and short-lived projectiles on a spatially indexed arena"
    }

    fn entity_count(&self) -> usize {
        self.config.npc_count + self.config.projectile_count
    }

    fn setup(&mut self) {
        for i in 0..self.config.npc_count {
            let enemy = self.config.enemy_every > 0 && i % self.config.enemy_every == 0;
            self.spawn_npc(enemy);
        }
        for _ in 0..self.config.projectile_count {
            self.spawn_projectile();
        }
    }

    fn update(&mut self) {
        let dt = self.config.delta_time;
        system_movement(&self.world, dt);
        system_combat(&self.world);

        let dead = system_expire(&self.world, dt);
        let mut expired_projectiles = 0;
        for entity in dead {
            if self.world.store::<Projectile>().contains(entity) {
                expired_projectiles += 1;
            }
            self.world.despawn(entity);
        }
        for _ in 0..expired_projectiles {
            self.spawn_projectile();
        }
    }

    fn teardown(&mut self) {
        let mut everyone = slice::owners(self.world.store::<Position>()).into_vec();
        everyone.extend(slice::owners(self.world.store::<Health>()).iter());
        everyone.sort_unstable();
        everyone.dedup();
        for entity in everyone {
            self.world.despawn(entity);
        }
    }
}
