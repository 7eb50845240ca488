//! End-to-end scenario on a small map: Morning water filling, then a
//! stabilizer carrying its columns through the Night void.

use chronovox_core::{GridPos, BLOCK_STABILIZER, BLOCK_WATER};
use chronovox_world::{TimePhase, WorldConfig, WorldState};

fn small_config() -> WorldConfig {
    WorldConfig {
        width: 10,
        depth: 10,
        world_height: 32,
        tree_density: 0.0,
        // Tight rings so the Night void actually reaches this map.
        center_safe_radius: 2.0,
        ring_width: 2.0,
        ..WorldConfig::default()
    }
}

#[test]
fn low_morning_columns_show_water_at_the_water_level() {
    let mut world = WorldState::new(small_config(), 77);
    world.generate_now(TimePhase::Morning, false);

    for x in 0..10 {
        for z in 0..10 {
            let surface = world
                .field()
                .top_excluding(x, z, &[BLOCK_WATER])
                .expect("morning columns are always land");
            if surface < 4 {
                assert_eq!(world.voxel(GridPos::new(x, 4, z)), Some(BLOCK_WATER));
                for y in 5..32 {
                    assert_eq!(world.voxel(GridPos::new(x, y, z)), None);
                }
            }
        }
    }
}

#[test]
fn stabilized_columns_are_land_through_the_night() {
    let mut world = WorldState::new(small_config(), 77);
    world.generate_now(TimePhase::Morning, false);

    let ground = world.field().top_excluding(5, 5, &[BLOCK_WATER]).unwrap();
    assert!(world.place_block(GridPos::new(5, ground + 1, 5), BLOCK_STABILIZER));

    world.generate_now(TimePhase::Night, true);
    let range = world.config().stabilizer_range;
    for x in 0..10 {
        for z in 0..10 {
            let dx = (x - 5) as f64;
            let dz = (z - 5) as f64;
            if (dx * dx + dz * dz).sqrt() <= range {
                assert!(
                    world.field().top_non_empty(x, z).is_some(),
                    "stabilized column ({x}, {z}) was voided"
                );
            }
        }
    }
}
