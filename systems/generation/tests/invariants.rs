use delve_core::{Cell, GoalPlacement, LevelConfig};
use delve_system_generation::{
    enemy_capacity, is_fully_connected, neighbors, DistanceField, LevelGenerator, UNREACHED,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn goal_placement(selector: u8) -> GoalPlacement {
    match selector {
        0 => GoalPlacement::Corner,
        1 => GoalPlacement::Scattered,
        _ => GoalPlacement::Absent,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn every_traversable_cell_is_reachable_from_start(
        seed in any::<u64>(),
        size in 2_u32..=14,
        wall_fraction in 0.0_f32..=1.0,
        enemies in 0_u32..=12,
        selector in 0_u8..=2,
    ) {
        let config = LevelConfig::new(size, wall_fraction, enemies)
            .with_goal_placement(goal_placement(selector));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let level = LevelGenerator::new().generate(&config, &mut rng)
            .expect("valid");
        let grid = &level.grid;

        let total = (size * size) as usize;
        let walls = grid.count(Cell::Wall);
        prop_assert!(
            is_fully_connected(grid.view(), level.start, total - walls),
            "seed={seed}, size={size}, fraction={wall_fraction} left unreachable cells",
        );
    }

    #[test]
    fn cardinalities_and_wall_budget_hold(
        seed in any::<u64>(),
        size in 2_u32..=12,
        wall_fraction in 0.0_f32..=1.0,
        enemies in 0_u32..=20,
        selector in 0_u8..=2,
    ) {
        let placement = goal_placement(selector);
        let config = LevelConfig::new(size, wall_fraction, enemies)
            .with_goal_placement(placement);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let level = LevelGenerator::new().generate(&config, &mut rng)
            .expect("valid");
        let grid = &level.grid;

        prop_assert_eq!(grid.count(Cell::Start), 1);
        prop_assert!(grid.count(Cell::Weapon) <= 1);
        if placement.has_goal() {
            prop_assert_eq!(grid.count(Cell::Goal), 1);
        } else {
            prop_assert_eq!(grid.count(Cell::Goal), 0);
        }

        let total = (size * size) as usize;
        let requested_walls = (total as f32 * wall_fraction).floor() as usize;
        prop_assert!(grid.count(Cell::Wall) <= requested_walls);

        // Floors available to enemy placement are everything the enemies,
        // the weapon and a scattered goal now occupy.
        let scattered_goal = usize::from(placement == GoalPlacement::Scattered);
        let available = grid.count(Cell::Floor)
            + grid.count(Cell::Enemy)
            + grid.count(Cell::Weapon)
            + scattered_goal;
        prop_assert_eq!(grid.count(Cell::Enemy), enemy_capacity(&config, available));
        prop_assert!(grid.count(Cell::Enemy) <= enemies as usize);
    }

    #[test]
    fn distances_step_by_one_across_traversable_edges(
        seed in any::<u64>(),
        size in 2_u32..=12,
        wall_fraction in 0.0_f32..=0.8,
    ) {
        let config = LevelConfig::new(size, wall_fraction, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let level = LevelGenerator::new().generate(&config, &mut rng)
            .expect("valid");
        let grid = &level.grid;
        let field = DistanceField::compute(grid.view(), level.start);

        for (cell, contents) in grid.iter() {
            let distance = field.distance(cell).expect("in bounds");
            if contents == Cell::Wall {
                prop_assert_eq!(distance, UNREACHED);
                continue;
            }
            prop_assert!(distance >= 0);
            for neighbor in neighbors(cell, size) {
                if grid.get(neighbor) == Some(Cell::Wall) {
                    continue;
                }
                let other = field.distance(neighbor).expect("in bounds");
                prop_assert!((distance - other).abs() <= 1);
            }
            if distance > 0 {
                let has_parent = neighbors(cell, size)
                    .filter_map(|neighbor| field.distance(neighbor))
                    .any(|other| other == distance - 1);
                prop_assert!(has_parent, "cell {cell:?} at {distance} has no predecessor");
            }
        }
    }
}
