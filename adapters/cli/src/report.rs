//! Plain-text rendering of level state.

use delve_core::{CellCoord, Grid, LevelSummary, PieceCategory};
use delve_world::{query::EnemySnapshot, ObservationWindow, PiecePool};
use glam::{Vec2, Vec3};

fn cell_label(cell: Option<CellCoord>) -> String {
    match cell {
        Some(cell) => format!("({}, {})", cell.column(), cell.row()),
        None => "none".to_owned(),
    }
}

/// One-line description of the generated layout.
pub(crate) fn summary_line(summary: &LevelSummary) -> String {
    format!(
        "seed {} | {}x{} | start {} | goal {} | weapon {} | {} enemies | {} walls",
        summary.seed,
        summary.size,
        summary.size,
        cell_label(Some(summary.start)),
        cell_label(summary.goal),
        cell_label(summary.weapon),
        summary.enemies,
        summary.walls,
    )
}

/// Cell, world position and footprint percentage of a notable location.
pub(crate) fn position_line(label: &str, cell: CellCoord, position: Vec3, percent: Vec2) -> String {
    format!(
        "{label} {} at world ({:.2}, {:.2}, {:.2}) | {:.1}% x {:.1}% of footprint",
        cell_label(Some(cell)),
        position.x,
        position.y,
        position.z,
        percent.x * 100.0,
        percent.y * 100.0,
    )
}

/// Grid rendered one row per line using each cell's glyph.
pub(crate) fn grid_ascii(grid: &Grid) -> String {
    let width = usize::try_from(grid.size()).unwrap_or(0).max(1);
    grid.cells()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.glyph()).collect())
        .collect::<Vec<String>>()
        .join("\n")
}

/// Active and created piece counts per category.
pub(crate) fn pool_table(pool: &PiecePool) -> String {
    let mut lines = vec![format!("{:<8}{:>8}{:>9}", "pieces", "active", "created")];
    for category in PieceCategory::ALL {
        lines.push(format!(
            "{:<8}{:>8}{:>9}",
            format!("{category:?}").to_lowercase(),
            pool.active_count(category),
            pool.created_count(category),
        ));
    }
    lines.join("\n")
}

/// One line per enemy with its cell and the yaw it faces.
pub(crate) fn enemy_lines(enemies: &[EnemySnapshot]) -> String {
    enemies
        .iter()
        .map(|enemy| {
            format!(
                "enemy {} at {} facing {:.0} deg{}",
                enemy.piece.get(),
                cell_label(Some(enemy.cell)),
                enemy.facing.yaw_degrees(),
                if enemy.eliminated { " (eliminated)" } else { "" },
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Window values rendered row by row with one decimal each.
pub(crate) fn window_ascii(window: &ObservationWindow) -> String {
    let side = usize::try_from(window.side()).unwrap_or(1).max(1);
    window
        .values()
        .chunks(side)
        .map(|row| {
            row.iter()
                .map(|value| format!("{value:.1}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::{Cell, Command, Direction, GridBuilder, LevelConfig, PieceId};
    use delve_world::{apply, query, Level};

    #[test]
    fn grid_ascii_prints_rows_top_to_bottom() {
        let mut builder = GridBuilder::filled(3, Cell::Floor);
        builder.set(CellCoord::new(0, 0), Cell::Start);
        builder.set(CellCoord::new(2, 0), Cell::Goal);
        builder.set(CellCoord::new(1, 1), Cell::Wall);
        builder.set(CellCoord::new(0, 2), Cell::Enemy);
        builder.set(CellCoord::new(2, 2), Cell::Weapon);

        assert_eq!(grid_ascii(&builder.build()), "S.G\n.#.\nE.W");
    }

    #[test]
    fn pool_table_lists_every_category() {
        let mut level = Level::generate(LevelConfig::new(4, 0.0, 1), 2)
            .expect("valid");
        let mut events = Vec::new();
        apply(&mut level, Command::Regenerate { seed: 3 }, &mut events);

        let table = pool_table(query::pool(&level));
        assert_eq!(table.lines().count(), PieceCategory::ALL.len() + 1);
        assert!(table.contains("floor"));
        assert!(table.contains("goal"));
    }

    #[test]
    fn window_ascii_has_one_line_per_row() {
        let level = Level::generate(LevelConfig::new(5, 0.2, 1), 9)
            .expect("valid");
        let window = query::observation_window(&level, query::start(&level).position, 1);
        let text = window_ascii(&window);

        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().all(|line| line.split(' ').count() == 3));
    }

    #[test]
    fn summary_line_mentions_missing_goal() {
        let summary = LevelSummary {
            seed: 4,
            size: 3,
            start: CellCoord::new(0, 0),
            goal: None,
            weapon: Some(CellCoord::new(1, 2)),
            enemies: 1,
            walls: 2,
        };
        let line = summary_line(&summary);
        assert!(line.contains("goal none"));
        assert!(line.contains("weapon (1, 2)"));
    }

    #[test]
    fn position_line_reports_world_and_percentage() {
        let line = position_line(
            "start",
            CellCoord::new(0, 3),
            Vec3::new(-1.5, 0.0, 1.5),
            Vec2::new(0.125, 0.875),
        );
        assert_eq!(
            line,
            "start (0, 3) at world (-1.50, 0.00, 1.50) | 12.5% x 87.5% of footprint"
        );
    }

    #[test]
    fn position_line_matches_level_queries() {
        let level = Level::generate(LevelConfig::new(4, 0.0, 0), 1)
            .expect("valid");
        let start = query::start(&level);
        let percent = query::position_to_percentage(&level, start.position);
        let line = position_line("start", start.cell, start.position, percent);

        let expected_x = (start.cell.column() as f32 + 0.5) / 4.0 * 100.0;
        assert!(line.contains(&format!("{expected_x:.1}% x")));
    }

    #[test]
    fn enemy_lines_print_yaw_of_facing() {
        let enemies = [
            EnemySnapshot {
                piece: PieceId::new(7),
                cell: CellCoord::new(2, 1),
                position: Vec3::ZERO,
                facing: Direction::West,
                eliminated: false,
            },
            EnemySnapshot {
                piece: PieceId::new(8),
                cell: CellCoord::new(0, 2),
                position: Vec3::ZERO,
                facing: Direction::South,
                eliminated: true,
            },
        ];

        assert_eq!(
            enemy_lines(&enemies),
            "enemy 7 at (2, 1) facing 270 deg\nenemy 8 at (0, 2) facing 180 deg (eliminated)"
        );
    }
}
