//! Text renderer for the simulation: reads world snapshots and draws the
//! grid as one glyph per cell. Never mutates simulation state.

use vivarium_core::{SnapshotState, World};

const EMPTY: char = '.';

fn glyph(state: &SnapshotState) -> char {
    match state {
        SnapshotState::Person { alive: true, .. } => '@',
        SnapshotState::Person { alive: false, .. } => 'x',
        SnapshotState::Food { visible: true, .. } => '*',
        SnapshotState::Food { visible: false, .. } => ',',
    }
}

/// Draw the whole grid, one row per line. When a person and a food share a
/// cell the person is drawn on top.
pub fn render(world: &World) -> String {
    let width = world.width() as usize;
    let height = world.height() as usize;
    let mut rows = vec![vec![EMPTY; width]; height];

    // Foods first so persons overdraw them in shared cells.
    let mut snapshots: Vec<_> = world.snapshots().collect();
    snapshots.sort_by_key(|s| matches!(s.state, SnapshotState::Person { .. }));

    for snapshot in snapshots {
        rows[snapshot.y as usize][snapshot.x as usize] = glyph(&snapshot.state);
    }

    rows.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line population summary for the end of a run.
pub fn summary(world: &World) -> String {
    let mut people = 0usize;
    let mut alive = 0usize;
    let mut total_energy = 0.0f64;
    let mut foods = 0usize;
    let mut total_amount = 0.0f64;

    for snapshot in world.snapshots() {
        match snapshot.state {
            SnapshotState::Person {
                energy, alive: a, ..
            } => {
                people += 1;
                if a {
                    alive += 1;
                }
                total_energy += energy;
            }
            SnapshotState::Food { amount, .. } => {
                foods += 1;
                total_amount += amount;
            }
        }
    }

    let mean_energy = if people > 0 {
        total_energy / people as f64
    } else {
        0.0
    };
    format!(
        "{alive}/{people} people alive (mean energy {mean_energy:.1}), {foods} food stocks holding {total_amount:.1}"
    )
}
