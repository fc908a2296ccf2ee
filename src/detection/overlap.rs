use crate::consts::{OVERLAP_ARENA_CHUNK, OVERLAP_GRID_CELL_SIZE};
use crate::frame::Star;

/// Grid-binned overlap filter: iterates `candidates` sorted by descending
/// mass, probing a 256x256-pixel cell grid's 3x3 neighborhood for an
/// already-accepted star within `radius` pixels. Accepted stars are kept in
/// a flat arena (pre-reserved in 1024-element chunks, mirroring the
/// reference implementation's pre-chunked node allocator — see spec ss9)
/// with per-cell index lists, rather than a hand-rolled linked list.
pub fn overlap_filter(mut candidates: Vec<Star>, width: usize, height: usize, radius: f64) -> Vec<Star> {
    candidates.sort_by(|a, b| b.mass.partial_cmp(&a.mass).unwrap());

    let grid_cols = (width / OVERLAP_GRID_CELL_SIZE + 1).max(1);
    let grid_rows = (height / OVERLAP_GRID_CELL_SIZE + 1).max(1);
    let mut cell_members: Vec<Vec<u32>> = vec![Vec::new(); grid_cols * grid_rows];

    let arena_capacity = ((candidates.len() + OVERLAP_ARENA_CHUNK - 1) / OVERLAP_ARENA_CHUNK.max(1)) * OVERLAP_ARENA_CHUNK;
    let mut accepted: Vec<Star> = Vec::with_capacity(arena_capacity.max(candidates.len()));

    let radius_sq = radius * radius;
    let cell_of = |x: f64, y: f64| -> (usize, usize) {
        let cx = ((x / OVERLAP_GRID_CELL_SIZE as f64) as usize).min(grid_cols - 1);
        let cy = ((y / OVERLAP_GRID_CELL_SIZE as f64) as usize).min(grid_rows - 1);
        (cx, cy)
    };

    for candidate in candidates {
        let (cx, cy) = cell_of(candidate.x, candidate.y);
        let mut collides = false;

        'probe: for dy in -1..=1i32 {
            for dx in -1..=1i32 {
                let nx = cx as i32 + dx;
                let ny = cy as i32 + dy;
                if nx < 0 || ny < 0 || nx as usize >= grid_cols || ny as usize >= grid_rows {
                    continue;
                }
                let members = &cell_members[ny as usize * grid_cols + nx as usize];
                for &member_idx in members {
                    let other = &accepted[member_idx as usize];
                    let ddx = other.x - candidate.x;
                    let ddy = other.y - candidate.y;
                    if ddx * ddx + ddy * ddy <= radius_sq {
                        collides = true;
                        break 'probe;
                    }
                }
            }
        }

        if !collides {
            let idx = accepted.len() as u32;
            accepted.push(candidate);
            cell_members[cy * grid_cols + cx].push(idx);
        }
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star_at(x: f64, y: f64, mass: f64) -> Star {
        Star { index: 0, value: mass as f32, x, y, mass, hfr: 1.0 }
    }

    #[test]
    fn close_candidate_is_dropped_spec_scenario_5() {
        // spec.md ss8 scenario 5: (10,10), (12,10), (30,30), R=5 -> only
        // (10,10) and (30,30) survive.
        let candidates = vec![star_at(10.0, 10.0, 3.0), star_at(12.0, 10.0, 2.0), star_at(30.0, 30.0, 1.0)];
        let survivors = overlap_filter(candidates, 100, 100, 5.0);
        let coords: Vec<(f64, f64)> = survivors.iter().map(|s| (s.x, s.y)).collect();
        assert_eq!(coords.len(), 2);
        assert!(coords.contains(&(10.0, 10.0)));
        assert!(coords.contains(&(30.0, 30.0)));
    }

    #[test]
    fn all_survivors_are_pairwise_separated() {
        let mut candidates = Vec::new();
        for i in 0..20 {
            candidates.push(star_at(i as f64 * 2.0, 0.0, (20 - i) as f64));
        }
        let survivors = overlap_filter(candidates, 200, 200, 5.0);
        for i in 0..survivors.len() {
            for j in (i + 1)..survivors.len() {
                let dx = survivors[i].x - survivors[j].x;
                let dy = survivors[i].y - survivors[j].y;
                assert!(dx * dx + dy * dy > 25.0);
            }
        }
    }

    #[test]
    fn brighter_candidate_wins_when_equidistant_pair_collides() {
        let candidates = vec![star_at(0.0, 0.0, 1.0), star_at(1.0, 1.0, 100.0)];
        let survivors = overlap_filter(candidates, 50, 50, 5.0);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].mass, 100.0);
    }
}
