use crate::consts::ALIGN_MATCH_DIST_SQ;
use crate::frame::Star;
use crate::numeric::KdTree2;

use super::transform::Transform2D;

/// A candidate star projected through a transform and matched to its
/// nearest reference star (if within the 8px distance threshold).
#[derive(Clone, Copy, Debug)]
pub struct Matched {
    pub candidate_index: usize,
    pub reference_index: usize,
    pub projected: (f64, f64),
    pub reference_point: (f64, f64),
}

/// Projects every candidate star through `transform`, finds its nearest
/// reference star via `ref_tree`, and keeps it as a match iff the squared
/// projection distance is `< 64.0` (8px, spec ss4.5 step 6).
pub fn match_projected_stars(candidates: &[Star], transform: &Transform2D, ref_tree: &KdTree2<usize>) -> Vec<Matched> {
    let mut matches = Vec::new();
    for (i, star) in candidates.iter().enumerate() {
        let (px, py) = transform.apply(star.x, star.y);
        if let Some(((rx, ry, ref_idx), dist_sq)) = ref_tree.nearest(px as f32, py as f32) {
            if dist_sq < ALIGN_MATCH_DIST_SQ {
                matches.push(Matched {
                    candidate_index: i,
                    reference_index: ref_idx,
                    projected: (px, py),
                    reference_point: (rx as f64, ry as f64),
                });
            }
        }
    }
    matches
}

/// Mean Euclidean projection error of `candidates[m.candidate_index]`
/// reprojected through `transform`, against each match's fixed reference
/// point. `matches` (which candidate pairs with which reference star) is
/// held fixed — this recomputes only the projected half of each pair,
/// which is what simplex refinement perturbs.
pub fn mean_projection_error(candidates: &[Star], matches: &[Matched], transform: &Transform2D) -> f64 {
    if matches.is_empty() {
        return f64::INFINITY;
    }
    let total: f64 = matches
        .iter()
        .map(|m| {
            let star = &candidates[m.candidate_index];
            let (px, py) = transform.apply(star.x, star.y);
            let dx = px - m.reference_point.0;
            let dy = py - m.reference_point.1;
            (dx * dx + dy * dy).sqrt()
        })
        .sum();
    total / matches.len() as f64
}

/// Minimum number of matched candidates required to accept a transform
/// (spec ss4.5 step 6: `ceil(stars.len() / 3)`).
pub fn min_required_matches(candidate_count: usize) -> usize {
    (candidate_count + 2) / 3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star_at(x: f64, y: f64) -> Star {
        Star { index: 0, value: 1.0, x, y, mass: 1.0, hfr: 1.0 }
    }

    #[test]
    fn identity_transform_matches_stars_to_themselves() {
        let refs = vec![(0.0f32, 0.0f32, 0usize), (10.0, 10.0, 1), (20.0, 5.0, 2)];
        let tree = KdTree2::build(refs);
        let candidates = vec![star_at(0.0, 0.0), star_at(10.0, 10.0), star_at(20.0, 5.0)];
        let matches = match_projected_stars(&candidates, &Transform2D::IDENTITY, &tree);
        assert_eq!(matches.len(), 3);
        let err = mean_projection_error(&candidates, &matches, &Transform2D::IDENTITY);
        assert!(err < 1e-6);
    }

    #[test]
    fn far_candidates_are_dropped() {
        let refs = vec![(0.0f32, 0.0f32, 0usize)];
        let tree = KdTree2::build(refs);
        let candidates = vec![star_at(100.0, 100.0)];
        let matches = match_projected_stars(&candidates, &Transform2D::IDENTITY, &tree);
        assert!(matches.is_empty());
    }

    #[test]
    fn min_required_matches_rounds_up() {
        assert_eq!(min_required_matches(10), 4);
        assert_eq!(min_required_matches(9), 3);
        assert_eq!(min_required_matches(1), 1);
    }
}
