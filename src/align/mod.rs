mod matching;
mod simplex;
mod transform;
mod triangle;

use tracing::debug;

use crate::consts::ALIGN_EARLY_EXIT_RESIDUAL;
use crate::error::{CoreError, Result};
use crate::frame::Star;
use crate::numeric::{KdTree2, KdTree3};

pub use matching::Matched;
pub use transform::Transform2D;
pub use triangle::Triangle;

/// Minimum reference stars an `Aligner` can be built from.
const MIN_REFERENCE_STARS: usize = 3;

/// Builds rotation/translation-invariant triangle descriptors from a
/// reference frame's brightest well-separated stars, and matches a
/// candidate frame's stars against them to derive an affine transform
/// (spec ss4.5).
#[derive(Clone, Debug)]
pub struct Aligner {
    ref_width: usize,
    ref_height: usize,
    ref_stars: Vec<Star>,
    picked: Vec<usize>,
    triangles: Vec<Triangle>,
    triangle_tree: KdTree3<usize>,
    star_tree: KdTree2<usize>,
    k: usize,
}

impl Aligner {
    /// Builds a reference catalog from `ref_stars`: picks the `k`
    /// brightest stars pairwise separated by `>= ref_height / 20`,
    /// generates all canonical triangles over them, and indexes both the
    /// triangle descriptors (3D k-d tree) and the raw reference stars (2D
    /// k-d tree, used later for per-star nearest-neighbor matching).
    pub fn new(ref_width: usize, ref_height: usize, ref_stars: &[Star], k: usize) -> Result<Self> {
        if ref_stars.len() < MIN_REFERENCE_STARS {
            return Err(CoreError::MissingPrecondition(format!(
                "aligner needs at least {MIN_REFERENCE_STARS} reference stars, got {}",
                ref_stars.len()
            )));
        }

        let min_distance = ref_height as f64 / 20.0;
        let picked = triangle::pick_brightest_distant(ref_stars, k, min_distance);
        if picked.len() < MIN_REFERENCE_STARS {
            return Err(CoreError::MissingPrecondition(
                "fewer than 3 reference stars satisfy the minimum pairwise separation".into(),
            ));
        }

        let triangles = triangle::generate_triangles(ref_stars, &picked);
        let triangle_points: Vec<(f64, f64, f64, usize)> = triangles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.d_ab, t.d_ac, t.d_bc, i))
            .collect();
        let triangle_tree = KdTree3::build(triangle_points);

        let star_points: Vec<(f32, f32, usize)> = ref_stars.iter().enumerate().map(|(i, s)| (s.x as f32, s.y as f32, i)).collect();
        let star_tree = KdTree2::build(star_points);

        debug!(reference_stars = ref_stars.len(), picked = picked.len(), triangles = triangles.len(), "built aligner reference catalog");

        Ok(Self {
            ref_width,
            ref_height,
            ref_stars: ref_stars.to_vec(),
            picked,
            triangles,
            triangle_tree,
            star_tree,
            k,
        })
    }

    /// Aligns `stars` (from a `candidate_width x candidate_height` frame)
    /// against this aligner's reference catalog (spec ss4.5 "Per-frame
    /// alignment"). Returns the best transform found and its residual.
    pub fn align(&self, candidate_width: usize, candidate_height: usize, stars: &[Star]) -> Result<(Transform2D, f64)> {
        let _ = candidate_height;
        if stars.len() < MIN_REFERENCE_STARS {
            return Err(CoreError::MissingPrecondition(format!(
                "alignment needs at least {MIN_REFERENCE_STARS} candidate stars, got {}",
                stars.len()
            )));
        }

        let scale = self.ref_width as f64 / candidate_width.max(1) as f64;
        let scaled_stars: Vec<Star> = stars
            .iter()
            .map(|s| Star { x: s.x * scale, y: s.y * scale, ..*s })
            .collect();

        let min_distance = self.ref_height as f64 / 20.0;
        let picked = triangle::pick_brightest_distant(&scaled_stars, self.k, min_distance);
        if picked.len() < MIN_REFERENCE_STARS {
            return Err(CoreError::NoAlignment);
        }
        let candidate_triangles = triangle::generate_triangles(&scaled_stars, &picked);
        if candidate_triangles.is_empty() {
            return Err(CoreError::NoAlignment);
        }

        // For each candidate triangle, find its nearest reference-triangle
        // descriptor, then keep the `k` lowest-distance matches (stable
        // sort preserves input order on ties, per spec ss6 determinism).
        let mut scored: Vec<(f64, Triangle, Triangle)> = candidate_triangles
            .iter()
            .filter_map(|ct| {
                self.triangle_tree
                    .nearest(ct.d_ab, ct.d_ac, ct.d_bc)
                    .map(|((_, _, _, ref_idx), dist_sq)| (dist_sq, *ct, self.triangles[ref_idx]))
            })
            .collect();
        scored.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap());
        scored.truncate(self.k);

        // `stars`, not the scaled/picked subset: the match-fraction
        // threshold in step 6 is evaluated against the full candidate list.
        let min_matches = matching::min_required_matches(stars.len());

        let mut best_transform = Transform2D::IDENTITY;
        let mut best_residual = f64::INFINITY;

        for (_dist_sq, candidate_tri, ref_tri) in &scored {
            let p = |idx: usize| (scaled_stars[idx].x, scaled_stars[idx].y);
            let q = |idx: usize| (self.ref_stars[idx].x, self.ref_stars[idx].y);

            let initial = match Transform2D::derive_affine(
                p(candidate_tri.a),
                p(candidate_tri.b),
                p(candidate_tri.c),
                q(ref_tri.a),
                q(ref_tri.b),
                q(ref_tri.c),
            ) {
                Ok(t) => t,
                Err(_) => continue,
            };

            let matches = matching::match_projected_stars(&scaled_stars, &initial, &self.star_tree);
            if matches.len() < min_matches {
                continue;
            }

            let refined_params = simplex::nelder_mead(initial.to_params(), |params| {
                let t = Transform2D::from_params(params);
                matching::mean_projection_error(&scaled_stars, &matches, &t)
            });
            let refined = Transform2D::from_params(refined_params);
            let residual = matching::mean_projection_error(&scaled_stars, &matches, &refined);

            if residual < best_residual {
                best_residual = residual;
                best_transform = refined;
            }

            if best_residual < ALIGN_EARLY_EXIT_RESIDUAL {
                break;
            }
        }

        if best_residual.is_finite() {
            debug!(residual = best_residual, "alignment converged");
            Ok((best_transform, best_residual))
        } else {
            Err(CoreError::NoAlignment)
        }
    }
}
