/// Static, pointer-free 3D k-d tree over `(x, y, z, payload)` quadruples.
///
/// Used by the aligner to index reference triangle descriptors
/// `(d_ab, d_ac, d_bc)` with the triangle index as payload. Construction and
/// search mirror [`super::kdtree2::KdTree2`] with axes cycling x-y-z.
#[derive(Clone, Debug)]
pub struct KdTree3<P> {
    points: Vec<(f64, f64, f64, P)>,
}

impl<P: Copy> KdTree3<P> {
    pub fn build(mut points: Vec<(f64, f64, f64, P)>) -> Self {
        let n = points.len();
        if n > 1 {
            build_range(&mut points, 0, n, 0);
        }
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Nearest neighbor to `(qx, qy, qz)`, returning `(point, squared_distance)`.
    pub fn nearest(&self, qx: f64, qy: f64, qz: f64) -> Option<((f64, f64, f64, P), f64)> {
        if self.points.is_empty() {
            return None;
        }
        let mut best_idx = 0usize;
        let mut best_dist = f64::INFINITY;
        search(&self.points, 0, self.points.len(), 0, qx, qy, qz, &mut best_idx, &mut best_dist);
        Some((self.points[best_idx], best_dist))
    }
}

fn sq_dist(ax: f64, ay: f64, az: f64, bx: f64, by: f64, bz: f64) -> f64 {
    let dx = ax - bx;
    let dy = ay - by;
    let dz = az - bz;
    dx * dx + dy * dy + dz * dz
}

fn axis_value<P>(p: &(f64, f64, f64, P), axis: usize) -> f64 {
    match axis {
        0 => p.0,
        1 => p.1,
        _ => p.2,
    }
}

fn build_range<P: Copy>(points: &mut [(f64, f64, f64, P)], lo: usize, hi: usize, depth: usize) {
    if hi - lo <= 1 {
        return;
    }
    let axis = depth % 3;
    let mid = lo + (hi - lo) / 2;
    nth_element(&mut points[lo..hi], mid - lo, axis);
    build_range(points, lo, mid, depth + 1);
    build_range(points, mid + 1, hi, depth + 1);
}

fn nth_element<P: Copy>(slice: &mut [(f64, f64, f64, P)], k: usize, axis: usize) {
    let mut lo = 0usize;
    let mut hi = slice.len() - 1;
    loop {
        if lo == hi {
            return;
        }
        let pivot = axis_value(&slice[hi], axis);
        let mut store = lo;
        for i in lo..hi {
            if axis_value(&slice[i], axis) < pivot {
                slice.swap(i, store);
                store += 1;
            }
        }
        slice.swap(store, hi);
        if k == store {
            return;
        } else if k < store {
            hi = store - 1;
        } else {
            lo = store + 1;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn search<P: Copy>(
    points: &[(f64, f64, f64, P)],
    lo: usize,
    hi: usize,
    depth: usize,
    qx: f64,
    qy: f64,
    qz: f64,
    best_idx: &mut usize,
    best_dist: &mut f64,
) {
    if lo >= hi {
        return;
    }
    let mid = lo + (hi - lo) / 2;
    let (px, py, pz, _) = points[mid];
    let d = sq_dist(px, py, pz, qx, qy, qz);
    if d < *best_dist {
        *best_dist = d;
        *best_idx = mid;
    }

    let axis = depth % 3;
    let plane = axis_value(&points[mid], axis);
    let query = match axis {
        0 => qx,
        1 => qy,
        _ => qz,
    };
    let diff = query - plane;

    let (near_lo, near_hi, far_lo, far_hi) = if diff < 0.0 {
        (lo, mid, mid + 1, hi)
    } else {
        (mid + 1, hi, lo, mid)
    };

    search(points, near_lo, near_hi, depth + 1, qx, qy, qz, best_idx, best_dist);
    if diff * diff < *best_dist {
        search(points, far_lo, far_hi, depth + 1, qx, qy, qz, best_idx, best_dist);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_matches_brute_force() {
        let points: Vec<(f64, f64, f64, usize)> = vec![
            (0.0, 0.0, 0.0, 0),
            (5.0, 5.0, 5.0, 1),
            (1.0, 2.0, 3.0, 2),
            (9.0, 2.0, 1.0, 3),
            (3.0, 8.0, 4.0, 4),
        ];
        let tree = KdTree3::build(points.clone());

        for &(qx, qy, qz) in &[(0.1, 0.1, 0.1), (8.0, 8.0, 8.0), (1.5, 2.5, 3.5)] {
            let (_, tree_dist) = tree.nearest(qx, qy, qz).unwrap();
            let brute = points
                .iter()
                .map(|&(px, py, pz, _)| sq_dist(px, py, pz, qx, qy, qz))
                .fold(f64::INFINITY, f64::min);
            assert!((tree_dist - brute).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_tree() {
        let tree: KdTree3<usize> = KdTree3::build(Vec::new());
        assert!(tree.nearest(0.0, 0.0, 0.0).is_none());
    }
}
