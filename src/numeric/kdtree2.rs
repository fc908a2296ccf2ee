/// Static, pointer-free 2D k-d tree over `(x, y, payload)` triples.
///
/// `build` recursively partitions by x, then y, then x, ... choosing the mid
/// index of each subrange as the pivot; the backing `Vec` layout IS the
/// tree — the mid index of `[lo, hi)` is always that subrange's root. No
/// interior mutability, so `KdTree2` is `Send + Sync` whenever `P` is.
#[derive(Clone, Debug)]
pub struct KdTree2<P> {
    points: Vec<(f32, f32, P)>,
}

impl<P: Copy> KdTree2<P> {
    pub fn build(mut points: Vec<(f32, f32, P)>) -> Self {
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

    /// Nearest neighbor to `(qx, qy)`, returning `(point, squared_distance)`.
    pub fn nearest(&self, qx: f32, qy: f32) -> Option<((f32, f32, P), f64)> {
        if self.points.is_empty() {
            return None;
        }
        let mut best_idx = 0usize;
        let mut best_dist = f64::INFINITY;
        search(&self.points, 0, self.points.len(), 0, qx, qy, &mut best_idx, &mut best_dist);
        Some((self.points[best_idx], best_dist))
    }
}

fn sq_dist(ax: f32, ay: f32, bx: f32, by: f32) -> f64 {
    let dx = (ax - bx) as f64;
    let dy = (ay - by) as f64;
    dx * dx + dy * dy
}

fn axis_value<P>(p: &(f32, f32, P), axis: usize) -> f32 {
    if axis == 0 {
        p.0
    } else {
        p.1
    }
}

fn build_range<P: Copy>(points: &mut [(f32, f32, P)], lo: usize, hi: usize, depth: usize) {
    if hi - lo <= 1 {
        return;
    }
    let axis = depth % 2;
    let mid = lo + (hi - lo) / 2;
    nth_element(&mut points[lo..hi], mid - lo, axis);
    build_range(points, lo, mid, depth + 1);
    build_range(points, mid + 1, hi, depth + 1);
}

/// Hoare-style selection (same shape as `numeric::qselect`) specialized to
/// partition `(f32, f32, P)` triples by one coordinate axis.
fn nth_element<P: Copy>(slice: &mut [(f32, f32, P)], k: usize, axis: usize) {
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
    points: &[(f32, f32, P)],
    lo: usize,
    hi: usize,
    depth: usize,
    qx: f32,
    qy: f32,
    best_idx: &mut usize,
    best_dist: &mut f64,
) {
    if lo >= hi {
        return;
    }
    let mid = lo + (hi - lo) / 2;
    let (px, py, _) = points[mid];
    let d = sq_dist(px, py, qx, qy);
    if d < *best_dist {
        *best_dist = d;
        *best_idx = mid;
    }

    let axis = depth % 2;
    let plane = axis_value(&points[mid], axis);
    let query = if axis == 0 { qx } else { qy };
    let diff = (query - plane) as f64;

    let (near_lo, near_hi, far_lo, far_hi) = if diff < 0.0 {
        (lo, mid, mid + 1, hi)
    } else {
        (mid + 1, hi, lo, mid)
    };

    search(points, near_lo, near_hi, depth + 1, qx, qy, best_idx, best_dist);
    if diff * diff < *best_dist {
        search(points, far_lo, far_hi, depth + 1, qx, qy, best_idx, best_dist);
    }
}
