use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::EPSILON;
use crate::numeric::qselect::qselect_median;

/// Enumerates all `(dx, dy)` offsets with `dx*dx + dy*dy <= (radius + eps)^2`
/// — the integer-lattice disk of the given radius — and returns them as
/// flat row-major offsets `dy * width + dx`.
pub fn create_mask(width: usize, radius: f32) -> Vec<isize> {
    let r = radius.ceil() as isize;
    let limit = (radius + EPSILON) * (radius + EPSILON);
    let mut offsets = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            let dist_sq = (dx * dx + dy * dy) as f32;
            if dist_sq <= limit {
                offsets.push(dy * width as isize + dx);
            }
        }
    }
    offsets
}

/// Flattens an `Array2<f32>` into a row-major `Vec<f32>`, independent of
/// the array's internal memory layout.
pub fn flatten_row_major(data: &Array2<f32>) -> Vec<f32> {
    let (h, w) = data.dim();
    let mut flat = Vec::with_capacity(h * w);
    for row in 0..h {
        for col in 0..w {
            flat.push(data[[row, col]]);
        }
    }
    flat
}

/// Gathers `data[index + offset]` for each in-bounds offset in `mask` into
/// `scratch` (cleared first), then returns the median via `qselect_median`.
pub fn gather_into(data: &[f32], index: usize, mask: &[isize], scratch: &mut Vec<f32>) -> f32 {
    scratch.clear();
    let n = data.len() as isize;
    let base = index as isize;
    for &offset in mask {
        let idx = base + offset;
        if idx >= 0 && idx < n {
            scratch.push(data[idx as usize]);
        }
    }
    qselect_median(scratch)
}

/// Single-shot convenience wrapper over [`gather_into`] for callers that
/// don't need to reuse a scratch buffer across many gathers.
pub fn gather_median(data: &[f32], index: usize, mask: &[isize]) -> f32 {
    let mut scratch = Vec::with_capacity(mask.len());
    gather_into(data, index, mask, &mut scratch)
}

/// Sparse median filter: for each index in `indices`, replaces `data[i]`
/// with the mask-gathered median computed from the *original* values — a
/// pixel being corrected never sees an already-corrected neighbor from the
/// same pass.
pub fn median_filter_sparse(data: &mut Array2<f32>, indices: &[usize], mask: &[isize]) {
    let flat = flatten_row_major(data);
    let (_, w) = data.dim();
    let mut scratch = Vec::with_capacity(mask.len());
    let replacements: Vec<(usize, f32)> = indices
        .iter()
        .map(|&i| (i, gather_into(&flat, i, mask, &mut scratch)))
        .collect();
    for (i, v) in replacements {
        data[[i / w, i % w]] = v;
    }
}

/// Parallel dense mask filter: replaces every pixel with its mask-gathered
/// median. Partitions the image into contiguous row slabs, one per rayon
/// worker, each with its own scratch buffer; reads from a shared flat copy
/// of the input and writes into a fresh output buffer, so slabs have no
/// inter-dependency and need no synchronization beyond rayon's implicit
/// barrier at the end of `par_chunks_mut`.
pub fn median_filter_mask_parallel(data: &Array2<f32>, mask: &[isize]) -> Array2<f32> {
    let (h, w) = data.dim();
    let flat = flatten_row_major(data);

    let ncpu = rayon::current_num_threads().max(1);
    let rows_per_slab = ((h + ncpu - 1) / ncpu).max(1);

    let mut out = vec![0.0f32; h * w];
    out.par_chunks_mut(rows_per_slab * w)
        .enumerate()
        .for_each(|(slab_idx, chunk)| {
            let row_start = slab_idx * rows_per_slab;
            let mut scratch = Vec::with_capacity(mask.len());
            for (local_row, chunk_row) in chunk.chunks_mut(w).enumerate() {
                let row = row_start + local_row;
                for col in 0..w {
                    let index = row * w + col;
                    chunk_row[col] = gather_into(&flat, index, mask, &mut scratch);
                }
            }
        });

    Array2::from_shape_vec((h, w), out).expect("output buffer matches (h, w)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_is_symmetric_disk() {
        let mask = create_mask(100, 1.5);
        // Radius 1.5 disk over integer lattice: the 9-neighborhood (dx,dy in -1..=1).
        let mut expected: Vec<isize> = Vec::new();
        for dy in -1..=1 {
            for dx in -1..=1 {
                expected.push(dy * 100 + dx);
            }
        }
        let mut a = mask.clone();
        let mut b = expected;
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn mask_radius_zero_is_just_center() {
        let mask = create_mask(50, 0.0);
        assert_eq!(mask, vec![0]);
    }

    #[test]
    fn gather_median_ignores_out_of_bounds_offsets() {
        let data: Vec<f32> = (0..10).map(|v| v as f32).collect();
        let mask = vec![-5, -1, 0, 1, 5];
        // index 0: only offsets 0 and 1 and 5 are in bounds -> {0, 1, 5} -> median 1.
        let m = gather_median(&data, 0, &mask);
        assert_eq!(m, 1.0);
    }

    #[test]
    fn sparse_filter_uses_original_values_for_all_replacements() {
        let mut data = Array2::from_shape_fn((5, 5), |(r, c)| (r * 5 + c) as f32);
        let mask = create_mask(5, 1.0);
        let indices = vec![6, 7, 12];
        let before = data.clone();
        median_filter_sparse(&mut data, &indices, &mask);
        // Unlisted pixels are untouched.
        for r in 0..5 {
            for c in 0..5 {
                let i = r * 5 + c;
                if !indices.contains(&i) {
                    assert_eq!(data[[r, c]], before[[r, c]]);
                }
            }
        }
    }

    #[test]
    fn parallel_mask_filter_matches_sequential_gather() {
        let data = Array2::from_shape_fn((20, 20), |(r, c)| ((r * 7 + c * 3) % 17) as f32);
        let mask = create_mask(20, 1.5);
        let parallel = median_filter_mask_parallel(&data, &mask);

        let flat = flatten_row_major(&data);
        let (h, w) = data.dim();
        for row in 0..h {
            for col in 0..w {
                let expected = gather_median(&flat, row * w + col, &mask);
                assert_eq!(parallel[[row, col]], expected);
            }
        }
    }
}
