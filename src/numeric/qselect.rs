/// In-place Hoare-style selection: reorders `buf` so that `buf[k]` holds the
/// k-th smallest element, and returns that value. `buf` is left in an
/// unspecified (partition-dependent) order otherwise — callers needing the
/// original order must clone first.
///
/// Panics if `buf` is empty or `k >= buf.len()`.
pub fn qselect(buf: &mut [f32], k: usize) -> f32 {
    assert!(!buf.is_empty(), "qselect requires a non-empty buffer");
    assert!(k < buf.len(), "qselect index out of range");

    let mut lo = 0usize;
    let mut hi = buf.len() - 1;

    loop {
        if lo == hi {
            return buf[lo];
        }
        let pivot_index = partition(buf, lo, hi);
        if k == pivot_index {
            return buf[k];
        } else if k < pivot_index {
            hi = pivot_index - 1;
        } else {
            lo = pivot_index + 1;
        }
    }
}

/// Median via `qselect`. For even-length buffers this returns the
/// upper-middle element (`k = n / 2` on zero-based indices) — that exact
/// convention is load-bearing for the background MAD path and must not be
/// changed to the lower-middle or averaged convention.
pub fn qselect_median(buf: &mut [f32]) -> f32 {
    let k = buf.len() / 2;
    qselect(buf, k)
}

/// Lomuto partition around `buf[hi]`, returning the pivot's final index.
fn partition(buf: &mut [f32], lo: usize, hi: usize) -> usize {
    let pivot = buf[hi];
    let mut store = lo;
    for i in lo..hi {
        if buf[i] < pivot {
            buf.swap(i, store);
            store += 1;
        }
    }
    buf.swap(store, hi);
    store
}
