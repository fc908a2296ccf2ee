use crate::consts::SIMPLEX_MAX_ITERATIONS;

/// Derivative-free Nelder-Mead simplex minimization over a fixed-size
/// parameter vector.
///
/// `initial` seeds one simplex vertex; the remaining `N` vertices are
/// `initial` perturbed along one axis each by a step proportional to that
/// axis's own magnitude (falling back to a small fixed step near zero).
/// Runs until `SIMPLEX_MAX_ITERATIONS` or the simplex's spread in objective
/// value collapses below `1e-12`.
pub fn nelder_mead<const N: usize>(initial: [f64; N], objective: impl Fn([f64; N]) -> f64) -> [f64; N] {
    const ALPHA: f64 = 1.0; // reflection
    const GAMMA: f64 = 2.0; // expansion
    const RHO: f64 = 0.5; // contraction
    const SIGMA: f64 = 0.5; // shrink

    let mut vertices: Vec<[f64; N]> = Vec::with_capacity(N + 1);
    vertices.push(initial);
    for i in 0..N {
        let mut v = initial;
        let step = if v[i].abs() > 1e-8 { v[i] * 0.05 } else { 0.01 };
        v[i] += step;
        vertices.push(v);
    }

    let mut values: Vec<f64> = vertices.iter().map(|&v| objective(v)).collect();

    for _ in 0..SIMPLEX_MAX_ITERATIONS {
        let mut order: Vec<usize> = (0..vertices.len()).collect();
        order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap());
        vertices = order.iter().map(|&i| vertices[i]).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let best = values[0];
        let worst = *values.last().unwrap();
        if (worst - best).abs() < 1e-12 {
            break;
        }

        let centroid = {
            let mut c = [0.0; N];
            for v in &vertices[..N] {
                for (ci, vi) in c.iter_mut().zip(v.iter()) {
                    *ci += vi;
                }
            }
            for ci in c.iter_mut() {
                *ci /= N as f64;
            }
            c
        };

        let reflect = add_scaled(centroid, sub(centroid, vertices[N]), ALPHA);
        let reflect_val = objective(reflect);

        if reflect_val < values[0] {
            let expand = add_scaled(centroid, sub(reflect, centroid), GAMMA);
            let expand_val = objective(expand);
            if expand_val < reflect_val {
                vertices[N] = expand;
                values[N] = expand_val;
            } else {
                vertices[N] = reflect;
                values[N] = reflect_val;
            }
            continue;
        }

        if reflect_val < values[N - 1] {
            vertices[N] = reflect;
            values[N] = reflect_val;
            continue;
        }

        let contract = add_scaled(centroid, sub(vertices[N], centroid), RHO);
        let contract_val = objective(contract);
        if contract_val < values[N] {
            vertices[N] = contract;
            values[N] = contract_val;
            continue;
        }

        for i in 1..=N {
            vertices[i] = add_scaled(vertices[0], sub(vertices[i], vertices[0]), SIGMA);
            values[i] = objective(vertices[i]);
        }
    }

    let mut best_idx = 0;
    for i in 1..values.len() {
        if values[i] < values[best_idx] {
            best_idx = i;
        }
    }
    vertices[best_idx]
}

fn sub<const N: usize>(a: [f64; N], b: [f64; N]) -> [f64; N] {
    let mut out = [0.0; N];
    for i in 0..N {
        out[i] = a[i] - b[i];
    }
    out
}

fn add_scaled<const N: usize>(base: [f64; N], delta: [f64; N], scale: f64) -> [f64; N] {
    let mut out = [0.0; N];
    for i in 0..N {
        out[i] = base[i] + delta[i] * scale;
    }
    out
}
