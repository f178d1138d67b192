//! Bounded-iteration Nelder-Mead minimizer used to fit the forecast model.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexOptions {
    pub max_iterations: usize,
    /// Relative spread of function values at which the simplex is converged
    pub f_tol: f64,
    /// Vertex spread at which the simplex is converged
    pub x_tol: f64,
    /// Initial edge length of the simplex
    pub step: f64,
    /// Iterations without a relative improvement of `stall_tol` in the best
    /// value after which the current best vertex is accepted
    pub stall_window: usize,
    pub stall_tol: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            f_tol: 1e-10,
            x_tol: 1e-9,
            step: 0.5,
            stall_window: 100,
            stall_tol: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum<const N: usize> {
    pub point: [f64; N],
    pub value: f64,
    pub iterations: usize,
}

/// Minimize `f` starting from `start`.
///
/// Converged means the vertex values or positions have collapsed, or the best
/// value has stalled for `stall_window` iterations (e.g. along a flat ridge).
/// Returns `None` if neither happens within `max_iterations` or the objective
/// is not finite at the best vertex.
pub fn minimize<const N: usize, F>(f: F, start: [f64; N], opts: &SimplexOptions) -> Option<Minimum<N>>
where
    F: Fn(&[f64; N]) -> f64,
{
    let mut simplex: Vec<([f64; N], f64)> = Vec::with_capacity(N + 1);
    simplex.push((start, f(&start)));
    for i in 0..N {
        let mut p = start;
        p[i] += opts.step;
        simplex.push((p, f(&p)));
    }

    let mut stall_best = f64::INFINITY;
    let mut stall_since = 0;

    for iteration in 0..opts.max_iterations {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (best_p, best) = simplex[0];
        let worst = simplex[N].1;
        if !best.is_finite() {
            return None;
        }

        if stall_best - best > opts.stall_tol * best.abs().max(f64::MIN_POSITIVE) {
            stall_best = best;
            stall_since = iteration;
        } else if iteration - stall_since >= opts.stall_window {
            return Some(Minimum {
                point: best_p,
                value: best,
                iterations: iteration,
            });
        }

        let spread = (worst - best).abs();
        let size = simplex[1..]
            .iter()
            .map(|(p, _)| distance(p, &best_p))
            .fold(0.0, f64::max);
        if spread <= opts.f_tol * (best.abs() + worst.abs()) + f64::MIN_POSITIVE
            || size <= opts.x_tol
        {
            return Some(Minimum {
                point: best_p,
                value: best,
                iterations: iteration,
            });
        }

        let mut centroid = [0.0; N];
        for (p, _) in &simplex[..N] {
            for i in 0..N {
                centroid[i] += p[i] / N as f64;
            }
        }
        let worst_p = simplex[N].0;
        let along = |t: f64| {
            let mut p = [0.0; N];
            for i in 0..N {
                p[i] = centroid[i] + t * (worst_p[i] - centroid[i]);
            }
            p
        };

        let xr = along(-1.0);
        let fr = f(&xr);
        if fr < best {
            let xe = along(-2.0);
            let fe = f(&xe);
            simplex[N] = if fe < fr { (xe, fe) } else { (xr, fr) };
        } else if fr < simplex[N - 1].1 {
            simplex[N] = (xr, fr);
        } else {
            // Outside contraction if the reflection improved on the worst, inside otherwise
            let xc = if fr < worst { along(-0.5) } else { along(0.5) };
            let fc = f(&xc);
            if fc < fr.min(worst) {
                simplex[N] = (xc, fc);
            } else {
                for vertex in simplex.iter_mut().skip(1) {
                    for i in 0..N {
                        vertex.0[i] = best_p[i] + 0.5 * (vertex.0[i] - best_p[i]);
                    }
                    vertex.1 = f(&vertex.0);
                }
            }
        }
    }

    None
}

fn distance<const N: usize>(a: &[f64; N], b: &[f64; N]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_bowl() {
        let f = |p: &[f64; 2]| (p[0] - 0.3).powi(2) + 2.0 * (p[1] + 0.7).powi(2) + 1.0;
        let min = minimize(f, [0.0, 0.0], &SimplexOptions::default()).unwrap();
        assert!((min.point[0] - 0.3).abs() < 1e-3, "{:?}", min);
        assert!((min.point[1] + 0.7).abs() < 1e-3, "{:?}", min);
        assert!((min.value - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rosenbrock() {
        let f = |p: &[f64; 2]| (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2);
        let opts = SimplexOptions {
            max_iterations: 2000,
            f_tol: 1e-14,
            ..SimplexOptions::default()
        };
        let min = minimize(f, [-1.2, 1.0], &opts).unwrap();
        assert!((min.point[0] - 1.0).abs() < 1e-2, "{:?}", min);
        assert!((min.point[1] - 1.0).abs() < 1e-2, "{:?}", min);
    }

    #[test]
    fn test_flat_objective_converges_immediately() {
        let min = minimize(|_: &[f64; 2]| 4.0, [0.0, 0.0], &SimplexOptions::default()).unwrap();
        assert_eq!(min.iterations, 0);
        assert_eq!(min.value, 4.0);
    }

    #[test]
    fn test_iteration_bound() {
        let f = |p: &[f64; 2]| (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2);
        let opts = SimplexOptions {
            max_iterations: 3,
            ..SimplexOptions::default()
        };
        assert!(minimize(f, [-1.2, 1.0], &opts).is_none());
    }

    #[test]
    fn test_stall_accepts_best_vertex() {
        // With the collapse tolerances disabled only the stall check can stop it
        let opts = SimplexOptions {
            max_iterations: 100_000,
            f_tol: 0.0,
            x_tol: 0.0,
            stall_window: 50,
            ..SimplexOptions::default()
        };
        let f = |p: &[f64; 2]| (p[0] - 0.3).powi(2) + (p[1] - 0.1).powi(2) + 1.0;
        let min = minimize(f, [0.0, 0.0], &opts).unwrap();
        assert!(min.iterations < 100_000);
        assert!((min.point[0] - 0.3).abs() < 1e-3, "{:?}", min);
        assert!((min.value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_slow_descent_is_not_a_stall() {
        // Rosenbrock's valley improves slowly but steadily
        let f = |p: &[f64; 2]| (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2);
        let opts = SimplexOptions {
            max_iterations: 2000,
            ..SimplexOptions::default()
        };
        let min = minimize(f, [-1.2, 1.0], &opts).unwrap();
        assert!(min.value < 1e-4, "{:?}", min);
    }

    #[test]
    fn test_nan_objective() {
        assert!(minimize(|_: &[f64; 1]| f64::NAN, [0.0], &SimplexOptions::default()).is_none());
    }
}
