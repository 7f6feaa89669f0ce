use interp1d::Interp1d;

use crate::error::{AnalysisError, Result};

/// `num` evenly spaced samples over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            let mut xs: Vec<f64> = (0..num).map(|i| start + step * i as f64).collect();
            xs[num - 1] = end;
            xs
        }
    }
}

/// Remove faulty values (> 1.0 becomes 0) and make the trace non-decreasing by
/// carrying the best value seen so far forward.
pub fn clean_utility_trace(utility_trace: &[f64]) -> Vec<f64> {
    let mut cleaned: Vec<f64> = utility_trace.iter().map(|&u| if u > 1.0 { 0.0 } else { u }).collect();
    for i in 1..cleaned.len() {
        if cleaned[i] < cleaned[i - 1] {
            cleaned[i] = cleaned[i - 1];
        }
    }
    cleaned
}

/// Cut a cleaned trace to `[0, x_max)` and anchor it at `(0, 0)` and `(x_max, best)`,
/// where `best` is the highest utility reached no later than `x_max`.
///
/// Checkpoints at exactly `x_max` count towards `best`. The collector places its
/// extension point there carrying the run's last utility, so a run that continued
/// past the horizon reports its final quality at `x_max`.
///
/// The returned abscissas are strictly increasing: a checkpoint whose time does not
/// exceed the previous kept one is dropped, so the `(0, 0)` anchor wins over a
/// measurement taken at t = 0.
pub fn anchor_trace(time_trace: &[f64], cleaned: &[f64], x_max: f64) -> (Vec<f64>, Vec<f64>) {
    let best = time_trace
        .iter()
        .zip(cleaned)
        .filter(|(t, _)| **t <= x_max)
        .map(|(_, u)| *u)
        .fold(0.0, f64::max);

    let mut xs = Vec::with_capacity(time_trace.len() + 2);
    let mut ys = Vec::with_capacity(time_trace.len() + 2);
    xs.push(0.0);
    ys.push(0.0);
    for (&t, &u) in time_trace.iter().zip(cleaned) {
        if t < x_max && t > xs[xs.len() - 1] {
            xs.push(t);
            ys.push(u);
        }
    }
    xs.push(x_max);
    ys.push(best);
    (xs, ys)
}

/// Resample one trace at every abscissa of `x`.
pub fn resample_trace(time_trace: &[f64], utility_trace: &[f64], x_max: f64, x: &[f64]) -> Result<Vec<f64>> {
    if !x_max.is_finite() || x_max <= 0.0 {
        return Err(AnalysisError::DegenerateTrace(format!(
            "horizon {} leaves fewer than two distinct time points",
            x_max
        )));
    }
    if time_trace.len() != utility_trace.len() {
        return Err(AnalysisError::input_format(
            "trace",
            format!(
                "time trace has {} entries but utility trace has {}",
                time_trace.len(),
                utility_trace.len()
            ),
        ));
    }
    if let Some(&value) = x.iter().find(|v| !(0.0..=x_max).contains(*v)) {
        return Err(AnalysisError::InterpolationRange { value, max: x_max });
    }

    let cleaned = clean_utility_trace(utility_trace);
    let (xs, ys) = anchor_trace(time_trace, &cleaned, x_max);
    let (first, last) = (ys[0], ys[ys.len() - 1]);

    let interp = Interp1d::new_sorted(xs, ys)
        .map_err(|e| AnalysisError::DegenerateTrace(format!("interpolation failed: {:?}", e)))?;
    let resampled = x
        .iter()
        .map(|&xi| {
            if xi <= 0.0 {
                first
            } else if xi >= x_max {
                last
            } else {
                interp.interpolate(xi)
            }
        })
        .collect();
    Ok(resampled)
}

/// Average several utility traces on the common abscissas `x` and return the
/// curve in percent.
///
/// Every trace is cleaned ([`clean_utility_trace`]), cut and anchored
/// ([`anchor_trace`]) and linearly interpolated; the element-wise mean across traces is
/// then scaled by 100.
pub fn avg_utility_traces(
    time_traces: &[Vec<f64>],
    utility_traces: &[Vec<f64>],
    x_max: f64,
    x: &[f64],
) -> Result<Vec<f64>> {
    if time_traces.is_empty() {
        return Err(AnalysisError::EmptyGroup { key: "no traces to average".to_string() });
    }
    if time_traces.len() != utility_traces.len() {
        return Err(AnalysisError::input_format(
            "traces",
            format!("{} time traces but {} utility traces", time_traces.len(), utility_traces.len()),
        ));
    }

    let mut sum = vec![0.0; x.len()];
    for (time_trace, utility_trace) in time_traces.iter().zip(utility_traces) {
        let resampled = resample_trace(time_trace, utility_trace, x_max, x)?;
        for (acc, v) in sum.iter_mut().zip(resampled) {
            *acc += v;
        }
    }
    let n = time_traces.len() as f64;
    Ok(sum.into_iter().map(|s| s / n * 100.0).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tol, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn linspace_includes_both_ends() {
        assert_eq!(linspace(0.0, 5.0, 6), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(linspace(0.0, 10.0, 100).len(), 100);
        assert_eq!(linspace(0.0, 10.0, 100)[99], 10.0);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn clamps_spikes_before_enforcing_monotonicity() {
        assert_eq!(clean_utility_trace(&[0.2, 1.5, 0.1, 0.4]), vec![0.2, 0.2, 0.2, 0.4]);
        assert_eq!(clean_utility_trace(&[1.2, 0.3]), vec![0.0, 0.3]);
    }

    #[test]
    fn cleaned_traces_are_monotone() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let n = rng.gen_range(0..40);
            let trace: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..1.3)).collect();
            let cleaned = clean_utility_trace(&trace);
            assert_eq!(cleaned.len(), trace.len());
            assert!(cleaned.windows(2).all(|w| w[0] <= w[1]));
            assert!(cleaned.iter().all(|u| *u <= 1.0));
        }
    }

    #[test]
    fn anchors_and_truncates() {
        let (xs, ys) = anchor_trace(&[0.0, 2.0, 5.0, 7.0], &[0.1, 0.1, 0.3, 0.4], 5.0);
        assert_eq!(xs, vec![0.0, 2.0, 5.0]);
        assert_eq!(ys, vec![0.0, 0.1, 0.3]);
    }

    #[test]
    fn end_point_carries_quality_reached_after_the_horizon() {
        // checkpoint at 12 s lies past x_max, the extension point at 10 s repeats its value
        let curve = avg_utility_traces(&[vec![2.0, 12.0, 10.0]], &[vec![0.2, 0.6, 0.6]], 10.0, &[0.0, 5.0, 10.0]).unwrap();
        assert_close(&curve, &[0.0, 35.0, 60.0], 1e-9);

        // without the extension point only in-horizon checkpoints count
        let curve = avg_utility_traces(&[vec![2.0, 12.0]], &[vec![0.2, 0.6]], 10.0, &[0.0, 5.0, 10.0]).unwrap();
        assert_close(&curve, &[0.0, 20.0, 20.0], 1e-9);
    }

    #[test]
    fn end_to_end_single_trace() {
        let x = linspace(0.0, 5.0, 6);
        let curve = avg_utility_traces(&[vec![0.0, 2.0, 5.0]], &[vec![0.1, 0.05, 0.3]], 5.0, &x).unwrap();
        assert_close(&curve, &[0.0, 5.0, 10.0, 16.6667, 23.3333, 30.0], 1e-3);
    }

    #[test]
    fn averages_across_traces() {
        let x = [0.0, 5.0, 10.0];
        let times = vec![vec![1.0, 10.0], vec![5.0, 10.0]];
        let utilities = vec![vec![0.2, 0.2], vec![0.6, 0.6]];
        let curve = avg_utility_traces(&times, &utilities, 10.0, &x).unwrap();
        // trace 1: 0, 0.2, 0.2 ; trace 2: 0, 0.6, 0.6
        assert_close(&curve, &[0.0, 40.0, 40.0], 1e-9);
    }

    #[test]
    fn curve_length_follows_abscissas() {
        let x = linspace(0.0, 100.0, 100);
        let curve = avg_utility_traces(&[vec![3.0, 50.0, 120.0]], &[vec![0.4, 0.5, 0.9]], 100.0, &x).unwrap();
        assert_eq!(curve.len(), x.len());
        assert!(curve.windows(2).all(|w| w[0] <= w[1] + 1e-12));
    }

    #[test]
    fn empty_trace_resamples_to_zero() {
        let curve = avg_utility_traces(&[vec![]], &[vec![]], 4.0, &[0.0, 2.0, 4.0]).unwrap();
        assert_eq!(curve, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn abscissa_outside_domain_is_rejected() {
        let err = avg_utility_traces(&[vec![1.0]], &[vec![0.5]], 5.0, &[0.0, 6.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::InterpolationRange { value, max } if value == 6.0 && max == 5.0));
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(matches!(
            avg_utility_traces(&[vec![1.0]], &[vec![0.5]], 0.0, &[0.0]),
            Err(AnalysisError::DegenerateTrace(_))
        ));
        assert!(matches!(avg_utility_traces(&[], &[], 5.0, &[0.0]), Err(AnalysisError::EmptyGroup { .. })));
        assert!(matches!(
            avg_utility_traces(&[vec![1.0, 2.0]], &[vec![0.5]], 5.0, &[0.0]),
            Err(AnalysisError::InputFormat { .. })
        ));
    }
}
