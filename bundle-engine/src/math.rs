//! Shared numeric primitives.
//!
//! Every ratio in the engine (margin, support, lift, correlation) goes
//! through [`safe_div`], so a zero, NaN or infinite intermediate always
//! collapses to 0 instead of leaking into emitted rows.

/// Coerce NaN and infinities to 0.
#[inline]
pub fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Divide, returning 0 when the denominator is 0 or the result is not finite.
#[inline]
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

/// Quantile of `values` with linear interpolation between closest ranks.
///
/// `q` is clamped into [0, 1]. An empty slice yields 0. NaN inputs are
/// treated as 0.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = values.iter().copied().map(finite_or_zero).collect();
    sorted.sort_by(f64::total_cmp);

    let q = finite_or_zero(q).clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Pearson correlation of two equally long series.
///
/// Returns `None` when the correlation is undefined: fewer than two
/// observations, mismatched lengths, or a constant series.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return None;
    }
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    let r = cov / denom;
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Round half away from zero to `decimals` places.
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    finite_or_zero((x * factor).round() / factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_div_guards_zero_and_nan() {
        assert_eq!(safe_div(1.0, 0.0), 0.0);
        assert_eq!(safe_div(f64::NAN, 2.0), 0.0);
        assert_eq!(safe_div(1.0, f64::INFINITY), 0.0);
        assert!((safe_div(3.0, 4.0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&v, 0.0) - 1.0).abs() < 1e-12);
        assert!((quantile(&v, 1.0) - 4.0).abs() < 1e-12);
        // pos = 0.3 * 3 = 0.9 → 1 + 0.9
        assert!((quantile(&v, 0.3) - 1.9).abs() < 1e-12);
        // pos = 0.7 * 3 = 2.1 → 3 + 0.1
        assert!((quantile(&v, 0.7) - 3.1).abs() < 1e-12);
    }

    #[test]
    fn quantile_is_order_independent() {
        let a = [5.0, 500.0, 40.0, 7.0];
        let b = [500.0, 7.0, 5.0, 40.0];
        assert_eq!(quantile(&a, 0.3), quantile(&b, 0.3));
    }

    #[test]
    fn quantile_of_empty_is_zero() {
        assert_eq!(quantile(&[], 0.5), 0.0);
    }

    #[test]
    fn pearson_detects_perfect_correlation() {
        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_undefined_cases() {
        assert!(pearson(&[1.0], &[1.0]).is_none());
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(pearson(&[1.0, 2.0], &[1.0]).is_none());
    }

    #[test]
    fn round_to_decimals() {
        assert_eq!(round_to(12.345_6, 2), 12.35);
        assert_eq!(round_to(0.123_46, 4), 0.1235);
        assert_eq!(round_to(f64::NAN, 2), 0.0);
    }
}
