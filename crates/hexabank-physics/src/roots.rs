// ─────────────────────────────────────────────────────────────────────
// Hexabank — Bisection Root Finder
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use hexabank_types::{BankError, BankResult};

/// Default iteration budget for [`bisect`].
pub const MAX_BISECTIONS: usize = 100;

/// Find a root of `f` in `[xmin, xmax]` to within `xacc`.
///
/// The end points must bracket a sign change. When the iteration budget
/// runs out first, the midpoint of the last bracket is returned.
pub fn bisect<F>(f: F, xmin: f64, xmax: f64, xacc: f64, max_iter: usize) -> BankResult<f64>
where
    F: Fn(f64) -> f64,
{
    let f_lo = f(xmin);
    let f_hi = f(xmax);
    if !(f_lo.is_finite() && f_hi.is_finite()) || f_lo * f_hi > 0.0 {
        return Err(BankError::Bracket { xmin, xmax });
    }
    if f_lo == 0.0 {
        return Ok(xmin);
    }
    if f_hi == 0.0 {
        return Ok(xmax);
    }

    // Orient so that f(lo) < 0 < f(hi).
    let (mut lo, mut hi) = if f_lo < 0.0 { (xmin, xmax) } else { (xmax, xmin) };
    for _ in 0..max_iter {
        let mid = 0.5 * (lo + hi);
        if (hi - lo).abs() < xacc {
            return Ok(mid);
        }
        let f_mid = f(mid);
        if f_mid == 0.0 {
            return Ok(mid);
        }
        if f_mid < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    log::debug!("bisect: budget of {max_iter} iterations exhausted in [{xmin}, {xmax}]");
    Ok(0.5 * (lo + hi))
}
