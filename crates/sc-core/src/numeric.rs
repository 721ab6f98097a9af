use crate::ScError;

/// Floating point type used throughout the system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, ScError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ScError::NonFinite { what, value: v })
    }
}

/// Check a whole attribute slice at once. Reports the first offending value.
pub fn ensure_all_finite(values: &[Real], what: &'static str) -> Result<(), ScError> {
    for &v in values {
        if !v.is_finite() {
            return Err(ScError::NonFinite { what, value: v });
        }
    }
    Ok(())
}
