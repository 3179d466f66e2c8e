use crate::io::error::{Result, invalid_parameter};
use num_traits::Float;
use std::fmt::Display;

/// Validate that `p` lies in `[0, 1]`
///
/// # Errors
///
/// Returns an invalid parameter error naming `parameter` when `p` is out of
/// range or NaN
pub fn try_probability<F: Float + Display>(parameter: &'static str, p: F) -> Result<F> {
    if p >= F::zero() && p <= F::one() {
        Ok(p)
    } else {
        Err(invalid_parameter(
            parameter,
            &p,
            &"probability must be in [0.0, 1.0]",
        ))
    }
}

/// Logistic squashing of `x` into `(0, 1)`
pub fn sigmoid<F: Float>(x: F) -> F {
    F::one() / (F::one() + (-x).exp())
}
