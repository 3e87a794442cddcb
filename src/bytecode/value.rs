//! Runtime values.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Significant digits used when rendering a value.
const DISPLAY_PRECISION: i32 = 6;

/// A double-precision number. The only value type the VM knows.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Value(pub f64);

impl Value {
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// True for both `+0.0` and `-0.0`.
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value(n)
    }
}

impl From<Value> for f64 {
    fn from(value: Value) -> f64 {
        value.0
    }
}

impl Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        Value(-self.0)
    }
}

impl Add for Value {
    type Output = Value;

    fn add(self, rhs: Value) -> Value {
        Value(self.0 + rhs.0)
    }
}

impl Sub for Value {
    type Output = Value;

    fn sub(self, rhs: Value) -> Value {
        Value(self.0 - rhs.0)
    }
}

impl Mul for Value {
    type Output = Value;

    fn mul(self, rhs: Value) -> Value {
        Value(self.0 * rhs.0)
    }
}

impl Div for Value {
    type Output = Value;

    fn div(self, rhs: Value) -> Value {
        Value(self.0 / rhs.0)
    }
}

/// Renders like C's `%g`: six significant digits, trailing zeros dropped, and
/// exponent notation when the exponent is below -4 or at least six.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_general(self.0))
    }
}

fn format_general(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to the target precision can bump the exponent (999999.5 -> 1e+06),
    // so the exponent is taken from the rounded scientific form.
    let scientific = format!("{:.*e}", (DISPLAY_PRECISION - 1) as usize, n);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= DISPLAY_PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_trailing_zeros(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (DISPLAY_PRECISION - 1 - exponent) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, n)).to_string()
    }
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
