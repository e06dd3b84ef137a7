use std::fmt;

use lopdf::Object;

/// A PDF numeric operand, kept in its original integer or real form so values
/// written back out keep their shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Real(f32),
}

impl Number {
    pub fn as_f32(self) -> f32 {
        match self {
            Number::Integer(i) => i as f32,
            Number::Real(r) => r,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Integer(i) => i == 0,
            Number::Real(r) => r == 0.,
        }
    }

    /// Multiplies by an integer factor, staying integral whenever the result is.
    pub fn scale(self, factor: i64) -> Number {
        match self {
            Number::Integer(i) => match i.checked_mul(factor) {
                Some(scaled) => Number::Integer(scaled),
                None => Number::Real(i as f32 * factor as f32),
            },
            Number::Real(r) => {
                let scaled = r * factor as f32;
                if scaled.fract() == 0. && scaled.abs() < i64::MAX as f32 {
                    Number::Integer(scaled as i64)
                } else {
                    Number::Real(scaled)
                }
            }
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::Integer(0)
    }
}

impl From<Number> for Object {
    fn from(n: Number) -> Self {
        match n {
            Number::Integer(i) => Object::Integer(i),
            Number::Real(r) => Object::Real(r),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Real(r) => write!(f, "{}", r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_keeps_integral_results_integral() {
        assert_eq!(Number::Real(0.2).scale(-1000), Number::Integer(-200));
        assert_eq!(Number::Integer(3).scale(-1000), Number::Integer(-3000));
        assert_eq!(Number::Real(0.0005).scale(-1000), Number::Real(-0.5));
    }

    #[test]
    fn scale_overflow_falls_back_to_real() {
        let huge = 10_000_000_000_000_000;
        assert_eq!(
            Number::Integer(huge).scale(-1000),
            Number::Real(huge as f32 * -1000.)
        );
        assert_eq!(Number::Integer(i64::MIN).scale(-1), Number::Real(i64::MIN as f32 * -1.));
    }

    #[test]
    fn zero_detection() {
        assert!(Number::default().is_zero());
        assert!(Number::Real(0.).is_zero());
        assert!(!Number::Real(0.1).is_zero());
    }
}
