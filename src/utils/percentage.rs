use std::{fmt::Display, ops::Deref};

/// Share of a whole, kept inside `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Percentage {
    pub const ZERO: Percentage = Percentage(0.);
    pub const FULL: Percentage = Percentage(100.);

    pub fn new_opt(value: f64) -> Option<Percentage> {
        if (0. ..=100.).contains(&value) {
            Some(Percentage(value))
        } else {
            None
        }
    }

    /// `part / whole` as a percentage. Anything outside of the range gets clamped, a zero or
    /// non-finite whole gives zero.
    pub fn of(part: f64, whole: f64) -> Percentage {
        if whole <= 0. || !whole.is_finite() || !part.is_finite() {
            return Percentage::ZERO;
        }
        Percentage((part / whole * 100.).clamp(0., 100.))
    }

    /// Value in `0..=1`. Handy for drawing bars.
    pub fn ratio(&self) -> f64 {
        self.0 / 100.
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Percentage;

    #[test]
    fn of_clamps_to_range() {
        assert_eq!(Percentage::of(250., 500.), Percentage::new_opt(50.).unwrap());
        assert_eq!(Percentage::of(900., 500.), Percentage::FULL);
        assert_eq!(Percentage::of(-1., 500.), Percentage::ZERO);
        assert_eq!(Percentage::of(10., 0.), Percentage::ZERO);
    }

    #[test]
    fn displays_one_decimal() {
        assert_eq!(Percentage::of(1., 3.).to_string(), "33.3%");
    }
}
