use std::{fmt::Display, ops::Deref};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Percentage {
    pub const ZERO: Percentage = Percentage(0.);

    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `whole` taken by `value`. A day without hours has nothing to share, so every part of
/// it is 0%.
pub fn hours_percentage(value: f64, whole: f64) -> Percentage {
    if whole <= 0. {
        return Percentage::ZERO;
    }
    Percentage::new_opt(value / whole * 100.).unwrap_or(Percentage::ZERO)
}

#[cfg(test)]
mod tests {
    use super::{hours_percentage, Percentage};

    #[test]
    fn test_zero_whole_is_zero_percent() {
        assert_eq!(hours_percentage(0., 0.), Percentage::ZERO);
        assert_eq!(hours_percentage(3., 0.), Percentage::ZERO);
    }

    #[test]
    fn test_share() {
        assert_eq!(*hours_percentage(1.5, 6.), 25.);
        assert_eq!(hours_percentage(1., 3.).to_string(), "33.3%");
    }

    #[test]
    fn test_negative_is_rejected() {
        assert_eq!(Percentage::new_opt(-1.), None);
    }
}
