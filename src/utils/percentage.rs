use std::{fmt::Display, ops::Deref};

use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

impl Percentage {
    pub const ZERO: Percentage = Percentage(0.);

    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value.is_nan() || value < 0. {
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

/// Share of `value` in `whole`. An empty whole gives 0%.
pub fn duration_percentage(value: Duration, whole: Duration) -> Percentage {
    if whole.num_seconds() <= 0 {
        return Percentage::ZERO;
    }
    Percentage::new_opt(value.num_seconds() as f64 / whole.num_seconds() as f64 * 100.)
        .unwrap_or(Percentage::ZERO)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::duration_percentage;

    #[test]
    fn test_duration_percentage() {
        let p = duration_percentage(Duration::seconds(30), Duration::seconds(120));
        assert_eq!(*p, 25.);
        assert_eq!(p.to_string(), "25%");
        assert_eq!(
            *duration_percentage(Duration::seconds(30), Duration::zero()),
            0.
        );
    }
}
