use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A score amount with one decimal place of precision.
///
/// Stored as an integer count of tenths so that the per-step one-decimal
/// rounding of the ruleset is exact and every event stays zero-sum.
/// Serialized as a plain decimal number (`15.5`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Points(i64);

impl Points {
    pub const ZERO: Points = Points(0);

    pub const fn from_tenths(tenths: i64) -> Self {
        Self(tenths)
    }

    pub const fn whole(value: i64) -> Self {
        Self(value * 10)
    }

    pub const fn tenths(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 10.0
    }

    /// Multiplies by `halves / 2` and rounds to one decimal, half away from zero.
    pub fn scale_halves(self, halves: i64) -> Self {
        Self(div_round(self.0 * halves, 2))
    }

    /// Divides evenly between `parts` shares, rounding to one decimal.
    pub fn split(self, parts: i64) -> Self {
        Self(div_round(self.0, parts))
    }
}

fn div_round(numerator: i64, denominator: i64) -> i64 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

impl From<f64> for Points {
    fn from(value: f64) -> Self {
        Self((value * 10.0).round() as i64)
    }
}

impl From<Points> for f64 {
    fn from(points: Points) -> Self {
        points.as_f64()
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        if abs % 10 == 0 {
            write!(f, "{}{}", sign, abs / 10)
        } else {
            write!(f, "{}{}.{}", sign, abs / 10, abs % 10)
        }
    }
}

impl Add for Points {
    type Output = Points;

    fn add(self, rhs: Points) -> Points {
        Points(self.0 + rhs.0)
    }
}

impl AddAssign for Points {
    fn add_assign(&mut self, rhs: Points) {
        self.0 += rhs.0;
    }
}

impl Sub for Points {
    type Output = Points;

    fn sub(self, rhs: Points) -> Points {
        Points(self.0 - rhs.0)
    }
}

impl SubAssign for Points {
    fn sub_assign(&mut self, rhs: Points) {
        self.0 -= rhs.0;
    }
}

impl Neg for Points {
    type Output = Points;

    fn neg(self) -> Points {
        Points(-self.0)
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Points>>(iter: I) -> Points {
        iter.fold(Points::ZERO, |acc, p| acc + p)
    }
}

impl<'a> Sum<&'a Points> for Points {
    fn sum<I: Iterator<Item = &'a Points>>(iter: I) -> Points {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(90, 1, 45)] // 9 x 0.5
    #[case(90, 2, 90)] // 9 x 1.0
    #[case(90, 3, 135)] // 9 x 1.5
    #[case(155, 1, 78)] // 15.5 x 0.5 = 7.75 -> 7.8
    #[case(45, 1, 23)] // 4.5 x 0.5 = 2.25 -> 2.3
    #[case(-45, 1, -23)]
    fn scale_halves_rounds_to_one_decimal(
        #[case] tenths: i64,
        #[case] halves: i64,
        #[case] expected: i64,
    ) {
        assert_eq!(
            Points::from_tenths(tenths).scale_halves(halves),
            Points::from_tenths(expected)
        );
    }

    #[rstest]
    #[case(Points::whole(9), "9")]
    #[case(Points::from_tenths(155), "15.5")]
    #[case(Points::from_tenths(-155), "-15.5")]
    #[case(Points::from_tenths(-5), "-0.5")]
    #[case(Points::ZERO, "0")]
    fn display_drops_trailing_zero(#[case] points: Points, #[case] expected: &str) {
        assert_eq!(points.to_string(), expected);
    }

    #[test]
    fn serializes_as_decimal_number() {
        let json = serde_json::to_string(&Points::from_tenths(155)).unwrap();
        assert_eq!(json, "15.5");

        let parsed: Points = serde_json::from_str("-4.5").unwrap();
        assert_eq!(parsed, Points::from_tenths(-45));
    }

    #[test]
    fn sums_and_negates() {
        let values = [Points::whole(9), Points::from_tenths(155), -Points::whole(3)];
        let total: Points = values.iter().sum();
        assert_eq!(total, Points::from_tenths(215));
    }
}
