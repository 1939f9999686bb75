use super::ConstructionError;

/// A scalar desirability score, where higher is better.
///
/// Any finite value is a valid preference. Negative values act as a veto: an
/// arc whose request-side or bid-side preference is negative is never created.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "f64", into = "f64")
)]
pub struct Preference(f64);

impl Preference {
    /// The preference assigned when a participant does not state one
    pub const NEUTRAL: Self = Self(1.0);

    /// Validate and wrap a preference value
    pub fn new(value: f64) -> Result<Self, ConstructionError> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(ConstructionError::NonFinite("preference"))
        }
    }

    /// The raw score
    pub fn value(self) -> f64 {
        self.0
    }

    /// Combine a request-side and bid-side preference into an arc weight.
    ///
    /// The combination is the arithmetic mean. Returns `None` if either side
    /// vetoes the match (negative or NaN).
    pub fn combine(request: f64, bid: f64) -> Option<f64> {
        if request >= 0.0 && bid >= 0.0 && request.is_finite() && bid.is_finite() {
            Some((request + bid) / 2.0)
        } else {
            None
        }
    }
}

impl Default for Preference {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl TryFrom<f64> for Preference {
    type Error = ConstructionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Preference> for f64 {
    fn from(value: Preference) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, 0.9, Some(0.95))]
    #[case(0.0, 0.0, Some(0.0))]
    #[case(2.0, 0.0, Some(1.0))]
    #[case(-0.1, 1.0, None)]
    #[case(1.0, -5.0, None)]
    #[case(f64::NAN, 1.0, None)]
    fn combination(#[case] request: f64, #[case] bid: f64, #[case] expected: Option<f64>) {
        assert_eq!(Preference::combine(request, bid), expected);
    }

    #[test]
    fn combination_is_monotone() {
        let low = Preference::combine(0.5, 0.5).unwrap();
        assert!(Preference::combine(0.6, 0.5).unwrap() > low);
        assert!(Preference::combine(0.5, 0.6).unwrap() > low);
    }

    #[test]
    fn rejects_non_finite() {
        assert_eq!(
            Preference::new(f64::INFINITY),
            Err(ConstructionError::NonFinite("preference"))
        );
        assert!(Preference::new(-3.0).is_ok());
    }
}
