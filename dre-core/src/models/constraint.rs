use super::{ConstructionError, Map};

/// A linear capacity bound over the member quantities of a portfolio.
///
/// The constraint reads `Σ coefficient(i) · q_i ≤ limit`, where `i` is a
/// member's position in its portfolio. Members without an explicit coefficient
/// use the constraint's default. Coefficients and the limit are non-negative,
/// so the empty allocation always satisfies every constraint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawCapacityConstraint", into = "RawCapacityConstraint")
)]
pub struct CapacityConstraint {
    limit: f64,
    default: f64,
    overrides: Map<usize, f64>,
}

impl CapacityConstraint {
    /// A bound on the total quantity of the portfolio, e.g. a facility's throughput.
    pub fn total(limit: f64) -> Result<Self, ConstructionError> {
        Self::weighted(limit, 1.0, std::iter::empty())
    }

    /// A bound on a weighted sum of member quantities.
    ///
    /// `default` applies to any member not listed in `overrides`.
    pub fn weighted(
        limit: f64,
        default: f64,
        overrides: impl IntoIterator<Item = (usize, f64)>,
    ) -> Result<Self, ConstructionError> {
        if !limit.is_finite() {
            return Err(ConstructionError::InvalidConstraint("limit must be finite"));
        }
        if limit < 0.0 {
            return Err(ConstructionError::InvalidConstraint(
                "limit must be non-negative",
            ));
        }

        let overrides = overrides.into_iter().collect::<Map<usize, f64>>();
        for &coefficient in std::iter::once(&default).chain(overrides.values()) {
            if !coefficient.is_finite() {
                return Err(ConstructionError::NonFinite("coefficient"));
            }
            if coefficient < 0.0 {
                return Err(ConstructionError::InvalidConstraint(
                    "coefficients must be non-negative",
                ));
            }
        }

        Ok(Self {
            limit,
            default,
            overrides,
        })
    }

    /// The right-hand side of the bound
    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// The coefficient applied to the member at `position`
    pub fn coefficient(&self, position: usize) -> f64 {
        self.overrides
            .get(&position)
            .copied()
            .unwrap_or(self.default)
    }

    /// The left-hand side of the bound for the given member quantities
    pub fn usage(&self, quantities: &[f64]) -> f64 {
        quantities
            .iter()
            .enumerate()
            .map(|(position, q)| self.coefficient(position) * q)
            .sum()
    }

    /// How far the given quantities are from the limit (negative if violated)
    pub fn headroom(&self, quantities: &[f64]) -> f64 {
        self.limit - self.usage(quantities)
    }

    /// Whether the given quantities satisfy the bound.
    ///
    /// This is a pure check; it does not search for a feasible point.
    pub fn evaluate(&self, quantities: &[f64]) -> bool {
        self.usage(quantities) <= self.limit
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawCapacityConstraint {
    limit: f64,
    #[serde(default = "unit")]
    default: f64,
    #[serde(default)]
    coefficients: Map<usize, f64>,
}

#[cfg(feature = "serde")]
fn unit() -> f64 {
    1.0
}

#[cfg(feature = "serde")]
impl TryFrom<RawCapacityConstraint> for CapacityConstraint {
    type Error = ConstructionError;

    fn try_from(value: RawCapacityConstraint) -> Result<Self, Self::Error> {
        Self::weighted(value.limit, value.default, value.coefficients)
    }
}

#[cfg(feature = "serde")]
impl From<CapacityConstraint> for RawCapacityConstraint {
    fn from(value: CapacityConstraint) -> Self {
        Self {
            limit: value.limit,
            default: value.default,
            coefficients: value.overrides,
        }
    }
}
