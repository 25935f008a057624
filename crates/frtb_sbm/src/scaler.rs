//! Correlation scenario scaling.

use frtb_core::math::CorrelationMatrix;
use frtb_core::types::CorrelationScenario;

/// Diagonal of intra-bucket correlation matrices.
pub const INTRA_BUCKET_DIAGONAL: f64 = 1.0;

/// Diagonal of inter-bucket correlation matrices.
pub const INTER_BUCKET_DIAGONAL: f64 = 0.0;

/// Applies a correlation scenario to a base matrix.
pub struct ScenarioScaler;

impl ScenarioScaler {
    /// Scales every element, then overwrites the diagonal with `diagonal`.
    ///
    /// # Examples
    ///
    /// ```
    /// use frtb_core::math::CorrelationMatrix;
    /// use frtb_core::types::CorrelationScenario;
    /// use frtb_sbm::scaler::ScenarioScaler;
    ///
    /// let base = CorrelationMatrix::uniform(2, 0.9, 1.0);
    /// let low = ScenarioScaler::scale(CorrelationScenario::Low, &base, 1.0);
    /// assert!((low.get(0, 1) - 0.8).abs() < 1e-12);
    /// assert_eq!(low.get(0, 0), 1.0);
    /// ```
    pub fn scale(
        scenario: CorrelationScenario,
        base: &CorrelationMatrix,
        diagonal: f64,
    ) -> CorrelationMatrix {
        match scenario {
            CorrelationScenario::Medium => base.clone().with_diagonal(diagonal),
            _ => base.map(|rho| scenario.scale(rho)).with_diagonal(diagonal),
        }
    }

    /// Squares every element before scaling (curvature convention).
    pub fn scale_squared(
        scenario: CorrelationScenario,
        base: &CorrelationMatrix,
        diagonal: f64,
    ) -> CorrelationMatrix {
        Self::scale(scenario, &base.map(|rho| rho * rho), diagonal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_medium_is_unchanged() {
        let base = CorrelationMatrix::uniform(3, 0.4, 1.0);
        assert_eq!(
            ScenarioScaler::scale(CorrelationScenario::Medium, &base, 1.0),
            base
        );
    }

    #[test]
    fn test_high_caps_at_one() {
        let base = CorrelationMatrix::uniform(2, 0.9, 1.0);
        let high = ScenarioScaler::scale(CorrelationScenario::High, &base, 1.0);
        assert_eq!(high.get(0, 1), 1.0);
    }

    #[test]
    fn test_gamma_diagonal_is_zero() {
        let gamma = CorrelationMatrix::uniform(2, 0.5, 0.0);
        let high = ScenarioScaler::scale(CorrelationScenario::High, &gamma, INTER_BUCKET_DIAGONAL);
        assert_eq!(high.get(1, 1), 0.0);
        assert_relative_eq!(high.get(0, 1), 0.625);
    }

    #[test]
    fn test_square_before_scaling() {
        let rho = CorrelationMatrix::uniform(2, 0.5, 1.0);
        let scaled = ScenarioScaler::scale_squared(CorrelationScenario::High, &rho, 1.0);
        assert_relative_eq!(scaled.get(0, 1), 0.3125);
        let low = ScenarioScaler::scale_squared(CorrelationScenario::Low, &rho, 1.0);
        assert_relative_eq!(low.get(0, 1), 0.1875);
    }

    #[test]
    fn test_negative_correlation_low() {
        let rho = CorrelationMatrix::uniform(2, -0.5, 1.0);
        let low = ScenarioScaler::scale(CorrelationScenario::Low, &rho, 1.0);
        // max(-0.375, -2.0)
        assert_relative_eq!(low.get(0, 1), -0.375);
    }
}
