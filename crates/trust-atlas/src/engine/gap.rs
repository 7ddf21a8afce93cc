//! Gap Calculator: the Trust-Quality Gap between citizen perception and
//! expert-assessed governance quality, plus the severity reading used by
//! downstream classification.

use super::aggregate::round1;
use super::domain::GapAssessment;

/// `institutional_trust - governance_quality`, rounded to one decimal, or
/// null when either side is missing. Positive means citizens trust more
/// than governance quality warrants; the sign convention is load-bearing
/// for downstream severity bands and must not flip.
pub fn trust_quality_gap(
    institutional_trust: Option<f64>,
    governance_quality: Option<f64>,
) -> Option<f64> {
    match (institutional_trust, governance_quality) {
        (Some(trust), Some(quality)) => Some(round1(trust - quality)),
        _ => None,
    }
}

impl GapAssessment {
    /// Severity bands escalate at 10 and 25 points on either side of zero.
    pub fn from_gap(gap: f64) -> Self {
        if gap >= 25.0 {
            GapAssessment::NaiveTrust
        } else if gap >= 10.0 {
            GapAssessment::TrustSurplus
        } else if gap > -10.0 {
            GapAssessment::Aligned
        } else if gap > -25.0 {
            GapAssessment::TrustDeficit
        } else {
            GapAssessment::CynicalDistrust
        }
    }
}

/// Assessment for an optional gap; null gaps carry no assessment.
pub fn assess(gap: Option<f64>) -> Option<GapAssessment> {
    gap.map(GapAssessment::from_gap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_sign_is_trust_minus_quality() {
        assert_eq!(trust_quality_gap(Some(70.0), Some(40.0)), Some(30.0));
        assert_eq!(trust_quality_gap(Some(40.0), Some(70.0)), Some(-30.0));
    }

    #[test]
    fn gap_is_null_when_either_side_is_missing() {
        assert_eq!(trust_quality_gap(None, Some(70.0)), None);
        assert_eq!(trust_quality_gap(Some(70.0), None), None);
        assert_eq!(trust_quality_gap(None, None), None);
    }

    #[test]
    fn gap_rounds_to_one_decimal() {
        assert_eq!(trust_quality_gap(Some(55.55), Some(40.0)), Some(15.6));
    }

    #[test]
    fn severity_bands_escalate_at_10_and_25() {
        assert_eq!(GapAssessment::from_gap(0.0), GapAssessment::Aligned);
        assert_eq!(GapAssessment::from_gap(9.9), GapAssessment::Aligned);
        assert_eq!(GapAssessment::from_gap(-9.9), GapAssessment::Aligned);
        assert_eq!(GapAssessment::from_gap(10.0), GapAssessment::TrustSurplus);
        assert_eq!(GapAssessment::from_gap(24.9), GapAssessment::TrustSurplus);
        assert_eq!(GapAssessment::from_gap(25.0), GapAssessment::NaiveTrust);
        assert_eq!(GapAssessment::from_gap(-10.0), GapAssessment::TrustDeficit);
        assert_eq!(GapAssessment::from_gap(-25.0), GapAssessment::CynicalDistrust);
    }
}
