//! Methodology Rule Set: the single declarative place where pillar
//! eligibility is encoded. Adding a pillar or source is an edit to the rule
//! table, not a new aggregation routine.

use super::domain::{Observation, Pillar, PillarRef, SubPillar, TrustType};
use super::EngineError;

/// Eligibility filter for one metric: a fixed conjunction over trust type,
/// methodology, and source. `None` means "no restriction".
#[derive(Debug, Clone, Copy)]
pub struct EligibilityRule {
    pub metric: SubPillar,
    pub trust_type: TrustType,
    pub methodologies: Option<&'static [&'static str]>,
    pub sources: Option<&'static [&'static str]>,
}

/// The full rule table. governance_quality deliberately restricts to
/// {CPI, WGI}, a narrower set than the six-source governance composites used
/// on detail pages elsewhere in the product; that asymmetry is part of the
/// published methodology and must not be unified here.
pub const ELIGIBILITY_RULES: &[EligibilityRule] = &[
    EligibilityRule {
        metric: SubPillar::Social,
        trust_type: TrustType::Interpersonal,
        methodologies: Some(&["binary"]),
        sources: None,
    },
    EligibilityRule {
        metric: SubPillar::InstitutionalTrust,
        trust_type: TrustType::Institutional,
        methodologies: None,
        sources: None,
    },
    EligibilityRule {
        metric: SubPillar::GovernanceQuality,
        trust_type: TrustType::Governance,
        methodologies: None,
        sources: Some(&["CPI", "WGI"]),
    },
    EligibilityRule {
        metric: SubPillar::Media,
        trust_type: TrustType::Media,
        methodologies: None,
        sources: None,
    },
    EligibilityRule {
        metric: SubPillar::Financial,
        trust_type: TrustType::Financial,
        methodologies: None,
        sources: None,
    },
    EligibilityRule {
        metric: SubPillar::Science,
        trust_type: TrustType::Science,
        methodologies: None,
        sources: None,
    },
    EligibilityRule {
        metric: SubPillar::AiTech,
        trust_type: TrustType::AiTech,
        methodologies: None,
        sources: None,
    },
];

/// Expert-index sources that proxy governance quality. A cell fed only by
/// these carries no direct survey signal and is always classified tier C.
pub const GOVERNANCE_PROXY_SOURCES: &[&str] =
    &["CPI", "WGI", "WJP", "WJP_Corruption", "FH", "V-Dem"];

pub fn rule_for(metric: SubPillar) -> &'static EligibilityRule {
    ELIGIBILITY_RULES
        .iter()
        .find(|rule| rule.metric == metric)
        .unwrap_or_else(|| unreachable!("rule table covers every metric"))
}

impl EligibilityRule {
    /// Whether an observation may feed this metric.
    pub fn admits(&self, obs: &Observation) -> bool {
        if obs.trust_type != self.trust_type {
            return false;
        }
        if let Some(allowed) = self.methodologies {
            match obs.methodology.as_deref() {
                Some(methodology) if allowed.contains(&methodology) => {}
                _ => return false,
            }
        }
        if let Some(allowed) = self.sources {
            if !allowed.contains(&obs.source.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Parses a `pillar`/`trust_type` query value, accepting both current pillar
/// names and legacy trust_type names. Unknown identifiers are a caller
/// error, never a silent empty result.
pub fn parse_pillar_ref(raw: &str) -> Result<PillarRef, EngineError> {
    let normalized = raw.trim().to_ascii_lowercase();
    let selector = match normalized.as_str() {
        "social" | "interpersonal" => PillarRef::Pillar(Pillar::Social),
        "institutions" => PillarRef::Pillar(Pillar::Institutions),
        "institutional" | "institutional_trust" => PillarRef::Sub(SubPillar::InstitutionalTrust),
        "governance" | "governance_quality" => PillarRef::Sub(SubPillar::GovernanceQuality),
        "media" => PillarRef::Pillar(Pillar::Media),
        "financial" => PillarRef::Pillar(Pillar::Financial),
        "science" => PillarRef::Pillar(Pillar::Science),
        "ai-tech" | "ai_tech" => PillarRef::Pillar(Pillar::AiTech),
        _ => {
            return Err(EngineError::Validation(format!(
                "unknown pillar '{raw}'; expected one of social, institutions, media, financial, \
                 science, ai-tech or a legacy trust type (interpersonal, institutional, governance)"
            )))
        }
    };
    Ok(selector)
}
