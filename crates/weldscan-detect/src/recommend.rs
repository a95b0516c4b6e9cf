//! Guidance text keyed by defect class and risk level.

use serde::{Deserialize, Serialize};

use crate::types::{DefectClass, RiskLevel};

/// Guidance for one defect class, from most to least urgent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceTiers {
    pub critical: Vec<String>,
    pub high: Vec<String>,
    /// Used for `medium` and `low` risk.
    pub routine: Vec<String>,
}

impl GuidanceTiers {
    fn from_static(critical: &[&str], high: &[&str], routine: &[&str]) -> Self {
        let own = |items: &[&str]| items.iter().map(|s| (*s).to_owned()).collect();
        Self {
            critical: own(critical),
            high: own(high),
            routine: own(routine),
        }
    }

    pub fn for_risk(&self, risk: RiskLevel) -> &[String] {
        match risk {
            RiskLevel::Critical => &self.critical,
            RiskLevel::High => &self.high,
            RiskLevel::Medium | RiskLevel::Low => &self.routine,
        }
    }
}

/// Static recommendation data; override it through JSON to localize or
/// adapt the wording.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationTable {
    pub crack: GuidanceTiers,
    pub porosity: GuidanceTiers,
    pub slag: GuidanceTiers,
}

impl Default for RecommendationTable {
    fn default() -> Self {
        Self {
            crack: GuidanceTiers::from_static(
                &[
                    "Immediate repair required",
                    "Stop operation until fixed",
                    "Conduct structural integrity assessment",
                ],
                &[
                    "Schedule repair within 24 hours",
                    "Monitor for growth",
                    "Consider stress analysis",
                ],
                &["Monitor during next inspection", "Document for trend analysis"],
            ),
            porosity: GuidanceTiers::from_static(
                &[
                    "Reject weld - redo required",
                    "Check welding parameters",
                    "Verify material quality",
                ],
                &[
                    "Evaluate against acceptance criteria",
                    "Consider repair welding",
                    "Review welding procedure",
                ],
                &["Acceptable if within limits", "Monitor in future inspections"],
            ),
            slag: GuidanceTiers::from_static(
                &[
                    "Remove slag and re-weld",
                    "Improve slag removal technique",
                    "Check electrode condition",
                ],
                &[
                    "Evaluate size and location",
                    "Consider grinding and repair",
                    "Review welding technique",
                ],
                &["Monitor for changes", "Ensure proper cleaning"],
            ),
        }
    }
}

impl RecommendationTable {
    pub fn tiers(&self, class: DefectClass) -> &GuidanceTiers {
        match class {
            DefectClass::Crack => &self.crack,
            DefectClass::Porosity => &self.porosity,
            DefectClass::Slag => &self.slag,
        }
    }

    pub fn lookup(&self, class: DefectClass, risk: RiskLevel) -> &[String] {
        self.tiers(class).for_risk(risk)
    }
}
