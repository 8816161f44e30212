//! Learning-gap classification of self-reported weak areas.

use serde::Serialize;

/// Severity of a reported weak area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapTier {
    Critical,
    Significant,
    Minor,
}

/// Keyword rules for gap classification.
///
/// Keywords are matched as substrings of the lowercased label. Critical
/// keywords are checked first, so a label lands in exactly one tier.
#[derive(Debug, Clone)]
pub struct GapRules {
    pub critical_keywords: Vec<String>,
    pub significant_keywords: Vec<String>,
}

impl Default for GapRules {
    fn default() -> Self {
        Self {
            critical_keywords: to_strings(&[
                "function",
                "equation",
                "derivative",
                "функции",
                "уравнения",
                "производная",
            ]),
            significant_keywords: to_strings(&[
                "geometry",
                "trigonometry",
                "геометрия",
                "тригонометрия",
            ]),
        }
    }
}

fn to_strings(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|k| k.to_string()).collect()
}

impl GapRules {
    pub fn classify(&self, label: &str) -> GapTier {
        let lowered = label.to_lowercase();
        let matches = |keywords: &[String]| keywords.iter().any(|k| lowered.contains(k.as_str()));
        if matches(&self.critical_keywords) {
            GapTier::Critical
        } else if matches(&self.significant_keywords) {
            GapTier::Significant
        } else {
            GapTier::Minor
        }
    }

    /// Split weak areas into tiers. Labels are kept verbatim and in input order.
    pub fn analyze(&self, weak_areas: &[String]) -> GapAnalysis {
        let mut gaps = GapAnalysis::default();
        for area in weak_areas {
            match self.classify(area) {
                GapTier::Critical => gaps.critical.push(area.clone()),
                GapTier::Significant => gaps.significant.push(area.clone()),
                GapTier::Minor => gaps.minor.push(area.clone()),
            }
        }
        gaps
    }
}

/// Weak areas grouped by severity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GapAnalysis {
    pub critical: Vec<String>,
    pub significant: Vec<String>,
    pub minor: Vec<String>,
}

impl GapAnalysis {
    pub fn is_critical(&self, name: &str) -> bool {
        self.critical.iter().any(|g| g == name)
    }

    pub fn is_significant(&self, name: &str) -> bool {
        self.significant.iter().any(|g| g == name)
    }

    pub fn is_empty(&self) -> bool {
        self.critical.is_empty() && self.significant.is_empty() && self.minor.is_empty()
    }
}
