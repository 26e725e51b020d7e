use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::{AnalysisResult, ApplicationForm, AssetKind, FraClaimType, LandType};

lazy_static! {
    static ref NOT_NUMERIC: Regex = Regex::new(r"[^\d.]").unwrap();
    static ref LEADING_NUMBER: Regex = Regex::new(r"^\d*\.?\d*").unwrap();
}

const AREA_TOLERANCE: f64 = 0.3;
const TRADITIONAL_KEYWORDS: &[&str] = &[
    "traditional",
    "ancestral",
    "generations",
    "community",
    "tribal",
    "indigenous",
];

struct Check {
    weight: u32,
    issue: &'static str,
    recommendation: &'static str,
}

const LAND_AREA: Check = Check {
    weight: 20,
    issue: "Land area does not match AI-detected boundaries",
    recommendation: "Verify land area measurements with field survey",
};
const COORDINATES: Check = Check {
    weight: 15,
    issue: "Invalid or missing coordinates",
    recommendation: "Provide accurate GPS coordinates for the claimed land",
};
const ELIGIBILITY: Check = Check {
    weight: 25,
    issue: "Land may not be eligible for forest rights",
    recommendation: "Verify traditional forest use and community rights",
};
const DOCUMENTATION: Check = Check {
    weight: 20,
    issue: "Incomplete supporting documentation",
    recommendation: "Upload all required documents and evidence",
};
const HISTORY: Check = Check {
    weight: 20,
    issue: "Insufficient historical evidence of forest use",
    recommendation: "Provide additional evidence of traditional forest use",
};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationDetails {
    pub land_area_match: bool,
    pub coordinates_valid: bool,
    pub forest_rights_eligible: bool,
    pub documentation_complete: bool,
    pub historical_evidence: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub confidence: f64,
    pub score: u32,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub ai_analysis: Option<AnalysisResult>,
    pub validation_details: ValidationDetails,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Moderate,
    Low,
}

impl ValidationReport {
    pub fn band(&self) -> ConfidenceBand {
        if self.confidence >= 0.8 {
            ConfidenceBand::High
        } else if self.confidence >= 0.6 {
            ConfidenceBand::Moderate
        } else {
            ConfidenceBand::Low
        }
    }
}

/// Reads a number out of free text the way a browser's `parseFloat` would
/// after everything but digits and dots has been stripped: `"1,250 ha"` is
/// 1250, `"4.5.1"` is 4.5.
pub fn claimed_hectares(text: &str) -> Option<f64> {
    let stripped = NOT_NUMERIC.replace_all(text, "");
    let number = LEADING_NUMBER.find(&stripped)?.as_str();
    number.parse().ok()
}

fn land_area_matches(form: &ApplicationForm, analysis: Option<&AnalysisResult>) -> bool {
    let Some(analysis) = analysis else {
        return true;
    };
    let Some(claimed) = claimed_hectares(&form.land_area) else {
        return false;
    };
    ((claimed - analysis.total_area()).abs() / claimed) <= AREA_TOLERANCE
}

fn coordinates_valid(form: &ApplicationForm) -> bool {
    form.coordinates.is_some_and(|c| c.is_valid())
}

fn eligible(form: &ApplicationForm, analysis: Option<&AnalysisResult>) -> bool {
    let Some(analysis) = analysis else {
        return true;
    };
    let mut forests = analysis.assets_of(AssetKind::Forest).peekable();
    if forests.peek().is_none() {
        return false;
    }

    match (form.claim_type, form.land_type) {
        (FraClaimType::CommunityForestRights, LandType::Community) => {
            forests.any(|asset| asset.area >= 5.0)
        }
        (FraClaimType::CommunityForestResourceRights, LandType::Habitation) => {
            forests.any(|asset| asset.area >= 10.0)
        }
        _ => true,
    }
}

fn documentation_complete(form: &ApplicationForm) -> bool {
    !form.supporting_documents.is_empty()
        && form.description.chars().count() > 50
        && [&form.applicant_name, &form.village, &form.district, &form.state]
            .iter()
            .all(|field| !field.is_empty())
}

fn historical_evidence(form: &ApplicationForm, analysis: Option<&AnalysisResult>) -> bool {
    let Some(analysis) = analysis else {
        return true;
    };
    let description = form.description.to_lowercase();
    let mentions_use = TRADITIONAL_KEYWORDS
        .iter()
        .any(|keyword| description.contains(keyword));
    let forest_evidence = analysis
        .forest_data
        .as_ref()
        .is_some_and(|f| f.canopy_cover > 40.0 || f.biomass > 100.0);

    mentions_use || forest_evidence
}

/// Scores a claim out of 100. Checks that depend on the land analysis pass
/// when no analysis is available.
pub fn validate_claim(form: &ApplicationForm, analysis: Option<AnalysisResult>) -> ValidationReport {
    let details = ValidationDetails {
        land_area_match: land_area_matches(form, analysis.as_ref()),
        coordinates_valid: coordinates_valid(form),
        forest_rights_eligible: eligible(form, analysis.as_ref()),
        documentation_complete: documentation_complete(form),
        historical_evidence: historical_evidence(form, analysis.as_ref()),
    };

    let outcomes = [
        (&LAND_AREA, details.land_area_match),
        (&COORDINATES, details.coordinates_valid),
        (&ELIGIBILITY, details.forest_rights_eligible),
        (&DOCUMENTATION, details.documentation_complete),
        (&HISTORY, details.historical_evidence),
    ];

    let max_score: u32 = outcomes.iter().map(|(check, _)| check.weight).sum();
    let mut score = 0;
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();
    for (check, passed) in outcomes {
        if passed {
            score += check.weight;
        } else {
            issues.push(check.issue.to_string());
            recommendations.push(check.recommendation.to_string());
        }
    }

    let confidence = f64::from(score) / f64::from(max_score);
    ValidationReport {
        is_valid: confidence >= 0.7 && issues.len() <= 2,
        confidence,
        score,
        issues,
        recommendations,
        ai_analysis: analysis,
        validation_details: details,
    }
}
