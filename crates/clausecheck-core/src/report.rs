//! Structured compliance report returned by the model.
//!
//! Field names follow the camelCase JSON contract declared in
//! [`SYSTEM_PROMPT`](crate::SYSTEM_PROMPT); enum values are SCREAMING_SNAKE_CASE.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Sentinel the model uses for `contractClause` when nothing in the document applies.
pub const CLAUSE_NOT_FOUND: &str = "Not found";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("report is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("overallScore {0} is outside 0..=100")]
    ScoreOutOfRange(u32),
}

/// Verdict for the contract as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Compliant,
    PartiallyCompliant,
    NonCompliant,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliant => "COMPLIANT",
            Self::PartiallyCompliant => "PARTIALLY_COMPLIANT",
            Self::NonCompliant => "NON_COMPLIANT",
        }
    }
}

/// Verdict for a single regulation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingStatus {
    /// Clause meets or exceeds the legal requirement.
    Compliant,
    /// Clause violates or falls short of the requirement.
    NonCompliant,
    /// Requirement addressed with minor gaps.
    PartiallyCompliant,
    /// Contract is silent on this requirement.
    NotAddressed,
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliant => "COMPLIANT",
            Self::NonCompliant => "NON_COMPLIANT",
            Self::PartiallyCompliant => "PARTIALLY_COMPLIANT",
            Self::NotAddressed => "NOT_ADDRESSED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

/// One regulation-category verdict with supporting evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub category: String,
    pub requirement: String,
    pub status: FindingStatus,
    /// Verbatim contract text, or [`CLAUSE_NOT_FOUND`].
    pub contract_clause: String,
    pub analysis: String,
    pub severity: Severity,
    /// Remediation guidance. Only meaningful when `status` is not `Compliant`,
    /// so the model may leave it out for compliant findings.
    #[serde(default)]
    pub recommendation: String,
}

impl Finding {
    /// Whether the model found a supporting clause in the contract.
    pub fn has_clause(&self) -> bool {
        !self.contract_clause.trim().is_empty() && self.contract_clause != CLAUSE_NOT_FOUND
    }

    /// The recommendation, if it applies to this finding.
    pub fn actionable_recommendation(&self) -> Option<&str> {
        if self.status == FindingStatus::Compliant || self.recommendation.trim().is_empty() {
            None
        } else {
            Some(&self.recommendation)
        }
    }
}

/// Full compliance assessment for one contract against one jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    #[serde(deserialize_with = "whole_number")]
    pub overall_score: u32,
    pub overall_status: OverallStatus,
    pub summary: String,
    pub findings: Vec<Finding>,
    pub critical_issues: Vec<String>,
    pub positive_aspects: Vec<String>,
}

impl ComplianceReport {
    /// Parse a model payload into a report.
    ///
    /// All top-level fields are required. The payload is accepted whole or
    /// rejected; nothing is repaired or defaulted.
    pub fn from_json(payload: &str) -> Result<Self, ReportError> {
        let report: Self = serde_json::from_str(payload)?;
        if report.overall_score > 100 {
            return Err(ReportError::ScoreOutOfRange(report.overall_score));
        }
        Ok(report)
    }

    /// Findings with the given status, in report order.
    pub fn findings_with_status(&self, status: FindingStatus) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.status == status)
    }
}

/// Models sometimes write integral scores as floats (`85.0`); accept those,
/// reject fractions and negatives.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(v) = n.as_u64() {
        return u32::try_from(v).map_err(|_| D::Error::custom(format!("score {v} is too large")));
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&f) => Ok(f as u32),
        _ => Err(D::Error::custom(format!("score {n} is not a whole number"))),
    }
}
