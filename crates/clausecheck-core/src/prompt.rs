//! Prompt contract for the compliance model.
//!
//! The system prompt is fixed and byte-stable; the user prompt embeds the
//! jurisdiction, its regulations as pretty-printed JSON, and the full contract text.

use serde_json::Value;

use crate::RegulationProfile;

// ── Prompt templates ──

pub const SYSTEM_PROMPT: &str = r#"You are an expert legal compliance analyst specializing in international employment law.
Your task is to analyze employment contracts and evaluate their compliance with country-specific labor regulations.

ANALYSIS METHODOLOGY:
1. Read the employment contract thoroughly
2. Compare each clause against the provided country regulations
3. Identify specific compliance issues with precise references
4. Provide actionable recommendations for remediation

COMPLIANCE STATUS DEFINITIONS:
- COMPLIANT: The contract clause meets or exceeds the legal requirement
- NON_COMPLIANT: The contract violates the regulation or falls short of requirements
- PARTIALLY_COMPLIANT: The contract addresses the requirement but has minor gaps
- NOT_ADDRESSED: The contract does not mention this aspect (may or may not be required)

OUTPUT FORMAT:
You MUST respond with a valid JSON object following this exact structure:
{
  "overallScore": <number 0-100>,
  "overallStatus": "<COMPLIANT|PARTIALLY_COMPLIANT|NON_COMPLIANT>",
  "summary": "<2-3 sentence executive summary>",
  "findings": [
    {
      "category": "<regulation category>",
      "requirement": "<what the law requires>",
      "status": "<COMPLIANT|NON_COMPLIANT|PARTIALLY_COMPLIANT|NOT_ADDRESSED>",
      "contractClause": "<relevant text from contract or 'Not found'>",
      "analysis": "<detailed explanation>",
      "severity": "<HIGH|MEDIUM|LOW>",
      "recommendation": "<specific action to fix if non-compliant>"
    }
  ],
  "criticalIssues": ["<list of most severe violations>"],
  "positiveAspects": ["<list of well-handled compliance areas>"]
}"#;

/// System and user prompt pair for one analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    pub system: String,
    pub user: String,
}

/// Render both prompts for a contract and a jurisdiction.
pub fn build_prompts(document_text: &str, profile: &RegulationProfile) -> Prompts {
    Prompts {
        system: SYSTEM_PROMPT.to_string(),
        user: build_user_prompt(document_text, profile),
    }
}

/// Render the user prompt. `document_text` is embedded whole, even when empty.
pub fn build_user_prompt(document_text: &str, profile: &RegulationProfile) -> String {
    // Alternate Display on Value pretty-prints with two-space indentation.
    let regulations = Value::Object(profile.regulations.clone());
    format!(
        "Please analyze the following employment contract for compliance with {name} employment regulations.\n\
         \n\
         === COUNTRY REGULATIONS: {name} ===\n\
         {regulations:#}\n\
         \n\
         === EMPLOYMENT CONTRACT TO ANALYZE ===\n\
         {document_text}\n\
         \n\
         === INSTRUCTIONS ===\n\
         1. Analyze the contract against EACH regulation category provided\n\
         2. Quote specific contract clauses when referencing findings\n\
         3. Be precise about what is compliant vs non-compliant\n\
         4. Provide the overall compliance score as a percentage (0-100)\n\
         5. Focus on legally significant issues, not formatting\n\
         \n\
         Respond with the JSON analysis object as specified.",
        name = profile.name,
    )
}
