pub mod extract;
pub mod prompt;
pub mod regulation;
pub mod report;

pub use extract::{DocumentKind, ExtractError, extract_text};
pub use prompt::{Prompts, SYSTEM_PROMPT, build_prompts, build_user_prompt};
pub use regulation::{CountrySummary, RegulationProfile};
pub use report::{
    ComplianceReport, Finding, FindingStatus, OverallStatus, ReportError, Severity,
};
