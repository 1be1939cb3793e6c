//! Vertical card display for compliance reports and guide listings.
//!
//! Renders a [`ComplianceReport`] as a grouped, human-readable card: headline
//! score, summary, findings grouped by status, then critical issues and
//! positive aspects.

use clausecheck_core::{ComplianceReport, CountrySummary, Finding, FindingStatus};
use clausecheck_store::SampleContract;

const LABEL_WIDTH: usize = 16;
const MAX_LIST_ITEMS: usize = 10;

/// Worst first.
const STATUS_ORDER: &[(FindingStatus, &str)] = &[
    (FindingStatus::NonCompliant, "Non-compliant"),
    (FindingStatus::PartiallyCompliant, "Partially compliant"),
    (FindingStatus::NotAddressed, "Not addressed"),
    (FindingStatus::Compliant, "Compliant"),
];

// ── Public API ──

pub fn print_report(file_name: &str, country_name: &str, report: &ComplianceReport) {
    print!("{}", render_report(file_name, country_name, report));
}

pub fn print_countries(countries: &[CountrySummary]) {
    for c in countries {
        println!("{:<10} {}", c.code, c.name);
        if !c.description.is_empty() {
            println!("  {}", c.description);
        }
        for feature in c.key_features.iter().take(MAX_LIST_ITEMS) {
            println!("  - {feature}");
        }
        println!();
    }
}

pub fn print_samples(samples: &[SampleContract]) {
    print!("{}", render_samples(samples));
}

// ── Report card ──

pub fn render_report(file_name: &str, country_name: &str, report: &ComplianceReport) -> String {
    let mut out = format!(
        "=== {file_name} ===\nCompliance with {country_name} employment regulations\n\n"
    );
    out.push_str(&label("score", &format!("{}/100", report.overall_score)));
    out.push_str(&label("status", &humanize(report.overall_status.as_str())));
    out.push_str(&label("findings", &report.findings.len().to_string()));
    out.push('\n');
    out.push_str(&report.summary);
    out.push_str("\n\n");

    for &(status, header) in STATUS_ORDER {
        let group: Vec<&Finding> = report.findings_with_status(status).collect();
        if group.is_empty() {
            continue;
        }
        out.push_str(&format!("{header} ({})\n", group.len()));
        for finding in group {
            out.push_str(&render_finding(finding));
        }
    }

    out.push_str(&render_list("Critical issues", &report.critical_issues));
    out.push_str(&render_list("Positive aspects", &report.positive_aspects));
    out
}

fn render_finding(f: &Finding) -> String {
    let mut out = format!("  [{}] {}\n", f.severity.as_str(), f.category);
    out.push_str(&field("requirement", &f.requirement));
    if f.has_clause() {
        out.push_str(&field("clause", &format!("\"{}\"", f.contract_clause)));
    } else {
        out.push_str(&field("clause", "(not found)"));
    }
    out.push_str(&field("analysis", &f.analysis));
    if let Some(rec) = f.actionable_recommendation() {
        out.push_str(&field("recommendation", rec));
    }
    out.push('\n');
    out
}

fn render_list(header: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut out = format!("{header}\n");
    for item in items.iter().take(MAX_LIST_ITEMS) {
        out.push_str(&format!("  - {item}\n"));
    }
    if items.len() > MAX_LIST_ITEMS {
        out.push_str(&format!("  ... and {} more\n", items.len() - MAX_LIST_ITEMS));
    }
    out.push('\n');
    out
}

pub fn render_samples(samples: &[SampleContract]) -> String {
    samples
        .iter()
        .map(|s| {
            format!(
                "{:<44} {:<14} {:<8} {}\n  {}\n",
                s.filename,
                s.compliance_hint,
                s.target_country,
                s.description,
                s.path.display()
            )
        })
        .collect()
}

/// Top-level `label  value` line.
fn label(name: &str, value: &str) -> String {
    format!("  {name:<LABEL_WIDTH$} {value}\n")
}

/// Finding detail line, indented under its header.
fn field(name: &str, value: &str) -> String {
    format!("    {name:<LABEL_WIDTH$} {value}\n")
}

/// `PARTIALLY_COMPLIANT` → `PARTIALLY COMPLIANT`
fn humanize(status: &str) -> String {
    status.replace('_', " ")
}
