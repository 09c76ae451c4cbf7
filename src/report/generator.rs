//! Report generation.
//!
//! Renders agreement results as console text, Markdown or JSON, and the
//! corpus overview printed by `--dry-run`.

use crate::cli::OutputFormat;
use crate::models::{AgreementReport, CorpusSummary, ReportMetadata};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// The three coefficient lines, rounded to `precision` decimals.
pub fn generate_coefficient_lines(report: &AgreementReport, precision: usize) -> Vec<String> {
    let c = &report.coefficients;
    vec![
        format!("Avg agreement:          {:.*}", precision, c.avg_agreement),
        format!("Fleiss (multi_kappa):   {:.*}", precision, c.multi_kappa),
        format!("Krippendorff's alpha:   {:.*}", precision, c.alpha),
    ]
}

/// Generate the plain-text report shown on the console.
pub fn generate_text_report(report: &AgreementReport, precision: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "**** Inter-annotator agreement for {} ****\n",
        report.metadata.text
    ));
    for line in generate_coefficient_lines(report, precision) {
        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &AgreementReport, precision: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# Inter-annotator agreement: {}\n\n",
        report.metadata.text
    ));

    output.push_str(&generate_metadata_section(&report.metadata));

    output.push_str("## Coefficients\n\n");
    output.push_str("| Coefficient | Value |\n");
    output.push_str("|:---|---:|\n");
    let c = &report.coefficients;
    output.push_str(&format!(
        "| Average observed agreement | {:.*} |\n",
        precision, c.avg_agreement
    ));
    output.push_str(&format!(
        "| Fleiss (multi-kappa) | {:.*} |\n",
        precision, c.multi_kappa
    ));
    output.push_str(&format!(
        "| Krippendorff's alpha | {:.*} |\n\n",
        precision, c.alpha
    ));

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Text:** {}\n", metadata.text));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Distance:** {}\n", metadata.distance));
    section.push_str(&format!(
        "- **Flexible matching:** {}\n",
        if metadata.flexible { "yes" } else { "no" }
    ));
    section.push_str(&format!(
        "- **Missing annotations padded with:** {}\n",
        if metadata.add_missing {
            metadata.dummy_label.to_string()
        } else {
            "not padded".to_string()
        }
    ));
    section.push_str(&format!(
        "- **Items:** {} ({} annotations)\n\n",
        metadata.items, metadata.triples
    ));

    section.push_str("| Coder | Annotator |\n");
    section.push_str("|:---|:---|\n");
    for coder in &metadata.coders {
        section.push_str(&format!("| {} | {} |\n", coder.code, coder.annotator));
    }
    section.push('\n');

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &AgreementReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Render `report` in `format`.
pub fn render(report: &AgreementReport, format: OutputFormat, precision: usize) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(generate_text_report(report, precision)),
        OutputFormat::Markdown => Ok(generate_markdown_report(report, precision)),
        OutputFormat::Json => generate_json_report(report),
    }
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(())
}

/// Generate the corpus overview printed by a dry run.
pub fn generate_summary_text(summary: &CorpusSummary) -> String {
    let mut lines = Vec::new();

    for annotator in &summary.annotators {
        if annotator.texts.is_empty() {
            lines.push(format!("{}: no annotated texts", annotator.annotator));
            continue;
        }

        let total: usize = annotator.texts.iter().map(|(_, n)| n).sum();
        lines.push(format!(
            "{}: {} texts, {} labeled edges",
            annotator.annotator,
            annotator.texts.len(),
            total
        ));
        for (text, edges) in &annotator.texts {
            lines.push(format!("    {:<16} {}", text, edges));
        }
    }

    lines.join("\n")
}
