//! Markdown report generation
//!
//! This module renders an analysis result as a human-readable markdown
//! document, including the heading histogram and the full link table.

use crate::analyzer::AnalysisResult;
use crate::output::{percentage, OutputResult};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report to `output_path`
///
/// # Arguments
///
/// * `result` - The analysis result
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn generate_markdown_report(result: &AnalysisResult, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(result, Utc::now());

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats an analysis result as markdown
///
/// `generated_at` is stamped into the header.
pub fn format_markdown_report(result: &AnalysisResult, generated_at: DateTime<Utc>) -> String {
    let mut md = String::new();

    md.push_str("# Site-Analyzer Report\n\n");

    md.push_str("## Page\n\n");
    md.push_str(&format!("- **URL**: {}\n", result.url));
    md.push_str(&format!("- **Title**: {}\n", escape_cell(&result.title)));
    md.push_str(&format!("- **HTML Version**: {}\n", result.html_version));
    md.push_str(&format!(
        "- **Login Form**: {}\n",
        if result.has_login_form { "yes" } else { "no" }
    ));
    md.push_str(&format!(
        "- **Generated**: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    md.push_str("## Headings\n\n");
    if result.heading_counts.is_empty() {
        md.push_str("No headings found.\n\n");
    } else {
        md.push_str("| Tag | Count |\n");
        md.push_str("|-----|-------|\n");
        for (tag, count) in &result.heading_counts {
            md.push_str(&format!("| {} | {} |\n", tag, count));
        }
        md.push('\n');
    }

    let total = result.total_links();
    md.push_str("## Links\n\n");
    md.push_str(&format!("- **Total**: {}\n", total));
    md.push_str(&format!("- **Internal**: {}\n", result.internal_count));
    md.push_str(&format!("- **External**: {}\n", result.external_count));
    md.push_str(&format!(
        "- **Inaccessible**: {} ({:.2}%)\n\n",
        result.inaccessible_count,
        percentage(result.inaccessible_count, total)
    ));

    if !result.links.is_empty() {
        md.push_str("| # | Link | Type | Accessible |\n");
        md.push_str("|---|------|------|------------|\n");
        for (i, link) in result.links.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                i + 1,
                escape_cell(&link.href),
                if link.is_internal { "internal" } else { "external" },
                if link.is_accessible { "yes" } else { "no" }
            ));
        }
        md.push('\n');
    }

    md
}

/// Keeps arbitrary page text from breaking table rows
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}
