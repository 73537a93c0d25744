//! Plain-text report for the terminal

use crate::analyzer::AnalysisResult;
use crate::output::percentage;

/// Formats an analysis result as a plain-text report
///
/// When `show_links` is set, every link is listed with its classification
/// and accessibility.
pub fn format_report(result: &AnalysisResult, show_links: bool) -> String {
    let mut out = String::new();

    out.push_str("=== Page Analysis ===\n\n");
    out.push_str(&format!("URL: {}\n", result.url));
    out.push_str(&format!("Title: {}\n", result.title));
    out.push_str(&format!("HTML version: {}\n", result.html_version));
    out.push_str(&format!(
        "Login form: {}\n\n",
        if result.has_login_form { "yes" } else { "no" }
    ));

    out.push_str(&format!("Headings ({}):\n", result.total_headings()));
    if result.heading_counts.is_empty() {
        out.push_str("  none\n");
    }
    for (tag, count) in &result.heading_counts {
        out.push_str(&format!("  {}: {}\n", tag, count));
    }
    out.push('\n');

    let total = result.total_links();
    out.push_str(&format!("Links ({}):\n", total));
    out.push_str(&format!(
        "  Internal: {} ({:.1}%)\n",
        result.internal_count,
        percentage(result.internal_count, total)
    ));
    out.push_str(&format!(
        "  External: {} ({:.1}%)\n",
        result.external_count,
        percentage(result.external_count, total)
    ));
    out.push_str(&format!(
        "  Inaccessible: {} ({:.1}%)\n",
        result.inaccessible_count,
        percentage(result.inaccessible_count, total)
    ));

    if show_links && !result.links.is_empty() {
        out.push('\n');
        for link in &result.links {
            out.push_str(&format!(
                "  [{}] [{}] {}\n",
                if link.is_internal { "int" } else { "ext" },
                if link.is_accessible { " ok " } else { "FAIL" },
                link.href
            ));
        }
    }

    out
}

/// Prints an analysis result to stdout
pub fn print_report(result: &AnalysisResult, show_links: bool) {
    print!("{}", format_report(result, show_links));
}
