//! Output formatters: console, JSON and Markdown

use crate::config::OutputFormat;
use crate::error::{Result, ResumeLensError};
use crate::output::report::AnalysisReport;
use colored::{Color, Colorize};
use std::path::Path;
use unicode_segmentation::UnicodeSegmentation;

/// Trait for formatting analysis reports
pub trait OutputFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Colored terminal output
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

const PREVIEW_GRAPHEMES: usize = 90;

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "▓".blue().bold(), title.blue().bold())
        } else {
            format!("\n▓ {}\n", title)
        }
    }

    fn score_color(score: u8) -> Color {
        match score {
            80..=100 => Color::Green,
            60..=79 => Color::Yellow,
            _ => Color::Red,
        }
    }

    fn format_terms(&self, terms: &[String], color: Color) -> String {
        if terms.is_empty() {
            return "  (none)\n".to_string();
        }
        let joined = terms
            .iter()
            .map(|term| self.colorize(term, color))
            .collect::<Vec<_>>()
            .join(", ");
        format!("  {}\n", joined)
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME COMPATIBILITY ANALYSIS"));
        output.push_str(&format!("Resume: {} | Role: {}\n", report.resume_file, report.role_title));

        let score_line = format!("{}% [{}]", report.score, report.verdict.to_uppercase());
        output.push_str(&format!(
            "\nScore: {}\n",
            if self.use_colors {
                score_line.color(Self::score_color(report.score)).bold().to_string()
            } else {
                score_line
            }
        ));
        output.push_str(&format!("ATS friendliness: {}\n", report.ats_friendliness));

        if report.metadata.low_confidence {
            output.push_str(&self.colorize(
                "\nWarning: no text could be extracted from the resume; treat this score as low-confidence.\n",
                Color::Yellow,
            ));
        }

        output.push_str(&self.format_header("Skills Found"));
        output.push_str(&self.format_terms(&report.skills_found, Color::Green));

        output.push_str(&self.format_header("Missing Keywords"));
        output.push_str(&self.format_terms(&report.missing_keywords, Color::Red));

        output.push_str(&self.format_header("Bullet Point Rewrites"));
        if report.weak_bullet_points.is_empty() {
            output.push_str("  (none)\n");
        }
        for (i, bullet) in report.weak_bullet_points.iter().enumerate() {
            let original = if self.detailed {
                bullet.original.clone()
            } else {
                truncate_text(&bullet.original, PREVIEW_GRAPHEMES)
            };
            output.push_str(&format!("  {}. {}\n", i + 1, self.colorize(&original, Color::BrightBlack)));
            output.push_str(&format!("     -> {}\n", self.colorize(&bullet.suggestion, Color::Cyan)));
        }

        if self.detailed {
            output.push_str(&self.format_header("Run Details"));
            output.push_str(&format!(
                "  Run {} | Model: {} | {} chars over {} page(s) | {}\n",
                report.metadata.run_id,
                report.metadata.model,
                report.metadata.resume_chars,
                report.metadata.page_count,
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        rendered.map_err(|e| ResumeLensError::OutputFormatting(format!("Failed to render JSON: {}", e)))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn markdown_list(terms: &[String]) -> String {
        if terms.is_empty() {
            return "_None_\n\n".to_string();
        }
        let mut output: String = terms.iter().map(|term| format!("- `{}`\n", term)).collect();
        output.push('\n');
        output
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Resume Compatibility Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Model:** {}\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.model
            ));
            output.push_str(&format!(
                "**Resume:** `{}` | **Role:** {}\n\n",
                report.resume_file, report.role_title
            ));
        }

        output.push_str("## Summary\n\n");
        output.push_str(&format!("**Score:** {}% ({})\n\n", report.score, report.verdict));
        output.push_str(&format!("**ATS Friendliness:** {}\n\n", report.ats_friendliness));
        if report.metadata.low_confidence {
            output.push_str("> No text could be extracted from the resume; this score is low-confidence.\n\n");
        }

        output.push_str("## Skills Found\n\n");
        output.push_str(&Self::markdown_list(&report.skills_found));

        output.push_str("## Missing Keywords\n\n");
        output.push_str(&Self::markdown_list(&report.missing_keywords));

        output.push_str("## Bullet Point Rewrites\n\n");
        if report.weak_bullet_points.is_empty() {
            output.push_str("_None_\n\n");
        } else {
            output.push_str("| Original | Suggestion |\n");
            output.push_str("|----------|------------|\n");
            for bullet in &report.weak_bullet_points {
                output.push_str(&format!(
                    "| {} | {} |\n",
                    escape_table_cell(&bullet.original),
                    escape_table_cell(&bullet.suggestion)
                ));
            }
            output.push('\n');
        }

        output.push_str(&format!("---\n_Generated by resume-lens v{}_\n", report.metadata.version));
        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

impl ReportGenerator {
    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &AnalysisReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

/// Truncate on a grapheme boundary, preferring the last word break.
pub fn truncate_text(text: &str, max_graphemes: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max_graphemes {
        return text.to_string();
    }

    let head = graphemes[..max_graphemes].concat();
    let cut = head.rfind(' ').filter(|&i| i > 0).unwrap_or(head.len());
    format!("{}...", head[..cut].trim_end())
}
