//! Presentation-side report built from a pipeline outcome

use crate::llm::validator::WeakBulletPoint;
use crate::pipeline::orchestrator::AnalysisOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// What the user sees: the outcome plus display-normalized keyword sets.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub resume_file: String,
    pub role_title: String,
    pub score: u8,
    pub verdict: String,
    pub ats_friendliness: String,
    /// Lowercased, de-duplicated, sorted
    pub missing_keywords: Vec<String>,
    /// Lowercased, de-duplicated, sorted
    pub skills_found: Vec<String>,
    pub weak_bullet_points: Vec<WeakBulletPoint>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub run_id: u64,
    pub model: String,
    pub resume_chars: usize,
    pub page_count: usize,
    pub low_confidence: bool,
    pub generated_at: DateTime<Utc>,
    pub version: String,
}

impl AnalysisReport {
    pub fn new(outcome: &AnalysisOutcome, resume_file: &Path, role_title: &str, model: &str) -> Self {
        let result = &outcome.result;
        Self {
            resume_file: resume_file
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| resume_file.display().to_string()),
            role_title: role_title.trim().to_string(),
            score: result.score,
            verdict: verdict(result.score).to_string(),
            ats_friendliness: result.ats_friendliness.clone(),
            missing_keywords: normalize_terms(&result.missing_keywords),
            skills_found: normalize_terms(&result.skills_found),
            weak_bullet_points: result.weak_bullet_points.clone(),
            metadata: ReportMetadata {
                run_id: outcome.run_id.0,
                model: model.to_string(),
                resume_chars: outcome.resume_chars,
                page_count: outcome.page_count,
                low_confidence: outcome.low_confidence,
                generated_at: outcome.completed_at,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// Case-fold, trim and de-duplicate terms for display.
pub fn normalize_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn verdict(score: u8) -> &'static str {
    match score {
        90..=100 => "Excellent",
        80..=89 => "Very Good",
        70..=79 => "Good",
        60..=69 => "Fair",
        50..=59 => "Below Average",
        _ => "Poor",
    }
}
