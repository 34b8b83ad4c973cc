//! Stage runners: one prompt → model → parse cycle each.
//!
//! Every stage is a pure function of its declared inputs plus the model client.
//! Model and parse failures are returned unchanged inside `StageError` so the
//! orchestrator (and ultimately the HTTP layer) can tell them apart.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::{ModelClient, ModelError, ResponseHint};
use crate::pipeline::parser::{self, ParseError};
use crate::pipeline::types::MAX_SCORE;

pub mod career;
pub mod interview;
pub mod resume;
pub mod roadmap;
pub mod skill_gap;

/// The five pipeline stages, declared in their nominal (numbered) order.
/// `Ord` follows that order and is used as the tie-break when scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    ResumeAnalysis,
    SkillGapAnalysis,
    CareerRecommendation,
    LearningRoadmap,
    InterviewPreparation,
}

impl StageName {
    pub const ALL: [StageName; 5] = [
        StageName::ResumeAnalysis,
        StageName::SkillGapAnalysis,
        StageName::CareerRecommendation,
        StageName::LearningRoadmap,
        StageName::InterviewPreparation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::ResumeAnalysis => "resume_analysis",
            StageName::SkillGapAnalysis => "skill_gap_analysis",
            StageName::CareerRecommendation => "career_recommendation",
            StageName::LearningRoadmap => "learning_roadmap",
            StageName::InterviewPreparation => "interview_preparation",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Sends one prompt and decodes the reply as `T`.
pub(crate) async fn call_and_parse<T: DeserializeOwned>(
    model: &dyn ModelClient,
    stage: StageName,
    prompt: &str,
) -> Result<T, StageError> {
    info!(%stage, "Calling model");
    let raw = model.complete(prompt, Some(&ResponseHint::Json)).await?;
    let parsed = parser::parse::<T>(&raw)?;
    info!(%stage, "Model reply parsed");
    Ok(parsed)
}

/// Clamps a 0–10 score, logging when the model strays out of range.
/// Absence is preserved.
pub(crate) fn clamp_score(stage: StageName, field: &str, score: Option<f32>) -> Option<f32> {
    score.map(|s| {
        if (0.0..=MAX_SCORE).contains(&s) {
            s
        } else {
            let clamped = s.clamp(0.0, MAX_SCORE);
            warn!(%stage, field, original = s, clamped, "Score out of range, clamped");
            clamped
        }
    })
}

/// Trims entries and drops blanks, keeping order.
pub(crate) fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
