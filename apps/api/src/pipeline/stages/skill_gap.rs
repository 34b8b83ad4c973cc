//! Stage 2: skill gap analysis against the effective target role.
//!
//! A gap without a priority is kept at Medium. A gap whose priority is not
//! High, Medium or Low is dropped with a warning; one odd entry never fails
//! the stage.

use serde::Deserialize;
use tracing::warn;

use crate::llm_client::prompts::{fill, join_list, JSON_ONLY_FOOTER};
use crate::llm_client::ModelClient;
use crate::pipeline::prompts::SKILL_GAP_PROMPT_TEMPLATE;
use crate::pipeline::stages::{call_and_parse, clamp_score, StageError, StageName};
use crate::pipeline::types::{lenient_number, Priority, ResumeAnalysis, SkillGap, SkillGapAnalysis};

const STAGE: StageName = StageName::SkillGapAnalysis;

#[derive(Debug, Deserialize)]
struct RawSkillGap {
    #[serde(default)]
    skill: String,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
struct RawSkillGapAnalysis {
    #[serde(default)]
    missing_skills: Vec<RawSkillGap>,
    #[serde(default, deserialize_with = "lenient_number")]
    readiness_score: Option<f32>,
    #[serde(default)]
    gap_analysis: String,
}

pub struct SkillGapInputs<'a> {
    pub resume: &'a ResumeAnalysis,
    /// Explicitly requested role, or the career stage's best fit.
    pub target_role: &'a str,
}

pub async fn run(
    model: &dyn ModelClient,
    inputs: &SkillGapInputs<'_>,
) -> Result<SkillGapAnalysis, StageError> {
    let prompt = build_prompt(inputs);
    let raw: RawSkillGapAnalysis = call_and_parse(model, STAGE, &prompt).await?;
    Ok(normalize(raw, inputs.target_role))
}

pub fn build_prompt(inputs: &SkillGapInputs<'_>) -> String {
    let user_skills = join_list(&inputs.resume.all_skills());
    fill(
        SKILL_GAP_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_FOOTER),
            ("user_skills", user_skills.as_str()),
            ("target_role", inputs.target_role),
            ("experience_summary", inputs.resume.experience_summary.as_str()),
        ],
    )
}

fn classify_gap(raw: RawSkillGap) -> Option<SkillGap> {
    let skill = raw.skill.trim().to_string();
    if skill.is_empty() {
        return None;
    }
    let priority = match raw.priority.as_deref().map(str::trim) {
        None | Some("") => Priority::Medium,
        Some(label) => match Priority::parse(label) {
            Some(priority) => priority,
            None => {
                warn!(
                    stage = %STAGE,
                    %skill,
                    priority = label,
                    "Dropping skill gap with unknown priority"
                );
                return None;
            }
        },
    };
    Some(SkillGap {
        skill,
        priority,
        reason: raw.reason.trim().to_string(),
    })
}

fn normalize(raw: RawSkillGapAnalysis, target_role: &str) -> SkillGapAnalysis {
    SkillGapAnalysis {
        // The role the gaps were measured against is ours, not the model's.
        target_role: target_role.to_string(),
        missing_skills: raw
            .missing_skills
            .into_iter()
            .filter_map(classify_gap)
            .collect(),
        readiness_score: clamp_score(STAGE, "readiness_score", raw.readiness_score),
        gap_analysis: raw.gap_analysis.trim().to_string(),
    }
}
