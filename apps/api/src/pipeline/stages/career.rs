//! Stage 3: career recommendation.
//!
//! Always yields one best-fit role and at most two alternatives. Extra
//! alternatives are cut to the first two in the model's order. A reply with no
//! alternatives is kept as-is with a data-quality warning.

use tracing::warn;

use crate::llm_client::prompts::{fill, join_list, JSON_ONLY_FOOTER};
use crate::llm_client::ModelClient;
use crate::pipeline::parser::ParseError;
use crate::pipeline::prompts::{CAREER_GAP_CONTEXT_TEMPLATE, CAREER_PROMPT_TEMPLATE};
use crate::pipeline::stages::{call_and_parse, clamp_score, StageError, StageName};
use crate::pipeline::types::{
    CareerRecommendations, ResumeAnalysis, RoleRecommendation, SkillGapAnalysis,
};

const STAGE: StageName = StageName::CareerRecommendation;
pub const MAX_ALTERNATIVE_ROLES: usize = 2;

pub struct CareerInputs<'a> {
    pub resume: &'a ResumeAnalysis,
    /// Present only when skill gap ran first, i.e. a target role was requested.
    pub skill_gaps: Option<&'a SkillGapAnalysis>,
}

pub async fn run(
    model: &dyn ModelClient,
    inputs: &CareerInputs<'_>,
) -> Result<CareerRecommendations, StageError> {
    let prompt = build_prompt(inputs);
    let raw: CareerRecommendations = call_and_parse(model, STAGE, &prompt).await?;
    Ok(normalize(raw)?)
}

pub fn build_prompt(inputs: &CareerInputs<'_>) -> String {
    let resume = inputs.resume;
    let years = resume
        .years_of_experience
        .map(|y| y.to_string())
        .unwrap_or_else(|| "Not stated".to_string());
    let role_context = inputs
        .skill_gaps
        .map(|gaps| {
            let readiness = gaps
                .readiness_score
                .map(|r| r.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            fill(
                CAREER_GAP_CONTEXT_TEMPLATE,
                &[
                    ("target_role", gaps.target_role.as_str()),
                    ("readiness_score", readiness.as_str()),
                    ("gap_analysis", gaps.gap_analysis.as_str()),
                ],
            )
        })
        .unwrap_or_default();
    let technical_skills = join_list(&resume.technical_skills);
    let soft_skills = join_list(&resume.soft_skills);

    fill(
        CAREER_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_FOOTER),
            ("role_context", role_context.as_str()),
            ("years_of_experience", years.as_str()),
            ("technical_skills", technical_skills.as_str()),
            ("soft_skills", soft_skills.as_str()),
            ("experience_summary", resume.experience_summary.as_str()),
        ],
    )
}

fn normalize(raw: CareerRecommendations) -> Result<CareerRecommendations, ParseError> {
    let best_fit = normalize_role(raw.best_fit_role);
    if best_fit.title.is_empty() {
        let raw_role = serde_json::to_string(&best_fit).unwrap_or_default();
        return Err(ParseError::new(
            "career recommendation has an empty best_fit_role.title",
            &raw_role,
        ));
    }

    let mut alternatives: Vec<RoleRecommendation> = raw
        .alternative_roles
        .into_iter()
        .map(normalize_role)
        .filter(|r| !r.title.is_empty())
        .collect();

    if alternatives.is_empty() {
        warn!(
            stage = %STAGE,
            best_fit = %best_fit.title,
            "Model returned no alternative roles"
        );
    } else if alternatives.len() > MAX_ALTERNATIVE_ROLES {
        warn!(
            stage = %STAGE,
            returned = alternatives.len(),
            kept = MAX_ALTERNATIVE_ROLES,
            "Too many alternative roles, keeping the first ones in model order"
        );
        alternatives.truncate(MAX_ALTERNATIVE_ROLES);
    }

    Ok(CareerRecommendations {
        best_fit_role: best_fit,
        alternative_roles: alternatives,
        career_insights: raw.career_insights.trim().to_string(),
    })
}

fn normalize_role(role: RoleRecommendation) -> RoleRecommendation {
    RoleRecommendation {
        title: role.title.trim().to_string(),
        match_score: clamp_score(STAGE, "match_score", role.match_score),
        reasoning: role.reasoning.trim().to_string(),
    }
}
