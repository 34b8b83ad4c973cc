//! Stage 5: interview preparation.
//!
//! A technical question without a recognisable difficulty, or a behavioral
//! question without a focus area, is dropped with a warning. The stage itself
//! only fails when the reply is not usable JSON.

use serde::Deserialize;
use tracing::warn;

use crate::llm_client::prompts::{fill, join_list, JSON_ONLY_FOOTER};
use crate::llm_client::ModelClient;
use crate::pipeline::prompts::INTERVIEW_PROMPT_TEMPLATE;
use crate::pipeline::stages::{call_and_parse, clean_list, StageError, StageName};
use crate::pipeline::types::{
    BehavioralQuestion, CareerRecommendations, Difficulty, InterviewPreparation, Priority,
    ResumeAnalysis, SkillGapAnalysis, TechnicalQuestion,
};

const STAGE: StageName = StageName::InterviewPreparation;
pub const NUM_TECHNICAL_QUESTIONS: usize = 10;
pub const NUM_BEHAVIORAL_QUESTIONS: usize = 8;

pub struct InterviewInputs<'a> {
    pub resume: &'a ResumeAnalysis,
    pub skill_gaps: &'a SkillGapAnalysis,
    pub career: &'a CareerRecommendations,
    pub target_role: &'a str,
}

/// Model-facing question shape; both kinds share it until classified.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    question: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    focus_area: Option<String>,
    #[serde(default)]
    tips: String,
}

#[derive(Debug, Deserialize)]
struct RawInterviewPreparation {
    #[serde(default)]
    technical_questions: Vec<RawQuestion>,
    #[serde(default)]
    behavioral_questions: Vec<RawQuestion>,
    #[serde(default)]
    preparation_tips: Vec<String>,
    #[serde(default)]
    success_strategies: Vec<String>,
    #[serde(default)]
    common_red_flags: Vec<String>,
}

pub async fn run(
    model: &dyn ModelClient,
    inputs: &InterviewInputs<'_>,
) -> Result<InterviewPreparation, StageError> {
    let prompt = build_prompt(inputs);
    let raw: RawInterviewPreparation = call_and_parse(model, STAGE, &prompt).await?;
    Ok(classify(raw, inputs.target_role))
}

pub fn build_prompt(inputs: &InterviewInputs<'_>) -> String {
    let priority_gaps: Vec<String> = inputs
        .skill_gaps
        .missing_skills
        .iter()
        .filter(|g| g.priority == Priority::High)
        .map(|g| g.skill.clone())
        .collect();
    let adjacent_roles: Vec<String> = inputs
        .career
        .alternative_roles
        .iter()
        .map(|r| r.title.clone())
        .collect();

    let num_technical = NUM_TECHNICAL_QUESTIONS.to_string();
    let num_behavioral = NUM_BEHAVIORAL_QUESTIONS.to_string();
    let technical_skills = join_list(&inputs.resume.technical_skills);
    let priority_gaps = join_list(&priority_gaps);
    let adjacent_roles = join_list(&adjacent_roles);

    fill(
        INTERVIEW_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_FOOTER),
            ("num_technical", num_technical.as_str()),
            ("num_behavioral", num_behavioral.as_str()),
            ("target_role", inputs.target_role),
            ("technical_skills", technical_skills.as_str()),
            ("priority_gaps", priority_gaps.as_str()),
            ("adjacent_roles", adjacent_roles.as_str()),
            ("experience_summary", inputs.resume.experience_summary.as_str()),
        ],
    )
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn classify(raw: RawInterviewPreparation, target_role: &str) -> InterviewPreparation {
    let mut technical_questions = Vec::with_capacity(raw.technical_questions.len());
    for q in raw.technical_questions {
        let question = q.question.trim().to_string();
        let difficulty = q.difficulty.as_deref().and_then(Difficulty::parse);
        match difficulty {
            Some(difficulty) if !question.is_empty() => technical_questions.push(TechnicalQuestion {
                question,
                category: non_blank(q.category).unwrap_or_else(|| "General".to_string()),
                difficulty,
                tips: q.tips.trim().to_string(),
            }),
            _ => warn!(
                stage = %STAGE,
                difficulty = ?q.difficulty,
                "Dropping technical question without a usable difficulty"
            ),
        }
    }

    let mut behavioral_questions = Vec::with_capacity(raw.behavioral_questions.len());
    for q in raw.behavioral_questions {
        let question = q.question.trim().to_string();
        match non_blank(q.focus_area) {
            Some(focus_area) if !question.is_empty() => {
                behavioral_questions.push(BehavioralQuestion {
                    question,
                    focus_area,
                    tips: q.tips.trim().to_string(),
                })
            }
            _ => warn!(
                stage = %STAGE,
                "Dropping behavioral question without a focus area"
            ),
        }
    }

    InterviewPreparation {
        target_role: target_role.to_string(),
        technical_questions,
        behavioral_questions,
        preparation_tips: clean_list(raw.preparation_tips),
        success_strategies: clean_list(raw.success_strategies),
        common_red_flags: clean_list(raw.common_red_flags),
    }
}
