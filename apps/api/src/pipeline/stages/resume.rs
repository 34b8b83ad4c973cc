//! Stage 1: resume analysis. Reads only the resume text.

use crate::llm_client::prompts::{fill, JSON_ONLY_FOOTER};
use crate::llm_client::ModelClient;
use crate::pipeline::prompts::RESUME_PROMPT_TEMPLATE;
use crate::pipeline::stages::{call_and_parse, clamp_score, clean_list, StageError, StageName};
use crate::pipeline::types::ResumeAnalysis;

const STAGE: StageName = StageName::ResumeAnalysis;

pub async fn run(model: &dyn ModelClient, resume_text: &str) -> Result<ResumeAnalysis, StageError> {
    let prompt = build_prompt(resume_text);
    let raw: ResumeAnalysis = call_and_parse(model, STAGE, &prompt).await?;
    Ok(normalize(raw))
}

pub fn build_prompt(resume_text: &str) -> String {
    fill(
        RESUME_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_FOOTER),
            ("resume_text", resume_text.trim()),
        ],
    )
}

fn normalize(raw: ResumeAnalysis) -> ResumeAnalysis {
    ResumeAnalysis {
        technical_skills: clean_list(raw.technical_skills),
        soft_skills: clean_list(raw.soft_skills),
        experience_summary: raw.experience_summary.trim().to_string(),
        years_of_experience: raw.years_of_experience.filter(|y| *y >= 0.0),
        resume_strength: clamp_score(STAGE, "resume_strength", raw.resume_strength),
    }
}
