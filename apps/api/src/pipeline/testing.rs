//! In-memory `ModelClient` and canned model replies for pipeline tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{ModelClient, ModelError, ResponseHint};

pub const SAMPLE_RESUME: &str = "Jane Doe — Software Engineer. Five years building backend \
    services in Rust and Python at a fintech startup. Led migration of a payments API to \
    async Rust, mentored two junior engineers, and owned on-call for the ledger service.";

/// Replays a fixed queue of replies in order and records every prompt it receives.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, ModelError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn complete(
        &self,
        prompt: &str,
        _hint: Option<&ResponseHint>,
    ) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ModelError::EmptyResponse {
                reason: Some("script exhausted".to_string()),
            }))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub const RESUME_REPLY: &str = r#"{
  "technical_skills": ["Rust", "Python", "PostgreSQL"],
  "soft_skills": ["Mentoring", "Ownership"],
  "experience_summary": "Mid-level backend engineer with five years in fintech.",
  "resume_strength": 7.5,
  "years_of_experience": 5
}"#;

pub const SKILL_GAP_REPLY: &str = r#"```json
{
  "missing_skills": [
    {"skill": "Kubernetes", "priority": "High", "reason": "Production deploys run on k8s"},
    {"skill": "Distributed tracing", "priority": "Medium", "reason": "Debugging across services"},
    {"skill": "Terraform", "priority": "Low", "reason": "Infra as code"}
  ],
  "gap_analysis": "Strong coding foundation; infrastructure depth is the main gap.",
  "readiness_score": 6.5
}
```"#;

pub const CAREER_REPLY: &str = r#"{
  "best_fit_role": {"title": "Backend Engineer", "match_score": 8.5, "reasoning": "Deep API work."},
  "alternative_roles": [
    {"title": "Platform Engineer", "match_score": 7.0, "reasoning": "On-call ownership."},
    {"title": "Site Reliability Engineer", "match_score": 6.5, "reasoning": "Ledger uptime."}
  ],
  "career_insights": "Moving toward platform work would compound existing strengths."
}"#;

pub fn roadmap_reply(months: u8) -> String {
    let goals: Vec<serde_json::Value> = (1..=months)
        .map(|m| {
            serde_json::json!({
                "month": m,
                "focus_areas": [format!("Area {m}")],
                "learning_objectives": ["Objective"],
                "skills_to_acquire": ["Kubernetes"],
                "practice_projects": ["Deploy a service"],
                "resources": ["Official docs"]
            })
        })
        .collect();
    serde_json::json!({
        "roadmap_duration": months,
        "monthly_goals": goals,
        "overall_strategy": "Infrastructure first, then observability.",
        "success_metrics": ["Ship a k8s deployment"]
    })
    .to_string()
}

pub const INTERVIEW_REPLY: &str = r#"Here you go:
{
  "technical_questions": [
    {"question": "Design a rate limiter.", "category": "System Design", "difficulty": "Hard", "tips": "Discuss token buckets."},
    {"question": "Explain Rust ownership.", "category": "Programming", "difficulty": "Easy", "tips": "Use an example."}
  ],
  "behavioral_questions": [
    {"question": "Tell me about an outage you owned.", "focus_area": "Ownership", "tips": "Use STAR."}
  ],
  "preparation_tips": ["Review system design basics"],
  "common_red_flags": ["Blaming teammates"],
  "success_strategies": ["Quantify impact"]
}"#;
