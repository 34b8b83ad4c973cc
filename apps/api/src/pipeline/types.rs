//! Request, per-stage outputs, and the combined analysis payload.
//!
//! Stage output types deserialize directly from model JSON. List fields default
//! to empty; the numeric fields the summary depends on stay `Option` so that a
//! missing score surfaces as `null` instead of a fabricated zero.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const MIN_RESUME_CHARS: usize = 50;
pub const MIN_ROADMAP_MONTHS: u8 = 3;
pub const MAX_ROADMAP_MONTHS: u8 = 6;
pub const DEFAULT_ROADMAP_MONTHS: u8 = 6;
pub const MAX_SCORE: f32 = 10.0;

// ────────────────────────────────────────────────────────────────────────────
// Request
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub resume_text: String,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default = "default_roadmap_months")]
    pub roadmap_months: u8,
}

fn default_roadmap_months() -> u8 {
    DEFAULT_ROADMAP_MONTHS
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("resume_text must be at least {min} characters (got {actual})")]
    ResumeTooShort { min: usize, actual: usize },

    #[error("roadmap_months must be between {min} and {max} (got {actual})")]
    RoadmapMonthsOutOfRange { min: u8, max: u8, actual: u8 },
}

impl AnalysisRequest {
    pub fn new(resume_text: impl Into<String>) -> Self {
        Self {
            resume_text: resume_text.into(),
            target_role: None,
            roadmap_months: DEFAULT_ROADMAP_MONTHS,
        }
    }

    pub fn with_target_role(mut self, role: impl Into<String>) -> Self {
        self.target_role = Some(role.into());
        self
    }

    pub fn with_roadmap_months(mut self, months: u8) -> Self {
        self.roadmap_months = months;
        self
    }

    /// Rejects the request before any model call is made.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let actual = self.resume_text.trim().chars().count();
        if actual < MIN_RESUME_CHARS {
            return Err(ValidationError::ResumeTooShort {
                min: MIN_RESUME_CHARS,
                actual,
            });
        }
        if !(MIN_ROADMAP_MONTHS..=MAX_ROADMAP_MONTHS).contains(&self.roadmap_months) {
            return Err(ValidationError::RoadmapMonthsOutOfRange {
                min: MIN_ROADMAP_MONTHS,
                max: MAX_ROADMAP_MONTHS,
                actual: self.roadmap_months,
            });
        }
        Ok(())
    }

    /// The explicitly requested role, if it has any non-whitespace content.
    pub fn requested_role(&self) -> Option<&str> {
        self.target_role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 1: resume analysis
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    #[serde(default)]
    pub technical_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
    pub experience_summary: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub years_of_experience: Option<f32>,
    /// 0–10. `None` when the model omitted it.
    #[serde(default, deserialize_with = "lenient_number")]
    pub resume_strength: Option<f32>,
}

impl ResumeAnalysis {
    /// Technical skills followed by soft skills, in order.
    pub fn all_skills(&self) -> Vec<String> {
        self.technical_skills
            .iter()
            .chain(self.soft_skills.iter())
            .cloned()
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 2: skill gap analysis
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" | "critical" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Priority::parse(&raw).ok_or_else(|| {
            de::Error::unknown_variant(raw.trim(), &["High", "Medium", "Low"])
        })
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub priority: Priority,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGapAnalysis {
    /// The effective target role the gaps were measured against.
    #[serde(default)]
    pub target_role: String,
    #[serde(default)]
    pub missing_skills: Vec<SkillGap>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub readiness_score: Option<f32>,
    #[serde(default)]
    pub gap_analysis: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 3: career recommendation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRecommendation {
    pub title: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub match_score: Option<f32>,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerRecommendations {
    pub best_fit_role: RoleRecommendation,
    #[serde(default)]
    pub alternative_roles: Vec<RoleRecommendation>,
    #[serde(default)]
    pub career_insights: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 4: learning roadmap
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthPlan {
    /// Assigned during reconciliation; whatever the model wrote here is ignored.
    #[serde(skip_deserializing)]
    pub month: u8,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub skills_to_acquire: Vec<String>,
    #[serde(default)]
    pub practice_projects: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl MonthPlan {
    pub fn empty(month: u8) -> Self {
        Self {
            month,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRoadmap {
    /// Always the requested month count, never the model's.
    #[serde(skip_deserializing)]
    pub roadmap_duration: u8,
    #[serde(default)]
    pub target_role: String,
    #[serde(default)]
    pub overall_strategy: String,
    #[serde(default)]
    pub monthly_goals: Vec<MonthPlan>,
    #[serde(default)]
    pub success_metrics: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 5: interview preparation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalQuestion {
    pub question: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub tips: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehavioralQuestion {
    pub question: String,
    pub focus_area: String,
    pub tips: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewPreparation {
    pub target_role: String,
    pub technical_questions: Vec<TechnicalQuestion>,
    pub behavioral_questions: Vec<BehavioralQuestion>,
    pub preparation_tips: Vec<String>,
    pub success_strategies: Vec<String>,
    pub common_red_flags: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Combined result
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionCounts {
    pub technical: usize,
    pub behavioral: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub resume_strength: Option<f32>,
    pub recommended_role: String,
    pub readiness_score: Option<f32>,
    pub total_skill_gaps: usize,
    pub roadmap_duration: u8,
    pub interview_questions_generated: QuestionCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisData {
    pub resume_analysis: ResumeAnalysis,
    pub skill_gap_analysis: SkillGapAnalysis,
    pub career_recommendations: CareerRecommendations,
    pub learning_roadmap: LearningRoadmap,
    pub interview_preparation: InterviewPreparation,
}

impl AnalysisData {
    pub fn summary(&self) -> Summary {
        Summary {
            resume_strength: self.resume_analysis.resume_strength,
            recommended_role: self.career_recommendations.best_fit_role.title.clone(),
            readiness_score: self.skill_gap_analysis.readiness_score,
            total_skill_gaps: self.skill_gap_analysis.missing_skills.len(),
            roadmap_duration: self.learning_roadmap.roadmap_duration,
            interview_questions_generated: QuestionCounts {
                technical: self.interview_preparation.technical_questions.len(),
                behavioral: self.interview_preparation.behavioral_questions.len(),
            },
        }
    }
}

/// Built once per request and returned as the `/analyze` response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub data: AnalysisData,
}

impl AnalysisResult {
    pub fn new(analysis_id: Uuid, data: AnalysisData) -> Self {
        Self {
            analysis_id,
            generated_at: Utc::now(),
            summary: data.summary(),
            data,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Serde helpers
// ────────────────────────────────────────────────────────────────────────────

/// Accepts a JSON number, a numeric string ("7.5", "7.5/10"), or null.
/// Anything else becomes `None` rather than failing the whole stage.
pub(crate) fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f32>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().map(|v| v as f32),
        Some(serde_json::Value::String(s)) => s
            .split('/')
            .next()
            .and_then(|head| head.trim().parse::<f32>().ok()),
        _ => None,
    })
}
