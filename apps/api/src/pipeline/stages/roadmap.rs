//! Stage 4: learning roadmap.
//!
//! `monthly_goals` always has exactly `months` entries: surplus months are
//! truncated, missing months are padded with empty plans, and months are
//! renumbered 1..=N in the order the model returned them.

use tracing::warn;

use crate::llm_client::prompts::{fill, join_list, JSON_ONLY_FOOTER};
use crate::llm_client::ModelClient;
use crate::pipeline::prompts::ROADMAP_PROMPT_TEMPLATE;
use crate::pipeline::stages::{call_and_parse, clean_list, StageError, StageName};
use crate::pipeline::types::{LearningRoadmap, MonthPlan, ResumeAnalysis, SkillGapAnalysis};

const STAGE: StageName = StageName::LearningRoadmap;

pub struct RoadmapInputs<'a> {
    pub resume: &'a ResumeAnalysis,
    pub skill_gaps: &'a SkillGapAnalysis,
    pub target_role: &'a str,
    pub months: u8,
}

pub async fn run(
    model: &dyn ModelClient,
    inputs: &RoadmapInputs<'_>,
) -> Result<LearningRoadmap, StageError> {
    let prompt = build_prompt(inputs);
    let raw: LearningRoadmap = call_and_parse(model, STAGE, &prompt).await?;
    Ok(reconcile(raw, inputs.target_role, inputs.months))
}

pub fn build_prompt(inputs: &RoadmapInputs<'_>) -> String {
    let skills_to_learn = if inputs.skill_gaps.missing_skills.is_empty() {
        "No specific skills provided".to_string()
    } else {
        inputs
            .skill_gaps
            .missing_skills
            .iter()
            .map(|g| format!("{} ({})", g.skill, g.priority))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let months = inputs.months.to_string();
    let current_skills = join_list(&inputs.resume.all_skills());
    fill(
        ROADMAP_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_FOOTER),
            ("months", months.as_str()),
            ("target_role", inputs.target_role),
            ("current_skills", current_skills.as_str()),
            ("skills_to_learn", skills_to_learn.as_str()),
        ],
    )
}

/// Forces the month count to `months` and numbers months sequentially.
pub fn reconcile(raw: LearningRoadmap, target_role: &str, months: u8) -> LearningRoadmap {
    let wanted = usize::from(months);
    let mut goals = raw.monthly_goals;

    if goals.len() != wanted {
        warn!(
            stage = %STAGE,
            returned = goals.len(),
            expected = wanted,
            "Roadmap month count mismatch, reconciling"
        );
    }
    goals.truncate(wanted);
    for month in goals.len() + 1..=wanted {
        goals.push(MonthPlan::empty(month as u8));
    }

    let monthly_goals = goals
        .into_iter()
        .zip(1..=months)
        .map(|(plan, month)| MonthPlan {
            month,
            focus_areas: clean_list(plan.focus_areas),
            learning_objectives: clean_list(plan.learning_objectives),
            skills_to_acquire: clean_list(plan.skills_to_acquire),
            practice_projects: clean_list(plan.practice_projects),
            resources: clean_list(plan.resources),
        })
        .collect();

    LearningRoadmap {
        roadmap_duration: months,
        target_role: target_role.to_string(),
        overall_strategy: raw.overall_strategy.trim().to_string(),
        monthly_goals,
        success_metrics: clean_list(raw.success_metrics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{roadmap_reply, ScriptedModel, RESUME_REPLY, SKILL_GAP_REPLY};

    fn raw_with_months(count: u8) -> LearningRoadmap {
        serde_json::from_str(&roadmap_reply(count)).unwrap()
    }

    #[test]
    fn test_exact_count_is_untouched() {
        let roadmap = reconcile(raw_with_months(4), "SRE", 4);
        assert_eq!(roadmap.monthly_goals.len(), 4);
        assert_eq!(roadmap.monthly_goals[3].focus_areas, vec!["Area 4"]);
        assert_eq!(roadmap.roadmap_duration, 4);
        assert_eq!(roadmap.target_role, "SRE");
    }

    #[test]
    fn test_surplus_months_are_truncated() {
        let roadmap = reconcile(raw_with_months(6), "SRE", 3);
        assert_eq!(roadmap.monthly_goals.len(), 3);
        assert_eq!(roadmap.monthly_goals[2].focus_areas, vec!["Area 3"]);
    }

    #[test]
    fn test_missing_months_are_padded_empty() {
        let roadmap = reconcile(raw_with_months(2), "SRE", 5);
        assert_eq!(roadmap.monthly_goals.len(), 5);
        assert_eq!(roadmap.monthly_goals[4], MonthPlan::empty(5));
        assert_eq!(roadmap.monthly_goals[1].focus_areas, vec!["Area 2"]);
    }

    #[test]
    fn test_months_are_renumbered_sequentially() {
        let mut raw = raw_with_months(3);
        for plan in &mut raw.monthly_goals {
            plan.month = 9;
        }
        let roadmap = reconcile(raw, "SRE", 3);
        let months: Vec<u8> = roadmap.monthly_goals.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![1, 2, 3]);
    }

    #[test]
    fn test_prompt_annotates_gap_priorities() {
        let resume: ResumeAnalysis = serde_json::from_str(RESUME_REPLY).unwrap();
        let gaps: SkillGapAnalysis = crate::pipeline::parser::parse(SKILL_GAP_REPLY).unwrap();
        let prompt = build_prompt(&RoadmapInputs {
            resume: &resume,
            skill_gaps: &gaps,
            target_role: "Platform Engineer",
            months: 4,
        });
        assert!(prompt.contains("Create a structured 4-month learning roadmap"));
        assert!(prompt.contains("Kubernetes (High), Distributed tracing (Medium), Terraform (Low)"));
        assert!(!prompt.contains("{months}"));
    }

    #[tokio::test]
    async fn test_run_ignores_unusable_month_numbers() {
        let resume: ResumeAnalysis = serde_json::from_str(RESUME_REPLY).unwrap();
        let gaps: SkillGapAnalysis = crate::pipeline::parser::parse(SKILL_GAP_REPLY).unwrap();
        let reply = serde_json::json!({
            "roadmap_duration": 6.0,
            "overall_strategy": "Depth first",
            "monthly_goals": [
                {"month": "Month 1", "focus_areas": ["Kubernetes basics"]},
                {"month": "Month 2", "focus_areas": ["Operators"]},
                {"month": null, "focus_areas": ["Tracing"]}
            ],
            "success_metrics": ["Ship a chart"]
        })
        .to_string();
        let model = ScriptedModel::replying(&[reply.as_str()]);
        let roadmap = run(
            &model,
            &RoadmapInputs {
                resume: &resume,
                skill_gaps: &gaps,
                target_role: "Platform Engineer",
                months: 3,
            },
        )
        .await
        .unwrap();
        let months: Vec<u8> = roadmap.monthly_goals.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![1, 2, 3]);
        assert_eq!(roadmap.monthly_goals[0].focus_areas, vec!["Kubernetes basics"]);
        assert_eq!(roadmap.roadmap_duration, 3);
    }

    #[test]
    fn test_prompt_keeps_braces_in_role_literal() {
        let resume: ResumeAnalysis = serde_json::from_str(RESUME_REPLY).unwrap();
        let gaps: SkillGapAnalysis = crate::pipeline::parser::parse(SKILL_GAP_REPLY).unwrap();
        let prompt = build_prompt(&RoadmapInputs {
            resume: &resume,
            skill_gaps: &gaps,
            target_role: "{current_skills} Lead",
            months: 3,
        });
        assert!(prompt.contains("{current_skills} Lead"));
    }

    #[tokio::test]
    async fn test_run_reconciles_model_reply() {
        let resume: ResumeAnalysis = serde_json::from_str(RESUME_REPLY).unwrap();
        let gaps: SkillGapAnalysis = crate::pipeline::parser::parse(SKILL_GAP_REPLY).unwrap();
        let reply = roadmap_reply(6);
        let model = ScriptedModel::replying(&[reply.as_str()]);
        let roadmap = run(
            &model,
            &RoadmapInputs {
                resume: &resume,
                skill_gaps: &gaps,
                target_role: "Platform Engineer",
                months: 3,
            },
        )
        .await
        .unwrap();
        assert_eq!(roadmap.monthly_goals.len(), 3);
        assert_eq!(roadmap.roadmap_duration, 3);
    }
}
