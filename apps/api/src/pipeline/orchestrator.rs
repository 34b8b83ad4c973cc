//! Orchestrator: runs the five stages in dependency order and assembles the
//! combined result.
//!
//! The stages form a small dependency graph whose shape depends on whether the
//! request names a target role:
//!
//! - role given:   resume → skill_gap → career → roadmap → interview
//! - role absent:  resume → career → skill_gap → roadmap → interview
//!
//! Without a requested role the skill gap stage measures against the career
//! stage's best fit, so career must run first. With a role, career receives
//! the gap analysis as extra context. The order is derived from the edges,
//! not hardcoded.
//!
//! All-or-nothing: the first stage failure aborts the run and no partial
//! result is returned.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::llm_client::ModelClient;
use crate::pipeline::stages::career::{self, CareerInputs};
use crate::pipeline::stages::interview::{self, InterviewInputs};
use crate::pipeline::stages::roadmap::{self, RoadmapInputs};
use crate::pipeline::stages::skill_gap::{self, SkillGapInputs};
use crate::pipeline::stages::{resume, StageError, StageName};
use crate::pipeline::types::{
    AnalysisData, AnalysisRequest, AnalysisResult, CareerRecommendations, InterviewPreparation,
    LearningRoadmap, ResumeAnalysis, SkillGapAnalysis, ValidationError,
};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Analysis failed at stage '{stage}': {cause}")]
    Failed {
        stage: StageName,
        #[source]
        cause: StageError,
    },

    #[error("Stage '{stage}' was scheduled before its dependency '{missing}'")]
    OutOfOrder {
        stage: StageName,
        missing: StageName,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Dependency graph
// ────────────────────────────────────────────────────────────────────────────

/// Stages whose output `stage` consumes.
pub fn dependencies(stage: StageName, has_target_role: bool) -> Vec<StageName> {
    use StageName as S;
    match stage {
        S::ResumeAnalysis => vec![],
        S::SkillGapAnalysis if has_target_role => vec![S::ResumeAnalysis],
        S::SkillGapAnalysis => vec![S::ResumeAnalysis, S::CareerRecommendation],
        S::CareerRecommendation if has_target_role => {
            vec![S::ResumeAnalysis, S::SkillGapAnalysis]
        }
        S::CareerRecommendation => vec![S::ResumeAnalysis],
        S::LearningRoadmap | S::InterviewPreparation => vec![
            S::ResumeAnalysis,
            S::SkillGapAnalysis,
            S::CareerRecommendation,
        ],
    }
}

/// Topological order over the stage graph. Among stages that are ready at the
/// same time, the lower-numbered stage runs first.
pub fn execution_order(has_target_role: bool) -> Vec<StageName> {
    let mut done: Vec<StageName> = Vec::with_capacity(StageName::ALL.len());
    let mut pending: BTreeSet<StageName> = StageName::ALL.into_iter().collect();

    while let Some(next) = pending
        .iter()
        .copied()
        .find(|s| dependencies(*s, has_target_role).iter().all(|d| done.contains(d)))
    {
        pending.remove(&next);
        done.push(next);
    }

    // The graph is fixed and acyclic; anything left over is a wiring bug.
    debug_assert!(pending.is_empty(), "cyclic stage graph: {pending:?}");
    done
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct StageOutputs {
    resume: Option<ResumeAnalysis>,
    skill_gaps: Option<SkillGapAnalysis>,
    career: Option<CareerRecommendations>,
    roadmap: Option<LearningRoadmap>,
    interview: Option<InterviewPreparation>,
}

fn require<T>(slot: &Option<T>, stage: StageName, missing: StageName) -> Result<&T, AnalysisError> {
    slot.as_ref()
        .ok_or(AnalysisError::OutOfOrder { stage, missing })
}

fn take<T>(slot: Option<T>, stage: StageName) -> Result<T, AnalysisError> {
    // Assembly runs after every stage; `stage` doubles as the missing one.
    slot.ok_or(AnalysisError::OutOfOrder {
        stage,
        missing: stage,
    })
}

pub struct Orchestrator {
    model: Arc<dyn ModelClient>,
}

impl Orchestrator {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Validates the request, runs every stage, and returns the combined result.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        request.validate()?;

        let analysis_id = Uuid::new_v4();
        let span = info_span!("analysis", %analysis_id);
        self.run_pipeline(analysis_id, request).instrument(span).await
    }

    async fn run_pipeline(
        &self,
        analysis_id: Uuid,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, AnalysisError> {
        let model = self.model.as_ref();
        let requested_role = request.requested_role();
        let plan = execution_order(requested_role.is_some());
        info!(
            model = self.model_name(),
            target_role = requested_role.unwrap_or("<from career stage>"),
            roadmap_months = request.roadmap_months,
            plan = ?plan,
            "Starting analysis"
        );

        let started = Instant::now();
        let mut out = StageOutputs::default();

        for stage in plan {
            let stage_started = Instant::now();
            match self.run_stage(model, stage, request, &mut out).await {
                Ok(()) => info!(
                    %stage,
                    elapsed_ms = stage_started.elapsed().as_millis() as u64,
                    "Stage complete"
                ),
                Err(e) => {
                    warn!(%stage, error = %e, "Stage failed, aborting analysis");
                    return Err(e);
                }
            }
        }

        let data = AnalysisData {
            resume_analysis: take(out.resume, StageName::ResumeAnalysis)?,
            skill_gap_analysis: take(out.skill_gaps, StageName::SkillGapAnalysis)?,
            career_recommendations: take(out.career, StageName::CareerRecommendation)?,
            learning_roadmap: take(out.roadmap, StageName::LearningRoadmap)?,
            interview_preparation: take(out.interview, StageName::InterviewPreparation)?,
        };

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis complete"
        );
        Ok(AnalysisResult::new(analysis_id, data))
    }

    async fn run_stage(
        &self,
        model: &dyn ModelClient,
        stage: StageName,
        request: &AnalysisRequest,
        out: &mut StageOutputs,
    ) -> Result<(), AnalysisError> {
        let failed = |cause: StageError| AnalysisError::Failed { stage, cause };

        match stage {
            StageName::ResumeAnalysis => {
                let value = resume::run(model, &request.resume_text)
                    .await
                    .map_err(failed)?;
                out.resume = Some(value);
            }
            StageName::SkillGapAnalysis => {
                let resume = require(&out.resume, stage, StageName::ResumeAnalysis)?;
                let target_role = effective_role(request, out, stage)?;
                let value = skill_gap::run(
                    model,
                    &SkillGapInputs {
                        resume,
                        target_role: &target_role,
                    },
                )
                .await
                .map_err(failed)?;
                out.skill_gaps = Some(value);
            }
            StageName::CareerRecommendation => {
                let resume = require(&out.resume, stage, StageName::ResumeAnalysis)?;
                let value = career::run(
                    model,
                    &CareerInputs {
                        resume,
                        skill_gaps: out.skill_gaps.as_ref(),
                    },
                )
                .await
                .map_err(failed)?;
                out.career = Some(value);
            }
            StageName::LearningRoadmap => {
                let resume = require(&out.resume, stage, StageName::ResumeAnalysis)?;
                let skill_gaps = require(&out.skill_gaps, stage, StageName::SkillGapAnalysis)?;
                let target_role = effective_role(request, out, stage)?;
                let value = roadmap::run(
                    model,
                    &RoadmapInputs {
                        resume,
                        skill_gaps,
                        target_role: &target_role,
                        months: request.roadmap_months,
                    },
                )
                .await
                .map_err(failed)?;
                out.roadmap = Some(value);
            }
            StageName::InterviewPreparation => {
                let resume = require(&out.resume, stage, StageName::ResumeAnalysis)?;
                let skill_gaps = require(&out.skill_gaps, stage, StageName::SkillGapAnalysis)?;
                let career = require(&out.career, stage, StageName::CareerRecommendation)?;
                let target_role = effective_role(request, out, stage)?;
                let value = interview::run(
                    model,
                    &InterviewInputs {
                        resume,
                        skill_gaps,
                        career,
                        target_role: &target_role,
                    },
                )
                .await
                .map_err(failed)?;
                out.interview = Some(value);
            }
        }
        Ok(())
    }
}

/// The requested role, or else the career stage's best fit.
fn effective_role(
    request: &AnalysisRequest,
    out: &StageOutputs,
    stage: StageName,
) -> Result<String, AnalysisError> {
    match request.requested_role() {
        Some(role) => Ok(role.to_string()),
        None => require(&out.career, stage, StageName::CareerRecommendation)
            .map(|c| c.best_fit_role.title.clone()),
    }
}
