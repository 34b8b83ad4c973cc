// All LLM prompt templates for the analysis pipeline.
// Placeholders are `{name}` and are filled in one pass with `llm_client::prompts::fill`.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Resume analysis. Replace: {resume_text}, {json_only}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Analyze the following resume and extract key information.

Return a JSON object with this EXACT schema:
{
  "technical_skills": ["skill1", "skill2"],
  "soft_skills": ["skill1", "skill2"],
  "experience_summary": "Brief summary of experience level and years",
  "resume_strength": 7.5,
  "years_of_experience": 3
}

RESUME TEXT:
{resume_text}

Instructions:
- Extract all technical skills (programming languages, tools, frameworks, technologies)
- Extract soft skills (communication, leadership, teamwork, etc.)
- Always include both skill lists, even if one is empty
- Summarize experience level in 2-3 sentences
- Rate resume strength from 0-10 based on clarity, completeness, relevant experience, and skills
- Estimate years of experience if mentioned; use null if it cannot be determined

{json_only}"#;

/// Skill gap analysis.
/// Replace: {user_skills}, {target_role}, {experience_summary}, {json_only}
pub const SKILL_GAP_PROMPT_TEMPLATE: &str = r#"Analyze skill gaps between the user's skills and the requirements for the target job role.

User's Skills: {user_skills}
Target Job Role: {target_role}
User's Experience: {experience_summary}

Return a JSON object with this EXACT schema:
{
  "missing_skills": [
    {
      "skill": "skill name",
      "priority": "High|Medium|Low",
      "reason": "Why this skill is important for the role"
    }
  ],
  "gap_analysis": "Overall summary of skill gaps in 2-3 sentences",
  "readiness_score": 7.5
}

Instructions:
- Identify missing skills required for the target role
- Prioritize gaps as High (critical for role), Medium (important), or Low (nice to have)
- Provide brief reasoning for each missing skill
- Calculate a readiness score (0-10) based on how well the user's skills match the role
- Write a brief gap analysis summary

{json_only}"#;

/// Career recommendation.
/// Replace: {technical_skills}, {soft_skills}, {experience_summary},
///          {years_of_experience}, {role_context}, {json_only}
pub const CAREER_PROMPT_TEMPLATE: &str = r#"Based on the user's profile, recommend the best-fit job role and alternative roles.

Technical Skills: {technical_skills}
Soft Skills: {soft_skills}
Experience: {experience_summary}
Years of Experience: {years_of_experience}
{role_context}
Return a JSON object with this EXACT schema:
{
  "best_fit_role": {
    "title": "Job Title",
    "match_score": 9.0,
    "reasoning": "Why this role is the best fit (2-3 sentences)"
  },
  "alternative_roles": [
    {
      "title": "Alternative Job Title 1",
      "match_score": 8.0,
      "reasoning": "Why this is a good alternative (1-2 sentences)"
    },
    {
      "title": "Alternative Job Title 2",
      "match_score": 7.5,
      "reasoning": "Why this is a good alternative (1-2 sentences)"
    }
  ],
  "career_insights": "Additional insights about career progression and opportunities (2-3 sentences)"
}

Instructions:
- Recommend exactly 1 best-fit role based on skills and experience
- Suggest 1-2 alternative roles that are viable options (never zero, never more than 2)
- Provide match scores (0-10) for each role
- Give clear reasoning for each recommendation
- Include career insights

{json_only}"#;

/// Extra career context used when the skill gap stage already ran.
/// Replace: {target_role}, {readiness_score}, {gap_analysis}
pub const CAREER_GAP_CONTEXT_TEMPLATE: &str = r#"Intended Role: {target_role}
Readiness For Intended Role: {readiness_score}/10
Gap Summary: {gap_analysis}
"#;

/// Learning roadmap.
/// Replace: {months}, {target_role}, {skills_to_learn}, {current_skills}, {json_only}
pub const ROADMAP_PROMPT_TEMPLATE: &str = r#"Create a structured {months}-month learning roadmap to prepare for the target job role.

Target Role: {target_role}
Skills to Learn: {skills_to_learn}
Current Skills: {current_skills}

Return a JSON object with this EXACT schema:
{
  "roadmap_duration": {months},
  "monthly_goals": [
    {
      "month": 1,
      "focus_areas": ["area1", "area2", "area3"],
      "learning_objectives": ["objective1", "objective2"],
      "skills_to_acquire": ["skill1", "skill2"],
      "practice_projects": ["project1", "project2"],
      "resources": ["resource1", "resource2"]
    }
  ],
  "overall_strategy": "High-level learning strategy for the entire roadmap (2-3 sentences)",
  "success_metrics": ["metric1", "metric2", "metric3"]
}

Instructions:
- Break down the roadmap into exactly {months} monthly goals, numbered 1 to {months}
- Each month should have 2-4 focus areas
- Include specific learning objectives for each month
- List skills to acquire each month
- Suggest 1-2 practice projects per month (real-world applicable)
- Recommend learning resources (courses, books, tutorials)
- Provide an overall learning strategy
- Include success metrics to track progress

{json_only}"#;

/// Interview preparation.
/// Replace: {target_role}, {technical_skills}, {experience_summary}, {priority_gaps},
///          {adjacent_roles}, {num_technical}, {num_behavioral}, {json_only}
pub const INTERVIEW_PROMPT_TEMPLATE: &str = r#"Generate interview questions to prepare for the target job role.

Target Role: {target_role}
Relevant Skills: {technical_skills}
Candidate Experience: {experience_summary}
Known Weak Spots: {priority_gaps}
Adjacent Roles: {adjacent_roles}

Generate {num_technical} technical questions and {num_behavioral} behavioral questions.

Return a JSON object with this EXACT schema:
{
  "technical_questions": [
    {
      "question": "Question text",
      "category": "category (e.g., Programming, System Design, Algorithms)",
      "difficulty": "Easy|Medium|Hard",
      "tips": "Brief tip on how to approach this question"
    }
  ],
  "behavioral_questions": [
    {
      "question": "Question text",
      "focus_area": "focus area (e.g., Leadership, Problem-solving, Teamwork)",
      "tips": "What interviewers are looking for in the answer"
    }
  ],
  "preparation_tips": ["tip1", "tip2", "tip3"],
  "common_red_flags": ["red flag 1", "red flag 2"],
  "success_strategies": ["strategy1", "strategy2", "strategy3"]
}

Instructions:
- Generate {num_technical} technical questions relevant to the role and skills
- Every technical question MUST include a difficulty of Easy, Medium, or Hard
- Generate {num_behavioral} behavioral questions (STAR method applicable)
- Every behavioral question MUST include a focus_area
- Probe the known weak spots in at least two technical questions
- Provide tips for answering each question
- Add general preparation tips (5-7 tips)
- List common mistakes/red flags to avoid
- Include success strategies for interviews

{json_only}"#;
