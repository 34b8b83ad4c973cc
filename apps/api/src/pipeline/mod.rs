// Career analysis pipeline: one resume in, five model-backed stages, one
// combined result out.

pub mod handlers;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod stages;
pub mod types;

#[cfg(test)]
pub mod testing;
