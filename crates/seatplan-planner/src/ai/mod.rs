//! Chat-model plumbing: prompt text and the backend that sends it

pub mod backend;
pub mod prompts;
