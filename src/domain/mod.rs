//! Domain layer containing questionnaire types and generation logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, state machine)
//! - `questionnaire` - Questions, responses, wizard steps and product categories
//! - `generation` - Prompt templates, fallback catalog, response sanitizer and cache
//! - `report` - The payload assembled at submission

pub mod foundation;
pub mod generation;
pub mod questionnaire;
pub mod report;
