//! Transparency Hub - Adaptive product transparency questionnaire
//!
//! A five-step wizard collects product information, then asks AI-generated
//! questions about manufacturing, testing and environmental impact. When the
//! generative-text provider is absent or misbehaves, curated fallback
//! questions take its place, so a questionnaire is always available.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
