//! QuestionGenerationService - Resolves the question set for one step.
//!
//! Flow for `generate`:
//!
//! 1. Cache hit: return it, no I/O.
//! 2. Provider not configured: fallback, not cached.
//! 3. Render prompt, call provider, sanitize.
//! 4. At least one valid question: cache and return.
//! 5. Otherwise: fallback, not cached.
//!
//! The call is total. Failures end up as warnings on the outcome.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::generation::{
    sanitize_response, CacheKey, FallbackCatalog, GenerationOutcome, GenerationParams,
    GenerationWarning, PromptCatalog, QuestionCache, Responses, SanitizeReport,
};
use crate::domain::questionnaire::{QuestionSet, QuestionStep};
use crate::ports::{ProviderError, ProviderInfo, QuestionProvider};

use super::pending::{Claim, PendingRequests};

/// Result of a one-off provider round trip, for troubleshooting.
#[derive(Debug, Clone)]
pub struct GenerationDiagnostics {
    pub provider: ProviderInfo,
    pub configured: bool,
    pub prompt: String,
    /// Raw provider text, when the call succeeded.
    pub raw_response: Option<String>,
    pub provider_error: Option<ProviderError>,
    /// Sanitizer output for `raw_response`.
    pub report: Option<SanitizeReport>,
}

impl GenerationDiagnostics {
    /// True when the provider produced at least one valid question.
    pub fn succeeded(&self) -> bool {
        self.report
            .as_ref()
            .map(SanitizeReport::has_survivors)
            .unwrap_or(false)
    }
}

/// Cache and in-flight counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    pub cached_sets: usize,
    pub in_flight: usize,
}

/// Question generation for one wizard session.
///
/// Clones share the provider, cache and in-flight registry.
#[derive(Clone)]
pub struct QuestionGenerationService {
    provider: Arc<dyn QuestionProvider>,
    prompts: Arc<PromptCatalog>,
    fallback: Arc<FallbackCatalog>,
    cache: QuestionCache,
    pending: PendingRequests,
}

impl QuestionGenerationService {
    /// Creates a service with built-in prompts and fallback data and an empty cache.
    pub fn new(provider: Arc<dyn QuestionProvider>) -> Self {
        Self {
            provider,
            prompts: Arc::new(PromptCatalog::default()),
            fallback: Arc::new(FallbackCatalog::builtin().clone()),
            cache: QuestionCache::new(),
            pending: PendingRequests::new(),
        }
    }

    /// Uses the given cache handle instead of a fresh one.
    pub fn with_cache(mut self, cache: QuestionCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_prompts(mut self, prompts: PromptCatalog) -> Self {
        self.prompts = Arc::new(prompts);
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackCatalog) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    pub fn provider_info(&self) -> ProviderInfo {
        self.provider.provider_info()
    }

    /// Resolves the question set for `params`. Never fails.
    pub async fn generate(&self, params: &GenerationParams) -> GenerationOutcome {
        let key = CacheKey::new(params.category.clone(), params.step);

        if let Some(questions) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Question cache hit");
            return GenerationOutcome::cached(questions);
        }

        if !self.provider.is_configured() {
            tracing::info!(
                category = %params.category,
                step = %params.step,
                "Provider not configured, using fallback questions"
            );
            return GenerationOutcome::fallback(
                self.fallback.lookup(&params.category, params.step),
                vec![GenerationWarning::ConfigurationAbsent],
            );
        }

        let prompt = self
            .prompts
            .render(params.step, &params.category, &params.prior_responses);

        let claim = self.pending.claim(&key, &self.cache, || {
            run_generation(
                self.provider.clone(),
                self.fallback.clone(),
                self.cache.clone(),
                key.clone(),
                prompt,
            )
        });

        match claim {
            Claim::Cached(questions) => GenerationOutcome::cached(questions),
            Claim::Joined(in_flight) => {
                tracing::debug!(key = %key, "Joining in-flight generation");
                in_flight.await
            }
            Claim::Started(in_flight) => in_flight.await,
        }
    }

    /// Returns the cached set for `(category, step)` without any I/O.
    pub fn cached(&self, category: &str, step: QuestionStep) -> Option<QuestionSet> {
        self.cache.get(&CacheKey::new(category, step))
    }

    /// Drops every cached set.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("Question cache cleared");
    }

    pub fn stats(&self) -> GenerationStats {
        GenerationStats {
            cached_sets: self.cache.len(),
            in_flight: self.pending.len(),
        }
    }

    /// Calls the provider once for `(category, step)` and reports every stage.
    ///
    /// Bypasses the cache entirely: nothing is read from or written to it.
    pub async fn diagnose(&self, category: &str, step: QuestionStep) -> GenerationDiagnostics {
        let prompt = self.prompts.render(step, category, &Responses::new());
        let mut diagnostics = GenerationDiagnostics {
            provider: self.provider.provider_info(),
            configured: self.provider.is_configured(),
            prompt,
            raw_response: None,
            provider_error: None,
            report: None,
        };

        if !diagnostics.configured {
            diagnostics.provider_error = Some(ProviderError::NotConfigured);
            return diagnostics;
        }

        match self.provider.generate_text(&diagnostics.prompt).await {
            Ok(raw) => {
                diagnostics.report = Some(sanitize_response(&raw));
                diagnostics.raw_response = Some(raw);
            }
            Err(err) => diagnostics.provider_error = Some(err),
        }

        diagnostics
    }
}

impl std::fmt::Debug for QuestionGenerationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionGenerationService")
            .field("provider", &self.provider.provider_info())
            .field("cache", &self.cache)
            .field("pending", &self.pending)
            .finish()
    }
}

/// Provider round trip for one key; caches only a non-empty validated set.
async fn run_generation(
    provider: Arc<dyn QuestionProvider>,
    fallback: Arc<FallbackCatalog>,
    cache: QuestionCache,
    key: CacheKey,
    prompt: String,
) -> GenerationOutcome {
    let fallback_set = || fallback.lookup(&key.category, key.step);

    let raw = match provider.generate_text(&prompt).await {
        Ok(raw) => raw,
        Err(ProviderError::NotConfigured) => {
            return GenerationOutcome::fallback(
                fallback_set(),
                vec![GenerationWarning::ConfigurationAbsent],
            );
        }
        Err(err) => {
            tracing::warn!(
                key = %key,
                provider = %provider.provider_info().name,
                error = %err,
                "Question generation failed, using fallback questions"
            );
            return GenerationOutcome::fallback(
                fallback_set(),
                vec![GenerationWarning::ProviderFailure {
                    message: err.to_string(),
                }],
            );
        }
    };

    let SanitizeReport {
        questions,
        mut warnings,
        candidates,
        ..
    } = sanitize_response(&raw);

    for warning in &warnings {
        tracing::warn!(key = %key, warning = %warning, "Provider response problem");
    }

    if questions.is_empty() {
        if warnings.is_empty() {
            warnings.push(GenerationWarning::MalformedResponse {
                message: "response contained no questions".to_string(),
            });
        }
        tracing::warn!(
            key = %key,
            candidates,
            "No valid questions in provider response, using fallback questions"
        );
        return GenerationOutcome::fallback(fallback_set(), warnings);
    }

    tracing::info!(
        key = %key,
        questions = questions.len(),
        dropped = candidates - questions.len(),
        "Generated questions"
    );
    cache.insert(key, questions.clone());
    GenerationOutcome::provider(questions, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockQuestionProvider;
    use crate::domain::foundation::QuestionId;
    use crate::domain::generation::QuestionSource;
    use crate::domain::questionnaire::{QuestionKind, ResponseValue};
    use std::time::Duration;

    const MFG_ARRAY: &str = r#"[
        {"id": "mfg_1", "question": "Where is the cocoa grown?", "type": "text", "required": true},
        {"id": "mfg_2", "question": "Is it fair trade?", "type": "boolean", "required": true}
    ]"#;

    fn service(provider: &MockQuestionProvider) -> QuestionGenerationService {
        QuestionGenerationService::new(Arc::new(provider.clone()))
    }

    fn params(category: &str, step: QuestionStep) -> GenerationParams {
        GenerationParams::new(category, step)
    }

    #[tokio::test]
    async fn unconfigured_provider_returns_fallback_without_calling() {
        let provider = MockQuestionProvider::unconfigured();
        let service = service(&provider);

        let outcome = service
            .generate(&params("personal-care", QuestionStep::Testing))
            .await;

        assert_eq!(outcome.source, QuestionSource::Fallback);
        assert_eq!(outcome.warnings, vec![GenerationWarning::ConfigurationAbsent]);
        assert_eq!(outcome.questions.len(), 5);
        let first = &outcome.questions[0];
        assert_eq!(first.id.as_str(), "test_1");
        assert_eq!(first.prompt, "Is the product dermatologically tested?");
        assert_eq!(first.kind, QuestionKind::Boolean);
        assert!(first.required);
        assert_eq!(provider.call_count(), 0);
        assert!(service.cached("personal-care", QuestionStep::Testing).is_none());
    }

    #[tokio::test]
    async fn unknown_category_uses_generic_default() {
        let service = service(&MockQuestionProvider::unconfigured());

        let outcome = service
            .generate(&params("widgets", QuestionStep::Environmental))
            .await;

        assert_eq!(outcome.questions.len(), 3);
        assert_eq!(
            outcome.questions,
            FallbackCatalog::builtin().lookup("", QuestionStep::Environmental)
        );
    }

    #[tokio::test]
    async fn provider_result_is_cached_and_reused() {
        let provider = MockQuestionProvider::new().with_response(MFG_ARRAY);
        let service = service(&provider);
        let p = params("chocolate", QuestionStep::Manufacturing);

        let first = service.generate(&p).await;
        let second = service.generate(&p).await;

        assert_eq!(first.source, QuestionSource::Provider);
        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert!(QuestionSet::ptr_eq(&first.questions, &second.questions));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn prior_responses_are_ignored_for_cache_matching() {
        let provider = MockQuestionProvider::new().with_response(MFG_ARRAY);
        let service = service(&provider);

        service
            .generate(&params("chocolate", QuestionStep::Manufacturing))
            .await;

        let mut prior = Responses::new();
        prior.insert(QuestionId::new("mfg_1").unwrap(), ResponseValue::text("Ghana"));
        let outcome = service
            .generate(&params("chocolate", QuestionStep::Manufacturing).with_prior_responses(prior))
            .await;

        assert!(outcome.from_cache);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn prior_responses_are_appended_to_prompt() {
        let provider = MockQuestionProvider::new().with_response(MFG_ARRAY);
        let service = service(&provider);

        let mut prior = Responses::new();
        prior.insert(QuestionId::new("mfg_3").unwrap(), ResponseValue::yes_no(true));
        service
            .generate(&params("food", QuestionStep::Testing).with_prior_responses(prior))
            .await;

        let prompt = &provider.get_calls()[0];
        assert!(prompt.contains("food product"));
        assert!(prompt.ends_with(r#"Previous responses context: {"mfg_3":true}"#));
    }

    #[tokio::test]
    async fn provider_failure_falls_back_uncached() {
        let provider = MockQuestionProvider::new()
            .with_error(ProviderError::unavailable("503"))
            .with_response(MFG_ARRAY);
        let service = service(&provider);
        let p = params("food", QuestionStep::Manufacturing);

        let failed = service.generate(&p).await;
        assert!(failed.is_fallback());
        assert!(matches!(
            failed.warnings.as_slice(),
            [GenerationWarning::ProviderFailure { .. }]
        ));
        assert!(service.cached("food", QuestionStep::Manufacturing).is_none());

        let retried = service.generate(&p).await;
        assert_eq!(retried.source, QuestionSource::Provider);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn all_invalid_candidates_fall_back() {
        let provider = MockQuestionProvider::new().with_response(
            r#"[{"id": "mfg_1", "question": "x", "type": "text"},
                {"id": "mfg_2", "question": "y", "type": "scale", "required": true}]"#,
        );
        let service = service(&provider);

        let outcome = service
            .generate(&params("food", QuestionStep::Manufacturing))
            .await;

        assert!(outcome.is_fallback());
        assert_eq!(outcome.warnings.len(), 2);
        assert_eq!(outcome.questions[0].prompt, "Where are the main ingredients sourced from?");
    }

    #[tokio::test]
    async fn empty_array_falls_back_with_warning() {
        let provider = MockQuestionProvider::new().with_response("```json\n[]\n```");
        let service = service(&provider);

        let outcome = service
            .generate(&params("food", QuestionStep::Testing))
            .await;

        assert!(outcome.is_fallback());
        assert!(matches!(
            outcome.warnings.as_slice(),
            [GenerationWarning::MalformedResponse { .. }]
        ));
    }

    #[tokio::test]
    async fn partially_valid_response_keeps_survivors_with_warnings() {
        let provider = MockQuestionProvider::new().with_response(
            r#"[{"id": "env_1", "question": "Recyclable?", "type": "boolean", "required": true},
                {"id": "env_2", "question": "Footprint?", "type": "number"}]"#,
        );
        let service = service(&provider);

        let outcome = service
            .generate(&params("food", QuestionStep::Environmental))
            .await;

        assert_eq!(outcome.source, QuestionSource::Provider);
        assert_eq!(outcome.questions.len(), 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(service.cached("food", QuestionStep::Environmental).is_some());
    }

    #[tokio::test]
    async fn configuration_is_checked_on_every_call() {
        let provider = MockQuestionProvider::unconfigured().with_response(MFG_ARRAY);
        let service = service(&provider);
        let p = params("food", QuestionStep::Manufacturing);

        assert!(service.generate(&p).await.is_fallback());

        provider.set_configured(true);
        let outcome = service.generate(&p).await;
        assert_eq!(outcome.source, QuestionSource::Provider);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_calls_share_one_provider_request() {
        let provider = MockQuestionProvider::new()
            .with_response(MFG_ARRAY)
            .with_delay(Duration::from_millis(30));
        let service = service(&provider);
        let p = params("food", QuestionStep::Manufacturing);

        let (a, b, c) = tokio::join!(service.generate(&p), service.generate(&p), service.generate(&p));

        assert_eq!(provider.call_count(), 1);
        assert!(QuestionSet::ptr_eq(&a.questions, &b.questions));
        assert!(QuestionSet::ptr_eq(&b.questions, &c.questions));
        assert_eq!(service.stats().in_flight, 0);
        assert_eq!(service.stats().cached_sets, 1);
    }

    #[tokio::test]
    async fn clear_cache_forces_new_provider_call() {
        let provider = MockQuestionProvider::new()
            .with_response(MFG_ARRAY)
            .with_response(MFG_ARRAY);
        let service = service(&provider);
        let p = params("food", QuestionStep::Manufacturing);

        service.generate(&p).await;
        service.clear_cache();
        assert!(service.cached("food", QuestionStep::Manufacturing).is_none());

        let outcome = service.generate(&p).await;
        assert!(!outcome.from_cache);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn injected_cache_is_shared() {
        let provider = MockQuestionProvider::new().with_response(MFG_ARRAY);
        let cache = QuestionCache::new();
        let service = service(&provider).with_cache(cache.clone());

        service
            .generate(&params("food", QuestionStep::Manufacturing))
            .await;

        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn separate_services_do_not_share_cache() {
        let provider = MockQuestionProvider::new()
            .with_response(MFG_ARRAY)
            .with_response(MFG_ARRAY);
        let p = params("food", QuestionStep::Manufacturing);

        service(&provider).generate(&p).await;
        let outcome = service(&provider).generate(&p).await;

        assert!(!outcome.from_cache);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn diagnose_reports_stages_without_touching_cache() {
        let provider = MockQuestionProvider::new()
            .with_response(format!("Here you go:\n```json\n{}\n```", MFG_ARRAY));
        let service = service(&provider);

        let diagnostics = service.diagnose("food", QuestionStep::Manufacturing).await;

        assert!(diagnostics.configured);
        assert!(diagnostics.succeeded());
        assert!(diagnostics.raw_response.unwrap().starts_with("Here you go"));
        assert_eq!(diagnostics.report.unwrap().questions.len(), 2);
        assert!(service.cached("food", QuestionStep::Manufacturing).is_none());
    }

    #[tokio::test]
    async fn diagnose_unconfigured_skips_provider() {
        let provider = MockQuestionProvider::unconfigured();
        let diagnostics = service(&provider)
            .diagnose("food", QuestionStep::Testing)
            .await;

        assert!(!diagnostics.succeeded());
        assert_eq!(diagnostics.provider_error, Some(ProviderError::NotConfigured));
        assert_eq!(provider.call_count(), 0);
    }
}
