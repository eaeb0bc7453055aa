//! Command-line walk through the questionnaire.
//!
//! ```text
//! transparency-hub <product-name> <category> [--json]
//! ```
//!
//! Loads configuration, steps through the wizard without answering, and
//! prints the exported report to stdout.

use std::sync::Arc;

use tracing::{info, warn};

use transparency_hub::adapters::{GeminiProvider, MarkdownReportExporter};
use transparency_hub::application::{
    QuestionGenerationService, SubmitReportCommand, SubmitReportHandler, WizardOrchestrator,
};
use transparency_hub::config::AppConfig;
use transparency_hub::domain::questionnaire::WizardStep;

const USAGE: &str = "usage: transparency-hub <product-name> <category> [--json]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let json = match args.iter().position(|a| a == "--json") {
        Some(index) => {
            args.remove(index);
            true
        }
        None => false,
    };
    let (product_name, category) = match args.as_slice() {
        [name, category] => (name.clone(), category.clone()),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    let config = AppConfig::load()?;
    config.validate()?;
    config.init_tracing()?;

    let provider = Arc::new(GeminiProvider::new(config.ai.gemini_config()));
    let service = QuestionGenerationService::new(provider);
    info!(provider = %service.provider_info().name, "Starting questionnaire");

    let mut wizard = WizardOrchestrator::new(service);
    wizard.set_product_name(product_name);
    wizard.set_product_category(category);

    while wizard.current_step() != WizardStep::Review {
        let step = wizard.next().await?;
        if let Some(source) = step
            .question_step()
            .and_then(|s| wizard.state().question_source(s))
        {
            info!(step = %step, source = %source, "Questions loaded");
        }
    }

    let summary = wizard.review_summary();
    for step in summary.steps.iter().filter(|s| !s.unanswered_required.is_empty()) {
        warn!(
            step = %step.step,
            unanswered = step.unanswered_required.len(),
            "Required questions left unanswered"
        );
    }

    let payload = wizard.submit().await?;
    let command = if json {
        SubmitReportCommand::json(payload)
    } else {
        SubmitReportCommand::markdown(payload)
    };

    let handler = SubmitReportHandler::new(Arc::new(MarkdownReportExporter::new()))
        .with_retry(config.export.max_attempts, config.export.retry_backoff());
    let result = handler.handle(command).await?;

    info!(filename = %result.report.filename, "Report ready");
    println!("{}", result.report.as_text().unwrap_or_default());
    Ok(())
}
