//! Extract command implementation.

use super::read_answer;
use crate::cli::ExtractArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::gateway::build_gateway;
use crate::output::Formatter;
use claimify_domain::CompletionGateway;
use claimify_extractor::{
    CancellationToken, ExtractionRequest, ExtractionResult, Extractor, ExtractorConfig,
};
use tracing::warn;

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let answer = read_answer(args.answer.as_deref())?;
    let gateway = build_gateway(&config.gateway, args.model.as_deref())?;

    let result = extract(gateway, &args, answer, &config.extractor, cancel_on_interrupt()).await?;

    let output = if args.trace {
        formatter.format_trace(&result)?
    } else {
        formatter.format_claims(&result)?
    };
    println!("{}", output);

    if formatter.format() == OutputFormat::Table {
        eprintln!("{}", formatter.run_summary(&result));
    }

    Ok(())
}

/// Run one extraction with the command-line overrides applied.
async fn extract<G>(
    gateway: G,
    args: &ExtractArgs,
    answer: String,
    config: &ExtractorConfig,
    cancel: CancellationToken,
) -> Result<ExtractionResult>
where
    G: CompletionGateway,
{
    let mut config = config.clone();
    if let Some(concurrency) = args.concurrency {
        config.max_concurrency = concurrency;
    }

    let preceding = args.preceding.unwrap_or(config.preceding);
    let following = args.following.unwrap_or(config.following);

    let extractor = Extractor::new(gateway, config)?;
    let request = ExtractionRequest::new(args.question.clone(), answer).with_window(preceding, following);

    Ok(extractor.run_with_cancel(request, cancel).await?)
}

/// Token that fires on Ctrl-C so completed sentences are still reported.
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, keeping claims from finished sentences");
            trigger.cancel();
        }
    });

    cancel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use claimify_extractor::ExtractorError;
    use claimify_llm::MockGateway;

    fn args(question: &str) -> ExtractArgs {
        ExtractArgs {
            question: question.to_string(),
            answer: None,
            preceding: None,
            following: None,
            concurrency: None,
            model: None,
            trace: false,
        }
    }

    #[tokio::test]
    async fn test_window_overrides() {
        let gateway = MockGateway::new("NO_VERIFIABLE_CLAIMS");
        let mut args = args("What did John do?");
        args.preceding = Some(0);

        let result = extract(
            gateway.clone(),
            &args,
            "John joined in 2010. He led the team.".to_string(),
            &ExtractorConfig::default(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(result.claims.is_empty());
        assert_eq!(result.metadata.preceding, 0);
        assert_eq!(result.metadata.following, 2);
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_concurrency_rejected() {
        let mut args = args("Q?");
        args.concurrency = Some(0);

        let result = extract(
            MockGateway::default(),
            &args,
            "John joined in 2010.".to_string(),
            &ExtractorConfig::default(),
            CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(CliError::Extractor(ExtractorError::Config(_)))));
    }
}
