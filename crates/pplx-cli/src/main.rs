// Binary entry point for pplx-cli

mod args;
mod output;

use anyhow::Result;
use args::Cli;
use clap::Parser;
use pplx_core::{ChatCompletionRequest, Client, Message, PerplexityConfig, RecencyFilter};
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

/// Parse CLI arguments, build the completion request and print the answer,
/// streamed token by token unless --no-streaming is given.
pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = PerplexityConfig::new(cli.api_key.as_str());
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.as_str());
    }
    let client = Client::with_config(config)?;

    let mut messages = Vec::new();
    if let Some(system) = &cli.system {
        messages.push(Message::system(system.as_str()));
    }
    messages.push(Message::user(cli.query.as_str()));

    let mut request = ChatCompletionRequest::new(cli.model.as_str(), messages);
    request.max_tokens = cli.max_tokens;
    request.temperature = cli.temperature;
    request.top_p = cli.top_p;
    request.top_k = cli.top_k;
    request.return_citations = cli.citations;
    request.return_related_questions = cli.related_questions;

    if !cli.domain_filter.is_empty() {
        request.search_domain_filter = Some(cli.domain_filter.clone());
    }

    if let Some(recency) = &cli.recency {
        request.search_recency_filter = Some(RecencyFilter::from_str(recency).map_err(|_| {
            anyhow::anyhow!("invalid recency filter `{recency}`; expected hour, day, week or month")
        })?);
    }

    if !cli.no_streaming {
        request.on_update = Some(Arc::new(|event| {
            for choice in &event.choices {
                if let Some(delta) = &choice.delta {
                    print!("{}", delta.content);
                    let _ = std::io::stdout().flush();
                }
            }
        }));
    }

    if cli.verbose {
        output::note(&format!("model: {}", output::format_model(&cli.model)));
    }

    match client.chat_completion(request).await {
        Ok(Some(response)) => match response.choices.first().and_then(|c| c.message.as_ref()) {
            Some(message) => println!("{}", message.content),
            None => output::warning("no choices found in the response"),
        },
        Ok(None) => {
            // Streamed content already went to stdout through the callback
            println!();
        }
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    }

    Ok(())
}
