use pplx_core::{ChatCompletionRequest, Client, RecencyFilter, SonarModel};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔎 Perplexity Search Filter Example");
    println!("===================================\n");

    // Set PERPLEXITY_API_KEY before running
    let client = Client::from_env()?;

    // Allowlist two domains and blocklist one ("-" prefix); at most three
    // entries are honored by the API
    let request = ChatCompletionRequest::builder(SonarModel::SonarLargeOnline)
        .system("Be precise and concise.")
        .user("What changed in the latest stable Rust release?")
        .return_citations(true)
        .return_related_questions(true)
        .search_domain_filter(vec![
            "rust-lang.org".to_string(),
            "github.com".to_string(),
            "-reddit.com".to_string(),
        ])
        .search_recency_filter(RecencyFilter::Week)
        .max_tokens(200)
        .build();

    let response = client
        .chat_completion(request)
        .await?
        .expect("buffered calls always return a response");

    match response.choices.first().and_then(|c| c.message.as_ref()) {
        Some(message) => println!("🤖 Assistant:\n{}", message.content),
        None => println!("No choices found in the response."),
    }

    Ok(())
}
