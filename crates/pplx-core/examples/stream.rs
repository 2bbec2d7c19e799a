use pplx_core::{ChatCompletionRequest, Client, RecencyFilter, SonarModel};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔄 Perplexity Streaming Chat Example");
    println!("====================================\n");

    // Set PERPLEXITY_API_KEY before running
    let client = Client::from_env()?;

    let request = ChatCompletionRequest::builder(SonarModel::SonarSmallOnline)
        .system("Be precise and concise. Be witty and engaging, with a touch of humor.")
        .user(
            "This user likes fantasy and sci-fi with strong female leads. \
             Recommend a recently discussed book that matches those interests.",
        )
        .search_recency_filter(RecencyFilter::Month)
        .on_update(|event| {
            // Print the assistant's response as it streams
            for choice in &event.choices {
                if let Some(delta) = &choice.delta {
                    print!("{}", delta.content);
                    let _ = std::io::stdout().flush();
                }
            }
        })
        .build();

    // Bound the whole exchange; the client itself imposes no deadline
    let response = tokio::time::timeout(
        std::time::Duration::from_secs(300),
        client.chat_completion(request),
    )
    .await??;

    // Streaming calls return no response value; the content already went
    // through the callback
    assert!(response.is_none());
    println!("\n\n✅ Streaming completed");

    Ok(())
}
