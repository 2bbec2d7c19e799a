use pplx_core::{ChatCompletionRequest, Client, Message, SonarModel};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("💬 Perplexity Basic Chat Example");
    println!("================================\n");

    // Set PERPLEXITY_API_KEY before running
    let client = Client::from_env()?;

    let mut request = ChatCompletionRequest::new(
        SonarModel::SonarSmallOnline,
        vec![
            Message::system("Be precise and concise."),
            Message::user("How many stars are there in our galaxy?"),
        ],
    );
    request.max_tokens = Some(100);
    request.temperature = Some(0.2);

    let response = client
        .chat_completion(request)
        .await?
        .expect("buffered calls always return a response");

    match response.choices.first().and_then(|c| c.message.as_ref()) {
        Some(message) => println!("🤖 Assistant: {}", message.content),
        None => println!("No choices found in the response."),
    }

    if let Some(usage) = response.usage {
        println!(
            "\n📊 Usage: {} prompt + {} completion = {} tokens",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }

    Ok(())
}
