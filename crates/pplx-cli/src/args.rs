use clap::Parser;

// Example strings for after_long_help
const CLI_EXAMPLES: &str = r#"EXAMPLES:
  pplx "How many moons does Jupiter have?"            # Quick query with the default model
  pplx -m llama-3.1-sonar-large-128k-online "..."     # Query with a specific model
  pplx --no-streaming "Tell me a story"               # Buffered output instead of streaming
  pplx --citations --recency week "Any Rust news?"    # Fresh, cited search results
  pplx --domain-filter rust-lang.org --domain-filter -reddit.com "..."  # Constrain sources"#;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(about = "A CLI tool for querying the Perplexity AI API")]
#[command(name = "pplx")]
#[command(after_long_help = CLI_EXAMPLES)]
pub struct Cli {
    /// The user query/prompt
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Model identifier (e.g. llama-3.1-sonar-small-128k-online)
    #[arg(short, long, default_value = "llama-3.1-sonar-small-128k-online")]
    pub model: String,

    /// System prompt
    #[arg(long)]
    pub system: Option<String>,

    /// Maximum number of completion tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature, between 0 and 2
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Nucleus sampling threshold, between 0 and 1
    #[arg(long)]
    pub top_p: Option<f64>,

    /// Top-k filtering, between 0 and 2048
    #[arg(long)]
    pub top_k: Option<u32>,

    /// Include citations in the response
    #[arg(long)]
    pub citations: bool,

    /// Include related questions in the response
    #[arg(long)]
    pub related_questions: bool,

    /// Restrict search results to a time interval: hour, day, week or month
    #[arg(long, value_name = "INTERVAL")]
    pub recency: Option<String>,

    /// Restrict citations to a domain; prefix with '-' to blocklist.
    /// Repeatable, at most 3 honored by the API
    #[arg(long = "domain-filter", value_name = "DOMAIN", allow_hyphen_values = true)]
    pub domain_filter: Vec<String>,

    /// Disable streaming output (stream tokens by default)
    #[arg(long)]
    pub no_streaming: bool,

    /// API key
    #[arg(long, env = "PERPLEXITY_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Override the API base URL
    #[arg(long, env = "PERPLEXITY_BASE_URL")]
    pub base_url: Option<String>,

    /// Verbose output
    #[arg(long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_domain_filter_accepts_blocklist_entries() {
        let cli = Cli::parse_from([
            "pplx",
            "--api-key",
            "test",
            "--domain-filter",
            "rust-lang.org",
            "--domain-filter",
            "-reddit.com",
            "what's new?",
        ]);
        assert_eq!(cli.domain_filter, vec!["rust-lang.org", "-reddit.com"]);
        assert_eq!(cli.query, "what's new?");
    }

    #[test]
    fn test_streaming_is_the_default() {
        let cli = Cli::parse_from(["pplx", "--api-key", "test", "hello"]);
        assert!(!cli.no_streaming);
        assert_eq!(cli.model, "llama-3.1-sonar-small-128k-online");
    }
}
