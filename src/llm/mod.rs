use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};

const BACKOFF_SECONDS: &[u64] = &[2, 4, 8, 16];

/// Create a mixtape Agent from the run configuration.
pub async fn create_agent(config: &Config) -> Result<mixtape_core::Agent> {
    build_agent(&config.llm_provider, &config.llm_model).await
}

async fn build_agent(provider: &str, model_name: &str) -> Result<mixtape_core::Agent> {
    // Each combination needs its own builder call since the model types are different.
    match (provider, model_name) {
        ("bedrock", "claude-haiku-4-5" | "haiku") => mixtape_core::Agent::builder()
            .bedrock(mixtape_core::ClaudeHaiku4_5)
            .build()
            .await
            .map_err(|e| Error::Llm(e.to_string())),
        ("bedrock", _) => {
            // Default bedrock model
            mixtape_core::Agent::builder()
                .bedrock(mixtape_core::ClaudeSonnet4_5)
                .build()
                .await
                .map_err(|e| Error::Llm(e.to_string()))
        }
        ("anthropic", "claude-haiku-4-5" | "haiku") => mixtape_core::Agent::builder()
            .anthropic_from_env(mixtape_core::ClaudeHaiku4_5)
            .build()
            .await
            .map_err(|e| Error::Llm(e.to_string())),
        ("anthropic", _) => mixtape_core::Agent::builder()
            .anthropic_from_env(mixtape_core::ClaudeSonnet4_5)
            .build()
            .await
            .map_err(|e| Error::Llm(e.to_string())),
        (other, _) => Err(Error::Config(format!("unknown llm provider: {other}"))),
    }
}

/// Check whether an LLM failure is worth retrying: rate limits and
/// transient overload, not malformed requests.
pub fn is_transient_error(message: &str) -> bool {
    let msg = message.to_lowercase();
    msg.contains("429")
        || msg.contains("rate limit")
        || msg.contains("overloaded")
        || msg.contains("timeout")
        || msg.contains("503")
}

/// Run one completion with bounded retry and exponential backoff on
/// transient errors. Non-transient errors surface immediately.
pub async fn run_with_retry(
    agent: &mixtape_core::Agent,
    prompt: &str,
    max_retries: u32,
) -> Result<String> {
    let mut attempt: u32 = 0;
    loop {
        match agent.run(prompt).await {
            Ok(response) => return Ok(response.text().trim().to_string()),
            Err(e) => {
                let message = e.to_string();
                if is_transient_error(&message) && attempt < max_retries {
                    let wait = BACKOFF_SECONDS
                        .get(attempt as usize)
                        .copied()
                        .unwrap_or(16);
                    log::warn!(
                        "Transient LLM error ({message}). Waiting {wait}s before retry {}/{max_retries}",
                        attempt + 1
                    );
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                    attempt += 1;
                } else {
                    return Err(Error::Llm(message));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_error_detection() {
        assert!(is_transient_error("HTTP 429 Too Many Requests"));
        assert!(is_transient_error("Rate limit exceeded"));
        assert!(is_transient_error("model overloaded, try again"));
        assert!(!is_transient_error("invalid request: prompt too long"));
        assert!(!is_transient_error("authentication failed"));
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let config = Config {
            llm_provider: "mainframe".into(),
            ..Config::default()
        };
        let err = match create_agent(&config).await {
            Ok(_) => panic!("expected an error for unknown provider"),
            Err(e) => e,
        };
        assert!(matches!(err, Error::Config(_)));
    }
}
