//! # Search Tools
//!
//! Web search over the Serper Google-search API. Requires
//! `SERPER_API_KEY` in the environment (free keys at https://serper.dev);
//! startup configuration fails fast without it.

use radkit::macros::tool;
use radkit::tools::ToolResult;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

/// Arguments for web search
#[derive(Deserialize, JsonSchema)]
pub struct SearchWebArgs {
    /// Search query
    pub query: String,
    /// Maximum number of results (default: 5)
    pub max_results: Option<u32>,
}

/// Search the internet using Google
#[tool(
    description = "Search the internet using Google. Returns organic results with titles, links and snippets."
)]
pub async fn search_web(args: SearchWebArgs) -> ToolResult {
    let api_key = match std::env::var("SERPER_API_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => return ToolResult::error("SERPER_API_KEY is not set".to_string()),
    };
    let max_results = args.max_results.unwrap_or(5);

    let client = match reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
    {
        Ok(c) => c,
        Err(e) => return ToolResult::error(format!("Failed to create HTTP client: {}", e)),
    };

    let response = client
        .post(SERPER_ENDPOINT)
        .header("X-API-KEY", api_key)
        .json(&json!({ "q": args.query, "num": max_results }))
        .send()
        .await;

    match response {
        Ok(response) => match response.json::<serde_json::Value>().await {
            Ok(body) => ToolResult::success(json!({
                "query": args.query,
                "results": organic_results(&body, max_results as usize)
            })),
            Err(e) => ToolResult::error(format!("Failed to parse search response: {}", e)),
        },
        Err(e) => ToolResult::error(format!("Search request failed: {}", e)),
    }
}

fn organic_results(body: &serde_json::Value, limit: usize) -> Vec<serde_json::Value> {
    body.get("organic")
        .and_then(|r| r.as_array())
        .map(|results| {
            results
                .iter()
                .take(limit)
                .map(|r| {
                    json!({
                        "title": r.get("title").and_then(|t| t.as_str()).unwrap_or(""),
                        "link": r.get("link").and_then(|u| u.as_str()).unwrap_or(""),
                        "snippet": r.get("snippet").and_then(|s| s.as_str()).unwrap_or("")
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organic_results_extracts_and_limits() {
        let body = json!({
            "organic": [
                { "title": "A", "link": "https://a.example", "snippet": "first" },
                { "title": "B", "link": "https://b.example", "snippet": "second" },
                { "title": "C", "link": "https://c.example", "snippet": "third" }
            ]
        });
        let results = organic_results(&body, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["title"], "A");
        assert_eq!(results[1]["snippet"], "second");
    }

    #[test]
    fn test_organic_results_tolerates_missing_fields() {
        let body = json!({ "organic": [ { "title": "only title" } ] });
        let results = organic_results(&body, 5);
        assert_eq!(results[0]["link"], "");
        assert_eq!(results[0]["snippet"], "");
    }

    #[test]
    fn test_organic_results_empty_on_unexpected_shape() {
        assert!(organic_results(&json!({ "message": "quota" }), 5).is_empty());
    }
}
