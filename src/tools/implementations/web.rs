//! Web search tool implementation
//!
//! Queries the DuckDuckGo HTML endpoint and reduces the result page to
//! plain-text snippets. Network failures are ordinary tool errors.

use crate::errors::{AgentError, Result};
use crate::tools::types::ToolContext;
use scraper::{Html, Selector};
use tracing::debug;

/// HTML search endpoint
pub const SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Snippets kept from one result page
const MAX_RESULTS: usize = 5;

/// CSS class DuckDuckGo puts on each result summary
const SNIPPET_SELECTOR: &str = ".result__snippet";

/// Search the web and return the top snippets, one per line
pub async fn web_search(query: &str, client: &reqwest::Client, context: &ToolContext) -> Result<String> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AgentError::ToolFailed("Search query cannot be empty".to_string()));
    }

    debug!(query = %query, "web search");

    let response = client
        .get(SEARCH_ENDPOINT)
        .query(&[("q", query)])
        .timeout(context.timeout)
        .send()
        .await
        .map_err(|e| AgentError::ToolFailed(format!("Error searching web: {}", e)))?;

    if !response.status().is_success() {
        return Err(AgentError::ToolFailed(format!(
            "Error searching web: HTTP {}",
            response.status()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| AgentError::ToolFailed(format!("Error searching web: {}", e)))?;

    let snippets = extract_snippets(&body, context.max_output_size);
    if snippets.is_empty() {
        return Ok(format!("No results found for '{}'.", query));
    }
    Ok(snippets.join("\n"))
}

/// Pull result snippets out of a DuckDuckGo HTML page
pub fn extract_snippets(html: &str, max_len: usize) -> Vec<String> {
    let Ok(selector) = Selector::parse(SNIPPET_SELECTOR) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut total = 0;
    document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
        .take(MAX_RESULTS)
        .take_while(|text| {
            total += text.len();
            total <= max_len
        })
        .collect()
}
