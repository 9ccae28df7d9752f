use crate::constants::defaults;
use crate::error::CrewError;
use crate::tools::traits::{Tool, ToolResult};
use regex::Regex;
use scraper::{Html, Node, Selector};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;

const TOOL_NAME: &str = "scrape_website";

/// Fetches a web page and returns its readable text.
/// Constructed with a fixed `website_url`; the model may still pass another URL.
pub struct ScrapeWebsiteTool {
    website_url: String,
    description: String,
    timeout: Duration,
}

impl ScrapeWebsiteTool {
    pub fn new(website_url: impl Into<String>) -> Self {
        let website_url = website_url.into();
        let description = format!(
            "Read the content of a website. Without arguments it reads {website_url}. \
             Pass `url` to read a different page. Returns the page text, truncated to 50KB."
        );
        Self {
            website_url,
            description,
            timeout: Duration::from_secs(defaults::SCRAPE_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn website_url(&self) -> &str {
        &self.website_url
    }

    /// Download `url` and extract its text.
    pub async fn fetch(&self, url: &str) -> Result<String, CrewError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(defaults::USER_AGENT)
            .build()
            .map_err(|e| CrewError::tool(TOOL_NAME, format!("Failed to create HTTP client: {e}")))?;

        tracing::info!(url, "scraping website");

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| CrewError::tool(TOOL_NAME, format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrewError::tool(
                TOOL_NAME,
                format!("{url} returned HTTP {status}"),
            ));
        }

        let html = response
            .text()
            .await
            .map_err(|e| CrewError::tool(TOOL_NAME, format!("Failed to read response: {e}")))?;

        Ok(truncate_at_boundary(html_to_text(&html), defaults::MAX_SCRAPE_BYTES))
    }
}

#[async_trait::async_trait]
impl Tool for ScrapeWebsiteTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Optional URL to read instead of the default website"
                }
            }
        })
    }

    async fn execute(&self, params: Value) -> ToolResult {
        let url = params
            .get("url")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.website_url)
            .to_string();

        let text = self.fetch(&url).await?;

        Ok(serde_json::json!({
            "url": url,
            "content": text,
        }))
    }
}

/// Elements that start a new line of output text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol",
    "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

fn hidden_selector() -> &'static Selector {
    static HIDDEN: OnceLock<Selector> = OnceLock::new();
    HIDDEN.get_or_init(|| Selector::parse("head, script, style, noscript, template, svg").unwrap())
}

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Reduce an HTML document to readable text, one block element per line.
/// Entities are decoded by the parser; `<head>`, scripts and styles are dropped.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let hidden: HashSet<_> = document.select(hidden_selector()).map(|el| el.id()).collect();

    let mut text = String::new();
    for node in document.root_element().descendants() {
        if node.ancestors().any(|a| hidden.contains(&a.id())) {
            continue;
        }
        match node.value() {
            Node::Text(t) => text.push_str(&whitespace().replace_all(t, " ")),
            Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) => text.push('\n'),
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_at_boundary(mut text: String, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text;
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_drops_scripts_and_tags() {
        let html = r#"<html><head><title>Docs</title><style>p { color: red; }</style></head>
            <body><h1>Creating a Crew</h1><script>alert("x")</script>
            <p>Set <code>memory=True</code> when you create the crew.</p>
            <!-- hidden --></body></html>"#;

        let text = html_to_text(html);
        assert!(text.contains("Creating a Crew"));
        assert!(text.contains("Set memory=True when you create the crew."));
        assert!(!text.contains("alert"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("hidden"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_html_to_text_decodes_entities() {
        let text = html_to_text("<p>Tom &amp; Jerry &lt;3 &quot;cheese&quot;</p>");
        assert_eq!(text, "Tom & Jerry <3 \"cheese\"");
    }

    #[test]
    fn test_html_to_text_keeps_paragraph_breaks() {
        let text = html_to_text("<p>first</p><p>second</p>");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn test_html_to_text_decodes_numeric_and_named_entities() {
        let text = html_to_text("<p>It&#8217;s easy &mdash; set memory&#x3D;True &hellip;</p>");
        assert_eq!(text, "It\u{2019}s easy \u{2014} set memory=True \u{2026}");
    }

    #[test]
    fn test_html_to_text_drops_whole_head() {
        let html = "<html><head><style>p{}</style><title>Secret Title</title><meta></head>\
                    <body><p>Body</p></body></html>";
        assert_eq!(html_to_text(html), "Body");
    }

    #[test]
    fn test_html_to_text_collapses_source_whitespace() {
        let html = "<div>\n  Crews run tasks\n  in order&nbsp;by default.\n</div><ul><li>one</li><li>two</li></ul>";
        let text = html_to_text(html);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Crews run tasks in order by default.", "one", "two"]);
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let text = "héllo".to_string();
        // 'é' spans bytes 1..3
        assert_eq!(truncate_at_boundary(text, 2), "h");
    }

    #[test]
    fn test_tool_definition() {
        let tool = ScrapeWebsiteTool::new("https://example.com/docs");
        let def = tool.to_definition();
        assert_eq!(def.name, "scrape_website");
        assert!(def.description.contains("https://example.com/docs"));
        assert_eq!(tool.website_url(), "https://example.com/docs");
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_tool_error() {
        let tool = ScrapeWebsiteTool::new("http://127.0.0.1:9/")
            .with_timeout(Duration::from_millis(500));
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, CrewError::Tool { ref tool, .. } if tool == "scrape_website"));
    }
}
