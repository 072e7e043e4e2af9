//! Query intent resolution
//!
//! The model is asked to answer in a three-part shape:
//!
//! ```text
//! TYPE: GENERAL | ACTION:<kind>
//! RESPONSE: <text for the user>
//! PARAMS: key=value, ...
//! ```
//!
//! The reply is external input, so parsing is lenient about markdown decoration and
//! falls back to returning the reply verbatim when no `TYPE:` marker is found.

use std::collections::HashMap;
use std::sync::Arc;

use geomap_core::error::Result;
use geomap_core::models::{IntentKind, QueryIntent};

use crate::ports::Generator;

const PROMPT_TEMPLATE: &str = r#"You are a GIS visualization assistant. Analyze this user query and determine:
1. Is it a general question about GIS concepts?
2. Is it a request for a specific action (map, stats, etc)?
3. What parameters are needed for the action?
4. For data explanation: brief, friendly with emojis

Available columns: {columns}

Examples:
- "What is NDVI?" -> GENERAL
- "Show me a map of population" -> ACTION:MAP (column=population)
- "Calculate statistics for income" -> ACTION:STATS (column=income)
- "Add a scale bar to the map" -> ACTION:MAP_ELEMENT (element=scale_bar)

Respond in this format:
TYPE: [GENERAL|ACTION:type]
RESPONSE: [your response]
PARAMS: [key=value, ...] (if applicable)

User query: {message}"#;

/// Build the instruction prompt for a message and the dataset's columns
pub fn build_prompt(message: &str, known_columns: &[String]) -> String {
    let columns = if known_columns.is_empty() {
        "(no dataset loaded)".to_string()
    } else {
        known_columns.join(", ")
    };
    PROMPT_TEMPLATE.replace("{columns}", &columns).replace("{message}", message)
}

/// Resolves a user message into a reply and an optional target column
pub struct IntentResolver {
    generator: Arc<dyn Generator>,
}

impl IntentResolver {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Ask the model about `message` and parse its reply.
    ///
    /// Model failures are returned as errors, never as reply text.
    pub async fn resolve(&self, message: &str, known_columns: &[String]) -> Result<QueryIntent> {
        let prompt = build_prompt(message, known_columns);
        let reply = self.generator.generate(&prompt).await?;

        let intent = parse_reply(&reply, known_columns);
        tracing::info!(
            model = self.generator.model_name(),
            kind = ?intent.kind,
            column = ?intent.matched_column,
            "Resolved query intent"
        );
        Ok(intent)
    }
}

/// Strip markdown emphasis and whitespace around a marker line
fn clean_line(line: &str) -> &str {
    line.trim().trim_matches(|c| c == '*' || c == '#' || c == '`').trim()
}

/// Find the `TYPE:` line, returning its value and the byte offset just past the line
fn find_type_line(reply: &str) -> Option<(String, usize)> {
    let mut offset = 0;
    for line in reply.split_inclusive('\n') {
        let cleaned = clean_line(line);
        let upper = cleaned.to_ascii_uppercase();
        if let Some(rest) = upper.strip_prefix("TYPE:") {
            let value = rest.trim().trim_start_matches('*').trim_matches(|c| c == '[' || c == ']').trim();
            return Some((value.to_string(), offset + line.len()));
        }
        offset += line.len();
    }
    None
}

/// Byte range of a `MARKER:` occurrence (case-insensitive)
fn find_marker(text: &str, marker: &str) -> Option<(usize, usize)> {
    let upper = text.to_ascii_uppercase();
    upper.find(marker).map(|start| (start, start + marker.len()))
}

/// Text after `RESPONSE:` up to the line holding `PARAMS:`, or everything after the TYPE line
fn response_section(reply: &str, after_type: usize) -> String {
    let body = &reply[after_type.min(reply.len())..];
    let start = find_marker(body, "RESPONSE:").map(|(_, end)| end).unwrap_or(0);
    let section = &body[start..];
    let end = match find_marker(section, "PARAMS:") {
        Some((marker, _)) => {
            let line_start = section[..marker].rfind('\n').map(|i| i + 1).unwrap_or(0);
            if clean_line(&section[line_start..marker]).is_empty() {
                line_start
            } else {
                marker
            }
        }
        None => section.len(),
    };
    section[..end].trim().trim_start_matches('*').trim().to_string()
}

fn is_decoration(c: char) -> bool {
    c.is_whitespace() || matches!(c, '[' | ']' | '(' | ')' | '{' | '}' | '"' | '\'' | '`' | '*')
}

/// `key=value` pairs on the `PARAMS:` line; brackets, parentheses, quotes and emphasis are stripped
fn parse_params(reply: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let Some((_, end)) = find_marker(reply, "PARAMS:") else {
        return params;
    };

    let line = reply[end..].lines().next().unwrap_or("").trim_matches(is_decoration);
    for pair in line.split(',') {
        if let Some((key, value)) = pair.split_once('=') {
            params.insert(key.trim_matches(is_decoration).to_string(), value.trim_matches(is_decoration).to_string());
        }
    }
    params
}

/// Parse a model reply against the dataset's columns
pub fn parse_reply(reply: &str, known_columns: &[String]) -> QueryIntent {
    let Some((type_value, after_type)) = find_type_line(reply) else {
        return QueryIntent::new(reply, IntentKind::Unstructured);
    };

    let kind = if type_value.starts_with("GENERAL") {
        IntentKind::General
    } else if let Some(action) = type_value.strip_prefix("ACTION:") {
        let action = action.split_whitespace().next().unwrap_or("");
        IntentKind::from_action(action.trim_matches(|c| c == '[' || c == ']'))
    } else {
        return QueryIntent::new(reply, IntentKind::Unstructured);
    };

    let response = response_section(reply, after_type);

    if kind != IntentKind::Map {
        return QueryIntent::new(response, kind);
    }

    let params = parse_params(reply);
    let column = params.get("column").cloned().unwrap_or_default();
    if !column.is_empty() && known_columns.iter().any(|c| *c == column) {
        QueryIntent::new(response, kind).with_column(column)
    } else {
        QueryIntent::new(
            format!("Column '{}' not found. Available columns: {}", column, known_columns.join(", ")),
            kind,
        )
    }
}
