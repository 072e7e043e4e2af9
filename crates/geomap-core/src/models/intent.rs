use serde::{Deserialize, Serialize};

/// What the language model decided the user wants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "action")]
pub enum IntentKind {
    /// A conversational answer, no side effect
    General,
    /// Render a map of a column
    Map,
    /// Compute statistics
    Stats,
    /// Add an element (scale bar, legend, ...) to the map
    MapElement,
    /// Any other `ACTION:<kind>` the model produced, upper-cased
    Other(String),
    /// The reply carried no recognizable `TYPE:` marker
    Unstructured,
}

impl IntentKind {
    /// Parse the part after `ACTION:`
    pub fn from_action(action: &str) -> Self {
        let action = action.trim().to_ascii_uppercase();
        match action.as_str() {
            "MAP" => IntentKind::Map,
            "STATS" | "STATISTICS" => IntentKind::Stats,
            "MAP_ELEMENT" => IntentKind::MapElement,
            _ => IntentKind::Other(action),
        }
    }
}

/// Result of resolving a user message. Consumed immediately by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub response_text: String,
    pub kind: IntentKind,
    pub matched_column: Option<String>,
}

impl QueryIntent {
    pub fn new(response_text: impl Into<String>, kind: IntentKind) -> Self {
        Self { response_text: response_text.into(), kind, matched_column: None }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.matched_column = Some(column.into());
        self
    }

    /// Matched columns as a list (zero or one element)
    pub fn matched_columns(&self) -> Vec<String> {
        self.matched_column.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parsing() {
        assert_eq!(IntentKind::from_action("map"), IntentKind::Map);
        assert_eq!(IntentKind::from_action(" STATS "), IntentKind::Stats);
        assert_eq!(IntentKind::from_action("MAP_ELEMENT"), IntentKind::MapElement);
        assert_eq!(IntentKind::from_action("export"), IntentKind::Other("EXPORT".to_string()));
    }

    #[test]
    fn test_matched_columns() {
        let intent = QueryIntent::new("ok", IntentKind::Map).with_column("pop");
        assert_eq!(intent.matched_columns(), vec!["pop".to_string()]);
        assert!(QueryIntent::new("hi", IntentKind::General).matched_columns().is_empty());
    }
}
