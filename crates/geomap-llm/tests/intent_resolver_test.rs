//! Intent resolution against a scripted generator

use async_trait::async_trait;
use geomap_core::error::{GeomapError, Result};
use geomap_core::models::IntentKind;
use geomap_llm::{Generator, IntentResolver};
use std::sync::{Arc, Mutex};

struct ScriptedGenerator {
    reply: Result<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self { reply: Ok(reply.to_string()), prompts: Mutex::new(Vec::new()) })
    }

    fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(GeomapError::LlmRequest { reason: reason.to_string() }),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(GeomapError::LlmRequest { reason }) => {
                Err(GeomapError::LlmRequest { reason: reason.clone() })
            }
            Err(_) => unreachable!(),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn columns() -> Vec<String> {
    vec!["NAME".to_string(), "POP2020".to_string(), "region".to_string()]
}

#[tokio::test]
async fn test_map_request_matches_column() {
    let generator =
        ScriptedGenerator::replying("TYPE: ACTION:MAP\nRESPONSE: Population by state 🗺️\nPARAMS: column=POP2020");
    let resolver = IntentResolver::new(generator.clone());

    let intent = resolver.resolve("show population on a map", &columns()).await.unwrap();

    assert_eq!(intent.kind, IntentKind::Map);
    assert_eq!(intent.matched_column.as_deref(), Some("POP2020"));
    assert_eq!(intent.response_text, "Population by state 🗺️");

    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Available columns: NAME, POP2020, region"));
    assert!(prompts[0].contains("User query: show population on a map"));
}

#[tokio::test]
async fn test_general_question() {
    let generator = ScriptedGenerator::replying("TYPE: GENERAL\nRESPONSE: A CRS defines how coordinates map to places.");
    let resolver = IntentResolver::new(generator);

    let intent = resolver.resolve("what is a CRS?", &columns()).await.unwrap();
    assert_eq!(intent.kind, IntentKind::General);
    assert!(intent.matched_columns().is_empty());
}

#[tokio::test]
async fn test_generator_failure_is_an_error() {
    let resolver = IntentResolver::new(ScriptedGenerator::failing("HTTP 500: boom"));

    let err = resolver.resolve("map region", &columns()).await.unwrap_err();
    assert!(matches!(err, GeomapError::LlmRequest { .. }));
    assert!(err.to_string().contains("HTTP 500"));
}
