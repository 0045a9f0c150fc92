#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use dossier::api::AppState;
use dossier::config::{
    Config, DatabaseConfig, EmbeddingsConfig, LlmConfig, ProcessingConfig, QueryConfig,
    ServerConfig,
};
use dossier::db::{Database, LibSqlBackend, StorageBackend};
use dossier::embeddings::EmbeddingProvider;
use dossier::llm::LlmProvider;

pub const TEST_DIMENSIONS: usize = 8;

/// Deterministic embedding derived from the text bytes: stable across runs,
/// different texts land at different points, unit length so cosine scores
/// stay in range.
pub fn embedding_for(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; TEST_DIMENSIONS];
    for (i, byte) in text.bytes().enumerate() {
        vector[i % TEST_DIMENSIONS] += f32::from(byte) / 255.0;
    }

    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

/// Responds to OpenAI-compatible `/embeddings` requests with one vector per
/// input.
pub struct EmbeddingResponder;

impl Respond for EmbeddingResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value =
            serde_json::from_slice(&request.body).expect("embedding request body is JSON");
        let inputs = body["input"].as_array().cloned().unwrap_or_default();

        let data: Vec<serde_json::Value> = inputs
            .iter()
            .enumerate()
            .map(|(index, input)| {
                let text = input.as_str().unwrap_or_default();
                serde_json::json!({
                    "object": "embedding",
                    "index": index,
                    "embedding": embedding_for(text),
                })
            })
            .collect();

        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "list",
            "data": data,
            "model": "test-embed",
            "usage": { "prompt_tokens": 1, "total_tokens": 1 }
        }))
    }
}

pub async fn mount_embedding_mock(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(EmbeddingResponder)
        .mount(server)
        .await;
}

/// Chat completion body with fixed usage (10 in, 5 out).
pub fn llm_response_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
}

pub async fn mount_llm_mock(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(llm_response_body(content)))
        .mount(server)
        .await;
}

pub fn test_config(embedding_url: &str, llm_url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: ":memory:".to_string(),
            auth_token: None,
            local_path: None,
        },
        embeddings: EmbeddingsConfig {
            model: "ollama/test-embed".to_string(),
            dimensions: TEST_DIMENSIONS,
            base_url: Some(embedding_url.to_string()),
            api_key: None,
            batch_size: 4,
            timeout_secs: 5,
            max_retries: 1,
        },
        processing: ProcessingConfig {
            chunk_size: 16,
            chunk_overlap: 4,
            max_file_size: 1024 * 1024,
        },
        query: QueryConfig {
            default_k: 5,
            max_k: 20,
        },
        llm: LlmConfig {
            model: "ollama/test-model".to_string(),
            api_key: None,
            base_url: Some(llm_url.to_string()),
            temperature: 0.0,
            timeout_secs: 5,
            max_retries: 2,
        },
    }
}

/// Builds an [`AppState`] over a fresh file-backed database. The returned
/// [`TempDir`] owns the database file; keep it alive for the test's
/// duration.
pub async fn test_state_with_config(mut config: Config) -> (AppState, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    config.database.url = dir
        .path()
        .join("dossier-test.db")
        .display()
        .to_string();

    let db = Database::new(&config.database, config.embeddings.dimensions)
        .await
        .expect("open database");
    let db: Arc<dyn StorageBackend> = Arc::new(LibSqlBackend::new(db));

    let embeddings = EmbeddingProvider::new(&config.embeddings).expect("embedding provider");
    let llm = LlmProvider::new(&config.llm);

    (AppState::new(config, db, embeddings, llm), dir)
}

pub async fn test_state(embedding_url: &str, llm_url: &str) -> (AppState, TempDir) {
    test_state_with_config(test_config(embedding_url, llm_url)).await
}

/// In-memory DOCX with a few paragraphs.
pub fn docx_fixture() -> Vec<u8> {
    let docx = docx_rs::Docx::new()
        .add_paragraph(
            docx_rs::Paragraph::new()
                .add_run(docx_rs::Run::new().add_text("Quarterly account review.")),
        )
        .add_paragraph(docx_rs::Paragraph::new().add_run(
            docx_rs::Run::new().add_text("The savings rate increased to four percent in March."),
        ))
        .add_paragraph(
            docx_rs::Paragraph::new().add_run(
                docx_rs::Run::new().add_text("Customers should review their standing orders."),
            ),
        );

    let mut buffer = Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).expect("pack docx");
    buffer.into_inner()
}

/// Plain-text fixture with `sentences` short sentences.
pub fn text_fixture(sentences: usize) -> String {
    (0..sentences)
        .map(|i| format!("Sentence number {i} covers account activity for month {i}."))
        .collect::<Vec<_>>()
        .join(" ")
}
