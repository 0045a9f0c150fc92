mod common;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transient_error_body() -> serde_json::Value {
    serde_json::json!({
        "error": {
            "message": "temporarily overloaded",
            "type": null,
            "param": null,
            "code": null
        }
    })
}

/// Two transient 5xx responses below the retry bound do not fail the query;
/// the third attempt succeeds.
#[tokio::test]
async fn transient_llm_failures_are_retried() {
    let providers = MockServer::start().await;
    common::mount_embedding_mock(&providers).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(transient_error_body()))
        .up_to_n_times(2)
        .mount(&providers)
        .await;
    common::mount_llm_mock(&providers, "- Hold the position").await;

    let (state, _dir) = common::test_state(&providers.uri(), &providers.uri()).await;

    let text = common::text_fixture(8);
    let stored = state
        .pipeline
        .store_document("doc.txt", Some("text/plain"), text.as_bytes())
        .await
        .expect("store");
    state.pipeline.ingest(&stored.document.id).await.expect("ingest");

    let result = state
        .query
        .query("should I hold?", Some(2))
        .await
        .expect("query should succeed after transient failures");
    assert_eq!(result.recommendations, vec!["Hold the position"]);
}

/// A provider that stays down exhausts the retries and surfaces as a
/// synthesis error.
#[tokio::test]
async fn persistent_llm_failure_surfaces_as_synthesis_error() {
    let providers = MockServer::start().await;
    common::mount_embedding_mock(&providers).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(transient_error_body()))
        .mount(&providers)
        .await;

    let mut config = common::test_config(&providers.uri(), &providers.uri());
    // Keep the test fast: one retry, short timeout.
    config.llm.max_retries = 1;
    config.llm.timeout_secs = 2;
    let (state, _dir) = common::test_state_with_config(config).await;

    let text = common::text_fixture(8);
    let stored = state
        .pipeline
        .store_document("doc.txt", Some("text/plain"), text.as_bytes())
        .await
        .expect("store");
    state.pipeline.ingest(&stored.document.id).await.expect("ingest");

    let err = state.query.query("any advice?", Some(2)).await.unwrap_err();
    assert_eq!(err.code(), "synthesis_error");
}

/// Authentication failures are not retried.
#[tokio::test]
async fn auth_failure_is_not_retried() {
    let providers = MockServer::start().await;
    common::mount_embedding_mock(&providers).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {
                "message": "Invalid API key provided",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        })))
        .mount(&providers)
        .await;

    let (state, _dir) = common::test_state(&providers.uri(), &providers.uri()).await;

    let text = common::text_fixture(8);
    let stored = state
        .pipeline
        .store_document("doc.txt", Some("text/plain"), text.as_bytes())
        .await
        .expect("store");
    state.pipeline.ingest(&stored.document.id).await.expect("ingest");

    let err = state.query.query("any advice?", Some(2)).await.unwrap_err();
    assert_eq!(err.code(), "synthesis_error");
}
