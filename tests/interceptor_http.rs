//! End-to-end tests of the interceptor over a real HTTP transport.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bridge_auth::auth::{CredentialPrompt, MemoryStore, PromptError, SecretStore};
use bridge_auth::config::StoreBackend;
use bridge_auth::transport::{MultipartForm, ReqwestTransport, Request};
use bridge_auth::{BridgeConfig, SecretInterceptor};

/// Prompt that hands out pre-recorded answers and counts its calls
#[derive(Default)]
struct ScriptedPrompt {
    answers: Mutex<VecDeque<Option<String>>>,
    notices: AtomicUsize,
    prompts: AtomicUsize,
}

impl ScriptedPrompt {
    fn answering(answers: &[Option<&str>]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().map(|a| a.map(str::to_string)).collect()),
            ..Self::default()
        })
    }

    fn notices(&self) -> usize {
        self.notices.load(Ordering::SeqCst)
    }

    fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialPrompt for ScriptedPrompt {
    async fn notify_rejected(&self) -> Result<(), PromptError> {
        self.notices.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn request_secret(&self) -> Result<Option<String>, PromptError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        Ok(self.answers.lock().unwrap().pop_front().flatten())
    }
}

fn client_with(
    initial_secret: Option<&str>,
    prompt: Arc<ScriptedPrompt>,
) -> SecretInterceptor<ReqwestTransport> {
    let secrets = SecretStore::new(Arc::new(MemoryStore::new()));
    if let Some(secret) = initial_secret {
        secrets.set(secret).unwrap();
    }
    SecretInterceptor::new(ReqwestTransport::new(), secrets, prompt)
}

async fn mount_secret_gate(server: &MockServer, accepted: &str) {
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .and(header("x-bridge-secret", accepted))
        .respond_with(ResponseTemplate::new(200).set_body_string("online"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(401))
        .with_priority(10)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_rejected_secret_replaced_and_retried() {
    let server = MockServer::start().await;
    mount_secret_gate(&server, "new").await;

    let prompt = ScriptedPrompt::answering(&[Some("new")]);
    let client = client_with(Some("old"), prompt.clone());

    let response = client
        .execute(&Request::get(format!("{}/api/status", server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text(), "online");
    assert_eq!(prompt.notices(), 1);
    assert_eq!(prompt.prompts(), 1);
    assert_eq!(client.secrets().get().unwrap().unwrap().as_str(), "new");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].headers.get("x-bridge-secret").unwrap(), "old");
    assert_eq!(received[1].headers.get("x-bridge-secret").unwrap(), "new");
}

#[tokio::test]
async fn test_cancelled_prompt_returns_401() {
    let server = MockServer::start().await;
    mount_secret_gate(&server, "never-matches").await;

    let prompt = ScriptedPrompt::answering(&[None]);
    let client = client_with(Some("old"), prompt.clone());

    let response = client
        .execute(&Request::get(format!("{}/api/status", server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(prompt.notices(), 1);
    assert_eq!(prompt.prompts(), 1);
    assert!(client.secrets().get().unwrap().is_none());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_401_is_final() {
    let server = MockServer::start().await;
    mount_secret_gate(&server, "right").await;

    let prompt = ScriptedPrompt::answering(&[Some("wrong"), Some("right")]);
    let client = client_with(None, prompt.clone());

    let response = client
        .execute(&Request::get(format!("{}/api/status", server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(prompt.notices(), 0);
    assert_eq!(prompt.prompts(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_server_error_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/loads"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let prompt = ScriptedPrompt::answering(&[]);
    let client = client_with(Some("abc"), prompt.clone());

    let response = client
        .execute(&Request::get(format!("{}/api/loads", server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(response.text(), "boom");
    assert_eq!(prompt.prompts(), 0);
    assert_eq!(client.secrets().get().unwrap().unwrap().as_str(), "abc");
}

#[tokio::test]
async fn test_json_content_type_inferred_for_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/loads/7"))
        .and(header("content-type", "application/json"))
        .and(header("x-bridge-secret", "abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(Some("abc"), ScriptedPrompt::answering(&[]));

    let response = client
        .execute(
            &Request::new(format!("{}/api/loads/7", server.uri()))
                .with_method("post")
                .with_body(r#"{"level":100}"#),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 204);
    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].body, br#"{"level":100}"#.to_vec());
}

#[tokio::test]
async fn test_multipart_keeps_its_own_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_with(None, ScriptedPrompt::answering(&[]));
    let form = MultipartForm::new()
        .text("name", "kitchen")
        .file("config", "config.json", b"{}".to_vec());

    client
        .execute(&Request::post(format!("{}/api/upload", server.uri())).with_body(form))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    let content_type = received[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    assert!(received[0].headers.get("x-bridge-secret").is_none());
}

#[tokio::test]
async fn test_client_from_config_uses_custom_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .and(header("x-api-secret", "cfg-secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = BridgeConfig {
        store: StoreBackend::Memory,
        secret_header: "X-Api-Secret".to_string(),
        request_timeout_secs: Some(5),
        ..BridgeConfig::default()
    };
    let client = config
        .build_client(ScriptedPrompt::answering(&[]))
        .unwrap();
    client.secrets().set("cfg-secret").unwrap();

    let response = client
        .execute(&Request::get(format!("{}/api/status", server.uri())))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}
