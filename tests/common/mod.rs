use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use contactbox::config::{BackendConfig, Config};
use contactbox::db::{Backend, StorageError, SubmissionStore};
use contactbox::models::{Created, NewSubmission, Submission, SubmissionId};

pub const ADMIN_KEY: &str = "test-admin-key";

/// In-memory store that counts calls and can be switched into failure mode.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Submission>>,
    next_id: AtomicI64,
    pub inserts: AtomicUsize,
    pub reads: AtomicUsize,
    pub fail: AtomicBool,
}

impl MemoryStore {
    pub fn rows(&self) -> Vec<Submission> {
        self.rows.lock().unwrap().clone()
    }

    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(StorageError::Connection("connection refused (db.internal:5432)".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    async fn ensure_schema(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.check()
    }

    async fn insert(&self, new: &NewSubmission) -> Result<Created, StorageError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let id = SubmissionId::Serial(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let created_at = Utc::now();
        self.rows.lock().unwrap().push(Submission {
            id: id.clone(),
            name: new.name.clone(),
            email: new.email.clone(),
            message: new.message.clone(),
            created_at,
        });
        Ok(Created { id, created_at })
    }

    async fn list_all(&self) -> Result<Vec<Submission>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let mut rows = self.rows();
        rows.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| match (&a.id, &b.id) {
                (SubmissionId::Serial(a), SubmissionId::Serial(b)) => b.cmp(a),
                _ => std::cmp::Ordering::Equal,
            })
        });
        Ok(rows)
    }
}

/// A running test server backed by a `MemoryStore`.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Submit a JSON body, return (body, status).
    pub async fn submit_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/mensajes"))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit form-urlencoded data, return the raw response.
    pub async fn submit_form(&self, data: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url("/api/mensajes"))
            .form(data)
            .send()
            .await
            .expect("submit form failed")
    }

    /// List submissions with the key passed as the `clave` query parameter.
    pub async fn list_with_query(&self, key: Option<&str>) -> (Value, StatusCode) {
        let mut request = self.client.get(self.url("/api/mensajes"));
        if let Some(key) = key {
            request = request.query(&[("clave", key)]);
        }
        let resp = request.send().await.expect("list request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// List submissions with the key passed in the `X-Admin-Key` header.
    pub async fn list_with_header(&self, key: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url("/api/mensajes"))
            .header("x-admin-key", key)
            .send()
            .await
            .expect("list request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config() -> Config {
    Config {
        backend: BackendConfig::Postgres {
            url: "postgres://unused".to_string(),
        },
        admin_key: ADMIN_KEY.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        max_body_size: 16 * 1024,
        rate_limit: 0,
        rate_limit_window_secs: 60,
        trusted_proxies: vec![],
        honeypot_field: Some("website".to_string()),
        redirect_url: None,
        log_level: "warn".to_string(),
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawn a test app after letting the caller adjust the configuration.
pub async fn spawn_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let mut config = test_config();
    customize(&mut config);

    let store = Arc::new(MemoryStore::default());
    let (app, _state) = contactbox::build_app(store.clone(), config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        store,
    }
}
