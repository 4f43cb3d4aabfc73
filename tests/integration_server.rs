//! Integration tests for the tenunku HTTP service.
//!
//! Each test:
//! 1. Opens a file-backed SQLite database in a scratch directory.
//! 2. Serves the real router on an ephemeral loopback port.
//! 3. Talks to it over HTTP with `reqwest`.

use anyhow::{Context, Result};
use argon2::Params;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::{
    env, fs,
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tenunku::{
    api::{
        self,
        handlers::auth::{AuthConfig, AuthState, OtpDelivery},
    },
    storage::UserStore,
};
use tokio::{net::TcpListener, task::JoinHandle};
use ulid::Ulid;

#[derive(Debug, Default)]
struct Outbox {
    sent: Mutex<Vec<(String, String)>>,
}

impl Outbox {
    fn otp_for(&self, phone: &str) -> Option<String> {
        self.sent.lock().ok().and_then(|sent| {
            sent.iter()
                .rev()
                .find(|(to, _)| to == phone)
                .map(|(_, otp)| otp.clone())
        })
    }
}

impl OtpDelivery for Outbox {
    fn deliver(&self, phone: &str, otp: &str) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((phone.to_string(), otp.to_string()));
        }
        Ok(())
    }
}

struct ScratchDb(PathBuf);

impl ScratchDb {
    fn new() -> Self {
        Self(env::temp_dir().join(format!("tenunku-it-{}.db", Ulid::new())))
    }
}

impl Drop for ScratchDb {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    outbox: Arc<Outbox>,
    handle: JoinHandle<()>,
    _db: ScratchDb,
}

impl TestServer {
    async fn start() -> Result<Self> {
        let db = ScratchDb::new();
        let store = UserStore::open(&db.0).await?;
        store.migrate().await?;

        let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
            .unwrap_or_default();
        let outbox = Arc::new(Outbox::default());
        let state = Arc::new(AuthState::new(
            AuthConfig::new().with_hash_params(params),
            outbox.clone(),
        ));

        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).await?;
        let addr = listener.local_addr()?;
        let app = api::router(store, state);

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app.into_make_service()).await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            outbox,
            handle,
            _db: db,
        })
    }

    async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {path} failed"))?;

        let status = response.status();
        let payload = response.json::<Value>().await?;

        Ok((status, payload))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn registration(full_name: &str, phone: &str, password: &str) -> Value {
    json!({
        "fullName": full_name,
        "phone": phone,
        "email": "a@x.com",
        "password": password,
        "role": "driver",
    })
}

#[tokio::test]
async fn register_login_verify_round() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, registered) = server
        .post("/auth/register", registration("Ann", "0811", "p1"))
        .await?;
    assert_eq!(status, StatusCode::OK);
    let user_id = registered["userId"]
        .as_str()
        .context("missing userId")?
        .to_string();
    assert_eq!(registered["token"], format!("mock-token-{user_id}"));

    let (status, logged_in) = server
        .post(
            "/auth/login",
            json!({ "username": "Ann", "password": "p1", "role": "driver" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logged_in["userId"], user_id.as_str());

    let (status, rejected) = server
        .post(
            "/auth/login",
            json!({ "username": "Ann", "password": "wrong", "role": "driver" }),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(rejected["error"], "Invalid credentials");

    let otp = server.outbox.otp_for("0811").context("no OTP issued")?;
    let (status, verified) = server
        .post("/auth/verify-otp", json!({ "phone": "0811", "otp": otp }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["message"], "Verification successful");

    Ok(())
}

#[tokio::test]
async fn duplicate_phone_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, _) = server
        .post("/auth/register", registration("Ann", "0811", "p1"))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, payload) = server
        .post("/auth/register", registration("Bob", "0811", "p2"))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload.get("error").is_some());

    Ok(())
}

#[tokio::test]
async fn health_reports_database_ok() -> Result<()> {
    let server = TestServer::start().await?;

    let response = server
        .client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-app").is_some());

    let payload = response.json::<Value>().await?;
    assert_eq!(payload["database"], "ok");
    assert_eq!(payload["name"], "tenunku");

    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> Result<()> {
    let server = TestServer::start().await?;

    let response = server
        .client
        .get(format!("{}/api-docs/openapi.json", server.base_url))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let document = response.json::<Value>().await?;
    assert!(document["paths"].get("/auth/register").is_some());

    Ok(())
}

#[tokio::test]
async fn schema_survives_restarts() -> Result<()> {
    let db = ScratchDb::new();

    let store = UserStore::open(&db.0).await?;
    store.migrate().await?;
    store
        .insert(&tenunku::storage::NewUser {
            id: "u1".to_string(),
            full_name: Some("Ann".to_string()),
            phone: Some("0811".to_string()),
            email: Some("a@x.com".to_string()),
            password: Some("hash".to_string()),
            role: Some("driver".to_string()),
            otp: "123456".to_string(),
            is_verified: true,
        })
        .await?;
    store.close().await;

    // Second process start against the same file.
    let store = UserStore::open(&db.0).await?;
    store.migrate().await?;
    let users = store
        .find_all(&tenunku::storage::UserFilter::new())
        .await?;
    assert_eq!(users.len(), 1);
    store.close().await;

    Ok(())
}
