use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use odoolink_application::RemoteGateway;
use odoolink_core::AppError;
use odoolink_domain::{ApiVersion, CallContext, EntityType, SearchDomain};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use url::Url;

use crate::{AttachmentEncoding, AttachmentUpload, upload_attachment};

use super::{DatabaseCreation, HttpCredentials, JsonRpcOdooSession, OdooConnectionSettings};

#[derive(Clone)]
struct FakeOdoo {
    replies: Arc<HashMap<&'static str, (StatusCode, Value)>>,
    requests: Arc<Mutex<Vec<(Value, Option<String>)>>>,
}

impl FakeOdoo {
    fn new(replies: Vec<(&'static str, StatusCode, Value)>) -> Self {
        Self {
            replies: Arc::new(
                replies
                    .into_iter()
                    .map(|(method, status, body)| (method, (status, body)))
                    .collect(),
            ),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn requests(&self) -> Vec<(Value, Option<String>)> {
        self.requests.lock().await.clone()
    }

    async fn serve(self) -> Url {
        let listener = match TcpListener::bind("127.0.0.1:0").await {
            Ok(listener) => listener,
            Err(error) => panic!("failed to bind fake Odoo listener: {error}"),
        };
        let address = match listener.local_addr() {
            Ok(address) => address,
            Err(error) => panic!("failed to read fake Odoo address: {error}"),
        };
        let router = Router::new()
            .route("/jsonrpc", post(answer))
            .with_state(self);
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Url::parse(&format!("http://{address}/"))
            .unwrap_or_else(|error| panic!("invalid fake Odoo url: {error}"))
    }
}

async fn answer(
    State(fake): State<FakeOdoo>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> impl IntoResponse {
    let authorization = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let method = request["params"]["method"]
        .as_str()
        .unwrap_or_default()
        .to_owned();
    fake.requests.lock().await.push((request, authorization));

    match fake.replies.get(method.as_str()) {
        Some((status, body)) => (*status, Json(body.clone())),
        None => (
            StatusCode::OK,
            Json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": 200, "message": "Odoo Server Error", "data": {"message": "unscripted"}}
            })),
        ),
    }
}

fn result(value: Value) -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({"jsonrpc": "2.0", "id": 1, "result": value}),
    )
}

fn fault(message: &str, debug: &str) -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {
                "code": 200,
                "message": "Odoo Server Error",
                "data": {"name": "odoo.exceptions.UserError", "message": message, "debug": debug}
            }
        }),
    )
}

fn scripted(method: &'static str, reply: (StatusCode, Value)) -> (&'static str, StatusCode, Value) {
    (method, reply.0, reply.1)
}

fn settings(url: Url) -> OdooConnectionSettings {
    OdooConnectionSettings {
        url,
        database: "demo".to_owned(),
        user: "admin".to_owned(),
        password: "secret".to_owned(),
        api_version: ApiVersion::new(15, 0),
        http_credentials: None,
        accept_invalid_certs: false,
        timeout: Duration::from_secs(5),
        create_database: None,
    }
}

fn partner() -> EntityType {
    EntityType::new("res.partner").unwrap_or_else(|error| panic!("valid entity type: {error}"))
}

#[tokio::test]
async fn connect_authenticates_and_executes_calls() {
    let fake = FakeOdoo::new(vec![
        scripted("authenticate", result(json!(2))),
        scripted("execute_kw", result(json!(12))),
    ]);
    let mut connection = settings(fake.clone().serve().await);
    connection.http_credentials = Some(HttpCredentials {
        user: "proxy".to_owned(),
        password: "door".to_owned(),
    });

    let session = JsonRpcOdooSession::connect(&connection).await;
    let Ok(session) = session else {
        panic!("session should authenticate");
    };
    assert_eq!(session.uid(), 2);

    let gateway = RemoteGateway::new(
        Arc::new(session),
        CallContext::with_defaults("fr_FR", true),
        ApiVersion::new(15, 0),
    );
    let count = gateway
        .search_count(&partner(), &SearchDomain::all(), None)
        .await;
    assert!(matches!(count, Ok(12)));

    let requests = fake.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].0["params"],
        json!({"service": "common", "method": "authenticate", "args": ["demo", "admin", "secret", {}]})
    );
    assert_eq!(requests[1].0["params"]["service"], json!("object"));
    assert_eq!(
        requests[1].0["params"]["args"],
        json!([
            "demo",
            2,
            "secret",
            "res.partner",
            "search_count",
            [[]],
            {"context": {"lang": "fr_FR", "noupdate": true}}
        ])
    );
    assert!(requests.iter().all(|(_, authorization)| {
        authorization.as_deref() == Some("Basic cHJveHk6ZG9vcg==")
    }));
    assert_ne!(requests[0].0["id"], requests[1].0["id"]);
}

#[tokio::test]
async fn rejected_credentials_are_an_authentication_error() {
    let fake = FakeOdoo::new(vec![scripted("authenticate", result(json!(false)))]);
    let url = fake.serve().await;

    let session = JsonRpcOdooSession::connect(&settings(url)).await;

    assert!(matches!(
        session,
        Err(AppError::Authentication(ref message)) if message.contains("\"admin\"")
    ));
}

#[tokio::test]
async fn database_fatal_fault_is_an_authentication_error() {
    let fake = FakeOdoo::new(vec![scripted(
        "authenticate",
        fault(
            "connection failed",
            "psycopg2.OperationalError: FATAL:  database \"demo\" does not exist\n",
        ),
    )]);
    let url = fake.serve().await;

    let session = JsonRpcOdooSession::connect(&settings(url)).await;

    assert!(matches!(
        session,
        Err(AppError::Authentication(ref message)) if message == "database \"demo\" does not exist"
    ));
}

#[tokio::test]
async fn backend_fault_carries_detailed_message() {
    let fake = FakeOdoo::new(vec![
        scripted("authenticate", result(json!(2))),
        scripted(
            "execute_kw",
            fault("The operation cannot be completed: missing name", "Traceback ..."),
        ),
    ]);
    let url = fake.serve().await;
    let Ok(session) = JsonRpcOdooSession::connect(&settings(url)).await else {
        panic!("session should authenticate");
    };
    let gateway = RemoteGateway::new(
        Arc::new(session),
        CallContext::new(),
        ApiVersion::new(15, 0),
    );

    let result = gateway.unlink(&partner(), &[1], None).await;

    assert!(matches!(
        result,
        Err(AppError::RemoteFault(ref message))
            if message == "The operation cannot be completed: missing name"
    ));
}

#[tokio::test]
async fn http_error_status_is_a_protocol_error() {
    let fake = FakeOdoo::new(vec![scripted(
        "authenticate",
        (StatusCode::BAD_GATEWAY, json!({"detail": "upstream down"})),
    )]);
    let url = fake.serve().await;

    let session = JsonRpcOdooSession::connect(&settings(url)).await;

    assert!(matches!(session, Err(AppError::Protocol(_))));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_protocol_error() {
    let listener = match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(error) => panic!("failed to reserve a port: {error}"),
    };
    let address = match listener.local_addr() {
        Ok(address) => address,
        Err(error) => panic!("failed to read reserved address: {error}"),
    };
    drop(listener);
    let url = Url::parse(&format!("http://{address}"))
        .unwrap_or_else(|error| panic!("invalid url: {error}"));

    let session = JsonRpcOdooSession::connect(&settings(url)).await;

    assert!(matches!(session, Err(AppError::Protocol(_))));
}

#[tokio::test]
async fn existing_database_is_tolerated_on_creation() {
    let fake = FakeOdoo::new(vec![
        scripted(
            "create_database",
            fault("Database already exists", "psycopg2.errors.DuplicateDatabase"),
        ),
        scripted("authenticate", result(json!(2))),
    ]);
    let mut connection = settings(fake.clone().serve().await);
    connection.create_database = Some(DatabaseCreation {
        master_password: "master".to_owned(),
        lang: "fr_FR".to_owned(),
        country_code: "fr".to_owned(),
        phone: String::new(),
    });

    let session = JsonRpcOdooSession::connect(&connection).await;

    assert!(session.is_ok());
    let requests = fake.requests().await;
    assert_eq!(
        requests[0].0["params"]["args"],
        json!(["master", "demo", false, "fr_FR", "secret", "admin", "fr", ""])
    );
}

#[tokio::test]
async fn local_file_is_uploaded_as_attachment() {
    let fake = FakeOdoo::new(vec![
        scripted("authenticate", result(json!(2))),
        scripted("execute_kw", result(json!(31))),
    ]);
    let url = fake.clone().serve().await;
    let Ok(session) = JsonRpcOdooSession::connect(&settings(url)).await else {
        panic!("session should authenticate");
    };
    let gateway = RemoteGateway::new(
        Arc::new(session),
        CallContext::new(),
        ApiVersion::new(15, 0),
    );
    let directory: PathBuf =
        std::env::temp_dir().join(format!("odoolink-upload-{}", uuid::Uuid::new_v4()));
    if let Err(error) = std::fs::create_dir_all(&directory) {
        panic!("failed to create scratch directory: {error}");
    }
    let path = directory.join("logo.txt");
    if let Err(error) = std::fs::write(&path, b"hello") {
        panic!("failed to write scratch file: {error}");
    }

    let proxy = gateway.entity(partner());
    let encoded = AttachmentUpload {
        res_id: Some(7),
        ..AttachmentUpload::default()
    };
    let raw = AttachmentUpload {
        res_id: None,
        name: Some("notes.txt".to_owned()),
        encoding: AttachmentEncoding::RawText,
    };
    let encoded_id = upload_attachment(&proxy, &path, &encoded, None).await;
    let raw_id = upload_attachment(&proxy, &path, &raw, None).await;

    assert!(matches!(encoded_id, Ok(31)));
    assert!(matches!(raw_id, Ok(31)));
    let requests = fake.requests().await;
    assert_eq!(requests[1].0["params"]["args"][3], json!("ir.attachment"));
    assert_eq!(
        requests[1].0["params"]["args"][5],
        json!([{"name": "logo.txt", "datas": "aGVsbG8=", "res_model": "res.partner", "res_id": 7}])
    );
    assert_eq!(
        requests[2].0["params"]["args"][5],
        json!([{"name": "notes.txt", "datas": "hello", "res_model": "res.partner"}])
    );
}
