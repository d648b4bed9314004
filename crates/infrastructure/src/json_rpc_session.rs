//! Authenticated Odoo session over the `/jsonrpc` endpoint.
//!
//! One HTTP round trip per call, no retry. Faults are classified into the
//! shared error taxonomy: transport and framing problems become
//! `AppError::Protocol`, rejected credentials become
//! `AppError::Authentication` and every other backend fault becomes
//! `AppError::RemoteFault` carrying the backend text.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use odoolink_application::{RemoteCall, RemoteTransport};
use odoolink_core::{AppError, AppResult};
use odoolink_domain::ApiVersion;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};
use url::Url;

const FATAL_MARKER: &str = "FATAL:";
const ALREADY_EXISTS_MARKER: &str = "already exists";

/// HTTP basic-auth pair for servers behind a protecting proxy.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpCredentials {
    /// Proxy user.
    pub user: String,
    /// Proxy password.
    pub password: String,
}

impl std::fmt::Debug for HttpCredentials {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parameters for creating the target database before authenticating.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseCreation {
    /// Server master password.
    pub master_password: String,
    /// Language installed with the database.
    pub lang: String,
    /// Country of the main company.
    pub country_code: String,
    /// Main company phone, may be empty.
    pub phone: String,
}

impl std::fmt::Debug for DatabaseCreation {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("DatabaseCreation")
            .field("master_password", &"<redacted>")
            .field("lang", &self.lang)
            .field("country_code", &self.country_code)
            .field("phone", &self.phone)
            .finish()
    }
}

/// Everything needed to open one session.
#[derive(Clone)]
pub struct OdooConnectionSettings {
    /// Server root, e.g. `https://erp.example.com`.
    pub url: Url,
    /// Database name.
    pub database: String,
    /// Login.
    pub user: String,
    /// Password or API key.
    pub password: String,
    /// Backend release hint.
    pub api_version: ApiVersion,
    /// Optional HTTP basic-auth pair.
    pub http_credentials: Option<HttpCredentials>,
    /// Skips TLS certificate verification.
    pub accept_invalid_certs: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Creates the database first when set.
    pub create_database: Option<DatabaseCreation>,
}

impl std::fmt::Debug for OdooConnectionSettings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("OdooConnectionSettings")
            .field("url", &self.url.as_str())
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("http_credentials", &self.http_credentials)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout", &self.timeout)
            .field("create_database", &self.create_database)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcFault>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcFault {
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<JsonRpcFaultData>,
}

#[derive(Debug, Default, Deserialize)]
struct JsonRpcFaultData {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    debug: Option<String>,
}

impl JsonRpcFault {
    /// Backend diagnostic text, preferring the detailed message.
    fn text(&self) -> &str {
        self.data
            .as_ref()
            .and_then(|data| data.message.as_deref())
            .filter(|message| !message.is_empty())
            .unwrap_or(self.message.as_str())
    }

    /// Text following the database driver `FATAL:` marker, if any.
    fn fatal_detail(&self) -> Option<String> {
        let debug = self.data.as_ref().and_then(|data| data.debug.as_deref());
        [Some(self.text()), debug]
            .into_iter()
            .flatten()
            .find_map(|text| {
                text.find(FATAL_MARKER)
                    .map(|start| text[start + FATAL_MARKER.len()..].trim().to_owned())
            })
    }
}

/// Raw JSON-RPC plumbing shared by the handshake and the session.
struct JsonRpcClient {
    http_client: reqwest::Client,
    endpoint: Url,
    http_credentials: Option<HttpCredentials>,
    next_request_id: AtomicU64,
}

impl JsonRpcClient {
    fn new(settings: &OdooConnectionSettings) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|error| AppError::Protocol(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http_client,
            endpoint: json_rpc_endpoint(&settings.url)?,
            http_credentials: settings.http_credentials.clone(),
            next_request_id: AtomicU64::new(1),
        })
    }

    /// Posts one call. The outer result carries transport failures, the
    /// inner one the backend fault.
    async fn call(
        &self,
        service: &str,
        method: &str,
        args: Vec<Value>,
    ) -> AppResult<Result<Value, JsonRpcFault>> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": {
                "service": service,
                "method": method,
                "args": args,
            },
            "id": request_id,
        });

        let mut builder = self.http_client.post(self.endpoint.clone()).json(&payload);
        if let Some(credentials) = &self.http_credentials {
            builder = builder.basic_auth(&credentials.user, Some(&credentials.password));
        }

        let response = builder.send().await.map_err(|error| {
            AppError::Protocol(format!("{} unreachable: {error}", self.endpoint))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Protocol(format!(
                "{} answered with HTTP status {status}",
                self.endpoint
            )));
        }

        let body: JsonRpcResponse = response.json().await.map_err(|error| {
            AppError::Protocol(format!(
                "{} returned an undecodable body: {error}",
                self.endpoint
            ))
        })?;

        Ok(match body.error {
            Some(fault) => Err(fault),
            None => Ok(body.result.unwrap_or(Value::Null)),
        })
    }
}

fn json_rpc_endpoint(base: &Url) -> AppResult<Url> {
    let root = base.as_str().trim_end_matches('/');
    Url::parse(&format!("{root}/jsonrpc"))
        .map_err(|error| AppError::Validation(format!("invalid Odoo url '{base}': {error}")))
}

/// Session authenticated against one database.
pub struct JsonRpcOdooSession {
    client: JsonRpcClient,
    database: String,
    password: String,
    uid: i64,
}

impl std::fmt::Debug for JsonRpcOdooSession {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("JsonRpcOdooSession")
            .field("endpoint", &self.client.endpoint.as_str())
            .field("database", &self.database)
            .field("uid", &self.uid)
            .finish_non_exhaustive()
    }
}

impl JsonRpcOdooSession {
    /// Optionally creates the database, then authenticates.
    pub async fn connect(settings: &OdooConnectionSettings) -> AppResult<Self> {
        let client = JsonRpcClient::new(settings)?;
        info!(
            url = %settings.url,
            database = %settings.database,
            user = %settings.user,
            "preparing Odoo connection"
        );

        if let Some(creation) = &settings.create_database {
            create_database(&client, settings, creation).await?;
        }

        let uid = authenticate(&client, settings)
            .await
            .inspect_err(|failure| error!(error = %failure, "Odoo connection failed"))?;
        debug!(uid, "Odoo connection established");

        Ok(Self {
            client,
            database: settings.database.clone(),
            password: settings.password.clone(),
            uid,
        })
    }

    /// Returns the authenticated user id.
    #[must_use]
    pub fn uid(&self) -> i64 {
        self.uid
    }
}

async fn authenticate(client: &JsonRpcClient, settings: &OdooConnectionSettings) -> AppResult<i64> {
    let answer = client
        .call(
            "common",
            "authenticate",
            vec![
                json!(settings.database),
                json!(settings.user),
                json!(settings.password),
                json!({}),
            ],
        )
        .await?;

    let value = answer.map_err(|fault| match fault.fatal_detail() {
        Some(detail) => AppError::Authentication(detail),
        None => AppError::RemoteFault(fault.text().to_owned()),
    })?;

    match value.as_i64() {
        Some(uid) if uid > 0 => Ok(uid),
        _ => Err(AppError::Authentication(format!(
            "connection error to {} {}. Check \"{}\" username and password.",
            settings.url, settings.database, settings.user
        ))),
    }
}

async fn create_database(
    client: &JsonRpcClient,
    settings: &OdooConnectionSettings,
    creation: &DatabaseCreation,
) -> AppResult<()> {
    let answer = client
        .call(
            "db",
            "create_database",
            vec![
                json!(creation.master_password),
                json!(settings.database),
                json!(false),
                json!(creation.lang),
                json!(settings.password),
                json!(settings.user),
                json!(creation.country_code),
                json!(creation.phone),
            ],
        )
        .await?;

    match answer {
        Ok(_) => {
            info!(database = %settings.database, "Odoo database created");
            Ok(())
        }
        Err(fault) if fault.text().contains(ALREADY_EXISTS_MARKER) => {
            warn!(database = %settings.database, "Odoo database already exists");
            Ok(())
        }
        Err(fault) => Err(AppError::RemoteFault(fault.text().to_owned())),
    }
}

#[async_trait]
impl RemoteTransport for JsonRpcOdooSession {
    async fn execute(&self, call: RemoteCall) -> AppResult<Value> {
        let args = vec![
            json!(self.database),
            json!(self.uid),
            json!(self.password),
            json!(call.entity_type.as_str()),
            json!(call.operation.as_str()),
            Value::Array(call.args),
            Value::Object(call.kwargs),
        ];

        self.client
            .call("object", "execute_kw", args)
            .await?
            .map_err(|fault| AppError::RemoteFault(fault.text().to_owned()))
    }
}

#[cfg(test)]
mod tests;
