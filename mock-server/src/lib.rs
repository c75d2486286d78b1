use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const CLIENT_ID: &str = "mock-client-id";
pub const CLIENT_SECRET: &str = "mock-client-secret";

/// The `{status, msg, data, data2}` wrapper every endpoint answers with.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub status: String,
    pub msg: String,
    pub data: Value,
    pub data2: Value,
}

impl Envelope {
    pub fn ok(data: Value, data2: Value) -> Self {
        Self {
            status: "ok".to_string(),
            msg: String::new(),
            data,
            data2,
        }
    }

    pub fn affected(affected: bool) -> Self {
        let data = if affected { "Affected" } else { "Unaffected" };
        Self::ok(Value::String(data.to_string()), Value::Null)
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            msg: msg.into(),
            data: Value::Null,
            data2: Value::Null,
        }
    }
}

type Reply = (StatusCode, Json<Envelope>);

fn reply(envelope: Envelope) -> Reply {
    (StatusCode::OK, Json(envelope))
}

/// Resources by kind, then by `owner/name`. Uploaded files are recorded as
/// kind `resource`, named by their full path.
#[derive(Default)]
pub struct Store {
    resources: HashMap<String, BTreeMap<String, Value>>,
}

#[derive(Clone)]
pub struct AppState {
    db: Arc<RwLock<Store>>,
    authorization: Arc<str>,
}

pub fn app() -> Router {
    app_with_credentials(CLIENT_ID, CLIENT_SECRET)
}

/// Router that only accepts Basic credentials `client_id:client_secret`.
pub fn app_with_credentials(client_id: &str, client_secret: &str) -> Router {
    let encoded = STANDARD.encode(format!("{client_id}:{client_secret}"));
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        authorization: format!("Basic {encoded}").into(),
    };
    Router::new()
        .route("/set-password", post(set_password))
        .route("/upload-resource", post(upload_resource))
        .route("/{action}", get(read).post(write))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_basic_auth))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_basic_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if presented != Some(&*state.authorization) {
        debug!(uri = %request.uri(), "rejected credentials");
        return (
            StatusCode::UNAUTHORIZED,
            Json(Envelope::error("Unauthorized operation")),
        )
            .into_response();
    }
    next.run(request).await
}

fn key_of(resource: &Value) -> Option<String> {
    let owner = resource.get("owner")?.as_str()?;
    let name = resource.get("name")?.as_str()?;
    Some(format!("{owner}/{name}"))
}

async fn read(
    State(state): State<AppState>,
    Path(action): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let Some(noun) = action.strip_prefix("get-") else {
        return reply(Envelope::error(format!("unknown action: {action}")));
    };
    let db = state.db.read().await;

    if let Some(id) = params.get("id") {
        let found = db
            .resources
            .get(noun)
            .and_then(|records| records.get(id))
            .cloned()
            .unwrap_or(Value::Null);
        return reply(Envelope::ok(found, Value::Null));
    }

    // `get-global-<kind>s` lists across owners; `get-<kind>s` needs an owner.
    let (kind, owner) = match noun.strip_prefix("global-") {
        Some(global) => (global.strip_suffix('s'), None),
        None => match params.get("owner") {
            Some(owner) => (noun.strip_suffix('s'), Some(owner.as_str())),
            None => return reply(Envelope::error("missing id or owner")),
        },
    };
    let Some(kind) = kind else {
        return reply(Envelope::error(format!("unknown action: {action}")));
    };
    let matching: Vec<Value> = db
        .resources
        .get(kind)
        .map(|records| {
            records
                .values()
                .filter(|r| owner.is_none() || r.get("owner").and_then(Value::as_str) == owner)
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    let paging = (
        params.get("p").and_then(|p| p.parse::<usize>().ok()),
        params.get("pageSize").and_then(|s| s.parse::<usize>().ok()),
    );
    match paging {
        (Some(page), Some(size)) if page > 0 && size > 0 => {
            let total = matching.len();
            let items: Vec<Value> = matching.into_iter().skip((page - 1) * size).take(size).collect();
            reply(Envelope::ok(Value::Array(items), Value::from(total)))
        }
        _ => reply(Envelope::ok(Value::Array(matching), Value::Null)),
    }
}

async fn write(
    State(state): State<AppState>,
    Path(action): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Reply {
    let Some((verb, kind)) = action.split_once('-') else {
        return reply(Envelope::error(format!("unknown action: {action}")));
    };
    let Ok(resource) = serde_json::from_slice::<Value>(&body) else {
        return reply(Envelope::error("invalid request body"));
    };
    let Some(key) = key_of(&resource) else {
        return reply(Envelope::error("owner and name are required"));
    };
    debug!(verb, kind, key = %key, "write");

    let mut db = state.db.write().await;
    let records = db.resources.entry(kind.to_string()).or_default();
    match verb {
        "add" => {
            if records.contains_key(&key) {
                return reply(Envelope::error(format!("{kind} already exists: {key}")));
            }
            records.insert(key, resource);
            reply(Envelope::affected(true))
        }
        "update" => {
            let Some(id) = params.get("id") else {
                return reply(Envelope::error("missing id"));
            };
            let Some(existing) = records.remove(id) else {
                return reply(Envelope::affected(false));
            };
            let updated = match params.get("columns") {
                Some(columns) => merge_columns(existing, &resource, columns),
                None => resource,
            };
            let new_key = key_of(&updated).unwrap_or(key);
            records.insert(new_key, updated);
            reply(Envelope::affected(true))
        }
        "delete" => reply(Envelope::affected(records.remove(&key).is_some())),
        _ => reply(Envelope::error(format!("unknown action: {action}"))),
    }
}

/// Copy only the comma-separated `columns` of `incoming` onto `existing`.
fn merge_columns(mut existing: Value, incoming: &Value, columns: &str) -> Value {
    if let (Some(target), Some(source)) = (existing.as_object_mut(), incoming.as_object()) {
        for column in columns.split(',') {
            if let Some(value) = source.get(column) {
                target.insert(column.to_string(), value.clone());
            }
        }
    }
    existing
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetPasswordForm {
    user_owner: String,
    user_name: String,
    old_password: String,
    new_password: String,
}

async fn set_password(State(state): State<AppState>, Form(form): Form<SetPasswordForm>) -> Reply {
    let key = format!("{}/{}", form.user_owner, form.user_name);
    let mut db = state.db.write().await;
    let Some(user) = db.resources.get_mut("user").and_then(|users| users.get_mut(&key)) else {
        return reply(Envelope::error(format!("The user: {key} doesn't exist")));
    };
    let Some(fields) = user.as_object_mut() else {
        return reply(Envelope::error("corrupt user record"));
    };
    let current = fields.get("password").and_then(Value::as_str).unwrap_or("");
    if current != form.old_password {
        return reply(Envelope::error("The old password is wrong"));
    }
    fields.insert("password".to_string(), Value::String(form.new_password));
    reply(Envelope::ok(Value::Null, Value::Null))
}

async fn upload_resource(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    mut multipart: Multipart,
) -> Reply {
    let Some(path) = params.get("fullFilePath").cloned() else {
        return reply(Envelope::error("missing fullFilePath"));
    };
    let mut file = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => match field.bytes().await {
                Ok(bytes) => file = Some(bytes.to_vec()),
                Err(e) => return reply(Envelope::error(e.to_string())),
            },
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => return reply(Envelope::error(e.to_string())),
        }
    }
    let Some(file) = file else {
        return reply(Envelope::error("missing file part"));
    };

    let owner = params.get("owner").cloned().unwrap_or_default();
    let file_name = path.rsplit('/').next().unwrap_or(&path).to_string();
    let url = format!("http://mock-storage{path}");
    debug!(path = %path, bytes = file.len(), "upload");

    let record = serde_json::json!({
        "owner": owner,
        "name": path,
        "user": params.get("user"),
        "application": params.get("application"),
        "tag": params.get("tag"),
        "parent": params.get("parent"),
        "fileName": file_name,
        "fileSize": file.len(),
        "url": url,
    });
    state
        .db
        .write()
        .await
        .resources
        .entry("resource".to_string())
        .or_default()
        .insert(format!("{owner}/{path}"), record);
    reply(Envelope::ok(Value::String(url), Value::String(file_name)))
}
