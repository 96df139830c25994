//! Untyped command boundary.
//!
//! Requests arrive as JSON from a front end that cannot be trusted to send
//! well-formed arguments. Every argument is checked here before the typed
//! service is called, so a malformed request never reaches the filesystem.
//!
//! Request: `{"op": "listEntries", "args": {"dir": "/vault"}}`
//! Response: `{"ok": true, "result": [...]}` or `{"ok": false, "error": "..."}`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{debug, warn};

use docvault_common::{Error, Result};

use crate::service::DocumentVault;

/// A boundary request.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub op: String,
    #[serde(default)]
    pub args: Value,
}

/// A boundary response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    fn success(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn failure(err: &Error) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(err.to_string()),
        }
    }
}

/// Result of a create operation as seen by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<PathBuf>> for CreateOutcome {
    fn from(result: Result<PathBuf>) -> Self {
        match result {
            Ok(path) => Self {
                success: true,
                path: Some(path),
                error: None,
            },
            Err(e) => Self {
                success: false,
                path: None,
                error: Some(reason(&e)),
            },
        }
    }
}

/// Human-readable failure reason without the category prefix.
fn reason(err: &Error) -> String {
    match err {
        Error::AlreadyExists(msg) | Error::InvalidInput(msg) => msg.clone(),
        Error::NotFound(what) => format!("{} not found", what),
        other => other.to_string(),
    }
}

/// Handle one JSON request line and produce one JSON response line.
pub async fn handle_json(vault: &DocumentVault, line: &str) -> String {
    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => dispatch(vault, request).await,
        Err(e) => {
            let err = Error::Serialization(e.to_string());
            warn!(error = %err, "Rejected malformed request");
            Response::failure(&err)
        }
    };

    serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(
            r#"{{"ok":false,"error":{}}}"#,
            Value::String(format!("Serialization error: {}", e))
        )
    })
}

/// Validate and execute a request.
pub async fn dispatch(vault: &DocumentVault, request: Request) -> Response {
    let op = request.op.clone();
    match execute(vault, request).await {
        Ok(result) => {
            debug!(op = %op, "Request handled");
            Response::success(result)
        }
        Err(err) => {
            if matches!(err, Error::InvalidInput(_)) {
                warn!(op = %op, error = %err, "Rejected malformed request");
            }
            Response::failure(&err)
        }
    }
}

async fn execute(vault: &DocumentVault, request: Request) -> Result<Value> {
    let args = Args::new(&request.args)?;

    match request.op.as_str() {
        "setRoot" => {
            let path = args.path("path")?;
            to_value(vault.set_root(path).await?)
        }
        "isSafe" => {
            let path = args.path("path")?;
            Ok(Value::Bool(vault.is_safe(path).await))
        }
        "listEntries" => {
            let dir = args.path("dir")?;
            to_value(vault.list_entries(dir).await)
        }
        "readDocument" => {
            let path = args.path("path")?;
            Ok(Value::String(vault.read_document(path).await?))
        }
        "writeDocument" => {
            let path = args.path("path")?;
            let content = args.text("content")?;
            vault.write_document(path, &content).await?;
            Ok(Value::Null)
        }
        "createFolder" => {
            let parent = args.path("parent")?;
            let name = args.string("name")?;
            to_value(CreateOutcome::from(vault.create_folder(parent, &name).await))
        }
        "createDocument" => {
            let parent = args.path("parent")?;
            let name = args.string("name")?;
            let content = args.optional_text("content")?;
            let result = vault
                .create_document(parent, &name, content.as_deref())
                .await;
            to_value(CreateOutcome::from(result))
        }
        "deleteFile" => {
            let path = args.path("path")?;
            Ok(Value::Bool(vault.delete_file(path).await))
        }
        "deleteFolder" => {
            let path = args.path("path")?;
            Ok(Value::Bool(vault.delete_folder(path).await))
        }
        "rename" => {
            let path = args.path("path")?;
            let new_name = args.string("newName")?;
            to_value(vault.rename(path, &new_name).await)
        }
        "listRecentDocuments" => {
            let root_dir = args.path("rootDir")?;
            let limit = args
                .optional_count("limit")?
                .unwrap_or(vault.config().recent_limit);
            let exclude = args
                .optional_bool("excludeDirectDescendants")?
                .unwrap_or(false);
            to_value(vault.list_recent_documents(root_dir, limit, exclude).await)
        }
        other => Err(Error::InvalidInput(format!("Unknown operation '{}'", other))),
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::Serialization(e.to_string()))
}

/// Typed accessors over a request's argument object.
struct Args<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> Args<'a> {
    fn new(value: &'a Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self { fields: None }),
            Value::Object(fields) => Ok(Self {
                fields: Some(fields),
            }),
            _ => Err(Error::InvalidInput("args must be an object".to_string())),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields
            .and_then(|fields| fields.get(key))
            .filter(|v| !v.is_null())
    }

    /// Required non-empty string.
    fn string(&self, key: &str) -> Result<String> {
        match self.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
            _ => Err(Error::InvalidInput(format!(
                "'{}' must be a non-empty string",
                key
            ))),
        }
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        self.string(key).map(PathBuf::from)
    }

    /// Required string, empty allowed.
    fn text(&self, key: &str) -> Result<String> {
        match self.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(Error::InvalidInput(format!("'{}' must be a string", key))),
        }
    }

    fn optional_text(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(Error::InvalidInput(format!("'{}' must be a string", key))),
        }
    }

    fn optional_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(Error::InvalidInput(format!("'{}' must be a boolean", key))),
        }
    }

    /// Optional non-negative integer.
    fn optional_count(&self, key: &str) -> Result<Option<usize>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| {
                    Error::InvalidInput(format!("'{}' must be a non-negative integer", key))
                }),
        }
    }
}
