//! Narrow request/response model over which the firewall operates.
//!
//! The surrounding HTTP server owns parsing and transport; it hands the
//! firewall a [`Request`] carrying the path, the header map and a typed
//! extension slot, and receives a [`Response`] with a status and body back.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::extensions::Params;

/// An inbound request as seen by the security layer.
pub struct Request {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    /// Request-scoped extension storage. Dropped together with the request.
    pub params: Params,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Request {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            params: Params::default(),
        }
    }

    /// Adds a header. Names are stored lowercased, matching how the server
    /// normalizes them on the wire.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// A response handed back to the server.
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    /// Builds a JSON response with the given status.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Response {
            status,
            content_type: "application/json",
            body: serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    /// Builds an empty response carrying only a status.
    pub fn status_only(status: u16) -> Self {
        Response {
            status,
            content_type: "text/plain",
            body: Vec::new(),
        }
    }
}

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// The downstream handler a firewall wraps.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<Response> + Send + Sync>;
