//! HTTP routing with matchit.
//!
//! Provides a simple router for registering and dispatching HTTP handlers.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use hyper::Method;
use libsql::Connection;
use serde::de::DeserializeOwned;

use crate::Result;
use crate::config::Config;
use crate::response::HttpResponse;

/// Boxed future for async handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Handler context passed to route handlers.
pub struct Context {
    /// The HTTP method.
    pub method: Method,
    /// The request URI.
    pub uri: hyper::Uri,
    /// The request headers.
    pub headers: hyper::http::HeaderMap,
    /// Route parameters (e.g., {username} from path).
    pub params: HashMap<String, String>,
    /// The request body, pre-read as bytes.
    pub body: Bytes,
    /// Database handle.
    pub db: crate::db::Handle,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl Context {
    /// Parse the request body as an urlencoded HTML form.
    ///
    /// An empty body is an empty form whatever its declared type, so a bare
    /// POST reads as "every checkbox unchecked".
    pub fn form<T: DeserializeOwned>(&self) -> Result<T> {
        if !self.body.is_empty() && !self.content_type_is(FORM_URLENCODED) {
            return Err(crate::Error::UnsupportedMediaType {
                expected: FORM_URLENCODED.to_string(),
            });
        }
        serde_urlencoded::from_bytes(&self.body)
            .map_err(|e| crate::Error::BadRequest(format!("Invalid form body: {e}")))
    }

    /// Get a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Whether the media type of `Content-Type` (ignoring parameters) is `expected`.
    pub fn content_type_is(&self, expected: &str) -> bool {
        self.header("Content-Type")
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(expected))
    }

    /// Whether the client prefers a JSON body over an HTML page.
    pub fn wants_json(&self) -> bool {
        self.header("Accept")
            .is_some_and(|accept| accept.contains("application/json"))
    }

    /// Get a route parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    /// Get a required route parameter, returning BadRequest if missing.
    pub fn require_param(&self, name: &str) -> Result<&str> {
        self.param(name)
            .ok_or_else(|| crate::Error::BadRequest(format!("Missing parameter: {name}")))
    }

    /// Username carried by the request's token.
    /// Returns None if no valid token is present.
    pub fn username(&self) -> Option<String> {
        crate::auth::extract_username(&self.headers, &self.config.auth).ok()
    }

    /// Require an authenticated request, returning Unauthorized if not.
    pub fn require_username(&self) -> Result<String> {
        crate::auth::extract_username(&self.headers, &self.config.auth)
    }

    /// Open a database connection for this request.
    pub fn connection(&self) -> Result<Connection> {
        crate::db::connection(&self.db)
    }
}

/// Handler function type.
/// Takes a Context and returns a future resolving to a Response.
pub type Handler = Box<dyn Fn(Context) -> BoxFuture<'static, Result<HttpResponse>> + Send + Sync>;

/// A registered route with method-specific handlers.
struct RouteEntry {
    handlers: HashMap<Method, Handler>,
}

/// HTTP router for registering and dispatching requests.
pub struct Router {
    routes: matchit::Router<usize>,
    /// Registered patterns. Looked up verbatim so that a static pattern such
    /// as `/users/~update/` is never folded into `/users/{username}/`.
    patterns: HashMap<String, usize>,
    entries: Vec<RouteEntry>,
}

impl Router {
    /// Create a new router.
    pub fn new() -> Self {
        Self {
            routes: matchit::Router::new(),
            patterns: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Register a handler for a method and path.
    ///
    /// # Panics
    /// If `path` is not a valid pattern or conflicts with one already
    /// registered. Routes are fixed at startup, so this is a programming error.
    pub fn route<F, Fut>(&mut self, method: Method, path: &str, handler: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        let entry_idx = match self.patterns.get(path) {
            Some(idx) => *idx,
            None => {
                let idx = self.entries.len();
                if let Err(e) = self.routes.insert(path, idx) {
                    panic!("invalid route {path}: {e}");
                }
                self.entries.push(RouteEntry {
                    handlers: HashMap::new(),
                });
                self.patterns.insert(path.to_string(), idx);
                idx
            }
        };

        let boxed: Handler = Box::new(move |ctx| Box::pin(handler(ctx)));
        self.entries[entry_idx].handlers.insert(method, boxed);
    }

    /// Convenience method for GET requests.
    pub fn get<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.route(Method::GET, path, handler);
    }

    /// Convenience method for POST requests.
    pub fn post<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.route(Method::POST, path, handler);
    }

    /// Register a module's routes.
    pub fn mount(&mut self, module: &dyn crate::Module) {
        tracing::debug!(module = module.name(), "Mounting routes");
        module.routes(self);
    }

    /// Convert to a thread-safe handle for use in request handling.
    pub fn into_handle(self) -> Arc<RouterHandle> {
        Arc::new(RouterHandle {
            routes: self.routes,
            entries: self.entries,
        })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe router handle for use in request handling.
pub struct RouterHandle {
    routes: matchit::Router<usize>,
    entries: Vec<RouteEntry>,
}

/// Result of matching a request to a route.
pub enum RouteMatch<'a> {
    /// Route matched with handler.
    Matched {
        handler: &'a Handler,
        params: HashMap<String, String>,
    },
    /// Path matched but a parameter is not percent-encoded UTF-8.
    MalformedParam,
    /// Path matched but method not allowed.
    MethodNotAllowed,
    /// Path not found.
    NotFound,
}

impl RouterHandle {
    /// Match a request to a route.
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        match self.routes.at(path) {
            Ok(matched) => {
                let entry = &self.entries[*matched.value];

                let Some(handler) = entry.handlers.get(method) else {
                    return RouteMatch::MethodNotAllowed;
                };

                // Handlers see decoded values, e.g. `émile` for `%C3%A9mile`.
                let params: Option<HashMap<String, String>> = matched
                    .params
                    .iter()
                    .map(|(k, v)| Some((k.to_string(), urlencoding::decode(v).ok()?.into_owned())))
                    .collect();

                match params {
                    Some(params) => RouteMatch::Matched { handler, params },
                    None => RouteMatch::MalformedParam,
                }
            }
            Err(_) => RouteMatch::NotFound,
        }
    }
}
