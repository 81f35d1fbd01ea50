//! Request descriptors and timeout composition.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::foundation::{TransportError, TransportResult};

/// User agent attached to every outgoing request.
pub const USER_AGENT: &str = concat!("courier/", env!("CARGO_PKG_VERSION"));

/// Default base URL of the remote bot API.
pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org/bot";

// =============================================================================
// Timeouts
// =============================================================================

/// The four timeout dimensions of a request. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Establishing a connection.
    pub connect: Option<Duration>,
    /// Waiting for response data.
    pub read: Option<Duration>,
    /// Sending the request body.
    pub write: Option<Duration>,
    /// Waiting for a free pooled connection.
    pub pool: Option<Duration>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Some(Duration::from_secs(5)),
            read: Some(Duration::from_secs(5)),
            write: Some(Duration::from_secs(5)),
            pool: Some(Duration::from_secs(1)),
        }
    }
}

impl Timeouts {
    /// All dimensions unbounded.
    pub const UNBOUNDED: Self = Self {
        connect: None,
        read: None,
        write: None,
        pool: None,
    };

    /// Returns a fresh value where every dimension supplied in `overrides`
    /// replaces the corresponding one of `self`.
    pub fn merge(&self, overrides: &TimeoutOverrides) -> Timeouts {
        Timeouts {
            connect: overrides.connect.unwrap_or(self.connect),
            read: overrides.read.unwrap_or(self.read),
            write: overrides.write.unwrap_or(self.write),
            pool: overrides.pool.unwrap_or(self.pool),
        }
    }
}

/// Per-call timeout overrides.
///
/// The outer `Option` says whether a dimension is supplied; the inner one is
/// the value, where `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeoutOverrides {
    pub connect: Option<Option<Duration>>,
    pub read: Option<Option<Duration>>,
    pub write: Option<Option<Duration>>,
    pub pool: Option<Option<Duration>>,
}

impl TimeoutOverrides {
    /// No overrides.
    pub fn none() -> Self {
        Self::default()
    }

    /// Overrides the connect timeout.
    pub fn connect(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.connect = Some(timeout.into());
        self
    }

    /// Overrides the read timeout.
    pub fn read(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.read = Some(timeout.into());
        self
    }

    /// Overrides the write timeout.
    pub fn write(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.write = Some(timeout.into());
        self
    }

    /// Overrides the pool-wait timeout.
    pub fn pool(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.pool = Some(timeout.into());
        self
    }

    /// Returns `true` if no dimension is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// Request data
// =============================================================================

/// A file attached to a request, sent as a multipart part.
#[derive(Clone, PartialEq, Eq)]
pub struct InputFile {
    pub field_name: String,
    pub file_name: String,
    pub content: Vec<u8>,
    pub mime_type: Option<String>,
}

impl InputFile {
    /// Creates a file attachment.
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            content: content.into(),
            mime_type: None,
        }
    }

    /// Sets the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputFile")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .field("len", &self.content.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Parameters and attachments of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestData {
    fields: Vec<(String, String)>,
    files: Vec<InputFile>,
}

impl RequestData {
    /// Creates empty request data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    ///
    /// Strings are sent as-is; any other value is sent as compact JSON.
    /// Null values are skipped. Fails with [`TransportError::InvalidRequest`]
    /// if the value cannot be encoded.
    pub fn param(
        mut self,
        name: impl Into<String>,
        value: impl Serialize,
    ) -> TransportResult<Self> {
        let value = serde_json::to_value(value).map_err(|e| {
            TransportError::InvalidRequest(format!("failed to encode parameter: {e}"))
        })?;
        match value {
            Value::Null => {}
            Value::String(s) => self.fields.push((name.into(), s)),
            other => self.fields.push((name.into(), other.to_string())),
        }
        Ok(self)
    }

    /// Adds a file attachment.
    pub fn file(mut self, file: InputFile) -> Self {
        self.files.push(file);
        self
    }

    /// The encoded form fields, in insertion order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// The file attachments.
    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    /// Returns `true` if the request must be sent as multipart.
    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// Returns `true` if there is nothing to send.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }
}

// =============================================================================
// Descriptor and response
// =============================================================================

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// One HTTP call to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: String,
    pub data: Option<RequestData>,
    pub timeouts: TimeoutOverrides,
}

impl RequestDescriptor {
    /// Creates a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            data: None,
            timeouts: TimeoutOverrides::default(),
        }
    }

    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            ..Self::post(url)
        }
    }

    /// Sets the payload.
    pub fn with_data(mut self, data: RequestData) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets per-call timeout overrides.
    pub fn with_timeouts(mut self, timeouts: TimeoutOverrides) -> Self {
        self.timeouts = timeouts;
        self
    }
}

/// Status code and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

// =============================================================================
// Endpoint
// =============================================================================

/// Maps remote method names to endpoint URLs.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    token: String,
}

impl Endpoint {
    /// Creates an endpoint on the default base URL.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    /// Creates an endpoint on a custom base URL, e.g. a local API server.
    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Returns the URL for `method`.
    pub fn url_for(&self, method: &str) -> String {
        format!("{}{}/{}", self.base_url, self.token, method)
    }

    /// Builds a POST descriptor for `method`.
    pub fn request(&self, method: &str) -> RequestDescriptor {
        RequestDescriptor::post(self.url_for(method))
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_merge_only_supplied_dimensions() {
        let defaults = Timeouts::default();
        let merged = defaults.merge(&TimeoutOverrides::none().read(Duration::from_secs(2)));

        assert_eq!(merged.read, Some(Duration::from_secs(2)));
        assert_eq!(merged.connect, defaults.connect);
        assert_eq!(merged.write, defaults.write);
        assert_eq!(merged.pool, defaults.pool);
        assert_eq!(defaults, Timeouts::default());
    }

    #[test]
    fn test_merge_can_unbound() {
        let merged = Timeouts::default().merge(&TimeoutOverrides::none().pool(None));
        assert_eq!(merged.pool, None);
        assert_eq!(merged.connect, Some(Duration::from_secs(5)));

        let bounded =
            Timeouts::UNBOUNDED.merge(&TimeoutOverrides::none().read(Duration::from_secs(2)));
        assert_eq!(bounded.read, Some(Duration::from_secs(2)));
        assert_eq!(bounded.connect, None);
        assert_eq!(bounded.write, None);
        assert_eq!(bounded.pool, None);
    }

    #[test]
    fn test_empty_overrides_keep_defaults() {
        let defaults = Timeouts::default();
        assert!(TimeoutOverrides::none().is_empty());
        assert_eq!(defaults.merge(&TimeoutOverrides::none()), defaults);
    }

    #[test]
    fn test_param_encoding() {
        let data = RequestData::new()
            .param("chat_id", 42)
            .unwrap()
            .param("text", "hi there")
            .unwrap()
            .param("reply_markup", json!({"inline_keyboard": []}))
            .unwrap()
            .param("disable_notification", true)
            .unwrap()
            .param("thread", None::<i64>)
            .unwrap();

        assert_eq!(
            data.fields(),
            &[
                ("chat_id".to_string(), "42".to_string()),
                ("text".to_string(), "hi there".to_string()),
                ("reply_markup".to_string(), r#"{"inline_keyboard":[]}"#.to_string()),
                ("disable_notification".to_string(), "true".to_string()),
            ]
        );
        assert!(!data.has_files());
    }

    #[test]
    fn test_param_encoding_failure_is_invalid_request() {
        let tuple_keys = BTreeMap::from([((1, 2), "pair")]);
        let err = RequestData::new().param("bad", tuple_keys).unwrap_err();

        assert!(matches!(err, TransportError::InvalidRequest(_)));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_endpoint_url() {
        let endpoint = Endpoint::new("123:abc");
        assert_eq!(
            endpoint.url_for("getMe"),
            "https://api.telegram.org/bot123:abc/getMe"
        );
        assert!(!format!("{endpoint:?}").contains("abc"));

        let req = endpoint.request("sendMessage");
        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.timeouts.is_empty());
    }

    #[test]
    fn test_response_helpers() {
        let resp = TransportResponse::new(200, br#"{"ok":true}"#.to_vec());
        assert!(resp.is_success());
        assert_eq!(resp.json::<serde_json::Value>().unwrap()["ok"], json!(true));
        assert!(!TransportResponse::new(429, Vec::new()).is_success());
    }
}
