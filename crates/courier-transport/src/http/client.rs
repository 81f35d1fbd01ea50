//! Pooled HTTP transport backed by `reqwest`.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder, Method, Proxy, RequestBuilder, header};
use tokio::sync::Semaphore;
use tracing::{debug, info};

use courier_core::{
    HttpMethod, RequestData, RequestDescriptor, TimeoutOverrides, Timeouts, Transport,
    TransportError, TransportResponse, TransportResult, USER_AGENT,
};

use super::config::PooledTransportConfig;

/// Maps a `reqwest` failure onto the transport taxonomy.
///
/// Timeouts must be checked before anything else; every other failure is a
/// network error.
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::TimedOut
    } else {
        TransportError::Network(format!("reqwest error: {err}"))
    }
}

/// Awaits `fut`, failing with [`TransportError::TimedOut`] after `limit`.
async fn within<F: Future>(limit: Option<Duration>, fut: F) -> TransportResult<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| TransportError::TimedOut),
        None => Ok(fut.await),
    }
}

/// Time allowed between handing the request to the client and receiving the
/// response head: `read`, plus `write` when there is a body to upload.
/// Unbounded if a component is unbounded or the sum overflows.
fn response_deadline(timeouts: &Timeouts, has_body: bool) -> Option<Duration> {
    let read = timeouts.read?;
    if has_body {
        read.checked_add(timeouts.write?)
    } else {
        Some(read)
    }
}

/// Last path segment of `url`, the remote method name. Keeps bot tokens out
/// of the logs.
fn endpoint_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or_default()
}

fn stopped() -> TransportError {
    TransportError::network("transport has been stopped")
}

/// A [`Transport`] with a bounded pool of reusable connections.
///
/// At most `pool_size` requests are in flight at once; further requests wait
/// for a slot up to the pool-wait timeout. Idle keep-alive connections are
/// capped at the same size.
///
/// # Timeouts
///
/// Each call merges its [`TimeoutOverrides`] into the configured defaults,
/// producing a call-local [`Timeouts`]:
///
/// - `pool` bounds the wait for a free slot;
/// - `read` bounds the wait for the response head, extended by `write` when
///   the request carries a body;
/// - `read` bounds reading the response body.
///
/// `connect` is applied by the underlying client to every new connection and
/// always uses the configured default. A per-call `connect` override is
/// ignored.
///
/// # Example
///
/// ```rust,ignore
/// use courier_core::{Endpoint, RequestData, TimeoutOverrides, Transport};
/// use courier_transport::{PooledTransport, PooledTransportConfig};
///
/// let transport = PooledTransport::new(PooledTransportConfig::new().with_pool_size(4))?;
/// transport.initialize().await?;
///
/// let request = Endpoint::new(token)
///     .request("sendMessage")
///     .with_data(RequestData::new().param("chat_id", 42)?.param("text", "hi")?)
///     .with_timeouts(TimeoutOverrides::none().read(Duration::from_secs(2)));
/// let response = transport.do_request(request).await?;
///
/// transport.stop().await?;
/// ```
pub struct PooledTransport {
    config: PooledTransportConfig,
    /// `None` once stopped.
    client: RwLock<Option<Client>>,
    slots: Semaphore,
    initialized: AtomicBool,
}

impl PooledTransport {
    /// Creates a transport. Fails with [`TransportError::InvalidConfig`] if the
    /// configuration is invalid or the client cannot be built.
    pub fn new(config: PooledTransportConfig) -> TransportResult<Self> {
        config.validate()?;
        let client = Self::build_client(&config)?;

        Ok(Self {
            slots: Semaphore::new(config.pool_size),
            client: RwLock::new(Some(client)),
            initialized: AtomicBool::new(false),
            config,
        })
    }

    fn build_client(config: &PooledTransportConfig) -> TransportResult<Client> {
        let mut builder = ClientBuilder::new().pool_max_idle_per_host(config.pool_size);
        if let Some(connect) = config.timeouts.connect {
            builder = builder.connect_timeout(connect);
        }

        if let Some(url) = &config.proxy_url {
            let proxy = Proxy::all(url.as_str()).map_err(|e| {
                TransportError::InvalidConfig(format!("invalid proxy url '{url}': {e}"))
            })?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| TransportError::InvalidConfig(format!("failed to build client: {e}")))
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PooledTransportConfig {
        &self.config
    }

    /// Returns the timeouts a call with `overrides` would use.
    pub fn effective_timeouts(&self, overrides: &TimeoutOverrides) -> Timeouts {
        self.config.timeouts.merge(overrides)
    }

    /// Returns `true` until [`stop`](Transport::stop) has run.
    pub fn is_running(&self) -> bool {
        self.client.read().is_some()
    }

    fn client(&self) -> TransportResult<Client> {
        self.client.read().clone().ok_or_else(stopped)
    }

    fn build_request(
        client: &Client,
        request: &RequestDescriptor,
    ) -> TransportResult<RequestBuilder> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };
        let mut builder = client
            .request(method, &request.url)
            .header(header::USER_AGENT, USER_AGENT);

        match &request.data {
            Some(data) if data.has_files() => {
                builder = builder.multipart(Self::multipart_form(data)?);
            }
            Some(data) if !data.fields().is_empty() => {
                builder = builder.form(data.fields());
            }
            _ => {}
        }

        Ok(builder)
    }

    fn multipart_form(data: &RequestData) -> TransportResult<Form> {
        let mut form = Form::new();
        for (name, value) in data.fields() {
            form = form.text(name.clone(), value.clone());
        }
        for file in data.files() {
            let mut part = Part::bytes(file.content.clone()).file_name(file.file_name.clone());
            if let Some(mime) = &file.mime_type {
                part = part.mime_str(mime).map_err(|e| {
                    TransportError::InvalidRequest(format!("invalid mime type '{mime}': {e}"))
                })?;
            }
            form = form.part(file.field_name.clone(), part);
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for PooledTransport {
    fn connection_pool_size(&self) -> usize {
        self.config.pool_size
    }

    async fn initialize(&self) -> TransportResult<()> {
        if !self.is_running() {
            return Err(stopped());
        }
        if !self.initialized.swap(true, Ordering::SeqCst) {
            info!(
                pool_size = self.config.pool_size,
                proxy = self.config.proxy_url.is_some(),
                "Pooled transport initialized"
            );
        }
        Ok(())
    }

    async fn stop(&self) -> TransportResult<()> {
        // Wakes every request still queued for a slot.
        self.slots.close();
        if self.client.write().take().is_some() {
            info!("Pooled transport stopped");
        }
        Ok(())
    }

    async fn do_request(&self, request: RequestDescriptor) -> TransportResult<TransportResponse> {
        let client = self.client()?;
        let timeouts = self.effective_timeouts(&request.timeouts);
        let endpoint = endpoint_name(&request.url);

        let _slot = within(timeouts.pool, self.slots.acquire())
            .await?
            .map_err(|_| stopped())?;

        debug!(method = %request.method, endpoint, ?timeouts, "Sending request");

        let has_body = request.data.as_ref().is_some_and(|data| !data.is_empty());
        let response = within(
            response_deadline(&timeouts, has_body),
            Self::build_request(&client, &request)?.send(),
        )
        .await?
        .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = within(timeouts.read, response.bytes())
            .await?
            .map_err(map_reqwest_error)?;

        debug!(endpoint, status, len = body.len(), "Request completed");
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}

impl std::fmt::Debug for PooledTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledTransport")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("available_slots", &self.slots.available_permits())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use courier_core::InputFile;
    use serde_json::{Value, json};

    const SLOW: Duration = Duration::from_millis(500);
    const SHORT: Duration = Duration::from_millis(50);

    async fn echo(headers: HeaderMap, body: Bytes) -> axum::Json<Value> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        axum::Json(json!({
            "user_agent": header("user-agent"),
            "content_type": header("content-type"),
            "body": String::from_utf8_lossy(&body),
        }))
    }

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/echo", post(echo))
            .route("/bad", post(|| async { (StatusCode::BAD_REQUEST, "nope") }))
            .route(
                "/slow",
                post(|| async {
                    tokio::time::sleep(SLOW).await;
                    "late"
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn short_timeouts() -> TimeoutOverrides {
        TimeoutOverrides::none()
            .connect(SHORT)
            .read(SHORT)
            .write(SHORT)
    }

    fn transport(pool_size: usize) -> PooledTransport {
        PooledTransport::new(PooledTransportConfig::new().with_pool_size(pool_size)).unwrap()
    }

    #[test]
    fn test_response_deadline_composition() {
        let mut t = Timeouts::default();
        t.read = Some(Duration::from_secs(2));
        assert_eq!(response_deadline(&t, false), Some(Duration::from_secs(2)));
        assert_eq!(response_deadline(&t, true), Some(Duration::from_secs(7)));

        t.write = None;
        assert_eq!(response_deadline(&t, false), Some(Duration::from_secs(2)));
        assert_eq!(response_deadline(&t, true), None);

        assert_eq!(response_deadline(&Timeouts::UNBOUNDED, false), None);
    }

    #[test]
    fn test_response_deadline_overflow_is_unbounded() {
        let t = Timeouts {
            connect: Some(Duration::MAX),
            read: Some(Duration::MAX),
            write: Some(Duration::MAX),
            pool: Some(Duration::MAX),
        };
        assert_eq!(response_deadline(&t, false), Some(Duration::MAX));
        assert_eq!(response_deadline(&t, true), None);
    }

    #[tokio::test]
    async fn test_reqwest_timeout_maps_to_timed_out() {
        let base = spawn_server().await;
        let client = Client::builder()
            .timeout(Duration::from_millis(10))
            .build()
            .unwrap();

        let err = client.post(format!("{base}/slow")).send().await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(map_reqwest_error(err), TransportError::TimedOut);
    }

    #[tokio::test]
    async fn test_reqwest_connect_failure_maps_to_network() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = Client::new()
            .post(format!("http://{addr}/echo"))
            .send()
            .await
            .unwrap_err();
        assert!(!err.is_timeout());
        assert!(matches!(map_reqwest_error(err), TransportError::Network(_)));
    }

    #[test]
    fn test_endpoint_name_hides_token() {
        assert_eq!(
            endpoint_name("https://api.telegram.org/bot123:secret/sendMessage"),
            "sendMessage"
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = PooledTransport::new(PooledTransportConfig::new().with_pool_size(0)).unwrap_err();
        assert!(matches!(err, TransportError::InvalidConfig(_)));
    }

    #[test]
    fn test_effective_timeouts_do_not_leak() {
        let transport = transport(1);
        let overridden =
            transport.effective_timeouts(&TimeoutOverrides::none().read(Duration::from_secs(2)));

        assert_eq!(overridden.read, Some(Duration::from_secs(2)));
        assert_eq!(overridden.connect, Some(Duration::from_secs(5)));
        assert_eq!(overridden.write, Some(Duration::from_secs(5)));
        assert_eq!(overridden.pool, Some(Duration::from_secs(1)));
        assert_eq!(
            transport.effective_timeouts(&TimeoutOverrides::none()),
            Timeouts::default()
        );
    }

    #[tokio::test]
    async fn test_returns_status_and_body() {
        let base = spawn_server().await;
        let transport = transport(1);
        transport.initialize().await.unwrap();

        let resp = transport
            .do_request(RequestDescriptor::post(format!("{base}/bad")))
            .await
            .unwrap();
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body, b"nope");
    }

    #[tokio::test]
    async fn test_form_fields_and_user_agent() {
        let base = spawn_server().await;
        let transport = transport(1);
        let data = RequestData::new()
            .param("chat_id", 42)
            .unwrap()
            .param("text", "hi")
            .unwrap();

        let resp = transport
            .do_request(RequestDescriptor::post(format!("{base}/echo")).with_data(data))
            .await
            .unwrap();
        let echoed: Value = resp.json().unwrap();

        assert_eq!(echoed["user_agent"], json!(USER_AGENT));
        assert_eq!(
            echoed["content_type"],
            json!("application/x-www-form-urlencoded")
        );
        assert_eq!(echoed["body"], json!("chat_id=42&text=hi"));
    }

    #[tokio::test]
    async fn test_files_sent_as_multipart() {
        let base = spawn_server().await;
        let transport = transport(1);
        let data = RequestData::new()
            .param("chat_id", 7)
            .unwrap()
            .file(
                InputFile::new("document", "notes.txt", b"file body".to_vec())
                    .with_mime_type("text/plain"),
            );

        let resp = transport
            .do_request(RequestDescriptor::post(format!("{base}/echo")).with_data(data))
            .await
            .unwrap();
        let echoed: Value = resp.json().unwrap();

        let content_type = echoed["content_type"].as_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data"));
        let body = echoed["body"].as_str().unwrap();
        assert!(body.contains(r#"name="chat_id""#));
        assert!(body.contains(r#"filename="notes.txt""#));
        assert!(body.contains("file body"));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timed_out() {
        let base = spawn_server().await;
        let transport = transport(1);

        let err = transport
            .do_request(
                RequestDescriptor::post(format!("{base}/slow")).with_timeouts(short_timeouts()),
            )
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::TimedOut);
    }

    #[tokio::test]
    async fn test_read_override_alone_times_out() {
        let base = spawn_server().await;
        let transport = transport(1);

        let started = tokio::time::Instant::now();
        let err = transport
            .do_request(
                RequestDescriptor::post(format!("{base}/slow"))
                    .with_timeouts(TimeoutOverrides::none().read(Duration::from_millis(200))),
            )
            .await
            .unwrap_err();

        assert_eq!(err, TransportError::TimedOut);
        assert!(started.elapsed() < SLOW);
    }

    #[tokio::test]
    async fn test_read_override_with_body_allows_write_time() {
        let base = spawn_server().await;
        let transport = transport(1);
        let data = RequestData::new().param("chat_id", 1).unwrap();

        let err = transport
            .do_request(
                RequestDescriptor::post(format!("{base}/slow"))
                    .with_data(data.clone())
                    .with_timeouts(TimeoutOverrides::none().read(SHORT).write(SHORT)),
            )
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::TimedOut);

        let resp = transport
            .do_request(
                RequestDescriptor::post(format!("{base}/slow"))
                    .with_data(data)
                    .with_timeouts(TimeoutOverrides::none().read(SHORT)),
            )
            .await
            .unwrap();
        assert_eq!(resp.body, b"late");
    }

    #[tokio::test]
    async fn test_huge_timeouts_do_not_panic() {
        let base = spawn_server().await;
        let transport = transport(1);

        let resp = transport
            .do_request(
                RequestDescriptor::post(format!("{base}/echo"))
                    .with_data(RequestData::new().param("k", "v").unwrap())
                    .with_timeouts(
                        TimeoutOverrides::none()
                            .connect(Duration::MAX)
                            .read(Duration::MAX)
                            .write(Duration::MAX),
                    ),
            )
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
    }

    #[test]
    fn test_invalid_mime_type_is_invalid_request() {
        let data = RequestData::new()
            .file(InputFile::new("document", "a.bin", vec![0_u8]).with_mime_type("not a mime"));
        let err = PooledTransport::multipart_form(&data).unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_network() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = transport(1)
            .do_request(RequestDescriptor::post(format!("http://{addr}/echo")))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }

    #[tokio::test]
    async fn test_pool_wait_times_out() {
        let base = spawn_server().await;
        let transport = Arc::new(transport(1));

        let holder = {
            let transport = Arc::clone(&transport);
            let url = format!("{base}/slow");
            tokio::spawn(async move { transport.do_request(RequestDescriptor::post(url)).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        let err = transport
            .do_request(
                RequestDescriptor::post(format!("{base}/echo"))
                    .with_timeouts(TimeoutOverrides::none().pool(SHORT)),
            )
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::TimedOut);

        assert_eq!(holder.await.unwrap().unwrap().body, b"late");
    }

    #[tokio::test]
    async fn test_concurrent_overrides_do_not_interfere() {
        let base = spawn_server().await;
        let transport = Arc::new(transport(2));

        let hurried = transport.do_request(
            RequestDescriptor::post(format!("{base}/slow")).with_timeouts(short_timeouts()),
        );
        let patient = transport.do_request(RequestDescriptor::post(format!("{base}/slow")));
        let (hurried, patient) = tokio::join!(hurried, patient);

        assert_eq!(hurried.unwrap_err(), TransportError::TimedOut);
        assert_eq!(patient.unwrap().status, 200);
        assert_eq!(transport.config().timeouts, Timeouts::default());
    }

    #[tokio::test]
    async fn test_requests_fail_after_stop() {
        let base = spawn_server().await;
        let transport = transport(1);
        transport.initialize().await.unwrap();
        transport.initialize().await.unwrap();
        transport.stop().await.unwrap();

        let err = transport
            .do_request(RequestDescriptor::post(format!("{base}/echo")))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
        assert!(transport.initialize().await.is_err());
        assert!(transport.stop().await.is_ok());
    }
}
