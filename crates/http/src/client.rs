//! HTTP object store client
//!
//! Wraps reqwest and implements the ObjectStore trait from mantle-core.
//! Every request carries a `date` header and a signature over it produced by
//! the configured [`Signer`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, DATE, HeaderMap, HeaderName, HeaderValue, LOCATION};
use reqwest::{Client, Method, Response, StatusCode};

use mantle_core::object::{
    DIRECTORY_CONTENT_TYPE, LINK_CONTENT_TYPE, is_directory_content_type,
};
use mantle_core::{
    ClientConfig, DirectoryEntry, DirectoryOptions, Error, LinkOptions, Object, ObjectBody,
    ObjectData, ObjectHeaders, ObjectKind, ObjectPath, ObjectStore, PutOptions, Result, Signer,
    StoredObject, authorization_header,
};

/// Content type recorded when a write does not specify one
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Object store client over HTTP(S)
pub struct HttpObjectStore {
    http: Client,
    config: ClientConfig,
    signer: Arc<dyn Signer>,
}

impl HttpObjectStore {
    /// Create a client from a configuration and a request signer
    pub fn new(config: ClientConfig, signer: Arc<dyn Signer>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("mantle/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.insecure);

        if let Some(timeout) = &config.timeout {
            builder = builder
                .connect_timeout(Duration::from_millis(timeout.connect_ms))
                .read_timeout(Duration::from_millis(timeout.read_ms));
        }

        let http = builder
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            signer,
        })
    }

    /// The configuration this client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the full URL for a path, percent-encoding each segment
    fn object_url(&self, path: &ObjectPath) -> String {
        format!("{}{}", self.config.url, path.encoded())
    }

    /// Build the `date` and `authorization` headers for one request
    fn auth_headers(&self) -> Result<HeaderMap> {
        let date = jiff::fmt::rfc2822::DateTimePrinter::new()
            .timestamp_to_rfc9110_string(&jiff::Timestamp::now())
            .map_err(|e| Error::Auth(format!("Failed to format request date: {e}")))?;

        let authorization =
            authorization_header(&self.config.signing_key_id(), self.signer.as_ref(), &date)?;

        let mut headers = HeaderMap::new();
        headers.insert(DATE, date.parse().unwrap());
        headers.insert(
            AUTHORIZATION,
            authorization
                .parse()
                .map_err(|e| Error::Auth(format!("Invalid authorization header: {e}")))?,
        );
        Ok(headers)
    }

    /// Convert a metadata bag into request headers
    fn header_map(headers: &ObjectHeaders) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        for (name, value) in headers.iter() {
            let header_name = HeaderName::try_from(name)
                .map_err(|e| Error::InvalidHeader(format!("{name}: {e}")))?;
            let header_value = HeaderValue::try_from(value)
                .map_err(|e| Error::InvalidHeader(format!("{name}: {e}")))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    /// Issue a signed request
    async fn request(
        &self,
        method: Method,
        path: &ObjectPath,
        extra: HeaderMap,
        body: Option<reqwest::Body>,
    ) -> Result<Response> {
        let url = self.object_url(path);
        tracing::debug!(%method, %path, "store request");

        let mut builder = self.http.request(method, &url).headers(self.auth_headers()?);
        if !extra.is_empty() {
            builder = builder.headers(extra);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {e}")))
    }

    /// Map a non-success response to an error; `path` names the entry a 404
    /// refers to
    async fn check(response: Response, path: &ObjectPath) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(path.to_string()));
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(Error::from_status(status.as_u16(), body))
    }

    /// Build a descriptor from response headers, passing metadata through
    /// verbatim
    fn descriptor(path: &ObjectPath, response_headers: &HeaderMap) -> StoredObject {
        let mut headers = ObjectHeaders::new();
        for (name, value) in response_headers {
            match value.to_str() {
                Ok(v) => headers.insert(name.as_str(), v),
                Err(_) => {
                    tracing::warn!(header = %name, "skipping undecodable response header value");
                }
            }
        }

        let kind = match headers.content_type() {
            Some(ct) if is_directory_content_type(ct) => ObjectKind::Directory,
            _ => ObjectKind::Object,
        };

        StoredObject::new(path.clone(), kind, headers)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, path: &ObjectPath, data: ObjectData, options: PutOptions) -> Result<()> {
        let mut extra = Self::header_map(&options.effective_headers()?)?;
        if !extra.contains_key(CONTENT_TYPE) {
            extra.insert(CONTENT_TYPE, DEFAULT_CONTENT_TYPE.parse().unwrap());
        }

        let body = match data {
            ObjectData::Bytes(bytes) => reqwest::Body::from(bytes),
            ObjectData::Stream(stream) => reqwest::Body::wrap_stream(stream),
        };

        let response = self.request(Method::PUT, path, extra, Some(body)).await?;
        Self::check(response, path).await?;
        Ok(())
    }

    async fn get(&self, path: &ObjectPath) -> Result<Object> {
        let response = self.request(Method::GET, path, HeaderMap::new(), None).await?;
        let response = Self::check(response, path).await?;

        let info = Self::descriptor(path, response.headers());
        let body = ObjectBody::from_stream(
            response
                .bytes_stream()
                .map_err(|e| Error::Network(format!("Failed reading object stream: {e}"))),
        );

        Ok(Object { info, body })
    }

    async fn head(&self, path: &ObjectPath) -> Result<StoredObject> {
        let response = self.request(Method::HEAD, path, HeaderMap::new(), None).await?;
        let response = Self::check(response, path).await?;
        Ok(Self::descriptor(path, response.headers()))
    }

    async fn delete(&self, path: &ObjectPath) -> Result<()> {
        let response = self.request(Method::DELETE, path, HeaderMap::new(), None).await?;
        Self::check(response, path).await?;
        Ok(())
    }

    async fn delete_recursive(&self, path: &ObjectPath) -> Result<()> {
        let info = self.head(path).await?;

        if info.is_directory() {
            for child in self.list_objects(path).await? {
                match self.delete_recursive(&child.path).await {
                    // Removed concurrently between listing and deletion
                    Err(e) if e.is_not_found() => {}
                    other => other?,
                }
            }
        }

        self.delete(path).await
    }

    async fn put_directory(&self, path: &ObjectPath, options: DirectoryOptions) -> Result<()> {
        let mut extra = Self::header_map(&options.headers)?;
        extra.insert(CONTENT_TYPE, DIRECTORY_CONTENT_TYPE.parse().unwrap());

        let response = self.request(Method::PUT, path, extra, None).await?;
        Self::check(response, path).await?;
        Ok(())
    }

    async fn put_snap_link(
        &self,
        link_path: &ObjectPath,
        target_path: &ObjectPath,
        options: LinkOptions,
    ) -> Result<()> {
        let mut extra = Self::header_map(&options.headers)?;
        extra.insert(CONTENT_TYPE, LINK_CONTENT_TYPE.parse().unwrap());
        extra.insert(
            LOCATION,
            HeaderValue::try_from(target_path.encoded())
                .map_err(|e| Error::InvalidHeader(format!("link target: {e}")))?,
        );

        let response = self.request(Method::PUT, link_path, extra, None).await?;
        // A 404 here means the link target does not exist
        Self::check(response, target_path).await?;
        Ok(())
    }

    async fn list_objects(&self, path: &ObjectPath) -> Result<Vec<StoredObject>> {
        let response = self.request(Method::GET, path, HeaderMap::new(), None).await?;
        let response = Self::check(response, path).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !is_directory_content_type(content_type) {
            return Err(Error::ObjectType(path.to_string()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed reading listing stream: {e}")))?;

        let mut children = Vec::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let entry: DirectoryEntry = serde_json::from_str(line)?;
            children.push(entry.into_object(path)?);
        }
        Ok(children)
    }
}
