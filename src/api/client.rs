use crate::api::resource::Resource;
use crate::error::ApiError;
use color_eyre::{eyre::eyre, Result};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

/// REST client for the employee backend.
///
/// One request per call: no retries, no pagination, default timeouts.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base_url: Url,
}

impl ApiClient {
  pub fn new(base_url: &str) -> Result<Self> {
    // Without a trailing slash, Url::join would replace the last path segment
    let normalized = if base_url.ends_with('/') {
      base_url.to_string()
    } else {
      format!("{}/", base_url)
    };
    let base_url =
      Url::parse(&normalized).map_err(|e| eyre!("Invalid API base URL {}: {}", base_url, e))?;

    let http = reqwest::Client::builder()
      .user_agent(concat!("staffdesk/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base_url })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  /// `GET /{collection}/`
  pub async fn list<R: Resource>(&self) -> Result<Vec<R>, ApiError> {
    let url = self.collection_url::<R>()?;
    self.send_json(self.http.request(Method::GET, url)).await
  }

  /// `GET /{collection}/{id}`
  pub async fn get<R: Resource>(&self, id: i64) -> Result<R, ApiError> {
    let url = self.record_url::<R>(id)?;
    self.send_json(self.http.request(Method::GET, url)).await
  }

  /// `POST /{collection}/`
  pub async fn create<R: Resource>(&self, draft: &R::Draft) -> Result<R, ApiError> {
    let url = self.collection_url::<R>()?;
    self
      .send_json(self.http.request(Method::POST, url).json(draft))
      .await
  }

  /// `PUT /{collection}/{id}` with only the fields being changed
  pub async fn update<R: Resource>(&self, id: i64, patch: &R::Patch) -> Result<R, ApiError> {
    let url = self.record_url::<R>(id)?;
    self
      .send_json(self.http.request(Method::PUT, url).json(patch))
      .await
  }

  /// `DELETE /{collection}/{id}`. Any response body is ignored.
  pub async fn delete<R: Resource>(&self, id: i64) -> Result<(), ApiError> {
    let url = self.record_url::<R>(id)?;
    self.send(self.http.request(Method::DELETE, url)).await?;
    Ok(())
  }

  fn collection_url<R: Resource>(&self) -> Result<Url, ApiError> {
    self.join(&format!("{}/", R::COLLECTION))
  }

  fn record_url<R: Resource>(&self, id: i64) -> Result<Url, ApiError> {
    self.join(&format!("{}/{}", R::COLLECTION, id))
  }

  fn join(&self, path: &str) -> Result<Url, ApiError> {
    self.base_url.join(path).map_err(|e| ApiError::Network {
      message: format!("invalid request url {}: {}", path, e),
    })
  }

  async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
    let bytes = self.send(request).await?;
    serde_json::from_slice(&bytes).map_err(ApiError::from)
  }

  /// Send a request and return the body of a 2xx response.
  async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
    let request = request.build()?;
    let method = request.method().clone();
    let path = request.url().path().to_string();
    debug!(%method, %path, "sending request");

    let response = self.http.execute(request).await.map_err(|e| {
      warn!(%method, %path, error = %e, "request could not be completed");
      ApiError::from(e)
    })?;

    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
      warn!(%method, %path, status = status.as_u16(), "request failed");
      return Err(ApiError::Request {
        status: status.as_u16(),
        body: String::from_utf8_lossy(&bytes).into_owned(),
      });
    }

    debug!(%method, %path, status = status.as_u16(), bytes = bytes.len(), "response received");
    Ok(bytes.to_vec())
  }
}
