use std::sync::{Arc, RwLock};

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{multipart, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use study_logging::{study_debug, study_warn};
use url::Url;

use crate::{ApiError, DownloadedFile, EngineSettings, FailureKind};

/// Called once for every `401` response, after the token has been dropped.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Explicit HTTP client for the study API.
///
/// Constructed once per process. It carries the bearer token as plain state
/// and reports expired sessions through the hook given at construction.
pub struct ApiClient {
    http: reqwest::Client,
    settings: EngineSettings,
    token: RwLock<Option<String>>,
    on_unauthorized: UnauthorizedHook,
}

impl ApiClient {
    pub fn new(
        settings: EngineSettings,
        token: Option<String>,
        on_unauthorized: UnauthorizedHook,
    ) -> Result<Self, ApiError> {
        Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            http,
            settings,
            token: RwLock::new(token),
            on_unauthorized,
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!("{}{}", self.settings.base_url.trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send once; no retry. Non-2xx statuses become errors.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        study_debug!("{} -> {}", response.url().path(), status);
        if status == StatusCode::UNAUTHORIZED {
            study_warn!("session rejected by server; dropping credentials");
            self.set_token(None);
            (self.on_unauthorized)();
            return Err(ApiError::new(FailureKind::Unauthorized, status.to_string()));
        }
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let response = self.send(self.http.get(url)).await?;
        Self::read_json(response).await
    }

    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let mut url = self.url(path)?;
        url.query_pairs_mut().extend_pairs(query.iter().copied());
        let response = self.send(self.http.get(url)).await?;
        Self::read_json(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let response = self.send(self.http.post(url).json(body)).await?;
        Self::read_json(response).await
    }

    /// POST whose response body is only an acknowledgement.
    pub async fn post_ack<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let url = self.url(path)?;
        self.send(self.http.post(url).json(body)).await?;
        Ok(())
    }

    pub async fn put_ack<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let url = self.url(path)?;
        self.send(self.http.put(url).json(body)).await?;
        Ok(())
    }

    pub async fn delete_ack(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path)?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: multipart::Form,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let response = self.send(self.http.post(url).multipart(form)).await?;
        Self::read_json(response).await
    }

    /// Stream a body into memory, enforcing `max_download_bytes`.
    pub async fn get_bytes(&self, path: &str) -> Result<DownloadedFile, ApiError> {
        let url = self.url(path)?;
        let response = self.send(self.http.get(url)).await?;
        let max_bytes = self.settings.max_download_bytes;

        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "download too large",
                ));
            }
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition);
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let mut buffer = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = buffer.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "download too large",
                ));
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(DownloadedFile {
            filename,
            content_type,
            bytes: Bytes::from(buffer),
        })
    }
}

/// Pull the filename out of a `Content-Disposition` header, preferring the
/// RFC 5987 `filename*` form.
pub(crate) fn filename_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    for part in header.split(';').map(str::trim) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let encoded = value.trim().trim_matches('"');
                let raw = encoded.split_once("''").map_or(encoded, |(_, rest)| rest);
                if let Some(decoded) = percent_decode(raw) {
                    return Some(decoded);
                }
            }
            "filename" => {
                plain = Some(value.trim().trim_matches('"').to_string());
            }
            _ => {}
        }
    }
    plain.filter(|name| !name.is_empty())
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok().filter(|name| !name.is_empty())
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
