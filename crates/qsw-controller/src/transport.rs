use bytes::Bytes;

use reqwest::header::{AUTHORIZATION, COOKIE};
use reqwest::{Client, Method, StatusCode};

use serde_json::Value;

use tokio::sync::Semaphore;

use tracing::debug;

use crate::error::{Error, ErrorKind, Result};
use crate::options::ConnectionOptions;
use crate::session::Session;

// Maps a failure status to an error, `401` being checked first.
fn status_error(status: StatusCode, method: &Method, path: &str, body: &[u8]) -> Error {
    let kind = match status {
        StatusCode::UNAUTHORIZED => ErrorKind::Login,
        StatusCode::INTERNAL_SERVER_ERROR => ErrorKind::InternalServer,
        _ => ErrorKind::Api,
    };
    Error::new(
        kind,
        format!(
            "{method} /{path} failed with status {status}: {}",
            String::from_utf8_lossy(body)
        ),
    )
}

// Bodies are never logged, they may hold the API key.
fn response_summary(method: &Method, path: &str, status: StatusCode, len: usize) -> String {
    format!("{method} /{path} status {status}, {len} bytes")
}

// HTTP plumbing shared by all endpoints of a switch.
//
// The semaphore bounds the number of requests in flight.
#[derive(Debug)]
pub(crate) struct Transport {
    client: Client,
    url: String,
    timeout: std::time::Duration,
    semaphore: Semaphore,
}

impl Transport {
    pub(crate) fn new(client: Client, options: &ConnectionOptions) -> Self {
        Self {
            client,
            url: options.url.clone(),
            timeout: options.timeout,
            semaphore: Semaphore::new(options.max_requests),
        }
    }

    async fn send(
        &self,
        session: &Session,
        method: &Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Bytes)> {
        let _permit = self.semaphore.acquire().await.map_err(|e| {
            Error::new(ErrorKind::InvalidHost, format!("Request queue closed: {e}"))
        })?;

        debug!("HTTP request: {method} /{path}");

        let mut request = self
            .client
            .request(method.clone(), format!("{}/{path}", self.url))
            .timeout(self.timeout)
            .header(COOKIE, session.cookie());

        if let Some(authorization) = session.authorization() {
            request = request.header(AUTHORIZATION, authorization);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        debug!("HTTP response: {}", response_summary(method, path, status, bytes.len()));

        Ok((status, bytes))
    }

    pub(crate) async fn request_json(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let (status, bytes) = self.send(session, &method, path, body).await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(status_error(status, &method, path, &bytes));
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(json) if status == StatusCode::OK => Ok(json),
            Ok(json) => Err(status_error(
                status,
                &method,
                path,
                json.to_string().as_bytes(),
            )),
            Err(_) if status != StatusCode::OK => {
                Err(status_error(status, &method, path, &bytes))
            }
            Err(e) => Err(Error::new(
                ErrorKind::InvalidResponse,
                format!("{method} /{path} returned an invalid body: {e}"),
            )),
        }
    }

    pub(crate) async fn request_bytes(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Bytes> {
        let (status, bytes) = self.send(session, &method, path, body).await?;

        if status == StatusCode::OK {
            Ok(bytes)
        } else {
            Err(status_error(status, &method, path, &bytes))
        }
    }
}
