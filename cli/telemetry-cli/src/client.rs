// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! HTTP calls against the telemetry target
//!
//! Every call is a single request with no retry. Non-2xx responses become
//! [`ClientError::Status`]; bodies that do not decode become
//! [`ClientError::Malformed`].

use std::path::Path;

use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use telemetry_api::{CreatedTask, LoginRequest, StatusEntry, TaskId, TaskRef, TaskRequest};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::{Credentials, Endpoints};
use crate::error::ClientError;
use crate::tls::{self, TlsTrust};

const USER_AGENT: &str = concat!("telemetry-cli/", env!("CARGO_PKG_VERSION"));

/// Bearer token issued by the auth service. Held in memory only.
#[derive(Debug, Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Client for one telemetry target
pub struct TelemetryClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl TelemetryClient {
    pub fn new(endpoints: Endpoints, trust: &TlsTrust) -> Result<Self, ClientError> {
        tls::install_crypto_provider();

        let builder = reqwest::Client::builder().user_agent(USER_AGENT);
        let http = trust
            .configure(builder)?
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self { http, endpoints })
    }

    /// `PUT /auth/login/`. The whole response body is the token.
    pub async fn login(&self, credentials: &Credentials) -> Result<BearerToken, ClientError> {
        let url = self.endpoints.login()?;
        debug!(%url, email = %credentials.email, "logging in");

        let body = LoginRequest {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        };
        let response = self.http.put(url).json(&body).send().await?;
        let response = check_status(response).await?;

        let token = response.text().await?;
        let token = token.trim();
        if token.is_empty() {
            return Err(ClientError::Malformed(
                "login returned an empty token".to_string(),
            ));
        }
        Ok(BearerToken::new(token))
    }

    /// `POST /task/`
    pub async fn create_task(
        &self,
        token: &BearerToken,
        task: &TaskRequest,
    ) -> Result<CreatedTask, ClientError> {
        let url = self.endpoints.task()?;
        debug!(%url, command = ?task.command, shell = ?task.shell, "creating task");

        let response = self
            .http
            .post(url)
            .bearer_auth(token.expose())
            .json(task)
            .send()
            .await?;
        decode_json(check_status(response).await?).await
    }

    /// `GET /status/?uuid=`. Only the first entry of the returned array is
    /// meaningful for a single-task query.
    pub async fn task_status(
        &self,
        token: &BearerToken,
        id: &TaskId,
    ) -> Result<StatusEntry, ClientError> {
        let url = self.endpoints.status(id)?;
        debug!(%url, "fetching task status");

        let response = self
            .http
            .get(url)
            .bearer_auth(token.expose())
            .send()
            .await?;
        let entries: Vec<StatusEntry> = decode_json(check_status(response).await?).await?;

        entries
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Malformed(format!("no status returned for task {}", id)))
    }

    /// `GET /task/?uuid=`, streamed to `dest`. Returns the number of bytes
    /// written.
    ///
    /// The body is written to a temporary file next to `dest`, which replaces
    /// `dest` only after the last chunk arrives. A failed request or an
    /// interrupted transfer leaves any existing `dest` untouched.
    pub async fn download_task(
        &self,
        token: &BearerToken,
        id: &TaskId,
        dest: &Path,
    ) -> Result<u64, ClientError> {
        let url = self.endpoints.task_archive(id)?;
        debug!(%url, dest = %dest.display(), "downloading task archive");

        let response = self
            .http
            .get(url)
            .bearer_auth(token.expose())
            .send()
            .await?;
        let response = check_status(response).await?;

        let io_err = |source: std::io::Error| ClientError::Io {
            path: dest.to_path_buf(),
            source,
        };

        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staging = tempfile::Builder::new()
            .prefix(".telemetry-download-")
            .tempfile_in(dir)
            .map_err(io_err)?;
        let mut file = tokio::fs::File::from_std(staging.as_file().try_clone().map_err(io_err)?);

        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(io_err)?;
        drop(file);

        staging.persist(dest).map_err(|e| io_err(e.error))?;
        debug!(bytes = written, dest = %dest.display(), "archive saved");
        Ok(written)
    }

    /// `PUT /task/` with `Cancel: true`
    pub async fn cancel_task(&self, token: &BearerToken, id: &TaskId) -> Result<(), ClientError> {
        let url = self.endpoints.task()?;
        debug!(%url, task = %id, "canceling task");

        let response = self
            .http
            .put(url)
            .bearer_auth(token.expose())
            .json(&TaskRef::cancel(id.clone()))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// `DELETE /task/`
    pub async fn delete_task(&self, token: &BearerToken, id: &TaskId) -> Result<(), ClientError> {
        let url = self.endpoints.task()?;
        debug!(%url, task = %id, "deleting task");

        let response = self
            .http
            .delete(url)
            .bearer_auth(token.expose())
            .json(&TaskRef::delete(id.clone()))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status,
        body: body.trim().to_string(),
    })
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Malformed(e.to_string()))
}
