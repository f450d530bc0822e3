// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Error types for telemetry-cli

use std::path::PathBuf;
use std::time::Duration;

use strum::Display;
use telemetry_api::TaskId;
use thiserror::Error;

/// Errors from a single call against the telemetry target
#[derive(Error, Debug)]
pub enum ClientError {
    /// The configured CA bundle could not be read
    #[error("failed to read CA certificate {}: {source}", .path.display())]
    CaCert {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configured CA bundle is not valid PEM
    #[error("invalid CA certificate: {0}")]
    InvalidCaCert(#[source] reqwest::Error),

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// An endpoint URL could not be built
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Connection, TLS handshake, or body transfer failure
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The target answered with a non-2xx status
    #[error("HTTP {status}{}", body_suffix(.body))]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Writing the downloaded archive failed
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

/// The step of the run a failure happened in. The display form prefixes the
/// one-line diagnostic printed on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Operation {
    #[strum(serialize = "client setup")]
    Setup,
    #[strum(serialize = "login")]
    Login,
    #[strum(serialize = "task create")]
    TaskCreate,
    #[strum(serialize = "status get")]
    StatusGet,
    #[strum(serialize = "download")]
    Download,
    #[strum(serialize = "task cancel")]
    TaskCancel,
    #[strum(serialize = "task delete")]
    TaskDelete,
}

/// Terminal failure of a run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("{op} error: {source}")]
    Call {
        op: Operation,
        #[source]
        source: ClientError,
    },

    #[error(
        "status get error: task {task} did not complete within {}s (last status: {last})",
        .waited.as_secs()
    )]
    Timeout {
        task: TaskId,
        waited: Duration,
        last: String,
    },
}

impl RunError {
    /// The operation that failed
    pub fn operation(&self) -> Operation {
        match self {
            RunError::Call { op, .. } => *op,
            RunError::Timeout { .. } => Operation::StatusGet,
        }
    }
}

/// Tag a client result with the operation it belongs to
pub trait OperationExt<T> {
    fn during(self, op: Operation) -> Result<T, RunError>;
}

impl<T> OperationExt<T> for Result<T, ClientError> {
    fn during(self, op: Operation) -> Result<T, RunError> {
        self.map_err(|source| RunError::Call { op, source })
    }
}
