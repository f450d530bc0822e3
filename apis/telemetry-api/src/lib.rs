// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Wire types for the telemetry task service.
//!
//! The service is split across two listeners: an auth service that hands out
//! bearer tokens, and a task service that accepts commands, reports their
//! status, and serves the collected output as an archive. Field names on the
//! wire are PascalCase (`UUID`, `StatusString`, ...), so every field here
//! carries an explicit rename.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, FromRepr, VariantNames};

// ============================================================================
// Endpoints
// ============================================================================

/// Default port of the auth service.
pub const DEFAULT_AUTH_PORT: u16 = 8000;

/// Default port of the task service.
pub const DEFAULT_TASK_PORT: u16 = 8001;

/// Login path, relative to the auth service root. `PUT` with [`LoginRequest`].
pub const LOGIN_PATH: &str = "auth/login/";

/// Task path, relative to the task service root.
///
/// - `POST` with [`TaskRequest`] creates a task
/// - `GET ?uuid=` downloads the task archive
/// - `PUT` with [`TaskRef::cancel`] cancels a running task
/// - `DELETE` with [`TaskRef::delete`] removes a finished task's files
pub const TASK_PATH: &str = "task/";

/// Status path, relative to the task service root. `GET ?uuid=` returns a
/// JSON array of [`StatusEntry`].
pub const STATUS_PATH: &str = "status/";

/// Query parameter naming the task on status and download requests.
pub const QUERY_PARAM_UUID: &str = "uuid";

/// Command run when the caller does not supply one.
pub const DEFAULT_COMMAND: &str = "ls -al";

// ============================================================================
// Identifiers
// ============================================================================

/// Task identifier as issued by the task service.
///
/// The service generates RFC 4122 UUIDs, but clients treat the value as
/// opaque and echo it back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Auth Service
// ============================================================================

/// Body of the login request. The response body is the raw bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    #[serde(rename = "Email")]
    pub email: &'a str,
    #[serde(rename = "Password")]
    pub password: &'a str,
}

// ============================================================================
// Task Service
// ============================================================================

/// Body of a task creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Commands executed without a shell.
    #[serde(rename = "Command", default)]
    pub command: Vec<String>,

    /// Commands executed in a shell.
    #[serde(rename = "Shell", default, skip_serializing_if = "Vec::is_empty")]
    pub shell: Vec<String>,

    /// Expiration in `YYYY-MM-DD HH:MM:SS` (UTC). The service applies its own
    /// default when absent; once expired, a task is canceled and its files
    /// removed.
    #[serde(
        rename = "Expiration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration: Option<String>,
}

impl Default for TaskRequest {
    fn default() -> Self {
        Self {
            command: vec![DEFAULT_COMMAND.to_string()],
            shell: Vec::new(),
            expiration: None,
        }
    }
}

/// Response to a task creation request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedTask {
    #[serde(rename = "UUID")]
    pub uuid: TaskId,
}

/// Body referencing an existing task, used to cancel or delete it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRef {
    #[serde(rename = "UUID")]
    pub uuid: TaskId,
    #[serde(rename = "Cancel", skip_serializing_if = "Option::is_none")]
    pub cancel: Option<bool>,
}

impl TaskRef {
    /// Body for `PUT /task/`. Tasks cannot be un-canceled, so this is always
    /// `true`.
    pub fn cancel(uuid: TaskId) -> Self {
        Self {
            uuid,
            cancel: Some(true),
        }
    }

    /// Body for `DELETE /task/`. Only valid once the task is canceled,
    /// completed, or expired.
    pub fn delete(uuid: TaskId) -> Self {
        Self { uuid, cancel: None }
    }
}

/// Lifecycle states reported in `StatusString`. The discriminants are the
/// numeric codes the service reports in `Status`; the service persists them,
/// so they never change.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    VariantNames,
    FromRepr,
)]
#[repr(u8)]
pub enum TaskStatus {
    Accepted = 0,
    Canceled = 1,
    Canceling = 2,
    Completed = 3,
    Expired = 4,
    Running = 5,
}

impl TaskStatus {
    /// Status for a numeric `Status` code, or `None` if the code is unknown.
    pub fn from_code(code: i64) -> Option<Self> {
        u8::try_from(code).ok().and_then(Self::from_repr)
    }
}

/// One element of the status response array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusEntry {
    #[serde(rename = "UUID", default)]
    pub uuid: Option<TaskId>,

    /// Numeric form of the status
    #[serde(rename = "Status", default)]
    pub status_code: Option<i64>,

    #[serde(rename = "StatusString")]
    pub status_string: String,

    #[serde(rename = "Expiration", default)]
    pub expiration: Option<String>,
}

impl StatusEntry {
    /// Parsed status. A name this client does not know falls back to the
    /// numeric code; `None` if neither is recognized.
    pub fn status(&self) -> Option<TaskStatus> {
        self.status_string
            .parse()
            .ok()
            .or_else(|| self.status_code.and_then(TaskStatus::from_code))
    }

    /// True only for the literal `Completed`.
    pub fn is_completed(&self) -> bool {
        let completed: &str = TaskStatus::Completed.as_ref();
        self.status_string == completed
    }
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.uuid {
            Some(uuid) => write!(f, "{} ({})", self.status_string, uuid),
            None => f.write_str(&self.status_string),
        }
    }
}
