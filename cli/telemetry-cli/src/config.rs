// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Run configuration

use std::net::Ipv6Addr;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use telemetry_api::{LOGIN_PATH, QUERY_PARAM_UUID, STATUS_PATH, TASK_PATH, TaskId, TaskRequest};
use url::{Host, Url};

use crate::tls::TlsTrust;

/// Login used when none is configured
pub const DEFAULT_EMAIL: &str = "admin";

/// Password used when none is configured
pub const DEFAULT_PASSWORD: &str = "P@ss!234";

/// Where the task archive is written when no output path is given
pub const DEFAULT_OUTPUT: &str = "./telemetry.zip";

/// Delay between status polls (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Base URLs of the two services on the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    auth: Url,
    task: Url,
}

impl Endpoints {
    /// Use explicit service roots. A missing trailing slash is added so that
    /// relative paths join below the root rather than replacing its last
    /// segment.
    pub fn new(auth: Url, task: Url) -> Self {
        Self {
            auth: with_trailing_slash(auth),
            task: with_trailing_slash(task),
        }
    }

    /// HTTPS roots for a target host. The host must be a bare domain name or
    /// IP address; IPv6 literals may be given with or without brackets.
    /// Anything carrying a port, path, or userinfo is rejected.
    pub fn for_host(host: &str, auth_port: u16, task_port: u16) -> Result<Self, url::ParseError> {
        let host = match host.parse::<Ipv6Addr>() {
            Ok(addr) => Host::Ipv6(addr),
            Err(_) => Host::parse(host)?,
        };

        let auth = Url::parse(&format!("https://{}:{}/", host, auth_port))?;
        let task = Url::parse(&format!("https://{}:{}/", host, task_port))?;
        Ok(Self { auth, task })
    }

    pub fn login(&self) -> Result<Url, url::ParseError> {
        self.auth.join(LOGIN_PATH)
    }

    pub fn task(&self) -> Result<Url, url::ParseError> {
        self.task.join(TASK_PATH)
    }

    pub fn task_archive(&self, id: &TaskId) -> Result<Url, url::ParseError> {
        let mut url = self.task()?;
        url.query_pairs_mut()
            .append_pair(QUERY_PARAM_UUID, id.as_str());
        Ok(url)
    }

    pub fn status(&self, id: &TaskId) -> Result<Url, url::ParseError> {
        let mut url = self.task.join(STATUS_PATH)?;
        url.query_pairs_mut()
            .append_pair(QUERY_PARAM_UUID, id.as_str());
        Ok(url)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Login credentials for the auth service
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_EMAIL, DEFAULT_PASSWORD)
    }
}

/// How the status endpoint is polled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait between two status requests
    pub interval: Duration,
    /// Give up (and cancel the task) once this much time has passed.
    /// `None` polls until the task completes.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: None,
        }
    }
}

/// Everything a run needs, assembled once before the first request
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub endpoints: Endpoints,
    pub credentials: Credentials,
    pub tls: TlsTrust,
    pub task: TaskRequest,
    pub poll: PollPolicy,
    /// Archive destination; overwritten if it exists
    pub output: PathBuf,
    /// Remove the task's files on the target once downloaded
    pub delete_after_download: bool,
}

impl RunConfig {
    /// Configuration matching the defaults for a given set of endpoints
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            credentials: Credentials::default(),
            tls: TlsTrust::default(),
            task: TaskRequest::default(),
            poll: PollPolicy::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            delete_after_download: false,
        }
    }
}
