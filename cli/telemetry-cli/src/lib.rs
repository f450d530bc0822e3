// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Telemetry CLI
//!
//! Runs a command on a telemetry target and downloads the collected output:
//!
//! 1. `PUT  auth/login/`       on the auth service, for a bearer token
//! 2. `POST task/`             on the task service, for a task UUID
//! 3. `GET  status/?uuid=`     until the task reports `Completed`
//! 4. `GET  task/?uuid=`       streamed to the output file
//!
//! Targets usually serve a self-signed certificate; see [`tls::TlsTrust`].

pub mod client;
pub mod config;
pub mod error;
pub mod run;
pub mod tls;

pub use client::{BearerToken, TelemetryClient};
pub use config::{Credentials, Endpoints, PollPolicy, RunConfig};
pub use error::{ClientError, Operation, RunError};
pub use run::{RunSummary, run, wait_for_completion};
pub use tls::TlsTrust;
