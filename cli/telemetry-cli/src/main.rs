// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! telemetry - run a command on a telemetry target and download its output

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use telemetry_api::{DEFAULT_AUTH_PORT, DEFAULT_COMMAND, DEFAULT_TASK_PORT, TaskRequest};
use tracing_subscriber::EnvFilter;

use telemetry_cli::config::{
    DEFAULT_EMAIL, DEFAULT_OUTPUT, DEFAULT_PASSWORD, DEFAULT_POLL_INTERVAL_SECS,
};
use telemetry_cli::{Credentials, Endpoints, PollPolicy, RunConfig, TlsTrust};

#[derive(Parser, Debug)]
#[command(
    name = "telemetry",
    version,
    about = "Run a command on a telemetry target and download its output",
    long_about = "Logs in to a telemetry target, submits a task, polls until the task \
                  completes, and downloads the task archive."
)]
struct Cli {
    /// IP or hostname of the telemetry target
    #[arg(long, env = "TELEMETRY_IP")]
    ip: String,

    /// Login email
    #[arg(long, env = "TELEMETRY_EMAIL", default_value = DEFAULT_EMAIL)]
    email: String,

    /// Login password
    #[arg(
        long,
        env = "TELEMETRY_PASSWORD",
        default_value = DEFAULT_PASSWORD,
        hide_default_value = true,
        hide_env_values = true
    )]
    password: String,

    /// Port of the auth service
    #[arg(long, default_value_t = DEFAULT_AUTH_PORT)]
    auth_port: u16,

    /// Port of the task service
    #[arg(long, default_value_t = DEFAULT_TASK_PORT)]
    task_port: u16,

    /// Command to run without a shell (repeatable)
    #[arg(long = "command", value_name = "CMD")]
    commands: Vec<String>,

    /// Command to run in a shell (repeatable)
    #[arg(long = "shell", value_name = "CMD")]
    shells: Vec<String>,

    /// Task expiration, "YYYY-MM-DD HH:MM:SS" in UTC
    #[arg(long)]
    expiration: Option<String>,

    /// Seconds between status polls
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    poll_interval: u64,

    /// Give up and cancel the task after this many seconds (default: wait forever)
    #[arg(long)]
    timeout: Option<u64>,

    /// Where to write the task archive
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Verify the target's TLS certificate against the platform trust store
    #[arg(long)]
    tls_verify: bool,

    /// Verify the target's TLS certificate against this PEM CA bundle
    #[arg(long, value_name = "PEM")]
    ca_cert: Option<PathBuf>,

    /// Delete the task's files on the target after downloading them
    #[arg(long)]
    delete_after_download: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<RunConfig> {
        let endpoints = Endpoints::for_host(&self.ip, self.auth_port, self.task_port)
            .with_context(|| format!("invalid target '{}'", self.ip))?;

        // Only fall back to the default command when nothing at all was given.
        let command = if self.commands.is_empty() && self.shells.is_empty() {
            vec![DEFAULT_COMMAND.to_string()]
        } else {
            self.commands
        };

        Ok(RunConfig {
            endpoints,
            credentials: Credentials::new(self.email, self.password),
            tls: TlsTrust::from_flags(self.tls_verify, self.ca_cert),
            task: TaskRequest {
                command,
                shell: self.shells,
                expiration: self.expiration,
            },
            poll: PollPolicy {
                interval: Duration::from_secs(self.poll_interval),
                timeout: self.timeout.map(Duration::from_secs),
            },
            output: self.output,
            delete_after_download: self.delete_after_download,
        })
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "telemetry_cli=debug"
    } else {
        "telemetry_cli=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match telemetry_cli::run(&config).await {
        Ok(summary) => {
            tracing::debug!(?summary, "run finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
