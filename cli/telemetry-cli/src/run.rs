// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! The run: log in, create a task, wait for it, download its archive.
//!
//! Each step needs the result of the one before it, so the calls are made
//! strictly in sequence and the first failure ends the run.

use std::path::PathBuf;
use std::time::Instant;

use telemetry_api::{StatusEntry, TaskId, TaskStatus};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::client::{BearerToken, TelemetryClient};
use crate::config::{PollPolicy, RunConfig};
use crate::error::{Operation, OperationExt, RunError};

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub task: TaskId,
    /// The entry that reported `Completed`
    pub status: StatusEntry,
    /// Number of status requests made, including the final one
    pub polls: u32,
    pub output: PathBuf,
    pub bytes: u64,
}

pub async fn run(config: &RunConfig) -> Result<RunSummary, RunError> {
    let client =
        TelemetryClient::new(config.endpoints.clone(), &config.tls).during(Operation::Setup)?;

    let token = client
        .login(&config.credentials)
        .await
        .during(Operation::Login)?;
    info!("authenticated");

    let created = client
        .create_task(&token, &config.task)
        .await
        .during(Operation::TaskCreate)?;
    info!(task = %created.uuid, "task created");
    println!("created task: {}", created.uuid);

    let (status, polls) = wait_for_completion(&client, &token, &created.uuid, &config.poll).await?;
    println!("status at completion: {}", status);

    let bytes = client
        .download_task(&token, &created.uuid, &config.output)
        .await
        .during(Operation::Download)?;
    info!(task = %created.uuid, bytes, "archive downloaded");
    println!("downloaded file {}", config.output.display());

    if config.delete_after_download {
        client
            .delete_task(&token, &created.uuid)
            .await
            .during(Operation::TaskDelete)?;
        println!("deleted task: {}", created.uuid);
    }

    Ok(RunSummary {
        task: created.uuid,
        status,
        polls,
        output: config.output.clone(),
        bytes,
    })
}

/// Poll the task's status until it reports `Completed`.
///
/// Any other status, known or not, means "keep waiting". Without a timeout
/// this loops for as long as the target keeps answering. With one, the wait
/// before the deadline is cut short, and once it has passed the task is
/// canceled on the target (best effort) and the run fails.
pub async fn wait_for_completion(
    client: &TelemetryClient,
    token: &BearerToken,
    task: &TaskId,
    policy: &PollPolicy,
) -> Result<(StatusEntry, u32), RunError> {
    let start = Instant::now();
    let mut polls: u32 = 0;

    loop {
        let entry = client
            .task_status(token, task)
            .await
            .during(Operation::StatusGet)?;
        polls += 1;

        if entry.is_completed() {
            info!(task = %task, polls, "task completed");
            return Ok((entry, polls));
        }

        println!(
            "status received: {}, waiting for status '{}'",
            entry.status_string,
            TaskStatus::Completed
        );

        match entry.status() {
            Some(status) => debug!(task = %task, %status, polls, "task not completed"),
            None => warn!(task = %task, status = %entry.status_string, "unrecognized task status"),
        }

        // Never sleep past the deadline.
        let wait = match policy.timeout {
            Some(timeout) => {
                let elapsed = start.elapsed();
                if elapsed >= timeout {
                    if let Err(e) = client.cancel_task(token, task).await {
                        warn!(task = %task, "{} error: {}", Operation::TaskCancel, e);
                    } else {
                        info!(task = %task, "task canceled after timeout");
                    }
                    return Err(RunError::Timeout {
                        task: task.clone(),
                        waited: elapsed,
                        last: entry.status_string,
                    });
                }
                policy.interval.min(timeout - elapsed)
            }
            None => policy.interval,
        };

        sleep(wait).await;
    }
}
