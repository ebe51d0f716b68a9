//! Fixed-interval status polling shared by sessions and Snark jobs.

use std::{future::Future, time::Duration};

use bonsai_types::{JobStatus, SessionStatusRes, SnarkReceipt, SnarkStatusRes};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::Error;

/// Default delay between two status requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How often and how long to poll a job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between two status requests.
    pub interval: Duration,
    /// Give up after this many status requests. `None` polls until the job ends.
    pub max_attempts: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

/// Classified status response.
#[derive(Debug, PartialEq)]
pub enum Progress<T> {
    /// The job is still running, optionally reporting which stage it is in.
    Running {
        /// Stage reported by the service.
        state: Option<String>,
    },
    /// The job succeeded with this artifact.
    Done(T),
}

/// A status response that can be classified into [`Progress`].
pub trait StatusResponse {
    /// What a successful job yields.
    type Output;

    /// Name used in malformed-response errors.
    const RESPONSE: &'static str;

    /// Classifies the response. Terminal failures and malformed responses become errors.
    fn into_progress(self) -> Result<Progress<Self::Output>, Error>;
}

impl StatusResponse for SessionStatusRes {
    /// URL of the receipt.
    type Output = String;

    const RESPONSE: &'static str = "session status";

    fn into_progress(self) -> Result<Progress<String>, Error> {
        match self.job_status() {
            JobStatus::Running => {
                let state = self.state.ok_or(missing::<Self>("state"))?;
                Ok(Progress::Running { state: Some(state) })
            }
            JobStatus::Succeeded => {
                let receipt_url = self.receipt_url.ok_or(missing::<Self>("receipt url"))?;
                Ok(Progress::Done(receipt_url))
            }
            status => Err(failed::<Self>(status, self.error_msg)),
        }
    }
}

impl StatusResponse for SnarkStatusRes {
    type Output = SnarkReceipt;

    const RESPONSE: &'static str = "snark status";

    fn into_progress(self) -> Result<Progress<SnarkReceipt>, Error> {
        match self.job_status() {
            // Snark status carries no stage.
            JobStatus::Running => Ok(Progress::Running { state: None }),
            JobStatus::Succeeded => {
                let output = self.output.ok_or(missing::<Self>("output"))?;
                Ok(Progress::Done(output))
            }
            status => Err(failed::<Self>(status, self.error_msg)),
        }
    }
}

fn missing<R: StatusResponse>(field: &'static str) -> Error {
    Error::MissingField {
        response: R::RESPONSE,
        field,
    }
}

fn failed<R: StatusResponse>(status: JobStatus, error_msg: Option<String>) -> Error {
    match error_msg {
        Some(message) => Error::JobFailed { status, message },
        None => missing::<R>("error message"),
    }
}

/// Calls `fetch` until the returned status is terminal, sleeping `config.interval` between
/// calls.
///
/// Returns the artifact of a successful job. A failed job, a malformed response, an exhausted
/// `max_attempts` or a cancelled `cancel` ends the loop with an error.
pub async fn poll_until_done<R, F, Fut>(
    config: &PollConfig,
    cancel: &CancellationToken,
    mut fetch: F,
) -> Result<R::Output, Error>
where
    R: StatusResponse,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, Error>>,
{
    let mut attempts = 0u32;
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let response = fetch().await?;
        attempts += 1;

        match response.into_progress()? {
            Progress::Done(output) => return Ok(output),
            Progress::Running { state } => info!(
                response = R::RESPONSE,
                state = state.as_deref().unwrap_or("-"),
                attempts,
                "Job running, continue polling"
            ),
        }

        if let Some(max_attempts) = config.max_attempts
            && attempts >= max_attempts
        {
            return Err(Error::PollLimitExceeded { attempts });
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
}
