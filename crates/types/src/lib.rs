//! Request and response types of the Bonsai proving service.
//!
//! The service owns this contract; the types here mirror its JSON schema and carry no
//! behaviour beyond classifying job status strings.
//!
//! ## Overview
//!
//! The types are organized around the calls a proving run makes, in order:
//! - Version - Check connectivity and supported zkVM versions
//! - Upload - Obtain pre-signed storage URLs for inputs and images
//! - Session - Create a proving session and poll its status
//! - Snark - Convert a finished session into a Groth16 Snark and poll its status

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Identifier of a program image registered with the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Hash)]
#[serde(transparent)]
pub struct ImageId(pub String);

impl From<String> for ImageId {
    fn from(s: String) -> Self {
        ImageId(s)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        ImageId(s.to_string())
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// UUID assigned by the service to an uploaded input, a session or a Snark job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Hash)]
#[serde(transparent)]
pub struct Uuid(pub String);

impl From<String> for Uuid {
    fn from(s: String) -> Self {
        Uuid(s)
    }
}

impl From<&str> for Uuid {
    fn from(s: &str) -> Self {
        Uuid(s.to_string())
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response of `GET version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// zkVM versions the service accepts.
    pub risc0_zkvm: Vec<String>,
}

/// Response of `GET inputs/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRes {
    /// Pre-signed URL the input bytes are `PUT` to.
    pub url: String,
    /// Identifier of the input once uploaded.
    pub uuid: Uuid,
}

/// Response of `GET images/upload/{image_id}` when the image is not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImgUploadRes {
    /// Pre-signed URL the image bytes are `PUT` to.
    pub url: String,
}

/// Body of `POST sessions/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCreate {
    /// Image to run.
    pub img: ImageId,
    /// Previously uploaded input.
    pub input: Uuid,
}

/// Response of `POST sessions/create` and `POST snark/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessRes {
    /// Identifier of the created job.
    pub uuid: Uuid,
}

/// Response of `GET sessions/status/{uuid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatusRes {
    /// Raw status string, see [`JobStatus`].
    pub status: String,
    /// Download URL of the receipt, set once the session succeeded.
    pub receipt_url: Option<String>,
    /// Failure reason, set when the session ended unsuccessfully.
    pub error_msg: Option<String>,
    /// Progress of a running session (e.g. `Setup`, `Executor`, `ProveSegments: 2/4`).
    pub state: Option<String>,
    /// Seconds since the session started.
    pub elapsed_time: Option<f64>,
}

/// Body of `POST snark/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnarkCreate {
    /// Session whose receipt is converted.
    pub session_id: Uuid,
}

/// Response of `GET snark/status/{uuid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnarkStatusRes {
    /// Raw status string, see [`JobStatus`].
    pub status: String,
    /// The Snark receipt, set once the job succeeded.
    pub output: Option<SnarkReceipt>,
    /// Failure reason, set when the job ended unsuccessfully.
    pub error_msg: Option<String>,
}

/// A Groth16 Snark receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnarkReceipt {
    /// The Groth16 seal.
    pub snark: Groth16Seal,
    /// Digest of the guest's final system state.
    pub post_state_digest: Vec<u8>,
    /// Public outputs committed by the guest.
    pub journal: Vec<u8>,
}

/// Groth16 proof points, each coordinate as big-endian bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groth16Seal {
    /// Point A (G1).
    pub a: Vec<Vec<u8>>,
    /// Point B (G2).
    pub b: Vec<Vec<Vec<u8>>>,
    /// Point C (G1).
    pub c: Vec<Vec<u8>>,
}

/// Status of a session or Snark job as reported by the service.
///
/// Strings the service may add later parse into [`JobStatus::Other`] and count as terminal
/// failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// Still in progress.
    Running,
    /// Finished with an artifact.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Ran past the service's time limit.
    TimedOut,
    /// Stopped by a user.
    Aborted,
    /// Unrecognized status string, kept verbatim.
    Other(String),
}

impl JobStatus {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::TimedOut => "TIMED_OUT",
            Self::Aborted => "ABORTED",
            Self::Other(status) => status,
        }
    }

    /// Returns `true` unless the job is still running.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl FromStr for JobStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "TIMED_OUT" => Self::TimedOut,
            "ABORTED" => Self::Aborted,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        let Ok(status) = s.parse::<JobStatus>();
        status
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SessionStatusRes {
    /// Parsed [`JobStatus`].
    pub fn job_status(&self) -> JobStatus {
        JobStatus::from(self.status.as_str())
    }
}

impl SnarkStatusRes {
    /// Parsed [`JobStatus`].
    pub fn job_status(&self) -> JobStatus {
        JobStatus::from(self.status.as_str())
    }
}
