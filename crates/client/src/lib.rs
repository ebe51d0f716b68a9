//! HTTP client for the Bonsai proving service.
//!
//! Uploads guest inputs, creates proving sessions, polls them until they finish and
//! optionally converts the resulting receipt into a Groth16 Snark.
//!
//! ## Example
//!
//! ```no_run
//! use bonsai_client::{BonsaiClient, Error, PollConfig, encode_inputs};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Error> {
//! let client = BonsaiClient::from_env("0.19.1")?;
//! let poll = PollConfig::default();
//! let cancel = CancellationToken::new();
//!
//! // Upload the input and start proving
//! let input = client.upload_input(encode_inputs(&[7, 3])).await?;
//! let session = client.create_session("d5ddf6dd".into(), input).await?;
//!
//! // Wait for the receipt
//! let receipt = client.wait_for_session(&session, &poll, &cancel).await?;
//! println!("Receipt is {} bytes", receipt.len());
//!
//! // Compress it into a Snark
//! let snark = client.create_snark(session).await?;
//! let snark_receipt = client.wait_for_snark(&snark, &poll, &cancel).await?;
//! println!("Journal: {:?}", snark_receipt.journal);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub use bonsai_types as types;
pub use client::{API_KEY_ENV, API_URL_ENV, BonsaiClient, DEFAULT_API_URL};
pub use error::Error;
pub use input::encode_inputs;
pub use poll::{DEFAULT_POLL_INTERVAL, PollConfig, Progress, StatusResponse, poll_until_done};

mod client;
mod error;
mod input;
mod poll;
