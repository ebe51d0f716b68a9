use bonsai_types::{
    CreateSessRes, ImageId, ImgUploadRes, SessionCreate, SessionStatusRes, SnarkCreate,
    SnarkReceipt, SnarkStatusRes, UploadRes, Uuid, VersionInfo,
};
use reqwest::{Client, IntoUrl, RequestBuilder, Response, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    Error,
    poll::{PollConfig, poll_until_done},
};

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "BONSAI_API_URL";
/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "BONSAI_API_KEY";
/// Base URL of the hosted service.
pub const DEFAULT_API_URL: &str = "https://api.bonsai.xyz/";

const API_KEY_HEADER: &str = "x-api-key";
const VERSION_HEADER: &str = "x-risc0-version";

/// HTTP client for the Bonsai proving service.
///
/// Every call to the service API carries the API key and the zkVM version headers. Calls to
/// the pre-signed storage URLs the service hands out are sent without them.
#[derive(Clone, Debug)]
pub struct BonsaiClient {
    base_url: Url,
    api_key: String,
    risc0_version: String,
    client: Client,
}

impl BonsaiClient {
    /// Creates a new client for the service at `base_url`.
    pub fn new(
        base_url: impl IntoUrl,
        api_key: impl Into<String>,
        risc0_version: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::with_client(base_url, api_key, risc0_version, Client::new())
    }

    /// Creates a new client with a custom [`reqwest::Client`].
    pub fn with_client(
        base_url: impl IntoUrl,
        api_key: impl Into<String>,
        risc0_version: impl Into<String>,
        client: Client,
    ) -> Result<Self, Error> {
        Ok(Self {
            base_url: with_trailing_slash(base_url.into_url()?),
            api_key: api_key.into(),
            risc0_version: risc0_version.into(),
            client,
        })
    }

    /// Creates a client from `BONSAI_API_URL` (optional) and `BONSAI_API_KEY` (required).
    pub fn from_env(risc0_version: impl Into<String>) -> Result<Self, Error> {
        let api_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| Error::MissingEnv(API_KEY_ENV))?;
        Self::new(api_url, api_key, risc0_version)
    }

    /// Base URL all API paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn api(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(API_KEY_HEADER, &self.api_key)
            .header(VERSION_HEADER, &self.risc0_version)
    }

    /// Sends a GET request to the specified API path and deserializes the response.
    pub async fn get<Res: DeserializeOwned>(&self, path: &str) -> Result<Res, Error> {
        let res = send(self.api(self.client.get(self.base_url.join(path)?))).await?;
        Ok(res.json::<Res>().await?)
    }

    /// Sends a POST request with a JSON body to the specified API path and deserializes the
    /// response.
    pub async fn post<Req: Serialize, Res: DeserializeOwned>(
        &self,
        path: &str,
        req: Req,
    ) -> Result<Res, Error> {
        let res = send(
            self.api(self.client.post(self.base_url.join(path)?))
                .json(&req),
        )
        .await?;
        Ok(res.json::<Res>().await?)
    }

    /// Retrieves the zkVM versions the service supports.
    pub async fn version(&self) -> Result<VersionInfo, Error> {
        self.get("version").await
    }

    /// Uploads guest input and returns its identifier.
    pub async fn upload_input(&self, input: Vec<u8>) -> Result<Uuid, Error> {
        let upload: UploadRes = self.get("inputs/upload").await?;
        debug!(uuid = %upload.uuid, len = input.len(), "Uploading input");
        self.put_data(&upload.url, input).await?;
        Ok(upload.uuid)
    }

    /// Uploads a program image under `image_id`.
    ///
    /// Returns `false` without uploading when the service already stores the image.
    pub async fn upload_image(&self, image_id: &ImageId, image: Vec<u8>) -> Result<bool, Error> {
        let url = self.base_url.join(&format!("images/upload/{image_id}"))?;
        let res = send(self.api(self.client.get(url))).await?;
        if res.status() == StatusCode::NO_CONTENT {
            info!(%image_id, "Image already uploaded");
            return Ok(false);
        }

        let upload: ImgUploadRes = res.json().await?;
        debug!(%image_id, len = image.len(), "Uploading image");
        self.put_data(&upload.url, image).await?;
        Ok(true)
    }

    /// Starts a proving session running `img` on `input`.
    pub async fn create_session(&self, img: ImageId, input: Uuid) -> Result<Uuid, Error> {
        let res: CreateSessRes = self
            .post("sessions/create", SessionCreate { img, input })
            .await?;
        Ok(res.uuid)
    }

    /// Fetches the status of a proving session.
    pub async fn session_status(&self, session_id: &Uuid) -> Result<SessionStatusRes, Error> {
        self.get(&format!("sessions/status/{session_id}")).await
    }

    /// Starts converting the receipt of a finished session into a Snark.
    pub async fn create_snark(&self, session_id: Uuid) -> Result<Uuid, Error> {
        let res: CreateSessRes = self.post("snark/create", SnarkCreate { session_id }).await?;
        Ok(res.uuid)
    }

    /// Fetches the status of a Snark job.
    pub async fn snark_status(&self, snark_id: &Uuid) -> Result<SnarkStatusRes, Error> {
        self.get(&format!("snark/status/{snark_id}")).await
    }

    /// Polls a session until it ends and downloads its receipt.
    pub async fn wait_for_session(
        &self,
        session_id: &Uuid,
        config: &PollConfig,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, Error> {
        let receipt_url =
            poll_until_done(config, cancel, || self.session_status(session_id)).await?;
        info!(%session_id, "Session succeeded, downloading receipt");
        self.download(&receipt_url).await
    }

    /// Polls a Snark job until it ends and returns the Snark receipt.
    pub async fn wait_for_snark(
        &self,
        snark_id: &Uuid,
        config: &PollConfig,
        cancel: &CancellationToken,
    ) -> Result<SnarkReceipt, Error> {
        let receipt = poll_until_done(config, cancel, || self.snark_status(snark_id)).await?;
        info!(%snark_id, "Snark succeeded");
        Ok(receipt)
    }

    /// Downloads an artifact from a pre-signed storage URL.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, Error> {
        let res = send(self.client.get(url)).await?;
        Ok(res.bytes().await?.to_vec())
    }

    async fn put_data(&self, url: &str, data: Vec<u8>) -> Result<(), Error> {
        send(self.client.put(url).body(data)).await?;
        Ok(())
    }
}

/// Makes `Url::join` append to the base path instead of replacing its last segment.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Sends an HTTP request and handles error status codes.
pub(crate) async fn send(request: RequestBuilder) -> Result<Response, Error> {
    let res = request.send().await?;

    if let Err(inner) = res.error_for_status_ref() {
        let msg = res.text().await.ok();
        return Err(Error::ErrorStatus { inner, msg });
    }

    Ok(res)
}
