use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::state::data::{FeedbackSubmission, ImageList};

const USER_AGENT: &str = concat!("image-feedback/", env!("CARGO_PKG_VERSION"));

/// Everything the session controller needs from the image service
///
/// All calls block until the server answers.
pub trait FeedbackApi {
    /// Fetch the list of images to rate. Never fails: any problem is
    /// logged and an empty list comes back.
    fn fetch_images(&self) -> ImageList;

    /// Download the raw bytes behind an image URL
    fn fetch_image_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError>;

    /// Post one rating. Any 2xx response counts as accepted.
    fn submit_score(&self, submission: &FeedbackSubmission) -> Result<(), ApiError>;
}

/// Wire shape of `GET /api/random_images/{n}`
#[derive(Debug, Deserialize)]
struct ImageListResponse {
    items: ImageList,
}

/// `FeedbackApi` over plain HTTP
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    image_count: u32,
}

impl HttpApi {
    pub fn new(base_url: &str, image_count: u32) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            image_count,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn try_fetch_images(&self) -> Result<ImageList, ApiError> {
        let url = self.endpoint(&format!("api/random_images/{}", self.image_count));
        debug!(%url, "fetching image list");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| ApiError::Transport { url: url.clone(), source })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|source| ApiError::Transport { url: url.clone(), source })?;

        parse_image_list(&url, status, &body)
    }
}

impl FeedbackApi for HttpApi {
    fn fetch_images(&self) -> ImageList {
        match self.try_fetch_images() {
            Ok(images) => {
                info!(count = images.len(), "📥 fetched images");
                images
            }
            Err(e) => {
                error!(error = %e, "failed to fetch images");
                ImageList::new()
            }
        }
    }

    fn fetch_image_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let transport = |source| ApiError::Transport { url: url.to_string(), source };

        let response = self.client.get(url).send().map_err(transport)?;
        check_status(url, response.status().as_u16())?;
        let bytes = response.bytes().map_err(transport)?;

        debug!(%url, size = bytes.len(), "downloaded image");
        Ok(bytes.to_vec())
    }

    fn submit_score(&self, submission: &FeedbackSubmission) -> Result<(), ApiError> {
        let url = self.endpoint("api/submit_score");

        let response = self
            .client
            .post(&url)
            .json(submission)
            .send()
            .map_err(|source| ApiError::Transport { url: url.clone(), source })?;

        check_status(&url, response.status().as_u16())
    }
}

fn check_status(url: &str, status: u16) -> Result<(), ApiError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(ApiError::Status { url: url.to_string(), status })
    }
}

/// Turn a status code and body into the ordered image list
///
/// Each item needs string `id` and `url` fields; anything else on the
/// item is ignored.
pub fn parse_image_list(url: &str, status: u16, body: &str) -> Result<ImageList, ApiError> {
    check_status(url, status)?;
    let response: ImageListResponse = serde_json::from_str(body)?;
    Ok(response.items)
}
