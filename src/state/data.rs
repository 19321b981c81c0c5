/// Shared data structures for the feedback session
///
/// These structs represent the data model that flows between
/// the image service client and the session controller.

use serde::{Deserialize, Serialize};

/// A single remote image the user can rate
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageRecord {
    /// Opaque identifier assigned by the service
    pub id: String,
    /// Absolute URL of the image bytes
    pub url: String,
}

/// Ordered list fetched once at startup and only ever traversed by index
pub type ImageList = Vec<ImageRecord>;

/// A rating between 0 and 10 inclusive
///
/// Construction clamps, so an out-of-range value can never reach the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub const MIN: Score = Score(0);
    pub const MAX: Score = Score(10);

    pub fn new(value: u8) -> Self {
        Score(value.min(Self::MAX.0))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Score {
    /// Slider starts in the middle of the range
    fn default() -> Self {
        Score(5)
    }
}

impl From<u8> for Score {
    fn from(value: u8) -> Self {
        Score::new(value)
    }
}

/// Body of one `POST /api/submit_score` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackSubmission {
    pub image_id: String,
    pub score: Score,
}

impl FeedbackSubmission {
    pub fn new(record: &ImageRecord, score: Score) -> Self {
        Self {
            image_id: record.id.clone(),
            score,
        }
    }
}

/// Position of the session within the image list
///
/// `current_index == len` means the list is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    pub current_index: usize,
    /// True while an image is on screen
    pub displayed: bool,
}

impl SessionState {
    /// Back to the first image, nothing on screen
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
