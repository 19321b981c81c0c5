/// Feedback session controller
///
/// Walks the image list one image at a time: show, collect a score,
/// submit, advance. Every transition is an explicit method call; the
/// host only decides which one to invoke.

use tracing::{error, info, warn};

use super::data::{FeedbackSubmission, ImageList, ImageRecord, Score, SessionState};
use super::journal::{FeedbackJournal, Outcome};
use crate::api::FeedbackApi;
use crate::error::ApiError;
use crate::imaging::{self, Dimensions, PreparedImage};

/// Where the session currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Welcome message and start button
    Idle,
    /// One image and the rating control
    Presenting,
    /// Every image has been handled; waiting for the user to acknowledge
    Exhausted,
}

/// Something that went wrong and the user should hear about
///
/// Both variants offer the same choice: retry or skip the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ImageLoadFailed { image_id: String, reason: String },
    SubmitFailed { image_id: String, reason: String },
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::ImageLoadFailed { image_id, reason } => {
                format!("Failed to load image {image_id}: {reason}")
            }
            Notice::SubmitFailed { image_id, reason } => {
                format!("Failed to submit feedback for {image_id}: {reason}")
            }
        }
    }
}

pub struct SessionController<A: FeedbackApi> {
    api: A,
    images: ImageList,
    state: SessionState,
    phase: Phase,
    frame: Dimensions,
    current: Option<PreparedImage>,
    notice: Option<Notice>,
    journal: Option<FeedbackJournal>,
}

impl<A: FeedbackApi> SessionController<A> {
    /// Fetch the image list once and start in `Idle`
    pub fn new(api: A, frame: Dimensions, journal: Option<FeedbackJournal>) -> Self {
        let images = api.fetch_images();
        info!(count = images.len(), "session ready");

        Self {
            api,
            images,
            state: SessionState::default(),
            phase: Phase::Idle,
            frame,
            current: None,
            notice: None,
            journal,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn images(&self) -> &ImageList {
        &self.images
    }

    /// The image on screen, if any
    pub fn current_image(&self) -> Option<&PreparedImage> {
        self.current.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// 1-based position for display, e.g. "2 / 3"
    pub fn progress(&self) -> (usize, usize) {
        let total = self.images.len();
        ((self.state.current_index + 1).min(total), total)
    }

    /// Available display region; applies to the next image shown
    pub fn set_frame(&mut self, frame: Dimensions) {
        self.frame = frame;
    }

    /// Idle -> Presenting (or straight to Exhausted if nothing is left)
    pub fn start(&mut self) -> Phase {
        if self.phase != Phase::Idle {
            warn!(phase = ?self.phase, "start ignored");
            return self.phase;
        }

        info!(index = self.state.current_index, "▶️ session started");
        self.notice = None;
        self.show_current()
    }

    /// Send the score for the current image and advance only if the
    /// server accepted it
    pub fn submit(&mut self, score: Score) -> Phase {
        let Some(record) = self.presented_record() else {
            warn!(phase = ?self.phase, "submit ignored");
            return self.phase;
        };

        let submission = FeedbackSubmission::new(record, score);
        match self.api.submit_score(&submission) {
            Ok(()) => {
                info!(image_id = %submission.image_id, score = score.value(), "✅ feedback submitted");
                self.journal(|j| j.record(&submission, Outcome::Accepted));
                self.notice = None;
                self.advance()
            }
            Err(e) => {
                error!(image_id = %submission.image_id, error = %e, "failed to submit feedback");
                self.journal(|j| j.record(&submission, Outcome::Failed));
                self.notice = Some(Notice::SubmitFailed {
                    image_id: submission.image_id,
                    reason: e.to_string(),
                });
                self.phase
            }
        }
    }

    /// Move past the current image without rating it
    ///
    /// Allowed while presenting, or from `Idle` after the image failed to load.
    pub fn skip(&mut self) -> Phase {
        let skippable = match self.phase {
            Phase::Presenting => true,
            Phase::Idle => matches!(self.notice, Some(Notice::ImageLoadFailed { .. })),
            Phase::Exhausted => false,
        };
        let Some(record) = self.images.get(self.state.current_index).filter(|_| skippable) else {
            warn!(phase = ?self.phase, "skip ignored");
            return self.phase;
        };

        info!(image_id = %record.id, "⏭️ image skipped");
        let image_id = record.id.clone();
        self.journal(|j| j.record_skip(&image_id));
        self.notice = None;
        self.advance()
    }

    /// Exhausted -> Idle, back to the first image of the same list
    pub fn acknowledge(&mut self) -> Phase {
        if self.phase != Phase::Exhausted {
            warn!(phase = ?self.phase, "acknowledge ignored");
            return self.phase;
        }

        self.state.reset();
        self.current = None;
        self.notice = None;
        self.phase = Phase::Idle;
        info!("🔄 session reset");
        self.phase
    }

    fn presented_record(&self) -> Option<&ImageRecord> {
        if self.phase != Phase::Presenting {
            return None;
        }
        self.images.get(self.state.current_index)
    }

    fn advance(&mut self) -> Phase {
        self.state.current_index = (self.state.current_index + 1).min(self.images.len());
        self.show_current()
    }

    /// Fetch, decode and fit the image at `current_index`
    fn show_current(&mut self) -> Phase {
        let Some(record) = self.images.get(self.state.current_index) else {
            info!("no more images");
            self.current = None;
            self.state.displayed = false;
            self.phase = Phase::Exhausted;
            return self.phase;
        };

        info!(url = %record.url, "loading image");
        match self.load(&record.url) {
            Ok(prepared) => {
                info!(width = prepared.size.width, height = prepared.size.height, "image loaded");
                self.current = Some(prepared);
                self.state.displayed = true;
                self.phase = Phase::Presenting;
            }
            Err(e) => {
                error!(url = %record.url, error = %e, "failed loading image");
                self.notice = Some(Notice::ImageLoadFailed {
                    image_id: record.id.clone(),
                    reason: e.to_string(),
                });
                self.current = None;
                self.state.displayed = false;
                self.phase = Phase::Idle;
            }
        }
        self.phase
    }

    fn load(&self, url: &str) -> Result<PreparedImage, ApiError> {
        let bytes = self.api.fetch_image_bytes(url)?;
        Ok(imaging::prepare(&bytes, self.frame)?)
    }

    fn journal(&self, f: impl FnOnce(&FeedbackJournal)) {
        if let Some(journal) = &self.journal {
            f(journal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io::Cursor;

    const FRAME: Dimensions = Dimensions::new(480, 480);

    /// Scripted stand-in for the image service
    #[derive(Default)]
    struct MockApi {
        images: ImageList,
        /// Urls that fail to download
        broken: Vec<String>,
        /// Queued submit results; empty means accept
        submit_results: RefCell<VecDeque<Result<(), u16>>>,
        submitted: RefCell<Vec<FeedbackSubmission>>,
        downloads: RefCell<Vec<String>>,
    }

    impl MockApi {
        fn with_images(n: usize) -> Self {
            let images = (0..n)
                .map(|i| ImageRecord {
                    id: format!("img-{i}"),
                    url: format!("http://test/api/image/{i}.png"),
                })
                .collect();
            Self { images, ..Default::default() }
        }

        fn reject_next_submit(&self, status: u16) {
            self.submit_results.borrow_mut().push_back(Err(status));
        }
    }

    impl FeedbackApi for &MockApi {
        fn fetch_images(&self) -> ImageList {
            self.images.clone()
        }

        fn fetch_image_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
            self.downloads.borrow_mut().push(url.to_string());
            if self.broken.iter().any(|b| b == url) {
                // Served an HTML error page instead of an image
                return Ok(b"<html>not found</html>".to_vec());
            }
            let mut buf = Vec::new();
            DynamicImage::ImageRgba8(RgbaImage::new(960, 480))
                .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
            Ok(buf)
        }

        fn submit_score(&self, submission: &FeedbackSubmission) -> Result<(), ApiError> {
            self.submitted.borrow_mut().push(submission.clone());
            match self.submit_results.borrow_mut().pop_front() {
                Some(Err(status)) => Err(ApiError::Status {
                    url: "http://test/api/submit_score".to_string(),
                    status,
                }),
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn test_start_presents_first_image() {
        let api = MockApi::with_images(3);
        let mut session = SessionController::new(&api, FRAME, None);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.current_image().is_none());

        assert_eq!(session.start(), Phase::Presenting);

        assert_eq!(session.state().current_index, 0);
        assert!(session.state().displayed);
        assert_eq!(session.current_image().unwrap().size, Dimensions::new(480, 240));
        assert_eq!(session.progress(), (1, 3));
    }

    #[test]
    fn test_full_session_then_reset() {
        let api = MockApi::with_images(3);
        let mut session = SessionController::new(&api, FRAME, None);
        session.start();

        assert_eq!(session.submit(Score::new(3)), Phase::Presenting);
        assert_eq!(session.submit(Score::new(8)), Phase::Presenting);
        assert_eq!(session.state().current_index, 2);
        assert_eq!(session.submit(Score::new(10)), Phase::Exhausted);
        assert_eq!(session.state().current_index, 3);
        assert!(session.current_image().is_none());

        assert_eq!(session.acknowledge(), Phase::Idle);
        assert_eq!(session.state().current_index, 0);
        assert!(!session.state().displayed);

        let submitted = api.submitted.borrow();
        let pairs: Vec<(&str, u8)> = submitted
            .iter()
            .map(|s| (s.image_id.as_str(), s.score.value()))
            .collect();
        assert_eq!(pairs, [("img-0", 3), ("img-1", 8), ("img-2", 10)]);
    }

    #[test]
    fn test_replay_uses_same_list() {
        let api = MockApi::with_images(2);
        let mut session = SessionController::new(&api, FRAME, None);
        session.start();
        session.submit(Score::default());
        session.submit(Score::default());
        session.acknowledge();

        assert_eq!(session.start(), Phase::Presenting);
        assert_eq!(
            *api.downloads.borrow(),
            [
                "http://test/api/image/0.png",
                "http://test/api/image/1.png",
                "http://test/api/image/0.png"
            ]
        );
    }

    #[test]
    fn test_failed_submit_does_not_advance() {
        let api = MockApi::with_images(3);
        let mut session = SessionController::new(&api, FRAME, None);
        session.start();
        api.reject_next_submit(500);

        assert_eq!(session.submit(Score::new(4)), Phase::Presenting);

        assert_eq!(session.state().current_index, 0);
        assert!(session.state().displayed);
        assert!(session.current_image().is_some());
        assert!(matches!(
            session.notice(),
            Some(Notice::SubmitFailed { image_id, .. }) if image_id == "img-0"
        ));

        // Retry succeeds and clears the notice
        assert_eq!(session.submit(Score::new(4)), Phase::Presenting);
        assert_eq!(session.state().current_index, 1);
        assert!(session.notice().is_none());
    }

    #[test]
    fn test_image_load_failure_returns_to_idle() {
        let mut api = MockApi::with_images(2);
        api.broken.push("http://test/api/image/1.png".to_string());
        let mut session = SessionController::new(&api, FRAME, None);
        session.start();

        assert_eq!(session.submit(Score::new(6)), Phase::Idle);

        assert_eq!(session.state().current_index, 1);
        assert!(!session.state().displayed);
        assert!(session.current_image().is_none());
        assert!(matches!(session.notice(), Some(Notice::ImageLoadFailed { .. })));

        // Start retries the same image
        assert_eq!(session.start(), Phase::Idle);
        assert_eq!(session.state().current_index, 1);
    }

    #[test]
    fn test_skip_after_load_failure() {
        let mut api = MockApi::with_images(2);
        api.broken.push("http://test/api/image/0.png".to_string());
        let mut session = SessionController::new(&api, FRAME, None);

        assert_eq!(session.start(), Phase::Idle);
        assert_eq!(session.skip(), Phase::Presenting);

        assert_eq!(session.state().current_index, 1);
        assert!(session.notice().is_none());
        assert!(api.submitted.borrow().is_empty());
    }

    #[test]
    fn test_skip_last_image_exhausts() {
        let api = MockApi::with_images(1);
        let mut session = SessionController::new(&api, FRAME, None);
        session.start();

        assert_eq!(session.skip(), Phase::Exhausted);
        assert!(api.submitted.borrow().is_empty());
    }

    #[test]
    fn test_skip_ignored_without_failure_in_idle() {
        let api = MockApi::with_images(2);
        let mut session = SessionController::new(&api, FRAME, None);

        assert_eq!(session.skip(), Phase::Idle);
        assert_eq!(session.state().current_index, 0);
    }

    #[test]
    fn test_empty_list_goes_straight_to_exhausted() {
        let api = MockApi::default();
        let mut session = SessionController::new(&api, FRAME, None);

        assert_eq!(session.start(), Phase::Exhausted);
        assert_eq!(session.progress(), (0, 0));
        assert_eq!(session.acknowledge(), Phase::Idle);
    }

    #[test]
    fn test_out_of_phase_calls_are_ignored() {
        let api = MockApi::with_images(1);
        let mut session = SessionController::new(&api, FRAME, None);

        assert_eq!(session.submit(Score::new(1)), Phase::Idle);
        assert_eq!(session.acknowledge(), Phase::Idle);
        assert!(api.submitted.borrow().is_empty());

        session.start();
        assert_eq!(session.start(), Phase::Presenting);
        assert_eq!(api.downloads.borrow().len(), 1);
    }

    #[test]
    fn test_frame_applies_to_next_image() {
        let api = MockApi::with_images(2);
        let mut session = SessionController::new(&api, FRAME, None);
        session.start();

        session.set_frame(Dimensions::new(200, 200));
        session.submit(Score::new(5));

        assert_eq!(session.current_image().unwrap().size, Dimensions::new(200, 100));
    }

    #[test]
    fn test_journal_records_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let journal = FeedbackJournal::new(dir.path());
        let api = MockApi::with_images(2);
        let mut session = SessionController::new(&api, FRAME, Some(journal.clone()));
        session.start();
        api.reject_next_submit(503);
        session.submit(Score::new(2));
        session.submit(Score::new(2));
        session.skip();

        let contents = std::fs::read_to_string(journal.path()).unwrap();
        let outcomes: Vec<&str> = contents
            .lines()
            .filter_map(|l| l.rsplit('\t').next())
            .collect();
        assert_eq!(outcomes, ["failed", "ok", "skipped"]);
    }
}
