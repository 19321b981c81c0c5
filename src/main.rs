use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, slider, text, Column, Image};
use iced::{window, Alignment, Element, Length, Size, Subscription, Task, Theme};
use rfd::{MessageButtons, MessageDialog, MessageLevel};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod error;
mod imaging;
mod state;

use api::HttpApi;
use config::{AppConfig, DisplayConfig};
use imaging::Dimensions;
use state::data::Score;
use state::journal::FeedbackJournal;
use state::session::{Notice, Phase, SessionController};

/// Outer padding around the panel content
const PADDING: f32 = 20.0;
/// Vertical space kept for the prompt, slider and buttons below the image
const CONTROLS_HEIGHT: f32 = 200.0;

/// Main application state
struct FeedbackPanel {
    /// Drives the walk through the image list
    session: SessionController<HttpApi>,
    /// Texts shown in the panel
    display: DisplayConfig,
    /// Current slider value
    score: Score,
    /// GPU handle for the image on screen
    picture: Option<Handle>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Start"
    Start,
    /// Slider moved
    ScoreChanged(u8),
    /// User clicked "Submit Feedback"
    Submit,
    /// User chose to move past the current image
    Skip,
    /// Window size changed; recompute the display frame
    WindowResized(Size),
}

impl FeedbackPanel {
    /// Create a new instance of the panel
    ///
    /// The image list is fetched here, once, before the window appears.
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        let api = HttpApi::new(&config.api.base_url, config.api.image_count);

        let journal = config.journal.log_dir().map(|dir| {
            let journal = FeedbackJournal::new(&dir);
            info!("Saving feedback to: {}", journal.path().display());
            journal
        });

        let session = SessionController::new(api, config.display.frame(), journal);
        info!("🎨 Image feedback panel initialized with {} images", session.images().len());

        (
            FeedbackPanel {
                session,
                display: config.display,
                score: Score::default(),
                picture: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Start => {
                info!("Start button clicked");
                let phase = self.session.start();
                self.after_transition(phase);
            }
            Message::ScoreChanged(value) => {
                self.score = Score::from(value);
            }
            Message::Submit => {
                let phase = self.session.submit(self.score);
                self.after_transition(phase);
            }
            Message::Skip => {
                let phase = self.session.skip();
                self.after_transition(phase);
            }
            Message::WindowResized(size) => {
                self.session.set_frame(frame_for(size));
            }
        }

        Task::none()
    }

    /// Sync the picture with the controller and raise any dialogs the new phase needs
    fn after_transition(&mut self, phase: Phase) {
        self.picture = self
            .session
            .current_image()
            .map(|img| Handle::from_rgba(img.size.width, img.size.height, img.pixels.clone()));

        match phase {
            Phase::Presenting => {}
            Phase::Idle => {
                if let Some(notice @ Notice::ImageLoadFailed { .. }) = self.session.notice() {
                    show_dialog(MessageLevel::Error, "Error", &notice.message());
                }
            }
            Phase::Exhausted => {
                info!("No more images");
                show_dialog(MessageLevel::Info, "Information", "Finished!!\nNo more images.");
                self.session.acknowledge();
                self.picture = None;
                self.score = Score::default();
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let notice = self.session.notice().map(|n| text(n.message()).size(14));

        let content: Column<Message> = match self.session.phase() {
            // Exhausted is acknowledged in the same update, so it renders as Idle
            Phase::Idle | Phase::Exhausted => {
                let mut idle = column![
                    text(&self.display.welcome).size(20),
                    button("Start").on_press(Message::Start).padding(10),
                ];
                // Last image failed to load: offer to move past it
                if let Some(notice) = notice {
                    idle = idle
                        .push(notice)
                        .push(button("Skip image").on_press(Message::Skip).padding(10));
                }
                idle
            }
            Phase::Presenting => {
                let (position, total) = self.session.progress();
                let mut presenting = column![text(format!("{position} / {total}")).size(14)];

                if let (true, Some(handle)) = (self.session.state().displayed, &self.picture) {
                    presenting = presenting.push(Image::new(handle.clone()));
                }

                presenting = presenting
                    .push(text(&self.display.prompt).size(16))
                    .push(
                        row![
                            text(Score::MIN.value().to_string()),
                            slider(
                                Score::MIN.value()..=Score::MAX.value(),
                                self.score.value(),
                                Message::ScoreChanged,
                            ),
                            text(Score::MAX.value().to_string()),
                        ]
                        .spacing(10)
                        .align_y(Alignment::Center),
                    )
                    .push(text(format!("Score: {}", self.score.value())).size(14))
                    .push(
                        row![
                            button("Submit Feedback").on_press(Message::Submit).padding(10),
                            button("Skip image").on_press(Message::Skip).padding(10),
                        ]
                        .spacing(10),
                    );

                if let Some(notice) = notice {
                    presenting = presenting.push(notice);
                }
                presenting
            }
        };

        container(content.spacing(20).padding(PADDING).align_x(Alignment::Center))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        window::resize_events().map(|(_id, size)| Message::WindowResized(size))
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Space left for the image once padding and controls are taken out
fn frame_for(size: Size) -> Dimensions {
    Dimensions::new(
        (size.width - 2.0 * PADDING).max(1.0) as u32,
        (size.height - CONTROLS_HEIGHT - 2.0 * PADDING).max(1.0) as u32,
    )
}

fn show_dialog(level: MessageLevel, title: &str, description: &str) {
    MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load();
    let frame = config.display.frame();
    let window_size = Size::new(
        frame.width as f32 + 2.0 * PADDING,
        frame.height as f32 + CONTROLS_HEIGHT + 2.0 * PADDING,
    );

    iced::application("Image Feedback", FeedbackPanel::update, FeedbackPanel::view)
        .subscription(FeedbackPanel::subscription)
        .theme(FeedbackPanel::theme)
        .window_size(window_size)
        .centered()
        .run_with(move || FeedbackPanel::new(config))
}
