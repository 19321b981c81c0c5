/// Client for the remote image service
///
/// Two endpoints are used:
/// - `GET /api/random_images/{n}` for the list of images to rate
/// - `POST /api/submit_score` for each rating
///
/// Image bytes are fetched from whatever URL the list points at.

pub mod client;

pub use client::{FeedbackApi, HttpApi};
