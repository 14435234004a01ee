//! HTTP gateway in front of Google Gemini
//!
//! Exposes ten generation features (chat, code, image analysis, journaling,
//! live-site generation, stories, recipes, workouts, dream visualization and
//! code debugging) through a single `POST /api/gemini` endpoint.

pub mod ai;
pub mod attachment;
pub mod dispatcher;
pub mod dream;
pub mod error;
pub mod features;
pub mod models;
pub mod prompts;
pub mod server;
pub mod tone;
pub mod transport;

pub use error::{Error, Result};
