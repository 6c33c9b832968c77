//! Callback sender adapters.

mod http_callback_sender;
mod recording_callback_sender;

pub use http_callback_sender::{HttpCallbackSender, DEFAULT_CALLBACK_URL};
pub use recording_callback_sender::RecordingCallbackSender;
