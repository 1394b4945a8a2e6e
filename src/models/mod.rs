pub mod error_models;
pub mod language_models;
pub mod ws_message_models;
