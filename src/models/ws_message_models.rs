use serde::{Deserialize, Serialize};

/// Status values carried in the `status` field of outbound frames. The
/// client UI keys off these strings, so they are part of the wire contract.
pub mod status {
    pub const SUCCESS: &str = "SUCCESS";
    pub const ERROR: &str = "ERROR";
    pub const WAITING_FOR_INPUT: &str = "WAITING_FOR_INPUT";
    pub const STREAM_CLOSED: &str = "STREAM_CLOSED";
    pub const INFO: &str = "INFO";
    pub const CLOSED: &str = "CLOSED";
    pub const EXECUTION_COMPLETE: &str = "EXECUTION_COMPLETE";
}

// PRIMARY STRUCTURE FOR INBOUND WEBSOCKET MESSAGES
//
// A submission carries `language` and `code`; an input chunk carries only
// `input`. The shape is a single struct with optional fields because the
// browser client sends whichever keys apply and omits the rest.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WsMessage {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub input: String,
}

/// Classified form of a [`WsMessage`].
#[derive(Debug, PartialEq)]
pub enum ClientCommand {
    Submission { language: String, code: String },
    Input { input: String },
    Invalid,
}

/// A single outbound JSON frame: `{"output": "...", "status": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerFrame {
    pub output: String,
    pub status: String,
}

impl ServerFrame {
    pub fn new(output: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            status: status.into(),
        }
    }

    pub fn success(output: impl Into<String>) -> Self {
        Self::new(output, status::SUCCESS)
    }

    pub fn error(output: impl Into<String>) -> Self {
        Self::new(output, status::ERROR)
    }

    pub fn info(output: impl Into<String>) -> Self {
        Self::new(output, status::INFO)
    }
}

/*
 * Example messages (as JSON):
 *
 * {"language": "python", "code": "print(1)"}   -> Submission
 * {"input": "42\n"}                            -> Input
 * {"output": "1\n", "status": "SUCCESS"}       <- ServerFrame
 */
