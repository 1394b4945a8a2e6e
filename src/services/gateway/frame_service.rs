//! Pure translation between client-side JSON frames and upstream protobuf
//! frames. Nothing in this module touches a socket, which keeps the whole
//! mapping unit-testable.

use crate::models::ws_message_models::{status, ClientCommand, ServerFrame, WsMessage};
use crate::proto::compiler_service::{execute_response, ExecuteResponse};

/// Error frames from a backend whose text carries this marker are internal
/// bookkeeping for the backend's own container teardown and are never shown
/// to the client.
pub const CLEANUP_MARKER: &str = "--- Cleaned up";

/// Parses one inbound text frame and classifies it.
///
/// A frame with both `language` and `code` non-empty is a submission. Failing
/// that, a frame with non-empty `input` is an input chunk (whether it is
/// usable depends on the caller having an active stream). Anything else is
/// invalid.
pub fn decode_client(text: &str) -> Result<ClientCommand, serde_json::Error> {
    let message: WsMessage = serde_json::from_str(text)?;
    if !message.language.is_empty() && !message.code.is_empty() {
        return Ok(ClientCommand::Submission {
            language: message.language,
            code: message.code,
        });
    }
    if !message.input.is_empty() {
        return Ok(ClientCommand::Input {
            input: message.input,
        });
    }
    Ok(ClientCommand::Invalid)
}

/// Serializes one outbound frame.
pub fn encode_server(frame: &ServerFrame) -> Result<String, serde_json::Error> {
    serde_json::to_string(frame)
}

/// Maps one upstream response to the frames the client should see, in order.
///
/// An `Output` whose trimmed text ends in `:` or `?` is taken as an
/// interactive input prompt and gains a companion `WAITING_FOR_INPUT` frame.
/// The heuristic is crude and fires on any output that happens to end that
/// way, but the browser UI depends on it, so it is part of the contract.
pub fn translate_upstream(response: ExecuteResponse) -> Vec<ServerFrame> {
    match response.payload {
        Some(execute_response::Payload::Output(output)) => {
            let mut frames = vec![ServerFrame::success(output.output_text.clone())];
            if is_input_prompt(&output.output_text) {
                frames.push(ServerFrame::new("", status::WAITING_FOR_INPUT));
            }
            frames
        }
        Some(execute_response::Payload::Error(error)) => {
            if error.error_text.contains(CLEANUP_MARKER) {
                Vec::new()
            } else {
                vec![ServerFrame::error(error.error_text)]
            }
        }
        Some(execute_response::Payload::Status(state)) => {
            vec![ServerFrame::new(state.state.clone(), state.state)]
        }
        None => Vec::new(),
    }
}

fn is_input_prompt(output: &str) -> bool {
    let trimmed = output.trim();
    trimmed.ends_with(':') || trimmed.ends_with('?')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::compiler_service::{Error, Output, Status};

    fn output_response(text: &str) -> ExecuteResponse {
        ExecuteResponse {
            payload: Some(execute_response::Payload::Output(Output {
                output_text: text.to_string(),
            })),
        }
    }

    #[test]
    fn submission_is_classified() {
        let command = decode_client(r#"{"language":"python","code":"print(1)"}"#).unwrap();
        assert_eq!(
            command,
            ClientCommand::Submission {
                language: "python".into(),
                code: "print(1)".into()
            }
        );
    }

    #[test]
    fn input_is_classified() {
        let command = decode_client(r#"{"input":"42\n"}"#).unwrap();
        assert_eq!(command, ClientCommand::Input { input: "42\n".into() });
    }

    #[test]
    fn empty_object_is_invalid() {
        assert_eq!(decode_client("{}").unwrap(), ClientCommand::Invalid);
    }

    #[test]
    fn language_without_code_is_invalid() {
        let command = decode_client(r#"{"language":"python","code":""}"#).unwrap();
        assert_eq!(command, ClientCommand::Invalid);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(decode_client("not json").is_err());
    }

    #[test]
    fn plain_output_maps_to_success() {
        let frames = translate_upstream(output_response("hi\n"));
        assert_eq!(frames, vec![ServerFrame::success("hi\n")]);
    }

    #[test]
    fn prompt_output_gains_waiting_frame() {
        let frames = translate_upstream(output_response("name: "));
        assert_eq!(
            frames,
            vec![
                ServerFrame::success("name: "),
                ServerFrame::new("", status::WAITING_FOR_INPUT),
            ]
        );
    }

    #[test]
    fn question_prompt_gains_waiting_frame() {
        let frames = translate_upstream(output_response("continue?\n"));
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].status, status::WAITING_FOR_INPUT);
    }

    #[test]
    fn error_maps_to_error_frame() {
        let response = ExecuteResponse {
            payload: Some(execute_response::Payload::Error(Error {
                error_text: "NameError: x".to_string(),
            })),
        };
        assert_eq!(
            translate_upstream(response),
            vec![ServerFrame::error("NameError: x")]
        );
    }

    #[test]
    fn cleanup_marker_is_suppressed() {
        let response = ExecuteResponse {
            payload: Some(execute_response::Payload::Error(Error {
                error_text: "--- Cleaned up container abc".to_string(),
            })),
        };
        assert!(translate_upstream(response).is_empty());
    }

    #[test]
    fn status_echoes_state_into_both_fields() {
        let response = ExecuteResponse {
            payload: Some(execute_response::Payload::Status(Status {
                state: "RUNNING".to_string(),
            })),
        };
        assert_eq!(
            translate_upstream(response),
            vec![ServerFrame::new("RUNNING", "RUNNING")]
        );
    }

    #[test]
    fn missing_payload_maps_to_nothing() {
        assert!(translate_upstream(ExecuteResponse { payload: None }).is_empty());
    }

    #[test]
    fn encode_has_output_and_status_fields() {
        let text = encode_server(&ServerFrame::success("hi")).unwrap();
        assert_eq!(text, r#"{"output":"hi","status":"SUCCESS"}"#);
    }
}
