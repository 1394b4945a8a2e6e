#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::ReceiverStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use compiler_gateway::models::error_models::GatewayError;
use compiler_gateway::models::ws_message_models::ServerFrame;
use compiler_gateway::proto::compiler_service::{
    execute_request, execute_response, Error, ExecuteRequest, ExecuteResponse, Output, Status,
};
use compiler_gateway::services::gateway::executor_registry_service::{
    CodeExecutor, ExecStream, ExecutorRegistry,
};
use compiler_gateway::services::gateway::screening_service::SafetyScreener;
use compiler_gateway::services::gateway::session_bridge_service::SessionBridge;
use compiler_gateway::services::http::router_service::build_router;
use compiler_gateway::services::languages::language_service::LangService;
use compiler_gateway::services::languages::language_storage_service::LangStorage;
use compiler_gateway::state::AppState;

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub fn output_response(text: &str) -> ExecuteResponse {
    ExecuteResponse {
        payload: Some(execute_response::Payload::Output(Output {
            output_text: text.to_string(),
        })),
    }
}

pub fn error_response(text: &str) -> ExecuteResponse {
    ExecuteResponse {
        payload: Some(execute_response::Payload::Error(Error {
            error_text: text.to_string(),
        })),
    }
}

pub fn status_response(state: &str) -> ExecuteResponse {
    ExecuteResponse {
        payload: Some(execute_response::Payload::Status(Status {
            state: state.to_string(),
        })),
    }
}

/// What a mock backend does with one opened stream.
#[derive(Clone)]
pub enum StreamBehavior {
    /// Reply to the code frame with these responses, then close the stream.
    CompleteWith(Vec<ExecuteResponse>),
    /// Reply to the code frame with a prompt, echo one input chunk back
    /// followed by EXECUTION_COMPLETE, then close the stream.
    Interactive { prompt: String },
    /// Reply to the code frame with one output and keep the stream open
    /// until the gateway tears it down.
    LongRunning { first_output: String },
}

/// In-process executor implementing the registry trait over channels. Every
/// request the gateway sends is captured for later assertions.
pub struct MockExecutor {
    behaviors: Arc<Mutex<VecDeque<StreamBehavior>>>,
    requests: Arc<Mutex<Vec<ExecuteRequest>>>,
}

impl MockExecutor {
    pub fn new(behaviors: Vec<StreamBehavior>) -> Self {
        Self {
            behaviors: Arc::new(Mutex::new(behaviors.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests_handle(&self) -> Arc<Mutex<Vec<ExecuteRequest>>> {
        Arc::clone(&self.requests)
    }
}

#[tonic::async_trait]
impl CodeExecutor for MockExecutor {
    async fn open_stream(&self) -> Result<ExecStream, GatewayError> {
        let behavior = self
            .behaviors
            .lock()
            .await
            .pop_front()
            .unwrap_or(StreamBehavior::CompleteWith(Vec::new()));
        let (request_tx, mut request_rx) = mpsc::channel::<ExecuteRequest>(16);
        let (response_tx, response_rx) = mpsc::channel(16);
        let requests = Arc::clone(&self.requests);

        tokio::spawn(async move {
            while let Some(request) = request_rx.recv().await {
                let payload = request.payload.clone();
                requests.lock().await.push(request);
                match (&behavior, payload) {
                    (
                        StreamBehavior::CompleteWith(responses),
                        Some(execute_request::Payload::Code(_)),
                    ) => {
                        for response in responses.clone() {
                            let _ = response_tx.send(Ok(response)).await;
                        }
                        return;
                    }
                    (
                        StreamBehavior::Interactive { prompt },
                        Some(execute_request::Payload::Code(_)),
                    ) => {
                        let _ = response_tx.send(Ok(output_response(prompt))).await;
                    }
                    (
                        StreamBehavior::Interactive { .. },
                        Some(execute_request::Payload::Input(input)),
                    ) => {
                        let _ = response_tx
                            .send(Ok(output_response(&input.input_text)))
                            .await;
                        let _ = response_tx
                            .send(Ok(status_response("EXECUTION_COMPLETE")))
                            .await;
                        return;
                    }
                    (
                        StreamBehavior::LongRunning { first_output },
                        Some(execute_request::Payload::Code(_)),
                    ) => {
                        let _ = response_tx.send(Ok(output_response(first_output))).await;
                    }
                    _ => {}
                }
            }
        });

        Ok(ExecStream {
            sender: request_tx,
            responses: Box::pin(ReceiverStream::new(response_rx)),
        })
    }
}

/// Binds the full gateway router on an ephemeral port. The returned TempDir
/// owns the catalog storage and must be kept alive by the caller.
pub async fn spawn_gateway(registry: ExecutorRegistry) -> (SocketAddr, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let storage = LangStorage::new(dir.path().join("languages.json"));
    storage
        .ensure_exists()
        .await
        .expect("storage should initialize");

    let state = AppState {
        bridge: Arc::new(SessionBridge::new(
            Arc::new(registry),
            Arc::new(SafetyScreener::new()),
        )),
        lang_service: Arc::new(LangService::new(storage)),
        limiter: None,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have addr");
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("gateway should run");
    });
    (addr, dir)
}

pub fn registry_with(language: &str, executor: MockExecutor) -> ExecutorRegistry {
    let mut executors: HashMap<String, Box<dyn CodeExecutor>> = HashMap::new();
    executors.insert(language.to_string(), Box::new(executor));
    ExecutorRegistry::with_executors(executors)
}

pub async fn connect_ws(addr: SocketAddr) -> WsClient {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/api/v1/execute"))
        .await
        .expect("websocket should connect");
    ws
}

pub async fn send_json(ws: &mut WsClient, payload: &str) {
    ws.send(Message::Text(payload.to_string()))
        .await
        .expect("websocket send should succeed");
}

/// Next text frame, decoded; panics after five seconds of silence.
pub async fn next_frame(ws: &mut WsClient) -> ServerFrame {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("frame should arrive in time")
            .expect("connection should stay open")
            .expect("websocket read should succeed");
        match message {
            Message::Text(text) => {
                return serde_json::from_str(&text).expect("frame should be valid JSON")
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected websocket message: {other:?}"),
        }
    }
}

/// Collects decoded frames until `count` STREAM_CLOSED frames were seen.
pub async fn frames_until_closed(ws: &mut WsClient, count: usize) -> Vec<ServerFrame> {
    let mut frames = Vec::new();
    let mut closed = 0;
    while closed < count {
        let frame = next_frame(ws).await;
        if frame.status == "STREAM_CLOSED" {
            closed += 1;
        }
        frames.push(frame);
    }
    frames
}
