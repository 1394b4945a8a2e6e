use std::collections::HashMap;
use std::pin::Pin;

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::{Channel, Endpoint};
use tonic::Status;

use crate::config::Config;
use crate::models::error_models::GatewayError;
use crate::proto::compiler_service::code_executor_client::CodeExecutorClient;
use crate::proto::compiler_service::{ExecuteRequest, ExecuteResponse};

/// Response half of an open execution stream.
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<ExecuteResponse, Status>> + Send>>;

/// One live bidirectional call to a backend executor. Dropping both halves
/// releases the underlying RPC.
pub struct ExecStream {
    pub sender: mpsc::Sender<ExecuteRequest>,
    pub responses: ResponseStream,
}

/// A language-specific backend capable of opening execution streams.
#[tonic::async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn open_stream(&self) -> Result<ExecStream, GatewayError>;
}

/// gRPC-backed executor over a lazily connected channel. A backend that is
/// down does not fail gateway startup; it surfaces per session when the
/// stream is opened.
pub struct GrpcExecutor {
    client: CodeExecutorClient<Channel>,
}

impl GrpcExecutor {
    pub fn connect_lazy(addr: &str) -> Result<Self, tonic::transport::Error> {
        let endpoint = Endpoint::from_shared(format!("http://{addr}"))?.connect_lazy();
        Ok(Self {
            client: CodeExecutorClient::new(endpoint),
        })
    }
}

#[tonic::async_trait]
impl CodeExecutor for GrpcExecutor {
    async fn open_stream(&self) -> Result<ExecStream, GatewayError> {
        let (sender, receiver) = mpsc::channel(16);
        let mut client = self.client.clone();
        let responses = client
            .execute(ReceiverStream::new(receiver))
            .await?
            .into_inner();
        Ok(ExecStream {
            sender,
            responses: Box::pin(responses),
        })
    }
}

/// Immutable mapping from lower-case language tag to its executor, built once
/// at startup. There is no runtime registration; the language catalog CRUD is
/// a separate concern and the bridge never consults it.
pub struct ExecutorRegistry {
    executors: HashMap<String, Box<dyn CodeExecutor>>,
}

impl ExecutorRegistry {
    pub fn from_config(config: &Config) -> Result<Self, tonic::transport::Error> {
        let mut executors: HashMap<String, Box<dyn CodeExecutor>> = HashMap::new();
        executors.insert(
            "python".to_string(),
            Box::new(GrpcExecutor::connect_lazy(&config.python_service)?),
        );
        executors.insert(
            "java".to_string(),
            Box::new(GrpcExecutor::connect_lazy(&config.java_service)?),
        );
        executors.insert(
            "cpp".to_string(),
            Box::new(GrpcExecutor::connect_lazy(&config.cpp_service)?),
        );
        Ok(Self { executors })
    }

    /// Registry over caller-supplied executors, keyed by lower-case tag.
    pub fn with_executors(executors: HashMap<String, Box<dyn CodeExecutor>>) -> Self {
        Self { executors }
    }

    pub fn lookup(&self, language: &str) -> Option<&dyn CodeExecutor> {
        self.executors
            .get(&language.to_lowercase())
            .map(|executor| executor.as_ref())
    }
}
