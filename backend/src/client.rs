use fair_share_core::{ArchiveSink, GameResultInput};
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{info, warn};

pub const RESULTS_PATH: &str = "/api/game-results";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("archive client needs a tokio runtime")]
    NoRuntime,
}

/// Posts finished games to a running archive without waiting for the answer.
#[derive(Debug, Clone)]
pub struct HttpArchiveClient {
    http: reqwest::Client,
    endpoint: String,
    runtime: Handle,
}

impl HttpArchiveClient {
    /// Uses the runtime the caller is running on.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let runtime = Handle::try_current().map_err(|_| ClientError::NoRuntime)?;
        Ok(Self::with_handle(base_url, runtime))
    }

    fn with_handle(base_url: &str, runtime: Handle) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}{RESULTS_PATH}", base_url.trim_end_matches('/')),
            runtime,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ArchiveSink for HttpArchiveClient {
    fn submit(&self, result: GameResultInput) {
        let http = self.http.clone();
        let endpoint = self.endpoint.clone();
        self.runtime.spawn(async move {
            match http.post(&endpoint).json(&result).send().await {
                Ok(res) if res.status().is_success() => {
                    info!(%endpoint, "game result archived");
                }
                Ok(res) => {
                    warn!(%endpoint, status = %res.status(), "archive rejected game result");
                }
                Err(err) => {
                    warn!(%endpoint, %err, "failed to archive game result");
                }
            }
        });
    }
}
