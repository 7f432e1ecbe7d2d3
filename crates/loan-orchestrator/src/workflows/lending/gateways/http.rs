use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{
    ApprovalGateway, ApprovalRequest, ExtractionGateway, GatewayError, PropertyValuationGateway,
    SolvencyGateway, SolvencyRequest,
};
use crate::workflows::lending::domain::PropertyIntake;

/// Route of each RPC operation, relative to the service base URL.
pub mod paths {
    pub const EXTRACTION: &str = "/rpc/extraction/text_to_json";
    pub const SOLVENCY: &str = "/rpc/solvency/credit_check";
    pub const PROPERTY: &str = "/rpc/property/evaluate_property";
    pub const APPROVAL: &str = "/rpc/approval/evaluate_loan_application";
}

/// Reply envelope shared by every operation.
#[derive(Debug, Serialize, Deserialize)]
pub struct RpcReply {
    pub result: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub text: String,
}

/// JSON-over-HTTP caller for one service.
#[derive(Debug, Clone)]
struct RpcClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RpcClient {
    fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| {
                error!(?err, "failed to create HTTP client");
                GatewayError::Transport(format!("failed to create HTTP client: {err}"))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    async fn call<B>(&self, path: &str, body: &B) -> Result<String, GatewayError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "calling scoring service");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let reply = response
            .json::<RpcReply>()
            .await
            .map_err(|err| GatewayError::Malformed(err.to_string()))?;
        Ok(reply.result)
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.timeout)
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

macro_rules! http_gateway {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            rpc: RpcClient,
        }

        impl $name {
            pub fn new(
                base_url: impl Into<String>,
                timeout: Duration,
            ) -> Result<Self, GatewayError> {
                Ok(Self {
                    rpc: RpcClient::new(base_url, timeout)?,
                })
            }
        }
    };
}

http_gateway!(
    /// Remote text extraction service.
    HttpExtractionGateway
);
http_gateway!(
    /// Remote solvency service.
    HttpSolvencyGateway
);
http_gateway!(
    /// Remote property valuation service.
    HttpPropertyGateway
);
http_gateway!(
    /// Remote approval decision service.
    HttpApprovalGateway
);

#[async_trait]
impl ExtractionGateway for HttpExtractionGateway {
    async fn extract(&self, text: &str) -> Result<String, GatewayError> {
        let body = ExtractionRequest {
            text: text.to_string(),
        };
        self.rpc.call(paths::EXTRACTION, &body).await
    }
}

#[async_trait]
impl SolvencyGateway for HttpSolvencyGateway {
    async fn check_solvency(&self, request: SolvencyRequest) -> Result<String, GatewayError> {
        self.rpc.call(paths::SOLVENCY, &request).await
    }
}

#[async_trait]
impl PropertyValuationGateway for HttpPropertyGateway {
    async fn valuate_property(&self, intake: &PropertyIntake) -> Result<String, GatewayError> {
        self.rpc.call(paths::PROPERTY, intake).await
    }
}

#[async_trait]
impl ApprovalGateway for HttpApprovalGateway {
    async fn decide_approval(&self, request: ApprovalRequest) -> Result<String, GatewayError> {
        self.rpc.call(paths::APPROVAL, &request).await
    }
}
