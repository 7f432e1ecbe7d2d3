use async_trait::async_trait;

use crate::workflows::lending::gateways::{ExtractionGateway, GatewayError};
use crate::workflows::lending::intake::TextFieldExtractor;

/// Serialises the label-table extraction as a JSON object.
#[derive(Debug, Clone, Default)]
pub struct ExtractionService {
    extractor: TextFieldExtractor,
}

impl ExtractionService {
    pub fn new(extractor: TextFieldExtractor) -> Self {
        Self { extractor }
    }

    pub fn text_to_json(&self, text: &str) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.extractor.extract(text))
    }
}

#[async_trait]
impl ExtractionGateway for ExtractionService {
    async fn extract(&self, text: &str) -> Result<String, GatewayError> {
        self.text_to_json(text)
            .map_err(|err| GatewayError::Malformed(err.to_string()))
    }
}
