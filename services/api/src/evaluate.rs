use crate::infra::orchestrator_with;
use clap::Args;
use loan_orchestrator::config::AppConfig;
use loan_orchestrator::error::AppError;
use loan_orchestrator::workflows::lending::{
    client_id_for, reference_gateways, ClientId, OrchestrationError,
};
use serde_json::json;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Read the application text from a file
    #[arg(long, required_unless_present = "text", conflicts_with = "text")]
    pub(crate) file: Option<PathBuf>,
    /// Application text given inline
    #[arg(long)]
    pub(crate) text: Option<String>,
    /// Client identifier (defaults to the Email field)
    #[arg(long)]
    pub(crate) client_id: Option<String>,
    /// Seed for the synthetic financial history
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

/// Evaluate one application with the in-process reference services and print JSON.
pub(crate) async fn run_evaluation(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        file,
        text,
        client_id,
        seed,
    } = args;

    let config = AppConfig::load()?;
    let text = match (file, text) {
        (Some(path), _) => std::fs::read_to_string(path)?,
        (None, Some(text)) => text,
        (None, None) => String::new(),
    };
    let client_id = client_id
        .map(ClientId)
        .unwrap_or_else(|| client_id_for(&text));

    let orchestrator = orchestrator_with(
        reference_gateways(),
        seed.or(config.financial.seed),
        config.gateways.timeout,
    );

    let payload = match orchestrator.process(&client_id, &text).await {
        Ok(result) => json!({
            "status": "success",
            "client_id": client_id.0,
            "client_data": result.client_data,
            "property_evaluation": result.property_evaluation,
            "approval_decision": result.approval_decision,
        }),
        Err(OrchestrationError::NonCompliantProperty { evaluation, .. }) => json!({
            "status": "error",
            "message": "Demande non valide",
            "evaluation": evaluation,
        }),
        Err(other) => return Err(other.into()),
    };

    match serde_json::to_string_pretty(&payload) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => println!("Evaluation unavailable: {err}"),
    }
    Ok(())
}
