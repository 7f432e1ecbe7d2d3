use crate::evaluate::{run_evaluation, EvaluateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_orchestrator::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Orchestrator",
    about = "Evaluate free-text loan applications against the scoring services",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the orchestrator HTTP service (default command)
    Serve(ServeArgs),
    /// Host the reference scoring services over JSON RPC
    Scoring(ScoringArgs),
    /// Run one application through the reference services and print the result
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoringArgs {
    /// Override the configured host for the scoring server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Port the scoring services listen on
    #[arg(long, default_value_t = 8000)]
    pub(crate) port: u16,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Scoring(args) => server::run_scoring(args).await,
        Command::Evaluate(args) => run_evaluation(args).await,
    }
}
