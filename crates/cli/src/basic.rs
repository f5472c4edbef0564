use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecsrun_aws::config::{resolved_region, AwsSettings};
use ecsrun_aws::ecs::EcsTaskApi;
use ecsrun_aws::logs::LogsApi;
use ecsrun_cli::args::BasicArgs;
use ecsrun_cli::{artifact, output};
use ecsrun_core::taskdef::build_definition;
use ecsrun_core::CoreError;
use ecsrun_runner::{execute_definition, ExecutionSettings};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ecsrun=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Argument errors exit 1 (not clap's default 2); -h/-V exit 0.
    let args = match BasicArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(u8::from(e.use_stderr()));
        }
    };

    // Empty positionals are rejected before any network call.
    if let Err(e) = args.validate() {
        eprintln!("ecsrun-basic error: {e}");
        eprintln!("{}", BasicArgs::command().render_usage());
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ecsrun-basic error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: BasicArgs) -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    let config = AwsSettings::default().load().await;
    let region = resolved_region(&config).ok_or(CoreError::MissingArgument("region"))?;

    let request = build_definition(&args.overrides(region), None)?;

    let path = artifact::document_path(&args.task_name);
    artifact::write_document(&request, &path)?;
    tracing::info!(path = %path.display(), "Wrote task definition document");

    let ecs = EcsTaskApi::new(&config);
    let logs = LogsApi::new(&config);
    let settings = ExecutionSettings::for_cluster(&args.cluster);

    let report = execute_definition(&ecs, &logs, &request, &settings).await?;
    output::print_report(&report);

    Ok(ExitCode::from(report.process_exit_code()))
}
