use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecsrun_aws::config::{resolved_region, AwsSettings};
use ecsrun_aws::ecs::EcsTaskApi;
use ecsrun_aws::logs::LogsApi;
use ecsrun_cli::args::RunArgs;
use ecsrun_cli::output;
use ecsrun_core::CoreError;
use ecsrun_runner::{run_one_off, ExecutionSettings};

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
    let args = match RunArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(u8::from(e.use_stderr()));
        }
    };

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ecsrun error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: RunArgs) -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    let aws = AwsSettings {
        profile: args.profile.clone(),
        region: args.region.clone(),
    };
    let config = aws.load().await;
    let region = resolved_region(&config).ok_or(CoreError::MissingArgument("region"))?;

    let overrides = args.overrides(region);
    let mut settings = ExecutionSettings::for_cluster(&args.cluster);
    settings.network = args.network();

    let ecs = EcsTaskApi::new(&config);
    let logs = LogsApi::new(&config);

    let report = run_one_off(&ecs, &logs, &overrides, Some(&args.from_task), &settings).await?;
    output::print_report(&report);

    Ok(ExitCode::from(report.process_exit_code()))
}
