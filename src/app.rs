//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - validates configuration before anything is served
//! - dispatches to the server, the terminal summary or the sample writer

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::{Cli, Command, DatasetArgs, SampleArgs, ServeArgs};
use crate::error::AppError;

pub mod pipeline;

const DEFAULT_LOG_FILTER: &str = "power_ts=info,tower_http=info";

/// Entry point for the `pwr` binary.
pub async fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    // `pwr` and `pwr --port 9000` behave like `pwr serve ...`. Clap requires a
    // subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    match cli.command {
        Command::Serve(args) => handle_serve(args).await,
        Command::Summary(args) => handle_summary(args).await,
        Command::Sample(args) => handle_sample(args),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();
}

async fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    let dataset = args.dataset.to_config();
    dataset.validate()?;
    let server = args.server_config();
    server.socket_addr()?;

    // A missing file is reported per request; a present one must have the
    // expected header before the server starts.
    if dataset.path.exists() {
        crate::io::check_schema(&dataset)?;
    } else {
        tracing::warn!(
            path = %dataset.path.display(),
            "dataset file not found; /fetch-dataset will fail until it exists"
        );
    }

    crate::server::serve(&server, dataset).await
}

async fn handle_summary(args: DatasetArgs) -> Result<(), AppError> {
    let config = args.to_config();
    config.validate()?;
    if !config.path.exists() {
        return Err(AppError::precondition(crate::data::store::FILE_MISSING));
    }

    let table = tokio::task::spawn_blocking(move || crate::data::store::load_table(&config))
        .await
        .map_err(|e| AppError::failed(format!("Dataset loader task failed: {e}")))??;

    let info = pipeline::data_info(&table);
    println!("{}", info.info);
    println!("{}", crate::report::format_description(&info.description));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = args.to_config();
    let rows = crate::data::sample::write_sample_file(&args.output, &config)?;
    tracing::info!(rows, path = %args.output.display(), "wrote sample dataset");
    println!("Wrote {rows} rows to {}", args.output.display());
    Ok(())
}

/// Rewrite argv so `pwr` defaults to `pwr serve`.
///
/// Rules:
/// - `pwr`                      -> `pwr serve`
/// - `pwr --port 9000 ...`      -> `pwr serve --port 9000 ...`
/// - `pwr --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("serve".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "serve".to_string());
    }
    argv
}
