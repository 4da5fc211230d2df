mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_analyze, run_predict, run_render};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let raw_args: Vec<String> = std::env::args().collect();
    let args = cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Predict {
            selection,
            viewport,
            format,
            output,
        } => {
            run_predict(
                &raw_args,
                args.config,
                args.verbose,
                selection,
                viewport,
                format,
                output,
            )
            .await
        }
        Commands::Render {
            input,
            from_response,
            viewport,
            format,
            output,
        } => {
            run_render(
                &raw_args,
                args.config,
                args.verbose,
                input,
                from_response,
                viewport,
                format,
                output,
            )
            .await
        }
        Commands::Analyze {
            selection,
            format,
            output,
        } => run_analyze(args.config, args.verbose, selection, format, output).await,
    }
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--verbose`. Logs go to stderr.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
