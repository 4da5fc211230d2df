use std::path::PathBuf;
use std::process::ExitCode;

use dpr_lib::output::DPR_OUTPUT_VERSION;
use dpr_lib::{load_summaries, AnalyzeOutput, DesignSummary, DprError, DprOutput, PipelineClient};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::load_config;

use super::progress_logger;

/// Run the analyze command.
pub async fn run_analyze(
    config_path: Option<PathBuf>,
    verbose: bool,
    selection: PathBuf,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    if verbose {
        eprintln!("Reading selection from {}\u{2026}", selection.display());
    }

    let designs: Vec<DesignSummary> = match load_summaries(&selection) {
        Ok(designs) => designs,
        Err(err) => return render_error(err, format, output),
    };
    let client = match PipelineClient::new(&config) {
        Ok(client) => client,
        Err(err) => return render_error(err, format, output),
    };

    let progress = progress_logger(verbose);
    let feedback = match client.analyze(&designs, progress.as_ref()).await {
        Ok(feedback) => feedback,
        Err(err) => return render_error(err, format, output),
    };

    let body = DprOutput::Analyze(AnalyzeOutput {
        version: DPR_OUTPUT_VERSION.to_string(),
        designs: designs.len(),
        feedback,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(DprError::Unknown(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
