use std::path::PathBuf;
use std::process::ExitCode;

use dpr_lib::{
    load_summaries, predict, DprError, DprOutput, LayerSummary, PipelineClient, SceneOutput,
    Viewport,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{
    build_options, format_effective_config, load_config, resolve_viewport, scene_document,
};

use super::progress_logger;

/// Run the predict command.
pub async fn run_predict(
    raw_args: &[String],
    config_path: Option<PathBuf>,
    verbose: bool,
    selection: PathBuf,
    viewport: Viewport,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    let viewport = resolve_viewport(raw_args, viewport, &config);
    if verbose {
        eprintln!(
            "{}",
            format_effective_config(&config, &viewport, config_path.as_deref())
        );
        eprintln!("Reading selection from {}\u{2026}", selection.display());
    }

    let layers: Vec<LayerSummary> = match load_summaries(&selection) {
        Ok(layers) => layers,
        Err(err) => return render_error(err, format, output),
    };
    let client = match PipelineClient::new(&config) {
        Ok(client) => client,
        Err(err) => return render_error(err, format, output),
    };

    let progress = progress_logger(verbose);
    let mut doc = scene_document(&config, viewport);
    let options = build_options(&config);
    let prediction = match predict(&client, &mut doc, &layers, &options, progress.as_ref()).await {
        Ok(prediction) => prediction,
        Err(err) => return render_error(err, format, output),
    };

    let body = DprOutput::Predict(SceneOutput::new(prediction, doc.snapshot()));
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(DprError::Unknown(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
