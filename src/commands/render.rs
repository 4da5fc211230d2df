use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde_json::Value;

use dpr_lib::response::parse_actions;
use dpr_lib::{interpret_response, materialize, DprError, DprOutput, SceneOutput, Viewport};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{
    build_options, format_effective_config, load_config, resolve_viewport, scene_document,
};

use super::progress_logger;

/// Run the render command.
#[allow(clippy::too_many_arguments)]
pub async fn run_render(
    raw_args: &[String],
    config_path: Option<PathBuf>,
    verbose: bool,
    input: PathBuf,
    from_response: bool,
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
        eprintln!("Reading AI output from {}\u{2026}", input.display());
    }

    let actions = match read_actions(&input, from_response) {
        Ok(actions) => actions,
        Err(err) => return render_error(err, format, output),
    };

    let progress = progress_logger(verbose);
    let mut doc = scene_document(&config, viewport);
    let options = build_options(&config);
    let prediction = match materialize(&mut doc, actions, &options, progress.as_ref()).await {
        Ok(prediction) => prediction,
        Err(err) => return render_error(err, format, output),
    };

    let body = DprOutput::Render(SceneOutput::new(prediction, doc.snapshot()));
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(DprError::Unknown(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}

/// Raw AI text, or a saved pipeline response when `from_response` is set.
fn read_actions(path: &Path, from_response: bool) -> Result<Vec<Value>, DprError> {
    if !path.exists() {
        return Err(DprError::Config(format!(
            "Input file not found: {}",
            path.display()
        )));
    }
    let contents = std::fs::read_to_string(path)?;
    if from_response {
        let response: Value = serde_json::from_str(&contents)?;
        interpret_response(&response)
    } else {
        parse_actions(&contents)
    }
}
