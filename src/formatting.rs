use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use dpr_lib::output::DPR_OUTPUT_VERSION;
use dpr_lib::scene::SceneTree;
use dpr_lib::{DprError, DprOutput, ErrorOutput, SceneOutput};

use crate::cli::OutputFormat;

/// Write output in the requested format.
pub fn write_output(
    body: &DprOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: DprError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let error_payload = err.to_payload();
    let payload = DprOutput::Error(ErrorOutput {
        version: DPR_OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    ExitCode::from(2)
}

/// Write JSON output to file or stdout.
fn write_json_output(
    body: &DprOutput,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Write pretty output to file or stdout.
fn write_pretty_output(body: &DprOutput, output: Option<&Path>) -> io::Result<()> {
    let stdout_is_tty = std::io::stdout().is_terminal();
    let use_human = output.is_none() && stdout_is_tty;

    if use_human {
        let content = format_pretty(body, true);
        println!("{content}");
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &DprOutput, colorize: bool) -> String {
    match body {
        DprOutput::Predict(out) => format_scene("[PREDICT]", out, colorize),
        DprOutput::Render(out) => format_scene("[RENDER]", out, colorize),
        DprOutput::Analyze(out) => {
            let mut buf = String::new();
            let header = color("[ANALYZE]", "34", colorize);
            writeln!(buf, "{} Feedback for {} design(s)", header, out.designs).ok();
            writeln!(buf, "{}", out.feedback).ok();
            buf
        }
        DprOutput::Error(out) => {
            let mut buf = String::new();
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or_else(|| out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
            buf
        }
    }
}

fn format_scene(label: &str, out: &SceneOutput, colorize: bool) -> String {
    let mut buf = String::new();
    let summary = &out.summary;
    let header = color(label, "36", colorize);
    writeln!(
        buf,
        "{} Built {} node(s) from {} action(s) (skipped {}, failed {})",
        header,
        summary.built,
        out.actions.len(),
        summary.skipped,
        summary.failed
    )
    .ok();

    let viewport = out.scene.viewport;
    match out.scene.frame {
        Some(frame) => writeln!(
            buf,
            "Viewport: {} centered on ({:.0}, {:.0}) at {:.0}%",
            viewport,
            frame.center_x,
            frame.center_y,
            frame.zoom * 100.0
        )
        .ok(),
        None => writeln!(buf, "Viewport: {}", viewport).ok(),
    };

    if !out.scene.nodes.is_empty() {
        writeln!(buf, "Nodes:").ok();
        for tree in &out.scene.nodes {
            write_tree(&mut buf, tree, 0);
        }
    }

    if !summary.warnings.is_empty() {
        writeln!(buf, "{}", color("Warnings:", "33", colorize)).ok();
        for warning in &summary.warnings {
            writeln!(buf, "- {warning}").ok();
        }
    }
    buf
}

fn write_tree(buf: &mut String, tree: &SceneTree, depth: usize) {
    let node = &tree.node;
    writeln!(
        buf,
        "{:indent$}- {} \"{}\" {}x{} at ({}, {})",
        "",
        node.kind,
        node.name,
        node.width,
        node.height,
        node.x,
        node.y,
        indent = depth * 2
    )
    .ok();
    for child in &tree.children {
        write_tree(buf, child, depth + 1);
    }
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}
