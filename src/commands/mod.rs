mod analyze;
mod predict;
mod render;

use std::sync::Arc;

use dpr_lib::ProgressCallback;

pub use analyze::run_analyze;
pub use predict::run_predict;
pub use render::run_render;

/// Step messages go to stderr only in verbose mode.
fn progress_logger(verbose: bool) -> Option<ProgressCallback> {
    if verbose {
        Some(Arc::new(|msg: &str| eprintln!("{msg}")))
    } else {
        None
    }
}
