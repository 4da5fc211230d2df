use std::sync::Arc;

/// Receives human-readable step messages ("Calling pipeline via proxy...").
pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;
