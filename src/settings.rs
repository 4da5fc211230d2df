use std::path::Path;

use dpr_lib::build::BuildOptions;
use dpr_lib::{Config, DprError, SceneDocument, Viewport};

/// Checks if a flag was present in the command-line arguments.
pub fn flag_present(args: &[String], flag: &str) -> bool {
    args.iter()
        .any(|arg| arg == flag || arg.starts_with(&format!("{flag}=")))
}

/// CLI viewport when `--viewport` was given, else the configured one.
pub fn resolve_viewport(raw_args: &[String], cli_viewport: Viewport, config: &Config) -> Viewport {
    if flag_present(raw_args, "--viewport") {
        cli_viewport
    } else {
        config.viewport
    }
}

/// Load config from a TOML/YAML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/dpr/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, DprError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        DprError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        DprError::Config(prefix)
    })?;
    Ok(cfg)
}

/// In-memory document seeded with the configured fonts and components.
pub fn scene_document(config: &Config, viewport: Viewport) -> SceneDocument {
    let mut doc = SceneDocument::with_fonts(viewport, config.document.font_names());
    for component in &config.document.components {
        doc.register_component(component.clone());
    }
    doc
}

pub fn build_options(config: &Config) -> BuildOptions {
    BuildOptions {
        default_font: config.document.default_font_name(),
    }
}

/// Format effective config as a single-line string.
pub fn format_effective_config(
    config: &Config,
    viewport: &Viewport,
    config_source: Option<&Path>,
) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    format!(
        "Effective config [{source}]: viewport={}x{}, mode={:?}, proxy={}, timeouts: request={}ms, poll={}ms/{}ms, fonts={}, components={}, default_font={}",
        viewport.width,
        viewport.height,
        config.pipeline.mode,
        config.pipeline.proxy_url,
        config.timeouts.request.as_millis(),
        config.timeouts.poll_interval.as_millis(),
        config.timeouts.poll_timeout.as_millis(),
        config.document.fonts.len(),
        config.document.components.len(),
        config.document.default_font
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpr_lib::host::{Document, FontName};
    use dpr_lib::scene::ComponentDef;
    use dpr_lib::NodeKind;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_present_matches_bare_and_assigned_forms() {
        assert!(flag_present(&args(&["dpr", "--viewport", "1x1"]), "--viewport"));
        assert!(flag_present(&args(&["dpr", "--viewport=1x1"]), "--viewport"));
        assert!(!flag_present(&args(&["dpr", "--viewports"]), "--viewport"));
    }

    #[test]
    fn resolve_viewport_prefers_config_when_flag_absent() {
        let mut cfg = Config::default();
        cfg.viewport = Viewport {
            width: 111,
            height: 222,
        };
        let cli = Viewport {
            width: 999,
            height: 999,
        };

        let resolved = resolve_viewport(&args(&["dpr", "render"]), cli, &cfg);
        assert_eq!((resolved.width, resolved.height), (111, 222));

        let explicit = args(&["dpr", "render", "--viewport", "999x999"]);
        let resolved = resolve_viewport(&explicit, cli, &cfg);
        assert_eq!((resolved.width, resolved.height), (999, 999));
    }

    #[test]
    fn scene_document_uses_configured_components() {
        let mut cfg = Config::default();
        cfg.document.components.push(ComponentDef {
            id: "1:2".to_string(),
            key: Some("btn".to_string()),
            name: "Button".to_string(),
            width: 120.0,
            height: 40.0,
        });

        let mut doc = scene_document(&cfg, Viewport::default());
        assert!(doc.component_by_id("1:2").is_some());
        let node = doc.create_node(NodeKind::Frame);
        assert_eq!(doc.geometry(&node).width, 100.0);
    }

    #[test]
    fn build_options_follow_default_font() {
        let mut cfg = Config::default();
        cfg.document.default_font = "Roboto:Regular".to_string();
        assert_eq!(
            build_options(&cfg).default_font,
            FontName::new("Roboto", "Regular")
        );
    }

    #[test]
    fn format_effective_config_includes_key_fields() {
        let cfg = Config::default();
        let summary = format_effective_config(
            &cfg,
            &Viewport {
                width: 1280,
                height: 720,
            },
            Some(Path::new("dpr.toml")),
        );
        assert!(summary.contains("1280x720"));
        assert!(summary.contains("mode=Proxy"));
        assert!(summary.contains("proxy=http://localhost:8000"));
        assert!(summary.contains("request=30000ms"));
        assert!(summary.contains("fonts=4"));
        assert!(summary.contains("dpr.toml"));
    }
}
