use clap::{Parser, Subcommand, ValueEnum};
use dpr_lib::Viewport;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dpr")]
#[command(
    version,
    about = "Design Predictor - Build AI-suggested design nodes from a selection",
    long_about = "Design Predictor (DPR)\n\nModes:\n- predict: send a selection to the AI pipeline and build the suggested nodes.\n- render: build nodes offline from saved AI output or a saved pipeline response.\n- analyze: request design feedback for selected frames or groups.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML or YAML) for pipeline, timeouts, fonts and components; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the AI pipeline for nodes that complete a selection
    Predict {
        #[arg(
            long,
            value_name = "PATH",
            help = "JSON file with layer summaries ({name,type,x,y,w,h})"
        )]
        selection: PathBuf,

        #[arg(
            long,
            default_value = "1440x900",
            help = "Viewport dimensions (WIDTHxHEIGHT)"
        )]
        viewport: Viewport,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Build nodes from saved AI output without calling the pipeline
    Render {
        #[arg(
            long,
            value_name = "PATH",
            help = "AI output text (fenced or bare JSON action list)"
        )]
        input: PathBuf,

        #[arg(
            long,
            help = "Treat the input as a full pipeline response and extract the output text first"
        )]
        from_response: bool,

        #[arg(
            long,
            default_value = "1440x900",
            help = "Viewport dimensions (WIDTHxHEIGHT)"
        )]
        viewport: Viewport,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Request design feedback for selected frames or groups
    Analyze {
        #[arg(
            long,
            value_name = "PATH",
            help = "JSON file with design summaries ({name,type,width,height,children})"
        )]
        selection: PathBuf,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}
