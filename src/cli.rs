//! Command-line interface for authentiscan.

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::gateway::{Gateway, Outcome};
use crate::model::{AnalysisRequest, ImagePayload};
use crate::report;
use crate::server;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_INVALID_INPUT: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// AI content detection gateway.
///
/// Classifies text and images as AI-generated or human/authentic by
/// delegating to external model providers. When a provider is unavailable a
/// clearly-labelled synthetic result is returned instead of an error.
#[derive(Parser)]
#[command(name = "authentiscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP analysis server
    Serve(ServeArgs),
    /// Analyze a piece of text
    Text(TextArgs),
    /// Analyze an image, optionally against an original
    Image(ImageArgs),
    /// Write a configuration file from the template
    Init(InitArgs),
}

/// Options shared by every command that loads configuration.
#[derive(Args)]
pub struct ConfigArgs {
    /// Path to configuration YAML (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the serve command.
#[derive(Parser)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Address to listen on (overrides server.bind)
    #[arg(short, long)]
    pub bind: Option<String>,
}

/// Arguments for the text command.
#[derive(Parser)]
pub struct TextArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Text to analyze
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the text from a file ("-" for stdin)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the image command.
#[derive(Parser)]
pub struct ImageArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Image to analyze
    pub image: PathBuf,

    /// Original image to compare against
    #[arg(long)]
    pub original: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "authentiscan.yaml")]
    pub output: PathBuf,
}

fn load_config(args: &ConfigArgs) -> Option<Config> {
    match Config::load(args.config.as_deref()) {
        Ok((config, path)) => {
            match path {
                Some(p) => tracing::debug!(path = %p.display(), "loaded configuration"),
                None => tracing::debug!("no configuration file found, using defaults"),
            }
            Some(config)
        }
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            eprintln!("Run 'authentiscan init' to create a configuration file");
            None
        }
    }
}

fn validate_format(format: &str) -> bool {
    if format != "pretty" && format != "json" {
        eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", format);
        return false;
    }
    true
}

/// Run the serve command.
pub async fn run_serve(args: &ServeArgs) -> anyhow::Result<i32> {
    let Some(config) = load_config(&args.config) else {
        return Ok(EXIT_ERROR);
    };
    server::serve(&config, args.bind.as_deref()).await?;
    Ok(EXIT_SUCCESS)
}

/// Run the text command.
pub async fn run_text(args: &TextArgs) -> anyhow::Result<i32> {
    if !validate_format(&args.format) {
        return Ok(EXIT_ERROR);
    }
    let Some(config) = load_config(&args.config) else {
        return Ok(EXIT_ERROR);
    };

    let (subject, text) = match (&args.text, &args.file) {
        (Some(text), _) => ("<argument>".to_string(), text.clone()),
        (None, Some(path)) => match read_text(path) {
            Ok(text) => (path.display().to_string(), text),
            Err(e) => {
                eprintln!("Error: cannot read {:?}: {}", path, e);
                return Ok(EXIT_ERROR);
            }
        },
        (None, None) => ("<argument>".to_string(), String::new()),
    };

    let gateway = Gateway::from_config(&config)?;
    let outcome = gateway.analyze_text(&AnalysisRequest::text(text)).await;
    emit(&args.format, &subject, &outcome)
}

/// Run the image command.
pub async fn run_image(args: &ImageArgs) -> anyhow::Result<i32> {
    if !validate_format(&args.format) {
        return Ok(EXIT_ERROR);
    }
    let Some(config) = load_config(&args.config) else {
        return Ok(EXIT_ERROR);
    };

    let image = match read_image(&args.image) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error: cannot read {:?}: {}", args.image, e);
            return Ok(EXIT_ERROR);
        }
    };
    let mut request = AnalysisRequest::image(image);
    if let Some(path) = &args.original {
        match read_image(path) {
            Ok(original) => request = request.with_reference(original),
            Err(e) => {
                eprintln!("Error: cannot read {:?}: {}", path, e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    let gateway = Gateway::from_config(&config)?;
    let outcome = gateway.analyze_image(&request).await;
    emit(&args.format, &args.image.display().to_string(), &outcome)
}

fn read_text(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
}

fn read_image(path: &Path) -> std::io::Result<ImagePayload> {
    let bytes = std::fs::read(path)?;
    Ok(ImagePayload::new(bytes, None))
}

fn emit(format: &str, subject: &str, outcome: &Outcome) -> anyhow::Result<i32> {
    match format {
        "json" => report::write_json(outcome)?,
        _ => report::write_pretty(subject, outcome),
    }
    match outcome {
        Outcome::ValidationFailed(_) => Ok(EXIT_INVALID_INPUT),
        _ => Ok(EXIT_SUCCESS),
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, config::TEMPLATE) {
        eprintln!("Error: failed to write configuration: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Export OPENAI_API_KEY and REPLICATE_API_TOKEN");
    println!("  2. Run: authentiscan serve --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_command() {
        let cli = Cli::try_parse_from(["authentiscan", "text", "hello world", "-f", "json"]).unwrap();
        match cli.command {
            Commands::Text(args) => {
                assert_eq!(args.text.as_deref(), Some("hello world"));
                assert_eq!(args.format, "json");
                assert!(args.config.config.is_none());
            }
            _ => panic!("expected text command"),
        }
    }

    #[test]
    fn test_text_and_file_conflict() {
        let parsed = Cli::try_parse_from(["authentiscan", "text", "hi", "--file", "a.txt"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_image_command() {
        let cli = Cli::try_parse_from([
            "authentiscan",
            "image",
            "suspect.png",
            "--original",
            "orig.png",
            "--config",
            "cfg.yaml",
        ])
        .unwrap();
        match cli.command {
            Commands::Image(args) => {
                assert_eq!(args.image, PathBuf::from("suspect.png"));
                assert_eq!(args.original, Some(PathBuf::from("orig.png")));
                assert_eq!(args.config.config, Some(PathBuf::from("cfg.yaml")));
            }
            _ => panic!("expected image command"),
        }
    }

    #[test]
    fn test_init_writes_template_once() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("authentiscan.yaml");
        let args = InitArgs {
            output: output.clone(),
        };

        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, config::TEMPLATE);

        // Refuses to overwrite
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_validate_format() {
        assert!(validate_format("pretty"));
        assert!(validate_format("json"));
        assert!(!validate_format("sarif"));
    }
}
