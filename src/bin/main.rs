//! Tundra CLI - build the warehouse schema context for SQL generation
//!
//! Usage:
//!   tundra context [--config <file>] [--annotations <file>] [--with-annotations]
//!   tundra prompt <question> [--config <file>]
//!   tundra annotations <file>
//!
//! Examples:
//!   tundra context --format json
//!   tundra prompt "Show top 5 categories by revenue last month"
//!   tundra annotations metadata/db_schema.yml

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use tundra::config::{LoggingSettings, Settings, WarehouseConfig};
use tundra::prompt::PromptTemplate;
use tundra::{logging, Catalog, CatalogBuilder, SchemaAnnotationLoader, SchemaIntrospector, WorkerConnector};

#[derive(Parser)]
#[command(name = "tundra")]
#[command(about = "Tundra - schema context for natural-language SQL over Snowflake")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the merged catalog and print the schema context
    Context {
        #[command(flatten)]
        build: BuildArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the full prompt that would be sent for a question
    Prompt {
        /// The natural-language question
        question: String,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Validate an annotation document and list its tables
    Annotations {
        /// Path to the YAML annotation document
        file: PathBuf,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Path to the config file (defaults to tundra.toml / $TUNDRA_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Annotation document (overrides annotations.path)
    #[arg(short, long)]
    annotations: Option<PathBuf>,

    /// Include column types and descriptions in the context
    #[arg(long)]
    with_annotations: bool,

    /// Upper bound on the context size
    #[arg(long)]
    max_chars: Option<usize>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// One line per table
    Text,
    /// The merged catalog as JSON
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Context { build, format } => cmd_context(build, format).await,
        Commands::Prompt { question, build } => cmd_prompt(question, build).await,
        Commands::Annotations { file } => cmd_annotations(file),
    }
}

/// Load settings and apply command-line overrides.
fn load_settings(args: &BuildArgs) -> Result<Settings, String> {
    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
    .map_err(|e| format!("Error loading config: {}", e))?;

    if let Some(path) = &args.annotations {
        settings.annotations.path = path.clone();
    }
    if args.with_annotations {
        settings.context.include_annotations = true;
    }
    if args.max_chars.is_some() {
        settings.context.max_chars = args.max_chars;
    }

    init_logging(&settings.logging);
    Ok(settings)
}

fn init_logging(settings: &LoggingSettings) {
    if let Err(e) = logging::init(settings) {
        eprintln!("Warning: logging disabled: {}", e);
    }
}

async fn build_catalog(settings: &Settings) -> Result<Catalog, String> {
    let warehouse = if settings.warehouse.is_empty() {
        WarehouseConfig::from_env()
    } else {
        WarehouseConfig::from_settings(&settings.warehouse)
    }
    .map_err(|e| format!("Error in warehouse configuration: {}", e))?;

    let connector = WorkerConnector::from_settings(&settings.worker)
        .map_err(|e| format!("Error locating worker: {}", e))?;

    let merge_options = settings.merge.options(&warehouse.schema);
    let builder = CatalogBuilder::new(
        SchemaIntrospector::new(connector, warehouse),
        SchemaAnnotationLoader::new(&settings.annotations.path),
    )
    .with_merge_options(merge_options);

    builder
        .build()
        .await
        .map_err(|e| format!("{}\n  caused by: {}", e.user_message(), e))
}

async fn cmd_context(args: BuildArgs, format: OutputFormat) -> ExitCode {
    let result = async {
        let settings = load_settings(&args)?;
        let catalog = build_catalog(&settings).await?;
        match format {
            OutputFormat::Text => Ok(settings.context.renderer().render(&catalog)),
            OutputFormat::Json => serde_json::to_string_pretty(&catalog)
                .map_err(|e| format!("Error serializing catalog: {}", e)),
        }
    }
    .await;

    match result {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_prompt(question: String, args: BuildArgs) -> ExitCode {
    let result = async {
        let settings = load_settings(&args)?;
        let catalog = build_catalog(&settings).await?;
        let context = settings.context.renderer().render(&catalog);
        Ok::<_, String>(PromptTemplate::default().render(&context, &question))
    }
    .await;

    match result {
        Ok(prompt) => {
            print!("{}", prompt);
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn cmd_annotations(file: PathBuf) -> ExitCode {
    // Duplicate-table warnings come through the log.
    let logging_settings = Settings::load().map(|s| s.logging).unwrap_or_default();
    init_logging(&logging_settings);

    let catalog = match SchemaAnnotationLoader::new(&file).load() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("File: {}", file.display());
    println!();

    if catalog.is_empty() {
        println!("No tables defined.");
        return ExitCode::SUCCESS;
    }

    println!("Tables:");
    for table in &catalog {
        let described = table
            .columns
            .iter()
            .filter(|c| !c.annotation.is_empty())
            .count();
        println!(
            "  - {} ({} columns, {} described)",
            table.qualified_name,
            table.columns.len(),
            described
        );
    }

    ExitCode::SUCCESS
}
