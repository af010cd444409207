use anyhow::{Context, Result};
use bqctl::config::Config;
use bqctl::gcp::auth::GcpCredentials;
use bqctl::gcp::client::GcpClient;
use bqctl::gcp::http::format_gcp_error;
use bqctl::{
    BigqueryClient, BigqueryError, CreateDatasetOptions, Dataset, DatasetCrud, DatasetReference,
    DeleteDatasetOptions, ListDatasetsOptions, RestBackend,
};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use futures::{StreamExt, TryStreamExt};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Environment variable holding a pre-minted access token
const TOKEN_ENV: &str = "BIGQUERY_ACCESS_TOKEN";

/// Manage BigQuery datasets
#[derive(Parser, Debug)]
#[command(name = "bqctl", version, about, long_about = None)]
struct Args {
    /// Default project for bare dataset ids
    #[arg(short, long, global = true)]
    project: Option<String>,

    /// BigQuery API base URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Access token to use instead of Application Default Credentials
    #[arg(long, global = true)]
    token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 60)]
    timeout: u64,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a dataset
    Get { dataset: DatasetArg },

    /// List datasets in a project
    List {
        /// Label filter, e.g. labels.env:prod
        #[arg(long)]
        filter: Option<String>,

        /// Page size hint
        #[arg(long)]
        page_size: Option<u32>,

        /// Include hidden datasets
        #[arg(long)]
        all: bool,

        /// Stop after this many datasets
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Create a dataset
    Create {
        dataset: DatasetArg,

        #[command(flatten)]
        metadata: MetadataArgs,
    },

    /// Show a dataset, creating it first if it doesn't exist
    GetOrCreate {
        dataset: DatasetArg,

        #[command(flatten)]
        metadata: MetadataArgs,
    },

    /// Delete a dataset
    Delete {
        dataset: DatasetArg,

        /// Also delete all tables in the dataset
        #[arg(long)]
        delete_contents: bool,
    },

    /// Save the default project to the config file
    SetProject { project: String },
}

#[derive(ClapArgs, Debug)]
struct MetadataArgs {
    #[arg(long)]
    friendly_name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Dataset location, e.g. EU or us-central1
    #[arg(long)]
    location: Option<String>,

    /// Label as key=value, may be repeated
    #[arg(long = "label", value_parser = parse_label)]
    labels: Vec<(String, String)>,
}

impl MetadataArgs {
    fn into_options(self) -> CreateDatasetOptions {
        CreateDatasetOptions {
            friendly_name: self.friendly_name,
            description: self.description,
            location: self.location,
            labels: self.labels.into_iter().collect::<BTreeMap<_, _>>(),
        }
    }

    fn is_empty(&self) -> bool {
        self.friendly_name.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.labels.is_empty()
    }
}

fn parse_label(value: &str) -> std::result::Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, val)) if !key.is_empty() => Ok((key.to_string(), val.to_string())),
        _ => Err(format!("expected key=value, got `{}`", value)),
    }
}

/// A dataset given either as a bare id or as `project:dataset`
#[derive(Debug, Clone)]
enum DatasetArg {
    Bare(String),
    Qualified(DatasetReference),
}

impl FromStr for DatasetArg {
    type Err = BigqueryError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        if value.contains(':') || value.contains('.') {
            value.parse().map(Self::Qualified)
        } else {
            Ok(Self::Bare(value.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("bqctl started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("bqctl").join("bqctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".bqctl").join("bqctl.log");
    }
    PathBuf::from("bqctl.log")
}

async fn build_client(args: &Args, config: &Config) -> Result<BigqueryClient<RestBackend>> {
    let token = args
        .token
        .clone()
        .or_else(|| std::env::var(TOKEN_ENV).ok());
    let credentials = match token {
        Some(token) => GcpCredentials::from_token(token),
        None => GcpCredentials::new().await?,
    };

    let endpoint = config.effective_endpoint(args.endpoint.as_deref());
    let gcp = GcpClient::with_endpoint(credentials, &endpoint, Duration::from_secs(args.timeout))?;

    let project = config.effective_project(args.project.as_deref());
    match &project {
        Some(project) => tracing::info!("Using project: {}, endpoint: {}", project, gcp.endpoint()),
        None => tracing::warn!("No default project configured"),
    }

    Ok(BigqueryClient::new(RestBackend::new(gcp), project))
}

fn format_labels(labels: &BTreeMap<String, String>) -> String {
    if labels.is_empty() {
        return "-".to_string();
    }
    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

fn table_row(dataset: &Dataset) -> String {
    let created = dataset
        .created_at()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<40} {:<16} {:<17} {}",
        dataset.reference.to_string(),
        dataset.location.as_deref().unwrap_or("-"),
        created,
        format_labels(&dataset.labels)
    )
}

fn table_header() -> String {
    format!("{:<40} {:<16} {:<17} {}", "DATASET", "LOCATION", "CREATED", "LABELS")
}

fn print_datasets(format: OutputFormat, datasets: &[Dataset]) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", table_header());
            for dataset in datasets {
                println!("{}", table_row(dataset));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(datasets)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(datasets)?),
    }
    Ok(())
}

fn print_dataset(format: OutputFormat, dataset: &Dataset) -> Result<()> {
    match format {
        OutputFormat::Table => print_datasets(format, std::slice::from_ref(dataset)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(dataset)?);
            Ok(())
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(dataset)?);
            Ok(())
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();

    if let Command::SetProject { project } = &args.command {
        config.set_project(project)?;
        println!("Default project set to {}", project);
        return Ok(());
    }

    let client = build_client(&args, &config).await?;

    match args.command {
        Command::Get { dataset } => {
            let dataset = match dataset {
                DatasetArg::Bare(id) => client.get_dataset(&id).await?,
                DatasetArg::Qualified(reference) => client.get_dataset_ref(&reference).await?,
            };
            print_dataset(args.output, &dataset)?;
        }
        Command::List {
            filter,
            page_size,
            all,
            limit,
        } => {
            let options = ListDatasetsOptions {
                page_size: page_size.or(config.page_size),
                filter,
                all,
            };
            let stream = client.list_datasets(options)?;
            let stream = match limit {
                Some(limit) => stream.take(limit).boxed(),
                None => stream,
            };

            match args.output {
                OutputFormat::Table => {
                    println!("{}", table_header());
                    let mut stream = stream;
                    while let Some(dataset) = stream.try_next().await? {
                        println!("{}", table_row(&dataset));
                    }
                }
                format => {
                    let datasets: Vec<Dataset> = stream.try_collect().await?;
                    print_datasets(format, &datasets)?;
                }
            }
        }
        Command::Create { dataset, metadata } => {
            let dataset = match dataset {
                DatasetArg::Bare(id) if metadata.is_empty() => client.create_dataset(&id).await?,
                DatasetArg::Bare(id) => {
                    let reference = client.resolver().resolve_dataset(None, &id)?;
                    client
                        .create_dataset_ref(&reference, metadata.into_options())
                        .await?
                }
                DatasetArg::Qualified(reference) => {
                    client
                        .create_dataset_ref(&reference, metadata.into_options())
                        .await?
                }
            };
            print_dataset(args.output, &dataset)?;
        }
        Command::GetOrCreate { dataset, metadata } => {
            let dataset = match dataset {
                DatasetArg::Bare(id) if metadata.is_empty() => {
                    client.get_or_create_dataset(&id).await?
                }
                DatasetArg::Bare(id) => {
                    let reference = client.resolver().resolve_dataset(None, &id)?;
                    client
                        .get_or_create_dataset_ref(&reference, metadata.into_options())
                        .await?
                }
                DatasetArg::Qualified(reference) => {
                    client
                        .get_or_create_dataset_ref(&reference, metadata.into_options())
                        .await?
                }
            };
            print_dataset(args.output, &dataset)?;
        }
        Command::Delete {
            dataset,
            delete_contents,
        } => {
            let reference = match dataset {
                DatasetArg::Bare(id) => client.resolver().resolve_dataset(None, &id)?,
                DatasetArg::Qualified(reference) => reference,
            };
            client
                .delete_dataset_ref(&reference, DeleteDatasetOptions { delete_contents })
                .await?;
            println!("Deleted {}", reference);
        }
        Command::SetProject { .. } => unreachable!("handled before the client is built"),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: {err:#}");
            None
        }
    };

    if let Err(err) = run(args).await {
        match err.downcast_ref::<BigqueryError>() {
            Some(bq_err) => eprintln!("Error: {}", format_gcp_error(bq_err)),
            None => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }
}
