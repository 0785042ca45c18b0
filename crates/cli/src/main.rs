// propostas - import financed-sales exports and manage period batches

mod exit_codes;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use propostas_cli::import::load_schema;
use propostas_cli::{import, render, AutoConfirm, Confirm, ImportError, ImportRequest, SourcePreview};
use propostas_config::{ConfigError, Settings};
use propostas_io::FsReader;
use propostas_store::{BatchStore, SqliteStore, StoreError};

use exit_codes::{
    import_exit_code, EXIT_CANCELLED, EXIT_ERROR, EXIT_IO, EXIT_STORE, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "propostas")]
#[command(about = "Import and reconcile financed-sales exports by competency period")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct GlobalArgs {
    /// Settings file (default: <config_dir>/propostas/settings.toml)
    #[arg(long, global = true, env = "PROPOSTAS_CONFIG")]
    config: Option<PathBuf>,

    /// Batch database, overrides storage.database
    #[arg(long, global = true, env = "PROPOSTAS_DB")]
    db: Option<PathBuf>,

    /// Column schema TOML, overrides import.schema
    #[arg(long, global = true)]
    schema: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import one or more exports as the batch for a competency period
    #[command(after_help = "\
Examples:
  propostas import --mes 3 --ano 2024 --vendas Vendas.csv --itens Itens.csv --totalseg Totalseg.xlsx
  propostas import --mes 3 --ano 2024 --itens Itens.csv --encoding windows-1252
  propostas import --mes 3 --ano 2024 --vendas Vendas.csv --yes --json > lote.json")]
    Import(ImportArgs),

    /// Inspect or clear saved batches
    #[command(subcommand)]
    Batches(BatchCommands),
}

#[derive(Args)]
struct ImportArgs {
    /// Competency month (1-12)
    #[arg(long)]
    mes: Option<String>,

    /// Competency year (four digits)
    #[arg(long)]
    ano: Option<String>,

    /// Sales export (semicolon-delimited)
    #[arg(long)]
    vendas: Option<PathBuf>,

    /// Line-item export (semicolon-delimited)
    #[arg(long)]
    itens: Option<PathBuf>,

    /// Insurance export (spreadsheet)
    #[arg(long)]
    totalseg: Option<PathBuf>,

    /// Text encoding of the delimited exports, overrides import.encoding
    #[arg(long)]
    encoding: Option<String>,

    /// Leave unselected sources empty instead of reusing the latest batch
    #[arg(long)]
    no_carry_over: bool,

    /// Accept every preview step without prompting
    #[arg(long, short = 'y')]
    yes: bool,

    /// Print the saved result as JSON to stdout
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum BatchCommands {
    /// List batches, most recent first (* marks the default batch)
    List {
        #[arg(long)]
        json: bool,
    },

    /// Show one batch (default: the most recently saved)
    #[command(after_help = "\
Examples:
  propostas batches show
  propostas batches show 2024-03 --json")]
    Show {
        /// Competency key (YYYY-MM)
        key: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Delete every batch
    Clear {
        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import(args) => cmd_import(&cli.global, args),
        Commands::Batches(cmd) => match cmd {
            BatchCommands::List { json } => cmd_batches_list(&cli.global, json),
            BatchCommands::Show { key, json } => cmd_batches_show(&cli.global, key, json),
            BatchCommands::Clear { yes } => cmd_batches_clear(&cli.global, yes),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // try_init also bridges `log` records from the library crates
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .try_init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn import(err: ImportError) -> Self {
        let hint = match &err {
            ImportError::NoSourceSelected => Some("pass --vendas, --itens and/or --totalseg".to_string()),
            ImportError::MissingPeriod => Some("pass --mes and --ano".to_string()),
            ImportError::SpreadsheetUnavailable => {
                Some("rebuild with the `xlsx` feature to read Totalseg.xlsx".to_string())
            }
            _ => None,
        };
        Self { code: import_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn store(err: StoreError) -> Self {
        match err {
            StoreError::MissingPeriod | StoreError::InvalidPeriod(_) => Self::args(err.to_string()),
            other => Self { code: EXIT_STORE, message: other.to_string(), hint: None },
        }
    }

    pub fn config(err: ConfigError) -> Self {
        Self { code: EXIT_IO, message: err.to_string(), hint: None }
    }

    pub fn json(err: serde_json::Error) -> Self {
        Self { code: EXIT_ERROR, message: format!("cannot encode JSON: {err}"), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Shared setup
// ---------------------------------------------------------------------------

fn load_settings(global: &GlobalArgs) -> Result<Settings, CliError> {
    let result = match &global.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    result.map_err(CliError::config)
}

fn open_store(global: &GlobalArgs, settings: &Settings) -> Result<BatchStore<SqliteStore>, CliError> {
    let path = global.db.clone().unwrap_or_else(|| settings.database_path());
    let kv = SqliteStore::open(&path)
        .map_err(CliError::store)
        .map_err(|e| e.with_hint(format!("database: {}", path.display())))?;
    Ok(BatchStore::new(kv))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(CliError::json)?;
    println!("{text}");
    Ok(())
}

/// Ask a yes/no question on stderr; anything but an explicit yes is no.
fn ask(question: &str) -> bool {
    eprint!("{question}");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes")
}

/// Interactive confirmation: print the preview, wait for an answer.
struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&mut self, preview: &SourcePreview<'_>) -> bool {
        eprint!("{}", render::preview(preview, render::PREVIEW_ROWS));
        let last = preview.step + 1 == preview.steps;
        ask(if last { "Confirmar e salvar? [s/N] " } else { "Confirmar e seguir? [s/N] " })
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_import(global: &GlobalArgs, args: ImportArgs) -> Result<(), CliError> {
    let settings = load_settings(global)?;
    let schema_path = global.schema.clone().or_else(|| settings.import.schema.clone());
    let schema = load_schema(schema_path.as_deref()).map_err(CliError::import)?;
    let mut store = open_store(global, &settings)?;

    let request = ImportRequest {
        mes: args.mes,
        ano: args.ano,
        vendas: args.vendas,
        itens: args.itens,
        totalseg: args.totalseg,
        encoding: args.encoding.unwrap_or_else(|| settings.import.encoding.clone()),
        carry_over: settings.import.carry_over && !args.no_carry_over,
    };

    let mut flow = import(&request, &schema, &FsReader, &store).map_err(CliError::import)?;
    eprint!("{}", render::summary(flow.result(), &flow.period().label()));

    let confirmed = if args.yes {
        flow.run_previews(&mut AutoConfirm)
    } else {
        flow.run_previews(&mut PromptConfirm)
    };
    if !confirmed {
        flow.cancel();
        return Err(CliError {
            code: EXIT_CANCELLED,
            message: "import cancelled, nothing was saved".to_string(),
            hint: None,
        });
    }

    let batch = flow.persist(&mut store).map_err(CliError::import)?;
    eprintln!("lote {} salvo ({})", batch.competencia_label, batch.id);
    if args.json {
        print_json(&batch.data)?;
    }
    Ok(())
}

fn cmd_batches_list(global: &GlobalArgs, json: bool) -> Result<(), CliError> {
    let settings = load_settings(global)?;
    let store = open_store(global, &settings)?;
    let batches = store.list().map_err(CliError::store)?;
    if json {
        return print_json(&batches);
    }
    let last = store.last_key().map_err(CliError::store)?;
    print!("{}", render::batch_list(&batches, last.as_deref()));
    Ok(())
}

fn cmd_batches_show(global: &GlobalArgs, key: Option<String>, json: bool) -> Result<(), CliError> {
    let settings = load_settings(global)?;
    let store = open_store(global, &settings)?;

    let (label, data) = match key {
        Some(key) => {
            let batch = store
                .get_by_key(&key)
                .map_err(CliError::store)?
                .ok_or_else(|| {
                    CliError::args(format!("no batch for '{key}'"))
                        .with_hint("run `propostas batches list`")
                })?;
            (batch.competencia_label, batch.data)
        }
        None => {
            let data = store
                .load()
                .map_err(CliError::store)?
                .ok_or_else(|| CliError::args("no saved batch").with_hint("run `propostas import` first"))?;
            let label = match store.last_key().map_err(CliError::store)? {
                Some(k) if store.get_by_key(&k).map_err(CliError::store)?.is_some() => {
                    propostas_store::Competencia::from_key(&k)
                        .map(|p| p.label())
                        .unwrap_or(k)
                }
                _ => "snapshot".to_string(),
            };
            (label, data)
        }
    };

    if json {
        print_json(&data)
    } else {
        print!("{}", render::summary(&data, &label));
        Ok(())
    }
}

fn cmd_batches_clear(global: &GlobalArgs, yes: bool) -> Result<(), CliError> {
    let settings = load_settings(global)?;
    let mut store = open_store(global, &settings)?;
    if !yes && !ask("Remover todos os lotes? [s/N] ") {
        return Err(CliError {
            code: EXIT_CANCELLED,
            message: "nothing removed".to_string(),
            hint: None,
        });
    }
    store.clear().map_err(CliError::store)?;
    eprintln!("todos os lotes removidos");
    Ok(())
}
