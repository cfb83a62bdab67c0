//! schema-doc CLI - database schema introspection for documentation.

mod prompt;

use clap::{Args, Parser, Subcommand};
use schema_doc::{
    check_output_target, health_check, introspect, list_tables, write_context, Config,
    EngineKind, IntrospectError, JdbcUrl, OutputFormat,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "schema-doc")]
#[command(about = "Introspect MySQL and PostgreSQL schemas into a documentation model")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Never prompt for missing connection values
    #[arg(long)]
    no_prompt: bool,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Connection and filter overrides; explicit flags win over the JDBC URL and
/// the config file.
#[derive(Args, Default)]
struct ConnectionArgs {
    /// JDBC URL, e.g. jdbc:mysql://localhost:3306/shop
    #[arg(long)]
    jdbc: Option<String>,

    /// Engine: mysql, postgres, pg-catalog
    #[arg(long)]
    engine: Option<String>,

    /// Database host
    #[arg(long)]
    host: Option<String>,

    /// Database port
    #[arg(long)]
    port: Option<u16>,

    /// Username
    #[arg(short, long)]
    user: Option<String>,

    /// Password
    #[arg(short, long)]
    password: Option<String>,

    /// Database name
    #[arg(short, long)]
    database: Option<String>,

    /// Schema to introspect
    #[arg(long)]
    schema: Option<String>,

    /// SSL mode: disable, require, verify-ca, verify-full
    #[arg(long)]
    ssl_mode: Option<String>,

    /// Table name pattern to include (repeatable; wins over --exclude)
    #[arg(long)]
    include: Vec<String>,

    /// Table name pattern to exclude (repeatable)
    #[arg(long)]
    exclude: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Introspect the schema and write the rendering context
    Doc {
        /// Output file [default: db-doc.json]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: json or yaml
        #[arg(short, long)]
        format: Option<String>,
    },

    /// List the tables selected by the filter
    Tables,

    /// Test the database connection
    HealthCheck,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), IntrospectError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };

    apply_connection_args(&mut config, &cli.connection)?;

    if prompt::should_prompt(cli.no_prompt) {
        prompt::fill_missing(&mut config)?;
    }

    if let Commands::Doc { output, format } = &cli.command {
        if let Some(path) = output {
            config.output.path = path.clone();
        }
        if let Some(format) = format {
            config.output.format = format.parse::<OutputFormat>()?;
        }
    }

    config.validate()?;
    let filter = config.table_filter()?;

    match cli.command {
        Commands::Doc { .. } => {
            let path = config.output.path.clone();
            check_output_target(&path)?;

            info!("Introspecting {}", config.connection.describe());
            let db = introspect(&config.connection, &filter).await?;
            write_context(&path, &db, config.output.format)?;

            let issues: usize = db.tables().iter().map(|t| t.issues().len()).sum();
            if cli.output_json {
                let summary = serde_json::json!({
                    "database": db.name(),
                    "tables": db.tables().len(),
                    "columns": db.column_count(),
                    "issues": issues,
                    "output": path,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("\nSchema documented!");
                println!("  Database: {}", db.name());
                println!("  Tables: {}", db.tables().len());
                println!("  Columns: {}", db.column_count());
                if issues > 0 {
                    println!("  Columns with unparsed types: {}", issues);
                }
                println!("  Output: {}", path.display());
            }
        }

        Commands::Tables => {
            let tables = list_tables(&config.connection, &filter).await?;

            if cli.output_json {
                let list: Vec<_> = tables
                    .iter()
                    .map(|t| serde_json::json!({ "name": t.name, "comment": t.comment }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                for table in &tables {
                    if table.comment.is_empty() {
                        println!("{}", table.name);
                    } else {
                        println!("{}\t{}", table.name, table.comment);
                    }
                }
            }
        }

        Commands::HealthCheck => {
            let result = health_check(&config.connection).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  {} ({}): OK ({}ms)",
                    config.connection.describe(),
                    result.engine,
                    result.latency_ms
                );
                println!("  Tables visible: {}", result.table_count);
            }
        }
    }

    Ok(())
}

/// Layer the JDBC URL and then explicit flags over the loaded config.
fn apply_connection_args(
    config: &mut Config,
    args: &ConnectionArgs,
) -> Result<(), IntrospectError> {
    if let Some(url) = &args.jdbc {
        config.apply_jdbc(&JdbcUrl::parse(url)?);
    }

    let conn = &mut config.connection;
    if let Some(engine) = &args.engine {
        conn.engine = engine.parse::<EngineKind>()?;
    }
    if let Some(host) = &args.host {
        conn.host = host.clone();
    }
    if let Some(port) = args.port {
        conn.port = Some(port);
    }
    if let Some(user) = &args.user {
        conn.user = user.clone();
    }
    if let Some(password) = &args.password {
        conn.password = password.clone();
    }
    if let Some(database) = &args.database {
        conn.database = database.clone();
    }
    if let Some(schema) = &args.schema {
        conn.schema = Some(schema.clone());
    }
    if let Some(ssl_mode) = &args.ssl_mode {
        conn.ssl_mode = ssl_mode.clone();
    }

    if !args.include.is_empty() {
        config.filter.include = args.include.clone();
    }
    if !args.exclude.is_empty() {
        config.filter.exclude = args.exclude.clone();
    }

    Ok(())
}

/// Install the tracing subscriber on stderr so stdout stays machine readable.
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
