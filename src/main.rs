mod catalog;
mod change_descriptor;
mod cli;
mod diff;
mod error;
mod filter;
mod render;
mod resolver;
mod serialize;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cli::ConnectionArg;
use dotenv::dotenv;
use sqlx::PgPool;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use catalog::Catalog;
use change_descriptor::describe_all;
use diff::diff_all;
use filter::{FilterOptions, filter_steps};
use render::SqlRenderer;
use resolver::debug_render::render_dot;
use serialize::{SerializeOptions, render_script};

#[derive(Parser)]
#[command(author, version, about = "Diffs two live PostgreSQL catalogs and emits an ordered migration", long_about = None)]
struct Cli {
    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug output and dump the resolved dependency graph (DOT) to stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Comma-separated schema-name prefixes to drop from the output (e.g. a managed provider's own schemas)
    #[arg(long, global = true, value_delimiter = ',')]
    ignore_schema_prefix: Vec<String>,

    /// Comma-separated role names to drop from the output (e.g. a managed provider's own roles)
    #[arg(long, global = true, value_delimiter = ',')]
    ignore_role: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum, Debug, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Sql,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two live catalogs and print the differences
    Diff {
        /// Connection URL (or data directory path) for the reference catalog
        main: ConnectionArg,
        /// Connection URL (or data directory path) for the catalog being compared
        branch: ConnectionArg,
        /// Output format: a JSON array of change descriptors, or a SQL script
        #[arg(short = 'O', long, value_enum, default_value = "json")]
        output: OutputFormat,
    },
    /// Compare two live catalogs and apply the generated SQL to `main`
    Migrate {
        /// Connection URL (or data directory path) for the catalog to update
        main: ConnectionArg,
        /// Connection URL (or data directory path) for the desired catalog state
        branch: ConnectionArg,
        /// Print the SQL that would run without executing it
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.debug {
        "debug"
    } else if cli.quiet {
        "error"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    let debug_env = std::env::var("DEBUG").ok().as_deref() == Some("1");
    let level = if debug_env { "debug" } else { default_level };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).init();
}

async fn load_pair(main: &ConnectionArg, branch: &ConnectionArg) -> Result<(Catalog, Catalog)> {
    let main_url = main.connection_string()?;
    let branch_url = branch.connection_string()?;

    info!("connecting to main catalog");
    let main_pool = PgPool::connect(&main_url)
        .await
        .context("failed to connect to the main catalog")?;
    info!("connecting to branch catalog");
    let branch_pool = PgPool::connect(&branch_url)
        .await
        .context("failed to connect to the branch catalog")?;

    let main_catalog = Catalog::load(&main_pool)
        .await
        .context("failed to extract the main catalog")?;
    let branch_catalog = Catalog::load(&branch_pool)
        .await
        .context("failed to extract the branch catalog")?;

    Ok((main_catalog, branch_catalog))
}

fn resolve_steps(
    cli: &Cli,
    main_catalog: &Catalog,
    branch_catalog: &Catalog,
) -> Result<Vec<diff::operations::MigrationStep>> {
    let steps = diff_all(main_catalog, branch_catalog);

    let filter_opts = FilterOptions::new(cli.ignore_schema_prefix.clone(), cli.ignore_role.clone());
    let steps = filter_steps(steps, &filter_opts);

    if cli.debug {
        eprintln!("{}", render_dot(&steps, main_catalog, branch_catalog));
    }

    let ordered = resolver::order(steps, main_catalog, branch_catalog)
        .context("failed to order migration steps")?;
    Ok(ordered)
}

async fn run_diff(
    cli: &Cli,
    main: &ConnectionArg,
    branch: &ConnectionArg,
    output: OutputFormat,
) -> Result<()> {
    let (main_catalog, branch_catalog) = load_pair(main, branch).await?;
    let ordered = resolve_steps(cli, &main_catalog, &branch_catalog)?;

    match output {
        OutputFormat::Json => {
            let descriptors = describe_all(&ordered);
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
        }
        OutputFormat::Sql => {
            let script = render_script(&ordered, SerializeOptions::default(), &main_catalog.context);
            println!("{script}");
        }
    }

    Ok(())
}

async fn run_migrate(cli: &Cli, main: &ConnectionArg, branch: &ConnectionArg, dry_run: bool) -> Result<()> {
    let main_url = main.connection_string()?;
    let (main_catalog, branch_catalog) = load_pair(main, branch).await?;
    let ordered = resolve_steps(cli, &main_catalog, &branch_catalog)?;

    if ordered.is_empty() {
        info!("no differences found, nothing to migrate");
        return Ok(());
    }

    let wrap_in_transaction = ordered.iter().all(|s| s.allows_transaction());
    let script = render_script(&ordered, SerializeOptions::default(), &main_catalog.context);

    if dry_run {
        println!("{script}");
        return Ok(());
    }

    let pool = PgPool::connect(&main_url)
        .await
        .context("failed to connect to the main catalog for migration")?;

    debug!(wrap_in_transaction, "executing migration script");

    if wrap_in_transaction {
        let mut tx = pool.begin().await?;
        for step in &ordered {
            for rendered in step.to_sql() {
                sqlx::query(&rendered.sql)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!("failed executing statement: {}", rendered.sql))?;
            }
        }
        tx.commit().await?;
    } else {
        for step in &ordered {
            for rendered in step.to_sql() {
                sqlx::query(&rendered.sql)
                    .execute(&pool)
                    .await
                    .with_context(|| format!("failed executing statement: {}", rendered.sql))?;
            }
        }
    }

    info!(statement_count = ordered.len(), "migration applied");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = match &cli.command {
        Commands::Diff {
            main,
            branch,
            output,
        } => run_diff(&cli, main, branch, *output).await,
        Commands::Migrate {
            main,
            branch,
            dry_run,
        } => run_migrate(&cli, main, branch, *dry_run).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}
