use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "verdict")]
#[command(about = "Decision-table rules engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a catalog and run a postfix program against it
    Run {
        /// Path to the decision-table catalog (JSON)
        #[arg(long)]
        catalog: String,
        /// Path to the entity-definition dictionary (JSON)
        #[arg(long)]
        entities: Option<String>,
        /// Path to a JSON object pushed as an input entity
        #[arg(long)]
        input: Option<String>,
        /// Entity-stack name of the input entity
        #[arg(long, default_value = "input")]
        input_name: String,
        /// Dictionary entry to instantiate as the result entity
        #[arg(long, default_value = "result")]
        result: String,
        /// Postfix source to execute (typically a table name)
        source: String,
    },
    /// Evaluate a bare postfix fragment and print the data stack
    Eval {
        /// Postfix source to evaluate
        source: String,
    },
    /// Compile a catalog and report what it contains
    Check {
        /// Path to the decision-table catalog (JSON)
        catalog: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            catalog,
            entities,
            input,
            input_name,
            result,
            source,
        } => commands::run::run(
            &catalog,
            entities.as_deref(),
            input.as_deref(),
            &input_name,
            &result,
            &source,
        ),
        Commands::Eval { source } => commands::eval::run(&source),
        Commands::Check { catalog } => commands::check::run(&catalog),
    }
}
