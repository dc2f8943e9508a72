use clap::{Parser, Subcommand};
use cmdbridge::{Backend, Bridge, Config, DispatchUnit};
use serde_json::Value;
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cmdbridge")]
#[command(about = "Translate placeholder statements into native backend requests", long_about = None)]
struct Args {
    /// Directory holding cmdbridge.toml and an optional .env
    #[arg(long, global = true, default_value = ".")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement and report its commands and placeholders
    Inspect {
        /// Backend grammar (defaults to the configured backend)
        #[arg(long, short, value_enum)]
        backend: Option<Backend>,

        /// Statement text; read from stdin when omitted
        statement: Option<String>,
    },

    /// Bind arguments and print the dispatch units as JSON
    Emit {
        /// Backend grammar (defaults to the configured backend)
        #[arg(long, short, value_enum)]
        backend: Option<Backend>,

        /// Statement text; read from stdin when omitted
        statement: Option<String>,

        /// One JSON argument, repeatable, bound in order
        #[arg(long = "arg")]
        arg: Vec<String>,

        /// All arguments as one JSON array, bound before any --arg
        #[arg(long)]
        args: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Print key-value commands in RESP wire format
        #[arg(long)]
        resp: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load_or_default(&args.config)?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let bridge = Bridge::from_config(&config);

    match args.command {
        Command::Inspect { backend, statement } => {
            let backend = backend.unwrap_or(config.backend);
            cmd_inspect(&bridge, backend, &read_statement(statement)?)
        }
        Command::Emit {
            backend,
            statement,
            arg,
            args,
            pretty,
            resp,
        } => {
            let backend = backend.unwrap_or(config.backend);
            let values = parse_arguments(args.as_deref(), &arg)?;
            cmd_emit(&bridge, backend, &read_statement(statement)?, &values, pretty, resp)
        }
    }
}

fn read_statement(statement: Option<String>) -> anyhow::Result<String> {
    match statement {
        Some(text) => Ok(text),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn parse_arguments(array: Option<&str>, single: &[String]) -> anyhow::Result<Vec<Value>> {
    let mut values = match array {
        Some(text) => match serde_json::from_str::<Value>(text)? {
            Value::Array(items) => items,
            other => anyhow::bail!("--args expects a JSON array, got {}", other),
        },
        None => Vec::new(),
    };
    for text in single {
        // Anything that is not valid JSON is taken as a plain string.
        let value = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()));
        values.push(value);
    }
    Ok(values)
}

fn cmd_inspect(bridge: &Bridge, backend: Backend, statement: &str) -> anyhow::Result<()> {
    let result = bridge.parse(backend, statement);
    if let Some(diagnostic) = result.diagnostics.first() {
        eprintln!("{}", diagnostic);
        std::process::exit(1);
    }

    let inventory = bridge.inventory(backend, &result);
    println!("backend: {}", backend);
    println!("commands: {}", inventory.command_count());
    for (i, (command, count)) in inventory.commands.iter().zip(&inventory.per_command).enumerate() {
        println!(
            "  {}. {}: {} ({}, {} placeholder(s))",
            i + 1,
            command.verb,
            command.target_display(),
            command.position,
            count
        );
    }
    println!(
        "placeholders: {} (command {}, nested {})",
        inventory.count(),
        inventory.counts.command,
        inventory.counts.nested
    );
    Ok(())
}

fn cmd_emit(
    bridge: &Bridge,
    backend: Backend,
    statement: &str,
    args: &[Value],
    pretty: bool,
    resp: bool,
) -> anyhow::Result<()> {
    let units = match bridge.execute(backend, statement, args) {
        Ok(units) => units,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    if resp {
        let mut out = std::io::stdout().lock();
        for unit in &units {
            match unit {
                DispatchUnit::Redis(command) => out.write_all(&command.to_resp())?,
                other => anyhow::bail!("--resp only applies to redis, not {}", other.backend()),
            }
        }
        out.flush()?;
        return Ok(());
    }

    let output = if pretty {
        serde_json::to_string_pretty(&units)?
    } else {
        serde_json::to_string(&units)?
    };
    println!("{}", output);
    Ok(())
}
