//! `roster` - CLI for roster
//!
//! This binary serves the roster HTTP API or runs a single store operation
//! against the people file.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use roster::cli::{Cli, Command, ConfigCommand, OutputFormat, ServeCommand};
use roster::{init_logging, query, AppState, Config, Person, PersonStore, SearchOutcome};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone())?;
    if let Some(data) = cli.data.clone() {
        config.storage.data_path = Some(data);
    }

    match cli.command {
        Command::Serve(cmd) => handle_serve(config, &cmd),
        Command::Get(cmd) => {
            let store = open_store(&config)?;
            match store.find_by_id(cmd.id) {
                Some(person) => print_people(std::slice::from_ref(person), cmd.format)?,
                None => match cmd.format {
                    OutputFormat::Plain => println!("No person with id {}", cmd.id),
                    OutputFormat::Json => println!("{{}}"),
                },
            }
            Ok(())
        }
        Command::List(cmd) => {
            let store = open_store(&config)?;
            print_people(store.people(), cmd.format)
        }
        Command::Search(cmd) => {
            let store = open_store(&config)?;
            let outcome = query::search(store.people(), &cmd.filter());
            print_outcome(&outcome, cmd.format)
        }
        Command::Add(cmd) => {
            let mut store = open_store(&config)?;
            let person = store.add(cmd.person.into())?;
            print_people(&[person], OutputFormat::Plain)
        }
        Command::Replace(cmd) => {
            let mut store = open_store(&config)?;
            let person = store.replace(cmd.id, cmd.person.into())?;
            print_people(&[person], OutputFormat::Plain)
        }
        Command::Delete(cmd) => {
            let mut store = open_store(&config)?;
            store.remove(cmd.id)?;
            println!("Successfully deleted a person with id {}", cmd.id);
            Ok(())
        }
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<PersonStore> {
    let path = config.data_path();
    let store = PersonStore::open(&path)
        .with_context(|| format!("cannot load people from {}", path.display()))?;
    Ok(store.with_pretty(config.storage.pretty))
}

fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    if let Some(host) = &cmd.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;

    let state = Arc::new(AppState::new(open_store(&config)?));
    let addr = config.bind_addr();

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(roster::server::serve(state, &addr))?;
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let stats = store.stats();

    if json {
        let mut status = serde_json::to_value(&stats)?;
        status["data_path"] = serde_json::json!(store.path());
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("roster status");
        println!("-------------");
        println!("People file:   {}", store.path().display());
        println!("People:        {}", stats.total_people);
        match stats.next_id {
            Some(id) => println!("Next id:       {id}"),
            None => println!("Next id:       (store is empty)"),
        }
        println!("File size:     {} bytes", stats.file_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  People file:        {}", config.data_path().display());
                println!("  Pretty JSON:        {}", config.storage.pretty);
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.bind_addr());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_outcome(outcome: &SearchOutcome, format: OutputFormat) -> anyhow::Result<()> {
    match (outcome.diagnostic(), format) {
        (Some(message), OutputFormat::Plain) => {
            println!("{message}");
            Ok(())
        }
        (Some(_), OutputFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(outcome)?);
            Ok(())
        }
        (None, _) => print_people(outcome.matches(), format),
    }
}

fn print_people(people: &[Person], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Plain => {
            for person in people {
                println!(
                    "{:>5}  {:<24}  {:>3}  {}",
                    person.id, person.name, person.age, person.gender
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(people)?);
        }
    }
    Ok(())
}
