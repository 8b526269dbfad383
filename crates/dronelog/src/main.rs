//! `dronelog` - CLI for the drone observation journal
//!
//! This binary drives the journal from the command line: listing saved
//! observations, recording new ones and inspecting or clearing the log.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use dronelog::cli::{AddCommand, Cli, Command, ConfigCommand};
use dronelog::{
    init_logging, Config, FixedLocation, JournalView, Location, NewObservation, ObservationLog,
    PhotoImportCamera, SqliteStore,
};

/// Shown when the journal has no entries.
const EMPTY_JOURNAL: &str = "No observations yet. Add the first one!";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::List(cmd) => handle_list(&config, cmd.json).await,
        Command::Add(cmd) => handle_add(&config, cmd).await,
        Command::Show(cmd) => handle_show(&config, &cmd.target, cmd.json).await,
        Command::Clear(cmd) => handle_clear(&config, cmd.yes).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_log(config: &Config) -> anyhow::Result<ObservationLog<SqliteStore>> {
    let path = config.database_path();
    let store = SqliteStore::open(&path)
        .with_context(|| format!("cannot open journal at {}", path.display()))?;
    Ok(ObservationLog::with_key(store, config.storage.log_key.clone()))
}

async fn handle_list(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut view = JournalView::new(open_log(config)?);
    view.refresh().await.context("cannot load observations")?;

    if json {
        println!("{}", serde_json::to_string_pretty(view.entries())?);
    } else if view.is_empty() {
        println!("{EMPTY_JOURNAL}");
    } else {
        println!("Your observations:");
        for line in view.summaries() {
            println!("{line}");
        }
    }
    Ok(())
}

async fn handle_add(config: &Config, cmd: AddCommand) -> anyhow::Result<()> {
    if let Some(location) = typed_location(&cmd) {
        if !location.is_valid() {
            anyhow::bail!("coordinates {location} are out of range");
        }
    }
    let log = open_log(config)?;

    let mut camera = PhotoImportCamera::new(config.camera.enabled, config.photos_dir());
    if let Some(photo) = &cmd.photo {
        camera = camera.with_source(photo);
    }
    // Coordinates typed by the user need no permission.
    let locator = match typed_location(&cmd) {
        Some(location) => FixedLocation::new(true, Some(location)),
        None => FixedLocation::new(config.location.enabled, config.fixed_position()),
    };

    let mut form = NewObservation::new();
    form.request_permissions(&camera, &locator).await;
    if let Some(description) = &cmd.description {
        form.set_description(description);
    }

    if cmd.photo.is_some() {
        if let Err(e) = form.take_picture(&camera).await {
            warn_user(&form, &e);
        }
    }
    if cmd.locate || cmd.lat.is_some() {
        if let Err(e) = form.fetch_location(&locator).await {
            warn_user(&form, &e);
        }
    }

    let record = match form.save(&log).await {
        Ok(record) => record,
        Err(e) => {
            if let Some(message) = form.message() {
                eprintln!("{message}");
            }
            return Err(e.into());
        }
    };

    if let Some(message) = form.message() {
        println!("{message}");
    }
    print!("{}", record.details());
    Ok(())
}

fn typed_location(cmd: &AddCommand) -> Option<Location> {
    Some(Location::new(cmd.lat?, cmd.lon?))
}

fn warn_user(form: &NewObservation, error: &dronelog::Error) {
    tracing::debug!(error = %error, "Capability failed");
    match form.message() {
        Some(message) => eprintln!("warning: {message} ({error})"),
        None => eprintln!("warning: {error}"),
    }
}

async fn handle_show(config: &Config, target: &str, json: bool) -> anyhow::Result<()> {
    let mut view = JournalView::new(open_log(config)?);
    view.refresh().await.context("cannot load observations")?;

    let Some(record) = view.lookup(target) else {
        anyhow::bail!("no observation matches '{target}'");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", record.details());
    }
    Ok(())
}

async fn handle_clear(config: &Config, yes: bool) -> anyhow::Result<()> {
    let mut view = JournalView::new(open_log(config)?);

    if !yes {
        // A corrupt log can still be cleared, so only count when it loads.
        match view.refresh().await {
            Ok(entries) => println!("This will delete {} observation(s).", entries.len()),
            Err(e) => println!("This will delete the stored journal ({e})."),
        }
        println!("Use --yes to confirm.");
        return Ok(());
    }

    view.clear_all().await.context("cannot clear observations")?;
    println!("All observations deleted.");
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
                println!("  Database path:      {}", config.database_path().display());
                println!("  Log key:            {}", config.storage.log_key);
                println!();
                println!("[Camera]");
                println!("  Enabled:            {}", config.camera.enabled);
                println!("  Photos directory:   {}", config.photos_dir().display());
                println!();
                println!("[Location]");
                println!("  Enabled:            {}", config.location.enabled);
                match config.fixed_position() {
                    Some(position) => println!("  Fixed position:     {position}"),
                    None => println!("  Fixed position:     none"),
                }
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
