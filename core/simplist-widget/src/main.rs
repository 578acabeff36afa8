//! simplist-widget: terminal stand-in for the SimpList home-screen widget.
//!
//! ## Subcommands
//!
//! - `show`: Render the tile for a size class
//! - `timeline`: Print the snapshot and next refresh as JSON
//! - `toggle` / `delete`: Tile actions by position
//! - `save`: Push a key/value pair through the host bridge
//! - `health`: Ping the widget host daemon

mod host_client;
mod logging;
mod tile;

use clap::{Parser, Subcommand};
use simplist_core::{
    render, ActionResult, Mutation, MutationOutcome, SizeClass, StorageConfig, WidgetConfig,
    WidgetEngine,
};

#[derive(Parser)]
#[command(name = "simplist-widget")]
#[command(about = "SimpList home-screen widget runtime")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the tile as the widget would show it
    Show {
        /// Tile size: small, medium, large or extra-large. Other family
        /// names get the default five rows.
        #[arg(long, default_value = "medium")]
        size: SizeClass,

        /// Show the gallery placeholder instead of stored data
        #[arg(long)]
        placeholder: bool,

        /// Print the tile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the current timeline (snapshot + refresh policy) as JSON
    Timeline {
        #[arg(long, default_value = "medium")]
        size: SizeClass,
    },

    /// Flip the done flag of the todo at INDEX
    Toggle {
        #[arg(value_name = "INDEX", allow_negative_numbers = true)]
        index: i64,

        #[arg(long, default_value = "medium")]
        size: SizeClass,
    },

    /// Remove the todo at INDEX
    Delete {
        #[arg(value_name = "INDEX", allow_negative_numbers = true)]
        index: i64,

        #[arg(long, default_value = "medium")]
        size: SizeClass,
    },

    /// Write a key/value pair into the shared app group (saveWidgetData)
    Save {
        #[arg(value_name = "KEY")]
        key: String,

        #[arg(value_name = "VALUE")]
        value: String,

        /// Write in-process instead of going through the widget host daemon
        #[arg(long)]
        direct: bool,
    },

    /// Check that the widget host daemon is answering
    Health,
}

fn main() {
    let cli = Cli::parse();

    let storage = StorageConfig::from_env();
    let _logging_guard = logging::init(storage.as_ref().ok());

    let storage = match storage {
        Ok(storage) => storage,
        Err(err) => {
            tracing::error!(error = %err, "Failed to resolve storage root");
            eprintln!("simplist-widget: {}", err);
            std::process::exit(1);
        }
    };
    let config = WidgetConfig::resolve(&storage);
    let engine = WidgetEngine::with_storage(storage, config);

    if let Err(message) = run(cli.command, &engine) {
        tracing::error!(error = %message, "simplist-widget failed");
        eprintln!("simplist-widget: {}", message);
        std::process::exit(1);
    }
}

fn run(command: Commands, engine: &WidgetEngine) -> Result<(), String> {
    match command {
        Commands::Show {
            size,
            placeholder,
            json,
        } => {
            let view = if placeholder {
                render(size, &engine.placeholder(), engine.config().interactive)
            } else {
                engine.render(size)
            };
            if json {
                println!("{}", to_json(&view)?);
            } else {
                println!("{}", tile::format_tile(&view));
            }
        }
        Commands::Timeline { size } => {
            println!("{}", to_json(&engine.timeline(size))?);
        }
        // Tile actions never fail from the user's point of view; the outcome
        // is printed for diagnostics and the exit code stays 0.
        Commands::Toggle { index, size } => {
            let result = perform_at(engine, Mutation::Toggle, index, size);
            tracing::info!(index, outcome = ?result.outcome, "Toggle action");
            print_action(engine, size, &result);
        }
        Commands::Delete { index, size } => {
            let result = perform_at(engine, Mutation::Delete, index, size);
            tracing::info!(index, outcome = ?result.outcome, "Delete action");
            print_action(engine, size, &result);
        }
        Commands::Save { key, value, direct } => {
            let saved = if direct {
                engine.host_bridge().save_widget_data(&key, &value)
            } else {
                let socket = host_client::socket_path(engine.storage());
                host_client::save_widget_data(&socket, &key, &value)
                    .map_err(|err| err.to_string())?
            };
            println!("{}", saved);
        }
        Commands::Health => {
            let socket = host_client::socket_path(engine.storage());
            let data = host_client::health(&socket).map_err(|err| err.to_string())?;
            println!("{}", to_json(&data)?);
        }
    }
    Ok(())
}

/// Negative positions address nothing and leave the store untouched.
fn perform_at(
    engine: &WidgetEngine,
    mutation: fn(usize) -> Mutation,
    index: i64,
    size: SizeClass,
) -> ActionResult {
    match usize::try_from(index) {
        Ok(index) => engine.perform(mutation(index), size),
        Err(_) => ActionResult {
            outcome: MutationOutcome::OutOfRange,
            refreshed: None,
        },
    }
}

fn print_action(engine: &WidgetEngine, size: SizeClass, result: &ActionResult) {
    println!("{:?}", result.outcome);
    if let Some(snapshot) = &result.refreshed {
        let view = render(size, snapshot, engine.config().interactive);
        println!("{}", tile::format_tile(&view));
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("Failed to serialize output: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplist_core::{encode, SharedStore, TodoItem};
    use tempfile::tempdir;

    #[test]
    fn negative_index_parses_and_is_out_of_range() {
        let cli = Cli::try_parse_from(["simplist-widget", "toggle", "-1"]).unwrap();
        let Commands::Toggle { index, size } = cli.command else {
            panic!("expected toggle");
        };
        assert_eq!(index, -1);

        let temp = tempdir().unwrap();
        let engine = WidgetEngine::with_storage(
            StorageConfig::with_root(temp.path().to_path_buf()),
            WidgetConfig::default(),
        );
        let raw = encode(&[TodoItem::new("a", false)]).unwrap();
        let store = SharedStore::open(engine.storage(), &engine.config().app_group);
        store.set(&engine.config().todos_key, &raw);

        let result = perform_at(&engine, Mutation::Toggle, index, size);
        assert_eq!(result.outcome, MutationOutcome::OutOfRange);
        assert!(result.refreshed.is_none());
        assert_eq!(store.get(&engine.config().todos_key), Some(raw));
    }

    #[test]
    fn unknown_size_family_falls_back_to_default_rows() {
        let cli =
            Cli::try_parse_from(["simplist-widget", "show", "--size", "accessoryCircular"]).unwrap();
        let Commands::Show { size, .. } = cli.command else {
            panic!("expected show");
        };
        assert_eq!(size, SizeClass::Other);
        assert_eq!(size.capacity(), 5);
    }
}
