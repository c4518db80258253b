//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::render;
use researchhub_core::config::{self, HubConfig};
use researchhub_core::{PersistenceBridge, RecentSearchHistory, SaveToggle, SavedCollection};
use std::path::Path;

/// Handle a CLI subcommand.
pub async fn handle_command(command: Commands, config_file: Option<&Path>) -> anyhow::Result<()> {
    match command {
        Commands::History { json } => {
            let config = load(config_file)?;
            handle_history(&config, json)
        }
        Commands::Saved { json, remove } => {
            let config = load(config_file)?;
            handle_saved(&config, json, remove.as_deref())
        }
        Commands::Config { action } => handle_config(action, config_file),
    }
}

fn load(config_file: Option<&Path>) -> anyhow::Result<HubConfig> {
    config::load_config(config_file, None)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
}

fn handle_history(config: &HubConfig, json: bool) -> anyhow::Result<()> {
    let history = RecentSearchHistory::load(PersistenceBridge::file(config.data_dir()));
    if json {
        println!("{}", serde_json::to_string_pretty(history.entries())?);
    } else {
        print!("{}", render::history(&history));
    }
    Ok(())
}

fn handle_saved(config: &HubConfig, json: bool, remove: Option<&str>) -> anyhow::Result<()> {
    let mut saved = SavedCollection::load(PersistenceBridge::file(config.data_dir()));

    if let Some(title) = remove {
        let Some(paper) = saved.find_by_title(title).cloned() else {
            anyhow::bail!("No saved paper titled \"{}\"", title);
        };
        let (toggle, persisted) = saved.toggle(&paper);
        persisted?;
        if toggle == SaveToggle::Removed {
            println!("{}", removed_message(title, &saved));
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(saved.papers())?);
        return Ok(());
    }

    println!("{}", render::heading(&format!("Saved papers ({})", saved.count_label())).trim());
    if saved.is_empty() {
        println!("No saved papers yet.");
    }
    for (i, paper) in saved.papers().iter().enumerate() {
        println!("{}", render::paper_card(i + 1, paper, true, true, &config.ui));
    }
    Ok(())
}

fn removed_message(title: &str, saved: &SavedCollection) -> String {
    format!("Removed \"{}\". Saved papers: {}.", title, saved.count_label())
}

fn handle_config(action: ConfigAction, config_file: Option<&Path>) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load(config_file)?;
            println!("{}", config.to_toml()?);
            Ok(())
        }
        ConfigAction::Path => {
            match config::user_config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No home directory found; only --config files are read."),
            }
            Ok(())
        }
        ConfigAction::Init => {
            let path = config::user_config_path()
                .ok_or_else(|| anyhow::anyhow!("No home directory found for the config file"))?;
            if config::write_default_config(&path)? {
                println!("Created default configuration at: {}", path.display());
            } else {
                println!("Configuration file already exists at: {}", path.display());
            }
            Ok(())
        }
    }
}
