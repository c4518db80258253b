//! REPL (Read-Eval-Print Loop) for interactive and one-shot search modes.
//!
//! The interactive loop waits on stdin and on finished searches at the same
//! time, so the user can keep typing while a request is in flight. Each
//! search runs on its own task and reports back through a channel; the
//! controller's epoch check drops replies that were overtaken.

use researchhub_core::config::{HubConfig, UiConfig};
use researchhub_core::{
    FetchError, Paper, RecommendationClient, SaveToggle, SearchController, SearchOutcome,
    SearchTicket, Tab,
};
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::render;
use crate::slash::CommandRegistry;

type Completion = (SearchTicket, Result<Vec<Paper>, FetchError>);

/// What the loop should do after a line of input.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Action {
    /// Print this text.
    Print(String),
    /// Submit the current query.
    Search,
    /// Open this URL in the browser.
    Open(String),
    Clear,
    Quit,
    Nothing,
}

/// Interpret one line of input against the session.
///
/// Plain text becomes the query and submits it. Slash commands mutate the
/// controller directly; anything with an outside effect is returned as an
/// [`Action`] for the loop to carry out.
pub(crate) fn dispatch(
    ctl: &mut SearchController,
    registry: &CommandRegistry,
    config: &HubConfig,
    input: &str,
) -> Action {
    let ui = &config.ui;
    let input = input.trim();
    if input.is_empty() {
        return Action::Nothing;
    }
    if !input.starts_with('/') {
        ctl.set_query(input);
        return Action::Search;
    }

    let (cmd, arg) = match input.split_once(' ') {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (input, ""),
    };

    let Some(info) = registry.lookup(cmd) else {
        return Action::Print(unknown_command(registry, cmd));
    };

    match info.name {
        "/search" => {
            if !arg.is_empty() {
                ctl.set_query(arg);
            }
            Action::Search
        }
        "/count" => match arg.parse::<i64>() {
            Ok(n) => {
                ctl.set_result_count(n);
                let note = if ctl.query().count_within_advisory_range() {
                    ""
                } else {
                    " (outside the advised 1-20; the service decides)"
                };
                Action::Print(format!("Result count set to {}{}.", n, note))
            }
            Err(_) => Action::Print(format!("Usage: {}", info.usage)),
        },
        "/history" => Action::Print(render::history(ctl.history())),
        "/apply" => match parse_position(arg) {
            Some(i) => match ctl.apply_recent(i) {
                Some(query) => Action::Print(format!(
                    "Query set to \"{}\". Use /search to run it.",
                    query
                )),
                None => Action::Print(format!("No recent search #{}.", i + 1)),
            },
            None => Action::Print(format!("Usage: {}", info.usage)),
        },
        "/expand" => match parse_position(arg) {
            Some(i) => match ctl.toggle_expanded(i) {
                Some(expanded) => {
                    let paper = &ctl.results()[i];
                    Action::Print(render::paper_card(
                        i + 1,
                        paper,
                        expanded,
                        ctl.is_saved(paper),
                        ui,
                    ))
                }
                None => Action::Print(format!("No result #{}.", i + 1)),
            },
            None => Action::Print(format!("Usage: {}", info.usage)),
        },
        "/results" => {
            ctl.select_tab(Tab::Search);
            Action::Print(render::search_tab(ctl, ui))
        }
        "/save" => match parse_position(arg) {
            Some(i) => toggle_save(ctl, i),
            None => Action::Print(format!("Usage: {}", info.usage)),
        },
        "/saved" => {
            ctl.select_tab(Tab::Saved);
            Action::Print(render::saved_tab(ctl, ui))
        }
        "/open" => match parse_position(arg) {
            Some(i) => {
                let paper = match ctl.tab() {
                    Tab::Search => ctl.results().get(i),
                    Tab::Saved => ctl.saved().get(i),
                };
                match paper {
                    Some(p) => match p.url.as_deref() {
                        Some(url) => Action::Open(url.to_string()),
                        None => Action::Print(format!("Paper #{} has no link.", i + 1)),
                    },
                    None => Action::Print(format!(
                        "No paper #{} in the {} tab.",
                        i + 1,
                        ctl.tab()
                    )),
                }
            }
            None => Action::Print(format!("Usage: {}", info.usage)),
        },
        "/tab" => match Tab::from_str_loose(arg) {
            Some(tab) => {
                ctl.select_tab(tab);
                Action::Print(render::active_tab(ctl, ui))
            }
            None => Action::Print(format!("Usage: {}", info.usage)),
        },
        "/status" => Action::Print(render::status(ctl, &config.service.endpoint)),
        "/dismiss" => match ctl.error() {
            Some(_) => {
                ctl.dismiss_error();
                Action::Print("Error dismissed.".into())
            }
            None => Action::Nothing,
        },
        "/clear" => Action::Clear,
        "/help" => Action::Print(registry.help_text()),
        "/quit" => Action::Quit,
        _ => Action::Nothing,
    }
}

/// Parse a 1-based position typed by the user into an index.
fn parse_position(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1)
}

fn toggle_save(ctl: &mut SearchController, index: usize) -> Action {
    let title = match ctl.tab() {
        Tab::Search => ctl.results().get(index),
        Tab::Saved => ctl.saved().get(index),
    }
    .map(|p| p.title.clone());

    let Some(title) = title else {
        return Action::Print(format!("No paper #{} in the {} tab.", index + 1, ctl.tab()));
    };
    let toggle = match ctl.tab() {
        Tab::Search => ctl.toggle_saved_result(index),
        Tab::Saved => ctl.toggle_saved_entry(index),
    };

    let mut message = match toggle {
        Some(SaveToggle::Saved) => {
            format!("★ Saved \"{}\" ({}).", title, ctl.saved().count_label())
        }
        Some(SaveToggle::Removed) => {
            format!("Removed \"{}\" ({}).", title, ctl.saved().count_label())
        }
        None => return Action::Nothing,
    };
    if let Some(e) = ctl.take_storage_error() {
        message.push_str(&format!(
            "\n\x1b[33mWarning: could not write saved papers: {}\x1b[0m",
            e
        ));
    }
    Action::Print(message)
}

fn unknown_command(registry: &CommandRegistry, cmd: &str) -> String {
    if let Some(suggestion) = registry.suggest(cmd) {
        return format!("Unknown command: {}. Did you mean {}?", cmd, suggestion);
    }
    let completions = registry.completions(cmd);
    if !completions.is_empty() {
        return format!(
            "Unknown command: {}. Matching commands: {}",
            cmd,
            completions.join(", ")
        );
    }
    format!("Unknown command: {}. Type /help for available commands.", cmd)
}

fn prompt(ctl: &SearchController) {
    let marker = if ctl.is_loading() { "…" } else { ">" };
    print!("\x1b[1;34m{} {}\x1b[0m ", ctl.tab(), marker);
    let _ = io::stdout().flush();
}

/// Open a new search and hand the request to a background task.
///
/// Returns `false` when the query was rejected before anything was sent.
fn submit(
    ctl: &mut SearchController,
    client: &Arc<dyn RecommendationClient>,
    tx: &mpsc::UnboundedSender<Completion>,
) -> bool {
    let ticket = match ctl.begin_search() {
        Ok(ticket) => ticket,
        Err(e) => {
            println!("\x1b[33m{}\x1b[0m", e.user_message());
            return false;
        }
    };
    println!("\x1b[90mSearching...\x1b[0m");

    let client = Arc::clone(client);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.recommend(ticket.request()).await;
        // The receiver is gone only when the REPL has exited.
        let _ = tx.send((ticket, result));
    });
    true
}

fn report_completion(ctl: &mut SearchController, ui: &UiConfig, completion: Completion) {
    let (ticket, result) = completion;
    match ctl.complete_search(ticket, result) {
        SearchOutcome::Applied { .. } => {
            if ctl.tab() == Tab::Saved {
                println!(
                    "\n\x1b[90m{} new results. /results to view them.\x1b[0m",
                    ctl.results().len()
                );
            } else {
                println!("{}", render::search_tab(ctl, ui));
            }
        }
        SearchOutcome::Failed(e) => {
            tracing::debug!(error = %e, "Search failed");
            if let Some(message) = ctl.error() {
                println!("\n\x1b[31m{}\x1b[0m", message);
            }
        }
        SearchOutcome::Stale => {}
    }
    if let Some(e) = ctl.take_storage_error() {
        println!("\x1b[33mWarning: could not write search history: {}\x1b[0m", e);
    }
}

/// Run the interactive session.
pub async fn run_interactive(
    config: HubConfig,
    mut ctl: SearchController,
    client: Arc<dyn RecommendationClient>,
) -> anyhow::Result<()> {
    println!("\x1b[1;32m  ResearchHub\x1b[0m  paper recommendations in your terminal");
    println!(
        "  Service: {} | Results: {} | Saved: {}",
        config.service.endpoint,
        ctl.query().result_count(),
        ctl.saved().count_label()
    );
    println!("  Type a topic to search, /help for commands, /quit to exit\n");

    let registry = CommandRegistry::with_defaults();
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: usize = 0;
    let mut stdin_open = true;

    prompt(&ctl);
    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        stdin_open = false;
                        if pending == 0 {
                            break;
                        }
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };

                match dispatch(&mut ctl, &registry, &config, &line) {
                    Action::Print(text) => println!("{}", text),
                    Action::Search => {
                        if submit(&mut ctl, &client, &tx) {
                            pending += 1;
                        }
                    }
                    Action::Open(url) => match open::that(&url) {
                        Ok(()) => println!("Opened {}", url),
                        Err(e) => println!("\x1b[31mCould not open {}: {}\x1b[0m", url, e),
                    },
                    Action::Clear => print!("\x1b[2J\x1b[H"),
                    Action::Quit => {
                        println!("Goodbye!");
                        break;
                    }
                    Action::Nothing => {}
                }
                prompt(&ctl);
            }
            Some(completion) = rx.recv() => {
                pending = pending.saturating_sub(1);
                report_completion(&mut ctl, &config.ui, completion);
                if !stdin_open && pending == 0 {
                    break;
                }
                prompt(&ctl);
            }
        }
    }

    Ok(())
}

/// Run one search, print the results, and exit.
pub async fn run_single_search(
    query: &str,
    config: HubConfig,
    mut ctl: SearchController,
    client: Arc<dyn RecommendationClient>,
) -> anyhow::Result<()> {
    ctl.set_query(query);
    let outcome = ctl
        .execute_search(client.as_ref())
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if let Some(e) = ctl.take_storage_error() {
        eprintln!("Warning: could not write search history: {}", e);
    }
    match outcome {
        SearchOutcome::Applied { .. } => {
            print!("{}", render::search_tab(&ctl, &config.ui));
            Ok(())
        }
        SearchOutcome::Failed(e) => {
            anyhow::bail!("{} ({})", e.user_message(), e)
        }
        SearchOutcome::Stale => Ok(()),
    }
}
