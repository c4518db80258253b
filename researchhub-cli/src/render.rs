//! Plain-text rendering of papers, result lists, and session state.
//!
//! Every function returns a `String` so output can be checked in tests; the
//! REPL decides when to print.

use researchhub_core::config::UiConfig;
use researchhub_core::{Paper, RecentSearchHistory, SearchController, Tab};
use unicode_width::UnicodeWidthStr;

const INDENT: &str = "     ";

/// Render one paper card.
///
/// `position` is the 1-based number the user types to address the paper.
pub fn paper_card(
    position: usize,
    paper: &Paper,
    expanded: bool,
    saved: bool,
    ui: &UiConfig,
) -> String {
    let marker = if saved { "★" } else { " " };
    let mut out = format!("\x1b[1m[{:>2}] {} {}\x1b[0m\n", position, marker, paper.title);

    if let Some(authors) = paper.authors.as_deref().filter(|a| !a.trim().is_empty()) {
        out.push_str(&format!("{}{}\n", INDENT, authors));
    }
    if let Some(year) = &paper.year {
        out.push_str(&format!("{}\x1b[90mPublished: {}\x1b[0m\n", INDENT, year));
    }

    let tags = paper.term_tags();
    if !tags.is_empty() {
        let rendered: Vec<String> = tags.iter().map(|t| format!("[{}]", t)).collect();
        out.push_str(&format!("{}\x1b[36m{}\x1b[0m\n", INDENT, rendered.join(" ")));
    }

    if let Some(summary) = paper.summary.as_deref() {
        let long = paper.has_long_summary(ui.summary_preview_chars);
        let text = if long && !expanded {
            paper
                .summary_preview(ui.summary_preview_chars)
                .unwrap_or_else(|| summary.to_string())
        } else {
            summary.to_string()
        };
        out.push_str(&wrap(&text, ui.wrap_width));
        out.push('\n');
        if long {
            let hint = if expanded { "Show less" } else { "Read more" };
            out.push_str(&format!(
                "{}\x1b[90m({}: /expand {})\x1b[0m\n",
                INDENT, hint, position
            ));
        }
    }

    if let Some(url) = paper.url.as_deref() {
        out.push_str(&format!(
            "{}View Paper: \x1b[4m{}\x1b[0m  \x1b[90m(/open {})\x1b[0m\n",
            INDENT, url, position
        ));
    }
    out
}

fn wrap(text: &str, width: usize) -> String {
    let options = textwrap::Options::new(width)
        .initial_indent(INDENT)
        .subsequent_indent(INDENT);
    textwrap::fill(text, options)
}

/// Header line followed by a rule of matching display width.
pub fn heading(title: &str) -> String {
    format!("\n{}\n{}\n", title, "─".repeat(UnicodeWidthStr::width(title)))
}

/// The search tab: loading indicator, error, and the current results.
pub fn search_tab(ctl: &SearchController, ui: &UiConfig) -> String {
    let mut out = String::new();
    if ctl.is_loading() {
        out.push_str("\x1b[90mSearching...\x1b[0m\n");
    }
    if let Some(error) = ctl.error() {
        out.push_str(&format!("\x1b[31m{}\x1b[0m\n", error));
    }

    let results = ctl.results();
    if results.is_empty() {
        if ctl.is_loading() || ctl.error().is_some() {
            return out;
        }
        // Only a search finished in this session produced the empty list.
        match ctl.history().get(0) {
            Some(query) if ctl.latest_epoch() > 0 => {
                out.push_str(&format!("No papers found for \"{}\".\n", query));
            }
            _ => out.push_str("No results yet. Type a topic and press Enter to search.\n"),
        }
        return out;
    }

    let query = ctl
        .history()
        .get(0)
        .map(|q| format!("Results for \"{}\"", q))
        .unwrap_or_else(|| "Results".to_string());
    out.push_str(&heading(&query));
    for (i, paper) in results.iter().enumerate() {
        out.push_str(&paper_card(
            i + 1,
            paper,
            ctl.is_expanded(i),
            ctl.is_saved(paper),
            ui,
        ));
        out.push('\n');
    }
    out
}

/// The saved tab: count label and every saved paper, or the empty hint.
pub fn saved_tab(ctl: &SearchController, ui: &UiConfig) -> String {
    let saved = ctl.saved();
    let mut out = heading(&format!("Saved papers ({})", saved.count_label()));
    if saved.is_empty() {
        out.push_str("No saved papers yet. Use /save N on a search result to keep it here.\n");
        return out;
    }
    for (i, paper) in saved.papers().iter().enumerate() {
        // Saved cards are always shown in full.
        out.push_str(&paper_card(i + 1, paper, true, true, ui));
        out.push('\n');
    }
    out
}

/// Whichever tab is active.
pub fn active_tab(ctl: &SearchController, ui: &UiConfig) -> String {
    match ctl.tab() {
        Tab::Search => search_tab(ctl, ui),
        Tab::Saved => saved_tab(ctl, ui),
    }
}

pub fn history(history: &RecentSearchHistory) -> String {
    if history.is_empty() {
        return "No recent searches.\n".to_string();
    }
    let mut out = String::from("Recent searches:\n");
    for (i, query) in history.entries().iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, query));
    }
    out
}

/// One-screen summary of the session.
pub fn status(ctl: &SearchController, endpoint: &str) -> String {
    let query = ctl.query();
    format!(
        "Endpoint:      {}\n\
         Query:         {}\n\
         Result count:  {}\n\
         Tab:           {}\n\
         Results:       {}\n\
         Saved:         {}\n\
         Recent:        {}\n\
         Loading:       {}\n",
        endpoint,
        if query.is_blank() { "(empty)" } else { query.query() },
        query.result_count(),
        ctl.tab(),
        ctl.results().len(),
        ctl.saved().count_label(),
        ctl.history().len(),
        if ctl.is_loading() { "yes" } else { "no" },
    )
}
