//! Slash command registry for the REPL.
//!
//! Provides structured metadata for all `/command` slash commands,
//! enabling categorized help, alias resolution, and completion.

/// Categories for grouping commands in `/help` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCategory {
    Search,
    Library,
    Session,
}

impl CommandCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CommandCategory::Search => "Search",
            CommandCategory::Library => "Library",
            CommandCategory::Session => "Session",
        }
    }

    pub fn all() -> &'static [CommandCategory] {
        &[
            CommandCategory::Search,
            CommandCategory::Library,
            CommandCategory::Session,
        ]
    }
}

impl std::fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Metadata describing a slash command.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    /// Primary name including the slash, e.g., "/search".
    pub name: &'static str,
    /// Alternative aliases, e.g., &["/exit", "/q"] for /quit.
    pub aliases: &'static [&'static str],
    /// One-line description shown in /help.
    pub description: &'static str,
    /// Usage pattern, e.g., "/count <n>".
    pub usage: &'static str,
    pub category: CommandCategory,
}

/// Registry holding all slash commands with their metadata.
pub struct CommandRegistry {
    commands: Vec<CommandInfo>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Create a registry pre-populated with all default commands.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }

    pub fn register(&mut self, info: CommandInfo) {
        self.commands.push(info);
    }

    /// Register all built-in commands.
    pub fn register_defaults(&mut self) {
        // Search commands
        self.register(CommandInfo {
            name: "/search",
            aliases: &["/s"],
            description: "Search for papers (reuses the current query if none given)",
            usage: "/search [query]",
            category: CommandCategory::Search,
        });
        self.register(CommandInfo {
            name: "/count",
            aliases: &["/n"],
            description: "Set how many papers to request (1-20 advised)",
            usage: "/count <n>",
            category: CommandCategory::Search,
        });
        self.register(CommandInfo {
            name: "/history",
            aliases: &["/recent"],
            description: "List recent searches",
            usage: "/history",
            category: CommandCategory::Search,
        });
        self.register(CommandInfo {
            name: "/apply",
            aliases: &[],
            description: "Copy recent search #n into the query",
            usage: "/apply <n>",
            category: CommandCategory::Search,
        });
        self.register(CommandInfo {
            name: "/expand",
            aliases: &["/x"],
            description: "Show or hide the full summary of result #n",
            usage: "/expand <n>",
            category: CommandCategory::Search,
        });
        self.register(CommandInfo {
            name: "/results",
            aliases: &[],
            description: "Switch to the search tab and show results",
            usage: "/results",
            category: CommandCategory::Search,
        });

        // Library commands
        self.register(CommandInfo {
            name: "/save",
            aliases: &["/unsave"],
            description: "Save or unsave paper #n in the current tab",
            usage: "/save <n>",
            category: CommandCategory::Library,
        });
        self.register(CommandInfo {
            name: "/saved",
            aliases: &["/library"],
            description: "Switch to the saved tab and list saved papers",
            usage: "/saved",
            category: CommandCategory::Library,
        });
        self.register(CommandInfo {
            name: "/open",
            aliases: &[],
            description: "Open the link of paper #n in the browser",
            usage: "/open <n>",
            category: CommandCategory::Library,
        });

        // Session commands
        self.register(CommandInfo {
            name: "/tab",
            aliases: &[],
            description: "Switch between the search and saved tabs",
            usage: "/tab search|saved",
            category: CommandCategory::Session,
        });
        self.register(CommandInfo {
            name: "/status",
            aliases: &[],
            description: "Show query, result count, and session state",
            usage: "/status",
            category: CommandCategory::Session,
        });
        self.register(CommandInfo {
            name: "/dismiss",
            aliases: &[],
            description: "Hide the current error message",
            usage: "/dismiss",
            category: CommandCategory::Session,
        });
        self.register(CommandInfo {
            name: "/clear",
            aliases: &[],
            description: "Clear the screen",
            usage: "/clear",
            category: CommandCategory::Session,
        });
        self.register(CommandInfo {
            name: "/help",
            aliases: &["/?"],
            description: "Show this help",
            usage: "/help",
            category: CommandCategory::Session,
        });
        self.register(CommandInfo {
            name: "/quit",
            aliases: &["/exit", "/q"],
            description: "Exit ResearchHub",
            usage: "/quit",
            category: CommandCategory::Session,
        });
    }

    /// Look up a command by name or alias.
    pub fn lookup(&self, input: &str) -> Option<&CommandInfo> {
        self.commands
            .iter()
            .find(|cmd| cmd.name == input || cmd.aliases.contains(&input))
    }

    /// Generate categorized help text.
    pub fn help_text(&self) -> String {
        let mut output = String::from("\nAvailable commands:\n");

        for category in CommandCategory::all() {
            let cmds: Vec<&CommandInfo> = self
                .commands
                .iter()
                .filter(|c| c.category == *category)
                .collect();

            if cmds.is_empty() {
                continue;
            }

            output.push_str(&format!("\n  {}:\n", category.label()));

            for cmd in cmds {
                let aliases = if cmd.aliases.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", cmd.aliases.join(", "))
                };
                output.push_str(&format!(
                    "    {:<20} {}{}\n",
                    cmd.usage, cmd.description, aliases
                ));
            }
        }

        output.push_str("\nInput:\n  Type a topic and press Enter to search.\n");
        output
    }

    /// Return command name completions matching a prefix.
    pub fn completions(&self, prefix: &str) -> Vec<&str> {
        let mut results = Vec::new();
        for cmd in &self.commands {
            if cmd.name.starts_with(prefix) {
                results.push(cmd.name);
            }
            for alias in cmd.aliases {
                if alias.starts_with(prefix) {
                    results.push(alias);
                }
            }
        }
        results.sort();
        results
    }

    pub fn all(&self) -> &[CommandInfo] {
        &self.commands
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Suggest the closest command for an unknown input using edit distance.
    pub fn suggest(&self, input: &str) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;

        for cmd in &self.commands {
            let names = std::iter::once(&cmd.name).chain(cmd.aliases.iter());
            for name in names {
                let dist = edit_distance(input, name);
                if dist <= 2 && best.is_none_or(|(_, d)| dist < d) {
                    best = Some((*name, dist));
                }
            }
        }

        best.map(|(name, _)| name)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Levenshtein distance over bytes.
fn edit_distance(a: &str, b: &str) -> usize {
    let a = a.as_bytes();
    let b = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
