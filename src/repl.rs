// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interactive resolution REPL.
//!
//! Each input line is an identifier resolved from the current module; lines
//! starting with a dot are commands.

use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Editor, Helper};
use satchel_runtime::module_system::is_relative;
use satchel_runtime::{Runtime, Value};
use std::borrow::Cow;
use std::fmt::Display;
use std::path::PathBuf;

const HISTORY_FILE: &str = ".satchel_history";
const HISTORY_LIMIT: usize = 500;
const DEFAULT_FROM: &str = "/app.js";

/// Dot-commands understood by the REPL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    From,
    Paths,
    Cache,
    Manifest,
    Require,
}

/// Command table: name, aliases, usage suffix, description
const COMMANDS: &[(ReplCommand, &str, &[&str], &str, &str)] = &[
    (ReplCommand::Help, "help", &["h", "?"], "", "List commands"),
    (ReplCommand::Exit, "exit", &["quit", "q"], "", "Leave the REPL"),
    (
        ReplCommand::From,
        "from",
        &["f"],
        " [file]",
        "Show or change the requiring module",
    ),
    (
        ReplCommand::Paths,
        "paths",
        &["p"],
        "",
        "Search paths of the requiring module",
    ),
    (ReplCommand::Cache, "cache", &["c"], "", "Cached module keys"),
    (ReplCommand::Manifest, "manifest", &["m"], "", "Packaged files"),
    (
        ReplCommand::Require,
        "require",
        &["r"],
        " <id>",
        "Load a module and print its exports",
    ),
];

impl ReplCommand {
    /// Split `.name [arg]` into a command and its argument
    pub fn parse(input: &str) -> Option<(Self, Option<&str>)> {
        let rest = input.trim().strip_prefix('.')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };
        let name = name.to_ascii_lowercase();

        COMMANDS
            .iter()
            .find(|(_, primary, aliases, _, _)| *primary == name || aliases.contains(&name.as_str()))
            .map(|(command, ..)| (*command, arg))
    }

    /// `.name` of every command, in table order
    pub fn names() -> impl Iterator<Item = String> {
        COMMANDS.iter().map(|(_, name, ..)| format!(".{name}"))
    }
}

/// Completes commands at the start of a line and packaged paths elsewhere
struct SatchelHelper {
    commands: Vec<String>,
    files: Vec<String>,
}

impl SatchelHelper {
    fn new(runtime: &Runtime) -> Self {
        let config = runtime.config();
        let files = runtime
            .manifest()
            .entries()
            .into_iter()
            .filter_map(|entry| config.logical_path(entry))
            .map(str::to_string)
            .collect();

        Self {
            commands: ReplCommand::names().collect(),
            files,
        }
    }

    fn candidates(&self, word: &str, at_line_start: bool) -> impl Iterator<Item = &String> {
        let pool = if at_line_start && word.starts_with('.') && !is_relative(word) {
            &self.commands
        } else {
            &self.files
        };
        pool.iter().filter(move |c| c.len() > word.len() && c.starts_with(word))
    }
}

impl Completer for SatchelHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        let start = head.rfind(' ').map_or(0, |i| i + 1);
        let word = &head[start..];
        if word.is_empty() {
            return Ok((pos, Vec::new()));
        }

        let pairs = self
            .candidates(word, start == 0)
            .map(|c| Pair {
                display: c.clone(),
                replacement: c.clone(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for SatchelHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos != line.len() || line.len() < 2 || line.contains(' ') {
            return None;
        }
        self.candidates(line, true)
            .next()
            .map(|c| (&c[line.len()..]).dimmed().to_string())
    }
}

impl Highlighter for SatchelHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let id = line.trim_start();
        if id.is_empty() {
            return Cow::Borrowed(line);
        }
        let painted = if ReplCommand::parse(id).is_some() {
            line.magenta().to_string()
        } else if is_relative(id) {
            line.cyan().to_string()
        } else if id.starts_with('/') {
            line.yellow().to_string()
        } else {
            line.green().to_string()
        };
        Cow::Owned(painted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Validator for SatchelHelper {}

impl Helper for SatchelHelper {}

/// What the loop does after a line
enum Flow {
    Next,
    Quit,
}

/// The interactive REPL over one runtime
pub struct Repl {
    runtime: Runtime,
    editor: Editor<SatchelHelper, DefaultHistory>,
    history: Option<PathBuf>,
    from: String,
}

impl Repl {
    /// Create a REPL resolving from `/app.js`
    pub fn new(runtime: Runtime) -> rustyline::Result<Self> {
        let config = Config::builder()
            .max_history_size(HISTORY_LIMIT)?
            .history_ignore_dups(true)?
            .auto_add_history(true)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(SatchelHelper::new(&runtime)));

        let history = history_file();
        if let Some(path) = &history {
            if editor.load_history(path).is_err() {
                tracing::debug!("No REPL history at {}", path.display());
            }
        }

        Ok(Self {
            runtime,
            editor,
            history,
            from: DEFAULT_FROM.to_string(),
        })
    }

    /// Read lines until `.exit` or end of input
    pub fn run(&mut self) -> rustyline::Result<()> {
        println!(
            "{} {} {} {}",
            "satchel".bright_cyan().bold(),
            env!("CARGO_PKG_VERSION").dimmed(),
            "| .help for commands, resolving from".dimmed(),
            self.from.yellow()
        );

        loop {
            let prompt = format!("{} ", format!("{}>", self.from).bright_green());
            let flow = match self.editor.readline(&prompt) {
                Ok(line) => self.handle(&line),
                Err(ReadlineError::Interrupted) => Flow::Next,
                Err(ReadlineError::Eof) => Flow::Quit,
                Err(err) => {
                    print_error(&err);
                    Flow::Quit
                }
            };
            if let Flow::Quit = flow {
                break;
            }
        }

        if let Some(path) = &self.history {
            if let Err(err) = self.editor.save_history(path) {
                tracing::warn!("Could not save REPL history: {}", err);
            }
        }
        Ok(())
    }

    fn handle(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Next;
        }
        match ReplCommand::parse(line) {
            Some((command, arg)) => self.command(command, arg),
            None => {
                if let Err(err) = crate::resolve(&self.runtime, &self.from, line) {
                    print_error(&err);
                }
                Flow::Next
            }
        }
    }

    fn command(&mut self, command: ReplCommand, arg: Option<&str>) -> Flow {
        match (command, arg) {
            (ReplCommand::Exit, _) => return Flow::Quit,
            (ReplCommand::Help, _) => {
                for (_, name, aliases, usage, description) in COMMANDS {
                    let synopsis = format!(".{name}{usage}");
                    let aliases = aliases.join(" ");
                    println!(
                        "  {:<16} {} {}",
                        synopsis.cyan(),
                        description,
                        format!("({aliases})").dimmed()
                    );
                }
                println!("  {}", "Anything else is resolved as a require() id.".dimmed());
            }
            (ReplCommand::From, Some(file)) => {
                self.from = self.runtime.paths().resolve(&[file]);
                println!("{}", self.from.yellow());
            }
            (ReplCommand::From, None) => println!("{}", self.from.yellow()),
            (ReplCommand::Paths, _) => {
                let module = self.runtime.module_at(&self.from);
                module.search_paths().iter().for_each(|dir| println!("{dir}"));
            }
            (ReplCommand::Cache, _) => {
                let keys = self.runtime.cache().keys();
                if keys.is_empty() {
                    println!("{}", "nothing cached".dimmed());
                }
                keys.iter().for_each(|key| println!("{key}"));
            }
            (ReplCommand::Manifest, _) => {
                let manifest = self.runtime.manifest();
                manifest.entries().iter().for_each(|entry| println!("{entry}"));
            }
            (ReplCommand::Require, Some(id)) => {
                let module = self.runtime.module_at(&self.from);
                match self.runtime.require(&module, id) {
                    Ok(value) => println!("{}", format_value(&value)),
                    Err(err) => print_error(&err),
                }
            }
            (ReplCommand::Require, None) => print_error(&"usage: .require <id>"),
        }
        Flow::Next
    }
}

/// `<data dir>/satchel/.satchel_history`, creating the directory
fn history_file() -> Option<PathBuf> {
    let dir = dirs::data_local_dir()?.join("satchel");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(HISTORY_FILE))
}

/// Colored rendering of a required value
fn format_value(value: &Value) -> String {
    match value {
        Value::Undefined | Value::Null => value.to_string().dimmed().to_string(),
        Value::Boolean(_) | Value::Number(_) => value.to_string().yellow().to_string(),
        Value::String(s) => format!("{s:?}").green().to_string(),
        Value::Capability(wrapper) => format!(
            "<native {} from {}> [{}]",
            wrapper.id(),
            wrapper.source_url(),
            wrapper.keys().join(", ")
        )
        .magenta()
        .to_string(),
        Value::Array(_) | Value::Object(_) => match serde_json::to_string_pretty(&value.to_json()) {
            Ok(json) => json,
            Err(_) => value.to_string(),
        },
    }
}

fn print_error(err: &dyn Display) {
    eprintln!("{} {}", "error:".red().bold(), err);
}
