//! Interactive chat REPL.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;

use anyhow::Result;
use codechat_application::ConversationEngine;
use codechat_core::quick_action::QuickAction;
use codechat_core::session::{FileTree, TreeViewState};
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::app::App;
use crate::files::collect_candidates;
use crate::render;

const COMMANDS: [&str; 9] = [
    "/help", "/status", "/tree", "/upload", "/github", "/reset", "/explain", "/quick", "/quit",
];

/// rustyline helper completing and highlighting slash commands.
#[derive(Clone)]
struct ReplHelper {
    commands: Vec<String>,
}

impl ReplHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for ReplHelper {}

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Status,
    Tree,
    Upload(Vec<PathBuf>),
    Github(String),
    Reset,
    Explain(String),
    Quick(Option<usize>),
    Quit,
    Chat(String),
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> ReplCommand {
        let line = line.trim();
        if !line.starts_with('/') {
            return ReplCommand::Chat(line.to_string());
        }
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "/help" => ReplCommand::Help,
            "/status" => ReplCommand::Status,
            "/tree" => ReplCommand::Tree,
            "/reset" => ReplCommand::Reset,
            "/quit" | "/exit" => ReplCommand::Quit,
            "/upload" if !rest.is_empty() => {
                ReplCommand::Upload(rest.split_whitespace().map(PathBuf::from).collect())
            }
            "/github" if !rest.is_empty() => ReplCommand::Github(rest.to_string()),
            "/explain" if !rest.is_empty() => ReplCommand::Explain(rest.to_string()),
            "/quick" if rest.is_empty() => ReplCommand::Quick(None),
            "/quick" => match rest.parse::<usize>() {
                Ok(position) => ReplCommand::Quick(Some(position)),
                Err(_) => ReplCommand::Invalid(format!("Not a chip number: {}", rest)),
            },
            "/upload" | "/github" | "/explain" => {
                ReplCommand::Invalid(format!("{} needs an argument", command))
            }
            other => ReplCommand::Invalid(format!("Unknown command: {}", other)),
        }
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_magenta());
    println!("  /status              backend and session status");
    println!("  /tree                show the ingested file tree");
    println!("  /upload <paths...>   upload files or directories");
    println!("  /github <url>        ingest a GitHub repository");
    println!("  /reset               reset the backend session");
    println!("  /explain <path>      explain one file");
    println!("  /quick [n]           list quick actions, or send chip n");
    println!("  /quit                exit");
    println!("Anything else is sent as a chat message.");
}

/// Rebuilds the tree view after the store's tree may have changed.
fn sync_tree_view(view: &mut TreeViewState, tree: &FileTree) {
    view.retain_known(tree);
    view.expand_all(tree);
}

pub async fn run(mut app: App) -> Result<()> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(ReplHelper::new()));

    println!("{}", "=== Codechat ===".bright_magenta().bold());
    println!(
        "{}",
        "Type /help for commands, or ask a question about your code.".bright_black()
    );

    let mut engine = app.mount_conversation().await;
    let mut tree_view = TreeViewState::new();
    sync_tree_view(&mut tree_view, &app.store.tree().await);
    for message in engine.transcript().await {
        println!("{}", render::message(&message));
    }
    announce_mode(&engine).await;

    loop {
        for notification in app.drain_notifications() {
            println!("{}", render::notification(&notification));
        }

        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        match ReplCommand::parse(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Help => print_help(),
            ReplCommand::Invalid(reason) => println!("{}", reason.yellow()),
            ReplCommand::Status => {
                let health = app.health().await;
                let view = app.store.view().await;
                println!(
                    "{}",
                    render::status(&view, health.as_ref(), engine.mode().await)
                );
            }
            ReplCommand::Tree => {
                let _ = app.store.refresh_file_tree().await;
                let tree = app.store.tree().await;
                sync_tree_view(&mut tree_view, &tree);
                println!("{}", render::tree(&tree, &tree_view));
            }
            ReplCommand::Upload(paths) => {
                let candidates = match collect_candidates(&paths) {
                    Ok(candidates) => candidates,
                    Err(err) => {
                        println!("{}", err.to_string().red());
                        continue;
                    }
                };
                let result = app.upload.upload(candidates, app.config.chunking).await;
                println!("{}", render::upload_items(&app.upload.items().await));
                app.upload.clear_finished().await;
                if result.is_ok_and(|report| report.response.is_some()) {
                    after_ingestion(&app, &engine, &mut tree_view).await;
                }
            }
            ReplCommand::Github(url) => {
                println!("{}", format!("Ingesting {} ...", url).bright_black());
                let result = app.github.submit(&url, app.config.chunking).await;
                println!("{}", render::pipeline(&app.github.pipeline().await));
                if result.is_ok() {
                    after_ingestion(&app, &engine, &mut tree_view).await;
                }
            }
            ReplCommand::Reset => {
                if app.store.reset_session().await.is_ok() {
                    engine.reset_mode().await;
                    engine = remount(&app, &mut tree_view).await;
                }
            }
            ReplCommand::Explain(identifier) => {
                let tree = app.store.tree().await;
                let path = tree
                    .find_file(&identifier)
                    .map(|entry| entry.path.clone())
                    .unwrap_or(identifier);
                tree_view.select(path.clone());
                if let Ok(reply) = engine.explain_file(&path).await {
                    println!("{}", render::message(&reply));
                }
            }
            ReplCommand::Quick(None) => println!("{}", render::quick_actions()),
            ReplCommand::Quick(Some(position)) => match QuickAction::from_position(position) {
                Some(action) => {
                    println!("{}", format!("> {}", action.prompt()).green());
                    if let Ok(reply) = engine.send_quick_action(action).await {
                        println!("{}", render::message(&reply));
                    }
                }
                None => println!("{}", format!("No quick action #{}", position).yellow()),
            },
            ReplCommand::Chat(text) => {
                if let Ok(reply) = engine.send(&text).await {
                    println!("{}", render::message(&reply));
                }
            }
        }
    }

    for notification in app.drain_notifications() {
        println!("{}", render::notification(&notification));
    }
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

/// Keeps the conversation and lets a demo session switch to live.
async fn after_ingestion(app: &App, engine: &ConversationEngine, tree_view: &mut TreeViewState) {
    let before = engine.mode().await;
    let mode = engine
        .observe_ingestion(app.store.readiness().await)
        .await;
    sync_tree_view(tree_view, &app.store.tree().await);
    if before != Some(mode) {
        announce_mode(engine).await;
    }
}

/// Starts a fresh conversation; only used after an explicit reset.
async fn remount(app: &App, tree_view: &mut TreeViewState) -> ConversationEngine {
    let engine = app.mount_conversation().await;
    sync_tree_view(tree_view, &app.store.tree().await);
    announce_mode(&engine).await;
    engine
}

async fn announce_mode(engine: &ConversationEngine) {
    if let Some(mode) = engine.mode().await {
        println!("{}", format!("[conversation mode: {}]", mode).bright_black());
    }
}
