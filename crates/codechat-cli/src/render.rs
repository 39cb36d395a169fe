//! Text rendering of store and engine state.

use codechat_application::SessionView;
use codechat_core::gateway::HealthStatus;
use codechat_core::ingest::{ProcessingPipeline, StepStatus, UploadItem, UploadStatus};
use codechat_core::notification::{Notification, NotificationLevel};
use codechat_core::quick_action::QuickAction;
use codechat_core::session::{
    ConversationMode, FileTree, Message, MessageMetadata, MessageRole, NodeKind, TreeViewState,
};
use colored::Colorize;

pub fn notification(notification: &Notification) -> String {
    let line = format!("{}: {}", notification.title, notification.message);
    match notification.level {
        NotificationLevel::Info => format!("ℹ {}", line).bright_black().to_string(),
        NotificationLevel::Success => format!("✔ {}", line).green().to_string(),
        NotificationLevel::Error => format!("✖ {}", line).red().to_string(),
    }
}

pub fn message(message: &Message) -> String {
    match message.role {
        MessageRole::User => format!("> {}", message.content).green().to_string(),
        MessageRole::Assistant => {
            let mut out = message
                .content
                .lines()
                .map(|line| line.bright_blue().to_string())
                .collect::<Vec<_>>()
                .join("\n");
            if let Some(meta) = message.metadata.as_ref().and_then(metadata) {
                out.push('\n');
                out.push_str(&meta.bright_black().to_string());
            }
            out
        }
    }
}

/// One-line summary of reply metadata, if there is anything to show.
pub fn metadata(metadata: &MessageMetadata) -> Option<String> {
    match metadata {
        MessageMetadata::Retrieval(stats) => {
            let mut line = format!(
                "[{} chunk(s) from {} file(s){}]",
                stats.chunks_found,
                stats.files_involved,
                if stats.retrieval_reranked {
                    ", reranked"
                } else {
                    ""
                }
            );
            let files = stats.files_line();
            if !files.is_empty() {
                line.push_str(&format!(" {}", files));
            }
            Some(line)
        }
        MessageMetadata::FileExplanation(stats) => {
            let detail = match (stats.chunks_used, stats.file_size_kb) {
                (Some(chunks), _) => format!("{} chunk(s)", chunks),
                (None, Some(kb)) if stats.was_truncated == Some(true) => {
                    format!("{} KB, truncated", kb)
                }
                (None, Some(kb)) => format!("{} KB", kb),
                (None, None) => String::new(),
            };
            let name = stats.file_name.as_deref().unwrap_or("file");
            Some(if detail.is_empty() {
                format!("[{} via {}]", name, stats.source)
            } else {
                format!("[{} via {}: {}]", name, stats.source, detail)
            })
        }
        MessageMetadata::Demo => Some("[demo mode]".to_string()),
        MessageMetadata::Failed { .. } => None,
    }
}

pub fn tree(tree: &FileTree, view: &TreeViewState) -> String {
    if tree.is_empty() {
        return "No files ingested yet.".bright_black().to_string();
    }
    tree.visible_rows(view)
        .into_iter()
        .map(|row| {
            let indent = "  ".repeat(row.depth);
            let label = match row.entry.kind {
                NodeKind::Folder => {
                    let marker = if row.expanded { "▾" } else { "▸" };
                    format!("{} {}/", marker, row.entry.name).bright_cyan().to_string()
                }
                NodeKind::File => format!("  {}", row.entry.name),
            };
            let label = if row.selected {
                label.bold().to_string()
            } else {
                label
            };
            format!("{}{}", indent, label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn status(
    view: &SessionView,
    health: Option<&HealthStatus>,
    mode: Option<ConversationMode>,
) -> String {
    let mut lines = Vec::new();
    match health {
        Some(health) if health.is_ok() => {
            lines.push(format!("Backend:   {} ({})", "online".green(), health.message))
        }
        Some(health) => lines.push(format!("Backend:   {}", health.status.yellow())),
        None => lines.push(format!("Backend:   {}", "unreachable".red())),
    }
    lines.push(format!("Readiness: {}", view.readiness));
    if let Some(snapshot) = &view.snapshot {
        lines.push(format!("Namespace: {}", snapshot.namespace));
        lines.push(format!("Files:     {}", snapshot.files_processed));
        let features = snapshot.features.enabled();
        if !features.is_empty() {
            lines.push(format!("Features:  {}", features.join(", ")));
        }
    }
    if let Some(mode) = mode {
        lines.push(format!("Mode:      {}", mode));
    }
    lines.join("\n")
}

pub fn upload_items(items: &[UploadItem]) -> String {
    items
        .iter()
        .map(|item| {
            let status = match item.status {
                UploadStatus::Pending => "pending".bright_black(),
                UploadStatus::Uploading => "uploading".yellow(),
                UploadStatus::Complete => "complete".green(),
                UploadStatus::Error => "error".red(),
            };
            format!("  {:<32} {:>3}% {}", item.file.name, item.progress, status)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn pipeline(pipeline: &ProcessingPipeline) -> String {
    pipeline
        .steps()
        .iter()
        .map(|step| {
            let marker = match step.status {
                StepStatus::Pending => "○".bright_black(),
                StepStatus::Active => "◐".yellow(),
                StepStatus::Complete => "●".green(),
                StepStatus::Error => "✖".red(),
            };
            format!("  {} {}", marker, step.stage)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn quick_actions() -> String {
    QuickAction::all()
        .into_iter()
        .enumerate()
        .map(|(index, action)| format!("  {}. {}", index + 1, action.label()))
        .collect::<Vec<_>>()
        .join("\n")
}
