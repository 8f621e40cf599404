use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use taskboard_shared::TaskPriority;
use unicode_width::UnicodeWidthStr;

use crate::assignees::{AccountDirectory, AssigneeBadge};
use crate::board::BoardNode;
use crate::card::CardView;
use crate::config::Config;
use crate::popup::{PopupMode, TaskOption, TaskPopup};
use crate::session::SubtaskRowView;
use crate::workspace::{Feedback, Workspace};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    /// One table per column, placeholders included.
    #[tracing::instrument(skip(self, workspace))]
    pub fn print_board(&mut self, workspace: &Workspace) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        for column in workspace.board().columns() {
            let title = format!("{} ({})", column.column.title(), column.task_count());
            writeln!(out, "{}", self.paint(&title, "1"))?;

            if let Some(BoardNode::Placeholder(text)) = column.nodes().first() {
                writeln!(out, "  {text}")?;
                writeln!(out)?;
                continue;
            }

            let headers = vec![
                "ID".to_string(),
                "Category".to_string(),
                "Title".to_string(),
                "Subtasks".to_string(),
                "Assignees".to_string(),
                "Priority".to_string(),
            ];
            let rows = workspace
                .cards(column.column)
                .iter()
                .map(|card| self.card_row(card))
                .collect();
            write_table(&mut out, headers, rows)?;
            writeln!(out)?;
        }

        Ok(())
    }

    fn card_row(&self, card: &CardView) -> Vec<String> {
        vec![
            self.paint(card.id.as_str(), "33"),
            card.category.label().to_string(),
            card.title.clone(),
            card.progress_label(),
            self.badges(&card.assignees),
            self.priority(card.priority),
        ]
    }

    #[tracing::instrument(skip(self, popup))]
    pub fn print_popup(&mut self, popup: &TaskPopup) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let fields = &popup.fields;

        writeln!(out, "id        {}", popup.task_id)?;
        writeln!(out, "category  {}", fields.category_label)?;
        writeln!(out, "title     {}", fields.title)?;
        writeln!(out, "desc      {}", fields.description)?;
        writeln!(out, "due       {}", fields.due_date)?;
        writeln!(out, "priority  {}", self.priority(fields.priority))?;
        writeln!(out, "assigned  {}", self.badges(&popup.assignees))?;

        writeln!(out, "subtasks")?;
        for row in popup.session.rows() {
            match row {
                SubtaskRowView::Display {
                    index,
                    text,
                    checked,
                } => {
                    let mark = if checked { "[x]" } else { "[ ]" };
                    writeln!(out, "  {index:>2} {mark} {text}")?;
                }
                SubtaskRowView::Editing { index, draft } => {
                    writeln!(out, "  {index:>2} [~] {draft}")?;
                }
            }
        }

        if popup.mode == PopupMode::Editing {
            writeln!(out, "mode      editing")?;
        }
        if popup.delete_confirmation {
            writeln!(out, "{}", self.paint("delete this task?", "31"))?;
        }
        let options = popup
            .options
            .iter()
            .map(|option| match option {
                TaskOption::Delete => "delete",
                TaskOption::Edit => "edit",
                TaskOption::Confirm => "confirm",
            })
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(out, "options   {options}")?;

        Ok(())
    }

    #[tracing::instrument(skip(self, directory))]
    pub fn print_accounts(&mut self, directory: &AccountDirectory) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "ID".to_string(),
            "Initials".to_string(),
            "Name".to_string(),
            "Color".to_string(),
        ];
        let rows = directory
            .iter()
            .map(|(id, account)| {
                vec![
                    self.paint(id.as_str(), "33"),
                    account.initials(),
                    account.full_name(),
                    account.profile_color.clone().unwrap_or_default(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    /// Alerts go to stderr; inline messages name the field they belong to.
    pub fn print_feedback(&mut self, feedback: &[Feedback]) -> anyhow::Result<()> {
        let mut err = io::stderr().lock();
        for item in feedback {
            match item {
                Feedback::Alert(message) => writeln!(err, "{}", self.paint(message, "31"))?,
                Feedback::Inline { field, message } => {
                    writeln!(err, "{}: {message}", self.paint(field, "33"))?
                }
            }
        }
        Ok(())
    }

    fn badges(&self, badges: &[AssigneeBadge]) -> String {
        badges
            .iter()
            .map(|badge| badge.initials.clone())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn priority(&self, priority: TaskPriority) -> String {
        match priority {
            TaskPriority::Urgent => self.paint(priority.key(), "31"),
            TaskPriority::Medium => self.paint(priority.key(), "33"),
            TaskPriority::Low => self.paint(priority.key(), "32"),
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|header| UnicodeWidthStr::width(header.as_str()))
        .collect();

    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, width) in headers.iter().zip(&widths) {
        write!(writer, "{header:width$} ")?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, width) in row.iter().zip(&widths).take(column_count) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
