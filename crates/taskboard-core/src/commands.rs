use anyhow::{Context, anyhow, bail};
use taskboard_shared::{AccountId, TaskCategory, TaskId, TaskPriority};
use tracing::{debug, info, instrument, warn};

use crate::cli::{AddArgs, Command, EditArgs, SubtaskCommand};
use crate::draft::TaskDraft;
use crate::drag::DragEvent;
use crate::render::Renderer;
use crate::workspace::Workspace;

/// Runs one command, then prints whatever feedback the workspace queued,
/// whether or not the command succeeded.
#[instrument(skip(workspace, renderer))]
pub async fn dispatch(
    workspace: &mut Workspace,
    renderer: &mut Renderer,
    command: Command,
) -> anyhow::Result<()> {
    let result = run_command(workspace, renderer, command).await;
    let feedback = workspace.take_feedback();
    if !feedback.is_empty() {
        debug!(count = feedback.len(), "printing queued feedback");
        renderer.print_feedback(&feedback)?;
    }
    result
}

async fn run_command(
    workspace: &mut Workspace,
    renderer: &mut Renderer,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Board => cmd_board(workspace, renderer).await,
        Command::Show { id } => cmd_show(workspace, renderer, &TaskId::new(id)).await,
        Command::Move { id, column } => {
            let id = TaskId::new(id);
            load_tasks(workspace).await?;
            for event in [
                DragEvent::Start(id.clone()),
                DragEvent::Over(column),
                DragEvent::Drop(column),
                DragEvent::End,
            ] {
                workspace
                    .handle_drag(event)
                    .await
                    .with_context(|| format!("failed to move task {id} to {column}"))?;
            }
            println!("Moved task {id} to {}.", column.title());
            Ok(())
        }
        Command::Add(args) => cmd_add(workspace, args).await,
        Command::Edit(args) => cmd_edit(workspace, renderer, args).await,
        Command::Delete { id, yes } => cmd_delete(workspace, renderer, &TaskId::new(id), yes).await,
        Command::Subtask(sub) => cmd_subtask(workspace, renderer, sub).await,
        Command::Accounts => {
            let directory = workspace
                .load_directory()
                .await
                .context("failed to load accounts")?
                .clone();
            renderer.print_accounts(&directory)
        }
    }
}

async fn load_tasks(workspace: &mut Workspace) -> anyhow::Result<()> {
    workspace.refresh().await.context("failed to load tasks")
}

async fn cmd_board(workspace: &mut Workspace, renderer: &mut Renderer) -> anyhow::Result<()> {
    load_tasks(workspace).await?;
    if let Err(err) = workspace.load_directory().await {
        warn!(error = %err, "accounts unavailable; showing initials only");
    }
    info!(tasks = workspace.cache().len(), "rendering board");
    renderer.print_board(workspace)
}

async fn cmd_show(
    workspace: &mut Workspace,
    renderer: &mut Renderer,
    id: &TaskId,
) -> anyhow::Result<()> {
    load_tasks(workspace).await?;
    if !workspace.open_task(id).await {
        bail!("no task with id {id}");
    }
    print_open_popup(workspace, renderer)
}

fn print_open_popup(workspace: &Workspace, renderer: &mut Renderer) -> anyhow::Result<()> {
    match workspace.popup() {
        Some(popup) => renderer.print_popup(popup),
        None => Ok(()),
    }
}

async fn cmd_add(workspace: &mut Workspace, args: AddArgs) -> anyhow::Result<()> {
    if !args.assign.is_empty() {
        workspace
            .load_directory()
            .await
            .context("failed to load accounts for --assign")?;
    }

    let mut draft = TaskDraft {
        title: args.title,
        description: args.description,
        due_date: args.due,
        category: args.category,
        priority: parse_priority(&args.priority)?,
        ..TaskDraft::default()
    };
    for text in &args.subtasks {
        draft
            .subtasks
            .push(text)
            .context("subtask text must not be empty")?;
    }
    for id in args.assign {
        let id = AccountId::new(id);
        if workspace.directory().get(&id).is_none() {
            bail!("unknown account id {id}");
        }
        draft.selection.select(id);
    }

    let title = draft.title.trim().to_string();
    workspace
        .submit_draft(&mut draft)
        .await
        .context("task was not added")?;
    println!("Added task '{title}'.");
    Ok(())
}

async fn cmd_edit(
    workspace: &mut Workspace,
    renderer: &mut Renderer,
    args: EditArgs,
) -> anyhow::Result<()> {
    let id = TaskId::new(args.id);
    load_tasks(workspace).await?;
    if !workspace.edit_task(&id).await {
        bail!("task {id} could not be opened for editing");
    }

    let category = args
        .category
        .as_deref()
        .map(|value| {
            TaskCategory::parse(value)
                .ok_or_else(|| anyhow!("category must be technicalTask or userStory, got: {value}"))
        })
        .transpose()?;
    let priority = args.priority.as_deref().map(parse_priority).transpose()?;

    let popup = workspace
        .popup_mut()
        .ok_or_else(|| anyhow!("edit popup for {id} did not open"))?;
    let form = popup.form_mut()?;
    if let Some(title) = args.title {
        form.title = title;
    }
    if let Some(description) = args.description {
        form.description = description;
    }
    if let Some(due) = args.due {
        form.due_date = due;
    }
    if let Some(category) = category {
        form.category = category;
    }
    if let Some(priority) = priority {
        form.priority = priority;
    }

    for (ids, wanted) in [(args.assign, true), (args.unassign, false)] {
        for account in ids {
            let account = AccountId::new(account);
            if popup.selection.contains(&account) == wanted {
                continue;
            }
            if popup.toggle_assignee(&account).is_none() {
                bail!("unknown account id {account}");
            }
        }
    }

    workspace
        .save_task(&id)
        .await
        .with_context(|| format!("task {id} was not saved"))?;
    println!("Saved task {id}.");
    cmd_show(workspace, renderer, &id).await
}

async fn cmd_delete(
    workspace: &mut Workspace,
    renderer: &mut Renderer,
    id: &TaskId,
    yes: bool,
) -> anyhow::Result<()> {
    load_tasks(workspace).await?;
    if !workspace.open_task(id).await {
        bail!("no task with id {id}");
    }
    workspace.request_delete(id);

    if !yes {
        print_open_popup(workspace, renderer)?;
        workspace.cancel_delete();
        println!("Nothing deleted; pass --yes to confirm.");
        return Ok(());
    }

    workspace
        .delete_task(id)
        .await
        .with_context(|| format!("task {id} was not deleted"))?;
    println!("Deleted task {id}.");
    Ok(())
}

async fn cmd_subtask(
    workspace: &mut Workspace,
    renderer: &mut Renderer,
    command: SubtaskCommand,
) -> anyhow::Result<()> {
    load_tasks(workspace).await?;

    match command {
        SubtaskCommand::Add { id, text } => {
            let id = TaskId::new(id);
            if !workspace.edit_task(&id).await {
                bail!("task {id} could not be opened for editing");
            }
            let popup = workspace
                .popup_mut()
                .ok_or_else(|| anyhow!("edit popup for {id} did not open"))?;
            popup.session.add_subtask(&text)?;
            workspace
                .save_task(&id)
                .await
                .with_context(|| format!("subtask was not added to {id}"))?;
            cmd_show(workspace, renderer, &id).await
        }
        SubtaskCommand::Rename { id, index, text } => {
            let id = TaskId::new(id);
            workspace
                .rename_subtask(&id, index, &text)
                .await
                .with_context(|| format!("subtask {index} of {id} was not renamed"))?;
            cmd_show(workspace, renderer, &id).await
        }
        SubtaskCommand::Remove { id, index } => {
            let id = TaskId::new(id);
            workspace
                .remove_subtask(&id, index)
                .await
                .with_context(|| format!("subtask {index} of {id} was not removed"))?;
            cmd_show(workspace, renderer, &id).await
        }
        SubtaskCommand::Toggle { id, index } => {
            let id = TaskId::new(id);
            let checked = workspace
                .toggle_subtask_done(&id, index)
                .await
                .with_context(|| format!("subtask {index} of {id} was not updated"))?;
            let state = if checked { "done" } else { "open" };
            println!("Subtask {index} of {id} is now {state}.");
            Ok(())
        }
    }
}

fn parse_priority(value: &str) -> anyhow::Result<TaskPriority> {
    TaskPriority::parse(value)
        .ok_or_else(|| anyhow!("priority must be urgent, medium or low, got: {value}"))
}
