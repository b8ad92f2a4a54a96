use anyhow::{Context, Result, anyhow, bail};
use kanban_app::{
    MutationCallbacks, TaskFilterBuilder, TaskGateway, TaskService, parse_due_date, parse_priority_tokens, parse_sort,
    parse_status_tokens,
};
use kanban_core::{FilterPatch, RemoteId, Task, TaskDraft, TaskId, TaskPriority, TaskStatus, TaskUpdate};
use time::{Date, OffsetDateTime};
use tracing::debug;

use crate::{Command, view};

pub async fn run<G: TaskGateway>(command: Command, service: &TaskService<G>) -> Result<()> {
    let today = OffsetDateTime::now_utc().date();
    match command {
        Command::Ls {
            statuses,
            priorities,
            search,
            assignee,
            sort,
            board,
            json,
        } => {
            let args = LsArgs {
                statuses,
                priorities,
                search,
                assignee,
                sort,
                board,
                json,
            };
            handle_ls(service, args, today).await
        }
        Command::Show { id, json } => handle_show(service, &id, json, today).await,
        Command::New {
            title,
            priority,
            status,
            due,
            description,
        } => {
            let draft = build_draft(
                &title,
                priority.as_deref(),
                status.as_deref(),
                due.as_deref(),
                description,
                today,
            )?;
            handle_new(service, &draft).await
        }
        Command::Update {
            id,
            title,
            status,
            priority,
            due,
        } => {
            let updates = build_update(title.as_deref(), status.as_deref(), priority.as_deref(), due.as_deref())?;
            handle_update(service, &id, &updates).await
        }
        Command::Rm { id } => handle_rm(service, &id).await,
    }
}

struct LsArgs {
    statuses: Vec<String>,
    priorities: Vec<String>,
    search: Option<String>,
    assignee: Option<String>,
    sort: Option<String>,
    board: bool,
    json: bool,
}

async fn handle_ls<G: TaskGateway>(service: &TaskService<G>, args: LsArgs, today: Date) -> Result<()> {
    let filters = TaskFilterBuilder::new()
        .with_statuses(&args.statuses)?
        .with_priorities(&args.priorities)?
        .with_search(args.search)
        .with_assignee(args.assignee)
        .build();
    let sort = args.sort.as_deref().map(parse_sort).transpose()?;

    let store = service.store();
    store.fetch_tasks().await.context("failed to load tasks")?;
    let filter_empty = filters.is_empty();
    store.set_filters(FilterPatch::from(filters));
    if let Some(sort) = sort {
        store.set_sort(sort);
    }

    let snapshot = store.snapshot();
    debug!(total = snapshot.tasks.len(), shown = snapshot.filtered_tasks.len(), sort = %snapshot.sort, "listing tasks");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot.filtered_tasks)?);
        return Ok(());
    }
    if args.board {
        println!("{}", view::render_board(&store.tasks_by_status(), today));
        return Ok(());
    }
    if snapshot.filtered_tasks.is_empty() {
        if filter_empty {
            println!("No tasks found");
        } else {
            println!("No tasks matched the provided filters");
        }
        return Ok(());
    }
    println!("{}", view::render_list(&snapshot.filtered_tasks, today));
    Ok(())
}

async fn handle_show<G: TaskGateway>(service: &TaskService<G>, raw_id: &str, json: bool, today: Date) -> Result<()> {
    let id = parse_task_id(raw_id)?;
    let store = service.store();
    store.fetch_tasks().await.context("failed to load tasks")?;

    let task = match store.select_task_by_id(&id) {
        Some(task) => task,
        None => {
            // Not in the first page; ask upstream for the single record.
            let task = store
                .gateway()
                .get_task(&id)
                .await
                .with_context(|| format!("task {id} not found"))?;
            store.set_selected_task(Some(task.clone()));
            task
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!("{}", view::render_detail(&task, today));
    }
    Ok(())
}

async fn handle_new<G: TaskGateway>(service: &TaskService<G>, draft: &TaskDraft) -> Result<()> {
    let callbacks = MutationCallbacks::new().on_success(|task: &Task| println!("created task: {} ({})", task.id, task.title));
    service
        .create_task(draft, callbacks)
        .await
        .map(drop)
        .ok_or_else(|| store_failure(service, "create"))
}

async fn handle_update<G: TaskGateway>(service: &TaskService<G>, raw_id: &str, updates: &TaskUpdate) -> Result<()> {
    let id = parse_task_id(raw_id)?;
    let callbacks = MutationCallbacks::new().on_success(|task: &Task| {
        println!("updated task: {} ({}, {})", task.id, task.title, task.status.label());
    });
    service
        .update_task(&id, updates, callbacks)
        .await
        .map(drop)
        .ok_or_else(|| store_failure(service, "update"))
}

async fn handle_rm<G: TaskGateway>(service: &TaskService<G>, raw_id: &str) -> Result<()> {
    let id = parse_task_id(raw_id)?;
    let message = format!("deleted task: {id}");
    let callbacks = MutationCallbacks::new().on_success(move |_: &()| println!("{message}"));
    if service.delete_task(&id, callbacks).await {
        Ok(())
    } else {
        Err(store_failure(service, "delete"))
    }
}

fn store_failure<G>(service: &TaskService<G>, operation: &str) -> anyhow::Error {
    let reason = service.store().error().unwrap_or_else(|| "unknown error".to_owned());
    anyhow!("failed to {operation} task: {reason}")
}

/// Accept `task-5` as well as a bare `5`.
fn parse_task_id(raw: &str) -> Result<TaskId> {
    let remote: RemoteId = raw.parse().with_context(|| format!("invalid task id: {raw}"))?;
    Ok(TaskId::from_remote(remote))
}

fn single_status(token: &str) -> Result<TaskStatus> {
    parse_status_tokens(&[token.to_owned()])?
        .pop()
        .ok_or_else(|| anyhow!("missing status"))
}

fn single_priority(token: &str) -> Result<TaskPriority> {
    parse_priority_tokens(&[token.to_owned()])?
        .pop()
        .ok_or_else(|| anyhow!("missing priority"))
}

fn build_draft(
    title: &str,
    priority: Option<&str>,
    status: Option<&str>,
    due: Option<&str>,
    description: Option<String>,
    today: Date,
) -> Result<TaskDraft> {
    if title.trim().is_empty() {
        bail!("title must not be empty");
    }
    let status = status.map(single_status).transpose()?.unwrap_or(TaskStatus::Todo);
    let priority = priority.map(single_priority).transpose()?.unwrap_or(TaskPriority::Medium);
    let due = due.map(parse_due_date).transpose()?.unwrap_or(today);

    let mut draft = TaskDraft::new(title.trim(), status, priority, due);
    draft.description = description.unwrap_or_default();
    Ok(draft)
}

fn build_update(
    title: Option<&str>,
    status: Option<&str>,
    priority: Option<&str>,
    due: Option<&str>,
) -> Result<TaskUpdate> {
    let mut updates = TaskUpdate::default();
    if let Some(title) = title {
        if title.trim().is_empty() {
            bail!("title must not be empty");
        }
        updates = updates.title(title.trim());
    }
    if let Some(status) = status {
        updates = updates.status(single_status(status)?);
    }
    if let Some(priority) = priority {
        updates = updates.priority(single_priority(priority)?);
    }
    if let Some(due) = due {
        updates = updates.due_date(parse_due_date(due)?);
    }
    if updates.is_empty() {
        bail!("nothing to update: pass at least one of --title, --status, --priority or --due");
    }
    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn task_ids_are_normalized() {
        let Ok(prefixed) = parse_task_id("task-5") else {
            panic!("prefixed id");
        };
        let Ok(bare) = parse_task_id(" 5 ") else {
            panic!("bare id");
        };
        assert_eq!(prefixed, bare);
        assert_eq!(prefixed.as_str(), "task-5");
        assert!(parse_task_id("task-five").is_err());
    }

    #[test]
    fn draft_defaults_and_overrides() {
        let today = date!(2026 - 03 - 04);
        let Ok(draft) = build_draft("  Write docs ", None, None, None, None, today) else {
            panic!("minimal draft");
        };
        assert_eq!(draft.title, "Write docs");
        assert_eq!(draft.status, TaskStatus::Todo);
        assert_eq!(draft.priority, TaskPriority::Medium);
        assert_eq!(draft.due_date, today);

        let Ok(draft) = build_draft(
            "Ship",
            Some("urgent"),
            Some("need-review"),
            Some("2026-03-20"),
            Some("Release notes".into()),
            today,
        ) else {
            panic!("full draft");
        };
        assert_eq!(draft.priority, TaskPriority::Urgent);
        assert_eq!(draft.status, TaskStatus::NeedReview);
        assert_eq!(draft.due_date, date!(2026 - 03 - 20));
        assert_eq!(draft.description, "Release notes");

        assert!(build_draft("   ", None, None, None, None, today).is_err());
        assert!(build_draft("x", Some("critical"), None, None, None, today).is_err());
    }

    #[test]
    fn empty_update_is_rejected() {
        let Err(err) = build_update(None, None, None, None) else {
            panic!("empty update should error");
        };
        assert!(err.to_string().contains("nothing to update"));

        let Ok(updates) = build_update(Some("Renamed"), Some("done"), None, None) else {
            panic!("title and status update");
        };
        assert_eq!(updates.title.as_deref(), Some("Renamed"));
        assert_eq!(updates.status, Some(TaskStatus::Done));
        assert_eq!(updates.priority, None);
    }
}
