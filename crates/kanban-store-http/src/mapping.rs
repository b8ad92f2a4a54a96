//! Upstream record → [`Task`] translation.
//!
//! The upstream API only knows a title and a completion flag. Everything else
//! a board card shows is synthesized here so nothing past the gateway has to
//! care where it came from. The random parts sit behind [`Enricher`] so they
//! can be pinned down in tests.

use kanban_core::{Assignee, Checklist, RemoteId, Task, TaskId, TaskPriority, TaskStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::{Date, Duration, OffsetDateTime};

use crate::wire::TodoRecord;

const OPEN_STATUSES: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::NeedReview];
const PRIORITIES: [TaskPriority; 4] = [
    TaskPriority::Low,
    TaskPriority::Medium,
    TaskPriority::High,
    TaskPriority::Urgent,
];
const TAGS: [&str; 2] = ["important", "review"];
const TEAM_SIZE: u64 = 5;
const CHECKLIST_TOTAL: u32 = 4;
const DUE_WINDOW_DAYS: i64 = 30;
const CREATED_WINDOW_SECS: i64 = 30 * 24 * 60 * 60;

/// Placeholder values with no upstream source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enrichment {
    /// Synthetic due date.
    pub due_date: Date,
    /// Synthetic creation time.
    pub created_at: OffsetDateTime,
    /// Synthetic modification time.
    pub updated_at: OffsetDateTime,
    /// Ticked checklist items (at most the checklist total).
    pub checklist_completed: u32,
    /// Attachment count.
    pub attachments: u32,
}

/// Source of placeholder enrichment for mapped records.
pub trait Enricher: Send + Sync {
    /// Produce enrichment for the record mapped at `index`.
    fn enrich(&self, index: u64) -> Enrichment;
}

/// Wall clock + thread RNG enrichment used against the live API.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomEnricher;

impl Enricher for RandomEnricher {
    fn enrich(&self, _index: u64) -> Enrichment {
        roll(&mut rand::rng(), OffsetDateTime::now_utc())
    }
}

/// Fixed clock + per-index seeded RNG; the same `(seed, index)` always yields
/// the same enrichment regardless of call order.
#[derive(Debug, Clone, Copy)]
pub struct SeededEnricher {
    seed: u64,
    now: OffsetDateTime,
}

impl SeededEnricher {
    /// Create a deterministic enricher anchored at `now`.
    #[must_use]
    pub const fn new(seed: u64, now: OffsetDateTime) -> Self {
        Self { seed, now }
    }
}

impl Enricher for SeededEnricher {
    fn enrich(&self, index: u64) -> Enrichment {
        let mut rng = StdRng::seed_from_u64(self.seed ^ index.rotate_left(32));
        roll(&mut rng, self.now)
    }
}

fn roll(rng: &mut impl Rng, now: OffsetDateTime) -> Enrichment {
    let due_date = now.date().saturating_add(Duration::days(rng.random_range(0..DUE_WINDOW_DAYS)));
    let created_at = now - Duration::seconds(rng.random_range(0..CREATED_WINDOW_SECS));
    Enrichment {
        due_date,
        created_at,
        updated_at: now,
        checklist_completed: rng.random_range(0..CHECKLIST_TOTAL),
        attachments: rng.random_range(0..3),
    }
}

/// Translate an upstream record into a board task.
///
/// `index` drives the deterministic placeholders (status for open records,
/// priority, assignee, tags): the 1-based list position for list fetches and
/// the upstream id for single-record calls.
#[must_use]
pub fn map_record(record: &TodoRecord, index: u64, enrichment: Enrichment) -> Task {
    let remote = if record.id == 0 { index } else { record.id };
    let title = if record.todo.is_empty() {
        format!("Task {index}")
    } else {
        record.todo.clone()
    };
    let status = if record.completed {
        TaskStatus::Done
    } else {
        OPEN_STATUSES[cycle(index, OPEN_STATUSES.len())]
    };
    let member = (index % TEAM_SIZE) + 1;
    let tag_count = cycle(index, 2) + 1;

    Task {
        id: TaskId::from_remote(RemoteId(remote)),
        description: format!("Task description for {title}"),
        title,
        status,
        priority: PRIORITIES[cycle(index, PRIORITIES.len())],
        due_date: enrichment.due_date,
        created_at: enrichment.created_at,
        updated_at: enrichment.updated_at,
        assignees: vec![Assignee {
            id: format!("user-{member}"),
            name: format!("Team Member {member}"),
            avatar: format!("https://api.dicebear.com/7.x/avataaars/svg?seed=user{index}"),
            email: format!("user{index}@example.com"),
        }],
        checklists: vec![Checklist::new(
            format!("checklist-{index}"),
            "Subtasks",
            enrichment.checklist_completed,
            CHECKLIST_TOTAL,
        )],
        comments: Vec::new(),
        attachments: enrichment.attachments,
        tags: TAGS[..tag_count].iter().map(|tag| (*tag).to_owned()).collect(),
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn cycle(index: u64, len: usize) -> usize {
    (index % len as u64) as usize
}
