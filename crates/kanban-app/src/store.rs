//! Observable task state container.
//!
//! [`TaskStore`] owns the task list, the active filters and sort, the derived
//! (filtered and sorted) view, the selection and the fetch lifecycle. Every
//! change goes through one of its methods, the derived view is recomputed
//! before the lock is released, and subscribers are notified synchronously
//! afterwards. The state lock is never held across a backend call, so
//! independent operations may be in flight at the same time.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kanban_core::{
    FilterOptions, FilterPatch, SortOptions, Task, TaskDraft, TaskId, TaskStatus, TaskUpdate, filter_tasks,
    sort_tasks,
};
use tracing::{debug, warn};

use crate::gateway::TaskGateway;

/// Point-in-time copy of everything the store exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Every known task, most recently created first after local creates.
    pub tasks: Vec<Task>,
    /// `tasks` narrowed by `filters` and ordered by `sort`.
    pub filtered_tasks: Vec<Task>,
    /// Whether the latest fetch is still in flight.
    pub loading: bool,
    /// Message of the last failed operation.
    pub error: Option<String>,
    /// Active filter criteria.
    pub filters: FilterOptions,
    /// Active sort.
    pub sort: SortOptions,
    /// Task shown in the detail view.
    pub selected_task: Option<Task>,
}

impl StoreSnapshot {
    fn apply_filters_and_sort(&mut self) {
        let narrowed = filter_tasks(&self.tasks, &self.filters);
        self.filtered_tasks = sort_tasks(&narrowed, self.sort);
    }
}

/// One kanban column of the derived view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    /// Column status.
    pub status: TaskStatus,
    /// Tasks in derived-view order.
    pub tasks: Vec<Task>,
}

/// Handle returned by [`TaskStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&StoreSnapshot) + Send + Sync>;

struct StoreState {
    snapshot: StoreSnapshot,
    default_sort: SortOptions,
    fetch_generation: u64,
}

/// Task state container over a [`TaskGateway`].
pub struct TaskStore<G> {
    gateway: G,
    state: Mutex<StoreState>,
    listeners: Mutex<BTreeMap<SubscriptionId, Listener>>,
    next_subscription: AtomicU64,
}

impl<G> TaskStore<G> {
    /// Empty store sorted by due date ascending.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: Mutex::new(StoreState {
                snapshot: StoreSnapshot::default(),
                default_sort: SortOptions::default(),
                fetch_generation: 0,
            }),
            listeners: Mutex::new(BTreeMap::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Use `sort` as both the initial sort and the one [`Self::clear_filters`]
    /// restores.
    #[must_use]
    pub fn with_sort(self, sort: SortOptions) -> Self {
        {
            let mut state = guard(&self.state);
            state.default_sort = sort;
            state.snapshot.sort = sort;
            state.snapshot.apply_filters_and_sort();
        }
        self
    }

    /// Borrow the backend.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Register a listener called after every state transition.
    pub fn subscribe(&self, listener: impl Fn(&StoreSnapshot) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        guard(&self.listeners).insert(id, Arc::new(listener));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        guard(&self.listeners).remove(&id).is_some()
    }

    /// Copy of the whole observable state.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        guard(&self.state).snapshot.clone()
    }

    /// Every known task.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        guard(&self.state).snapshot.tasks.clone()
    }

    /// Filtered and sorted view of [`Self::tasks`].
    #[must_use]
    pub fn filtered_tasks(&self) -> Vec<Task> {
        guard(&self.state).snapshot.filtered_tasks.clone()
    }

    /// Whether the latest fetch is in flight.
    #[must_use]
    pub fn loading(&self) -> bool {
        guard(&self.state).snapshot.loading
    }

    /// Message of the last failed operation.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        guard(&self.state).snapshot.error.clone()
    }

    /// Active filters.
    #[must_use]
    pub fn filters(&self) -> FilterOptions {
        guard(&self.state).snapshot.filters.clone()
    }

    /// Active sort.
    #[must_use]
    pub fn sort(&self) -> SortOptions {
        guard(&self.state).snapshot.sort
    }

    /// Selected task.
    #[must_use]
    pub fn selected_task(&self) -> Option<Task> {
        guard(&self.state).snapshot.selected_task.clone()
    }

    /// Look a task up by id in the full list.
    #[must_use]
    pub fn task_by_id(&self, id: &TaskId) -> Option<Task> {
        let id = id.normalized();
        guard(&self.state)
            .snapshot
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
    }

    /// The derived view grouped into one column per status, in column order.
    #[must_use]
    pub fn tasks_by_status(&self) -> Vec<BoardColumn> {
        let state = guard(&self.state);
        TaskStatus::ALL
            .into_iter()
            .map(|status| BoardColumn {
                status,
                tasks: state
                    .snapshot
                    .filtered_tasks
                    .iter()
                    .filter(|task| task.status == status)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    /// Shallow-merge `patch` into the active filters.
    pub fn set_filters(&self, patch: FilterPatch) {
        self.transition(|snapshot| {
            patch.apply(&mut snapshot.filters);
            snapshot.apply_filters_and_sort();
        });
    }

    /// Replace the active sort.
    pub fn set_sort(&self, sort: SortOptions) {
        self.transition(|snapshot| {
            snapshot.sort = sort;
            snapshot.apply_filters_and_sort();
        });
    }

    /// Drop every filter and restore the default sort.
    pub fn clear_filters(&self) {
        self.transition_state(|state| {
            state.snapshot.filters = FilterOptions::default();
            state.snapshot.sort = state.default_sort;
            state.snapshot.apply_filters_and_sort();
        });
    }

    /// Set or clear the selection.
    pub fn set_selected_task(&self, task: Option<Task>) {
        self.transition(|snapshot| snapshot.selected_task = task);
    }

    /// Select the task with `id`, or clear the selection when it is unknown.
    /// Returns the new selection.
    pub fn select_task_by_id(&self, id: &TaskId) -> Option<Task> {
        let id = id.normalized();
        let mut selected = None;
        self.transition(|snapshot| {
            snapshot.selected_task = snapshot.tasks.iter().find(|task| task.id == id).cloned();
            selected.clone_from(&snapshot.selected_task);
        });
        selected
    }

    /// Recompute the derived view from the current tasks, filters and sort.
    pub fn apply_filters_and_sort(&self) {
        self.transition(StoreSnapshot::apply_filters_and_sort);
    }

    fn transition(&self, apply: impl FnOnce(&mut StoreSnapshot)) {
        self.transition_state(|state| apply(&mut state.snapshot));
    }

    fn transition_state(&self, apply: impl FnOnce(&mut StoreState)) {
        let snapshot = {
            let mut state = guard(&self.state);
            apply(&mut state);
            state.snapshot.clone()
        };
        self.notify(&snapshot);
    }

    fn notify(&self, snapshot: &StoreSnapshot) {
        let listeners: Vec<Listener> = guard(&self.listeners).values().cloned().collect();
        for listener in listeners {
            listener(snapshot);
        }
    }

    fn begin_fetch(&self) -> u64 {
        let mut generation = 0;
        self.transition_state(|state| {
            state.fetch_generation += 1;
            generation = state.fetch_generation;
            state.snapshot.loading = true;
            state.snapshot.error = None;
        });
        debug!(generation, "fetch started");
        generation
    }
}

impl<G: TaskGateway> TaskStore<G> {
    /// Reload every task from the backend.
    ///
    /// A failure keeps the previous tasks and records the message in
    /// [`StoreSnapshot::error`]. `error` is cleared when a fetch starts, so a
    /// mutation failing while the fetch runs stays visible after it succeeds.
    /// `loading` and `error` follow the most recently started fetch; any
    /// successful fetch replaces the task list.
    ///
    /// # Errors
    /// Returns the backend error after recording it.
    pub async fn fetch_tasks(&self) -> Result<(), G::Error> {
        let generation = self.begin_fetch();
        let mut completion = FetchCompletion::new(self, generation);

        match self.gateway.get_tasks().await {
            Ok(tasks) => {
                debug!(generation, count = tasks.len(), "fetch finished");
                completion.finish(
                    |snapshot| {
                        snapshot.tasks = tasks;
                        snapshot.apply_filters_and_sort();
                    },
                    None,
                );
                Ok(())
            }
            Err(err) => {
                warn!(generation, error = %err, "fetch failed");
                completion.finish(|_| {}, Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Fetch only when nothing is loaded and no fetch is running.
    /// Returns whether a fetch was issued.
    ///
    /// # Errors
    /// Returns the backend error of the issued fetch.
    pub async fn fetch_if_empty(&self) -> Result<bool, G::Error> {
        let idle_and_empty = {
            let state = guard(&self.state);
            state.snapshot.tasks.is_empty() && !state.snapshot.loading
        };
        if !idle_and_empty {
            return Ok(false);
        }
        self.fetch_tasks().await?;
        Ok(true)
    }

    /// Create a task upstream and prepend it.
    ///
    /// # Errors
    /// Returns the backend error after recording it; `tasks` is unchanged.
    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task, G::Error> {
        self.clear_error();
        match self.gateway.create_task(draft).await {
            Ok(task) => {
                debug!(id = %task.id, "task created");
                self.transition(|snapshot| {
                    snapshot.tasks.insert(0, task.clone());
                    snapshot.apply_filters_and_sort();
                });
                Ok(task)
            }
            Err(err) => Err(self.record_failure("create", err)),
        }
    }

    /// Update a task upstream and replace it in place.
    ///
    /// The selection is refreshed when it points at the same id. `5` and
    /// `task-5` name the same task.
    ///
    /// # Errors
    /// Returns the backend error after recording it; `tasks` is unchanged.
    pub async fn update_task(&self, id: &TaskId, updates: &TaskUpdate) -> Result<Task, G::Error> {
        self.clear_error();
        match self.gateway.update_task(id, updates).await {
            Ok(task) => {
                let id = id.normalized();
                debug!(%id, "task updated");
                self.transition(|snapshot| {
                    if let Some(slot) = snapshot.tasks.iter_mut().find(|existing| existing.id == id) {
                        *slot = task.clone();
                    }
                    if snapshot.selected_task.as_ref().is_some_and(|selected| selected.id == id) {
                        snapshot.selected_task = Some(task.clone());
                    }
                    snapshot.apply_filters_and_sort();
                });
                Ok(task)
            }
            Err(err) => Err(self.record_failure("update", err)),
        }
    }

    /// Delete a task upstream, then drop it locally.
    ///
    /// The selection is cleared when it points at the deleted id. `5` and
    /// `task-5` name the same task.
    ///
    /// # Errors
    /// Returns the backend error after recording it; the task stays listed.
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), G::Error> {
        self.clear_error();
        match self.gateway.delete_task(id).await {
            Ok(()) => {
                let id = id.normalized();
                debug!(%id, "task deleted");
                self.transition(|snapshot| {
                    snapshot.tasks.retain(|task| task.id != id);
                    if snapshot.selected_task.as_ref().is_some_and(|selected| selected.id == id) {
                        snapshot.selected_task = None;
                    }
                    snapshot.apply_filters_and_sort();
                });
                Ok(())
            }
            Err(err) => Err(self.record_failure("delete", err)),
        }
    }

    fn clear_error(&self) {
        self.transition(|snapshot| snapshot.error = None);
    }

    fn record_failure(&self, operation: &'static str, err: G::Error) -> G::Error {
        warn!(operation, error = %err, "task mutation failed");
        let message = err.to_string();
        self.transition(|snapshot| snapshot.error = Some(message));
        err
    }
}

/// Ends a fetch exactly once, including when the fetch future is dropped
/// before the backend answers or a listener panics mid-transition.
struct FetchCompletion<'a, G> {
    store: &'a TaskStore<G>,
    generation: u64,
    finished: bool,
}

impl<'a, G> FetchCompletion<'a, G> {
    const fn new(store: &'a TaskStore<G>, generation: u64) -> Self {
        Self {
            store,
            generation,
            finished: false,
        }
    }

    fn finish(&mut self, apply: impl FnOnce(&mut StoreSnapshot), error: Option<String>) {
        let generation = self.generation;
        self.store.transition_state(|state| {
            apply(&mut state.snapshot);
            if state.fetch_generation == generation {
                // Success leaves alone any error a mutation recorded meanwhile.
                if error.is_some() {
                    state.snapshot.error = error;
                }
                state.snapshot.loading = false;
            }
        });
        self.finished = true;
    }
}

impl<G> Drop for FetchCompletion<'_, G> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let generation = self.generation;
        debug!(generation, "fetch abandoned");
        if std::thread::panicking() {
            // A listener panicked mid-transition; calling listeners again could abort.
            let mut state = guard(&self.store.state);
            if state.fetch_generation == generation {
                state.snapshot.loading = false;
            }
            return;
        }
        self.store.transition_state(|state| {
            if state.fetch_generation == generation {
                state.snapshot.loading = false;
            }
        });
    }
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
