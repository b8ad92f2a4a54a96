use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kanban_core::{Task, TaskDraft, TaskId, TaskUpdate};

use crate::gateway::TaskGateway;
use crate::store::TaskStore;

type SuccessCallback<T> = Box<dyn FnOnce(&T) + Send>;
type ErrorCallback = Box<dyn FnOnce(&str) + Send>;

/// Optional feedback hooks for a single mutation (toasts, status lines).
pub struct MutationCallbacks<T> {
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
}

impl<T> Default for MutationCallbacks<T> {
    fn default() -> Self {
        Self {
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> MutationCallbacks<T> {
    /// No callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` with the mutation result when it succeeds.
    #[must_use]
    pub fn on_success(mut self, callback: impl FnOnce(&T) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Run `callback` with the error message when it fails.
    #[must_use]
    pub fn on_error(mut self, callback: impl FnOnce(&str) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    fn resolve<E: std::fmt::Display>(self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => {
                if let Some(callback) = self.on_success {
                    callback(&value);
                }
                Some(value)
            }
            Err(err) => {
                if let Some(callback) = self.on_error {
                    callback(&err.to_string());
                }
                None
            }
        }
    }
}

/// View-binding façade over a shared [`TaskStore`].
///
/// Mutations report through callbacks instead of errors; failures are also
/// recorded in the store's `error` field. Each mutation kind tracks whether
/// any call of that kind is in flight.
pub struct TaskService<G> {
    store: Arc<TaskStore<G>>,
    creating: AtomicUsize,
    updating: AtomicUsize,
    deleting: AtomicUsize,
}

impl<G> TaskService<G> {
    /// Bind to `store`.
    pub const fn new(store: Arc<TaskStore<G>>) -> Self {
        Self {
            store,
            creating: AtomicUsize::new(0),
            updating: AtomicUsize::new(0),
            deleting: AtomicUsize::new(0),
        }
    }

    /// Shared store handle.
    pub const fn store(&self) -> &Arc<TaskStore<G>> {
        &self.store
    }

    /// Whether a create is in flight.
    pub fn is_creating(&self) -> bool {
        self.creating.load(Ordering::Acquire) > 0
    }

    /// Whether an update is in flight.
    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::Acquire) > 0
    }

    /// Whether a delete is in flight.
    pub fn is_deleting(&self) -> bool {
        self.deleting.load(Ordering::Acquire) > 0
    }
}

impl<G: TaskGateway> TaskService<G> {
    /// Create a task. Returns the created task on success.
    pub async fn create_task(&self, draft: &TaskDraft, callbacks: MutationCallbacks<Task>) -> Option<Task> {
        let _pending = Pending::start(&self.creating);
        callbacks.resolve(self.store.create_task(draft).await)
    }

    /// Update a task. Returns the updated task on success.
    pub async fn update_task(
        &self,
        id: &TaskId,
        updates: &TaskUpdate,
        callbacks: MutationCallbacks<Task>,
    ) -> Option<Task> {
        let _pending = Pending::start(&self.updating);
        callbacks.resolve(self.store.update_task(id, updates).await)
    }

    /// Delete a task. Returns whether it succeeded.
    pub async fn delete_task(&self, id: &TaskId, callbacks: MutationCallbacks<()>) -> bool {
        let _pending = Pending::start(&self.deleting);
        callbacks.resolve(self.store.delete_task(id).await).is_some()
    }
}

struct Pending<'a>(&'a AtomicUsize);

impl<'a> Pending<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
