//! Backend seam between the task store and whatever serves the tasks.

use std::error::Error;
use std::sync::Arc;

use kanban_core::{Task, TaskDraft, TaskId, TaskUpdate};
use kanban_store_http::{GatewayError, HttpGateway};

/// Async task backend consumed by [`crate::TaskStore`].
///
/// Implementations translate between [`Task`] values and their own storage;
/// the store never sees backend-specific shapes.
#[allow(async_fn_in_trait)]
pub trait TaskGateway: Send + Sync {
    /// Error type bubbled up from the backend.
    type Error: Error + Send + Sync + 'static;

    /// Fetch the current task list in backend order.
    ///
    /// # Errors
    /// Returns a backend-specific error when the list cannot be read.
    async fn get_tasks(&self) -> Result<Vec<Task>, Self::Error>;

    /// Fetch a single task.
    ///
    /// # Errors
    /// Returns a backend-specific error when the task cannot be read.
    async fn get_task(&self, id: &TaskId) -> Result<Task, Self::Error>;

    /// Persist a new task and return it as stored.
    ///
    /// # Errors
    /// Returns a backend-specific error when the task cannot be created.
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, Self::Error>;

    /// Apply `updates` to the task and return it as stored.
    ///
    /// # Errors
    /// Returns a backend-specific error when the task cannot be updated.
    async fn update_task(&self, id: &TaskId, updates: &TaskUpdate) -> Result<Task, Self::Error>;

    /// Remove the task.
    ///
    /// # Errors
    /// Returns a backend-specific error when the task cannot be deleted.
    async fn delete_task(&self, id: &TaskId) -> Result<(), Self::Error>;
}

impl TaskGateway for HttpGateway {
    type Error = GatewayError;

    async fn get_tasks(&self) -> Result<Vec<Task>, Self::Error> {
        Self::get_tasks(self).await
    }

    async fn get_task(&self, id: &TaskId) -> Result<Task, Self::Error> {
        Self::get_task(self, id).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, Self::Error> {
        Self::create_task(self, draft).await
    }

    async fn update_task(&self, id: &TaskId, updates: &TaskUpdate) -> Result<Task, Self::Error> {
        Self::update_task(self, id, updates).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), Self::Error> {
        Self::delete_task(self, id).await
    }
}

impl<G: TaskGateway> TaskGateway for Arc<G> {
    type Error = G::Error;

    async fn get_tasks(&self) -> Result<Vec<Task>, Self::Error> {
        self.as_ref().get_tasks().await
    }

    async fn get_task(&self, id: &TaskId) -> Result<Task, Self::Error> {
        self.as_ref().get_task(id).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, Self::Error> {
        self.as_ref().create_task(draft).await
    }

    async fn update_task(&self, id: &TaskId, updates: &TaskUpdate) -> Result<Task, Self::Error> {
        self.as_ref().update_task(id, updates).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), Self::Error> {
        self.as_ref().delete_task(id).await
    }
}
