//! Mutation fan-out
//!
//! Updates and deletes are checked against the mutability classifier first;
//! a read-only id never reaches a backend. Permitted mutations go to every
//! target in parallel and succeed when at least one target accepts them.
//! Creates go to the designated writable target only.

use crate::backend::Target;
use crate::error::{Operation, ShopError, SourceError, TargetFailure};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use shop_model::{ensure_editable, RecordId, Resource};

/// Outcome of a mutation that at least one target accepted
#[derive(Debug, Serialize)]
pub struct MutationReport<T> {
    /// Response from the highest-priority target that succeeded
    pub data: T,
    /// Targets that accepted the mutation, in priority order
    pub succeeded: Vec<String>,
    /// Targets that rejected it
    #[serde(skip)]
    pub failures: Vec<TargetFailure>,
    /// Human-readable summary, e.g. `updated product 150 in live & seed`
    pub message: String,
}

impl<T> MutationReport<T> {
    /// Whether some targets failed while others succeeded
    ///
    /// The sources have diverged when this is true.
    #[inline]
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Replace the payload, keeping the outcome
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MutationReport<U> {
        MutationReport {
            data: f(self.data),
            succeeded: self.succeeded,
            failures: self.failures,
            message: self.message,
        }
    }
}

/// Sends mutations to an ordered set of targets
///
/// The first target is the designated writable one: it receives creates,
/// and its response wins when several targets answer.
#[derive(Debug, Clone)]
pub struct MutationDispatcher {
    targets: Vec<Target>,
}

impl MutationDispatcher {
    /// Create dispatcher with its designated writable target
    #[must_use]
    pub fn new(writer: Target) -> Self {
        Self {
            targets: vec![writer],
        }
    }

    /// With an additional fan-out target
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    /// Update a record on every target
    ///
    /// # Errors
    /// - [`ShopError::ReadOnly`] when `id` is seed data; no request is made
    /// - [`ShopError::AllTargetsFailed`] when no target accepted the update,
    ///   or [`ShopError::Source`] when there was only one target
    pub async fn update(
        &self,
        resource: Resource,
        id: &RecordId,
        body: &Value,
    ) -> Result<MutationReport<Value>, ShopError> {
        ensure_editable(resource, id)?;
        let attempts = join_all(self.targets.iter().map(|target| async move {
            (target, target.backend().update(resource, id, body).await)
        }))
        .await;
        settle(Operation::Update, resource, &id.to_string(), attempts)
    }

    /// Delete a record on every target
    ///
    /// # Errors
    /// Same as [`MutationDispatcher::update`].
    pub async fn delete(
        &self,
        resource: Resource,
        id: &RecordId,
    ) -> Result<MutationReport<()>, ShopError> {
        ensure_editable(resource, id)?;
        let attempts = join_all(self.targets.iter().map(|target| async move {
            (target, target.backend().delete(resource, id).await)
        }))
        .await;
        settle(Operation::Delete, resource, &id.to_string(), attempts)
    }

    /// Create a record on the designated writable target
    ///
    /// # Errors
    /// [`ShopError::Source`] carrying the writer's failure.
    pub async fn create(
        &self,
        resource: Resource,
        body: &Value,
    ) -> Result<MutationReport<Value>, ShopError> {
        let writer = &self.targets[0];
        let outcome = writer.backend().create(resource, body).await;
        let label = body
            .get("id")
            .and_then(RecordId::from_json)
            .map_or_else(|| "new".to_string(), |id| id.to_string());
        settle(Operation::Create, resource, &label, vec![(writer, outcome)])
    }
}

fn settle<T>(
    operation: Operation,
    resource: Resource,
    id: &str,
    attempts: Vec<(&Target, Result<T, SourceError>)>,
) -> Result<MutationReport<T>, ShopError> {
    let mut data = None;
    let mut succeeded = Vec::new();
    let mut failures = Vec::new();

    for (target, outcome) in attempts {
        match outcome {
            Ok(value) => {
                if data.is_none() {
                    data = Some(value);
                }
                succeeded.push(target.name().to_string());
            }
            Err(error) => {
                tracing::warn!(
                    source = target.name(),
                    %operation,
                    %resource,
                    id,
                    %error,
                    "Target rejected mutation"
                );
                failures.push(TargetFailure {
                    target: target.name().to_string(),
                    error,
                });
            }
        }
    }

    let Some(data) = data else {
        tracing::error!(%operation, %resource, id, "Every target failed");
        if failures.len() == 1 {
            if let Some(TargetFailure { target, error }) = failures.pop() {
                return Err(ShopError::Source {
                    target,
                    source: error,
                });
            }
        }
        return Err(ShopError::AllTargetsFailed {
            operation,
            resource,
            id: id.to_string(),
            failures,
        });
    };

    let message = format!(
        "{} {resource} {id} in {}",
        operation.past_tense(),
        succeeded.join(" & ")
    );
    if failures.is_empty() {
        tracing::info!(%operation, %resource, id, targets = %succeeded.join(","), "Mutation applied");
    } else {
        tracing::warn!(
            %operation,
            %resource,
            id,
            succeeded = %succeeded.join(","),
            failed = failures.len(),
            "Mutation partially applied; sources have diverged"
        );
    }

    Ok(MutationReport {
        data,
        succeeded,
        failures,
        message,
    })
}
