//! Lifecycle hook points and the listener interface exposed by a data engine.

use std::collections::HashMap;
use std::sync::Arc;

use recordhook_core::{Error, Operation, Record, Result};
use strum::{AsRefStr, Display, EnumIter, IntoStaticStr};

use crate::Dispatcher;

/// Tracing target for hook operations.
const TRACING_TARGET: &str = "recordhook_dispatch::hooks";

/// Points in a record's lifecycle at which handlers can be registered.
///
/// Before-points fire ahead of the commit and are never forwarded to
/// subscribers; after-points fire once the mutation has been persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum HookPoint {
    BeforeCreate,
    AfterCreate,
    BeforeUpdate,
    AfterUpdate,
    BeforeDelete,
    AfterDelete,
}

impl HookPoint {
    /// Returns the operation forwarded for this point, if any.
    pub fn operation(self) -> Option<Operation> {
        match self {
            Self::AfterCreate => Some(Operation::Insert),
            Self::AfterUpdate => Some(Operation::Update),
            Self::AfterDelete => Some(Operation::Delete),
            Self::BeforeCreate | Self::BeforeUpdate | Self::BeforeDelete => None,
        }
    }

    /// Returns the after-commit point for an operation.
    pub fn after(op: Operation) -> Self {
        match op {
            Operation::Insert => Self::AfterCreate,
            Operation::Update => Self::AfterUpdate,
            Operation::Delete => Self::AfterDelete,
        }
    }

    /// Returns whether this point fires after the commit.
    #[inline]
    pub fn is_after_commit(self) -> bool {
        self.operation().is_some()
    }
}

/// Payload handed to hook handlers.
///
/// For deletes `record` is the snapshot taken before removal.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEvent {
    /// Collection the record belongs to.
    pub collection: String,
    /// Record state at the hook point.
    pub record: Record,
}

impl RecordEvent {
    pub fn new(collection: impl Into<String>, record: Record) -> Self {
        Self {
            collection: collection.into(),
            record,
        }
    }

    /// Builds an event whose collection is taken from the record itself.
    pub fn from_record(record: Record) -> Self {
        Self::new(record.collection.clone(), record)
    }
}

/// Handler invoked at a hook point.
#[async_trait::async_trait]
pub trait RecordHook: Send + Sync {
    /// Handles the event; an error is returned to the engine.
    async fn handle(&self, event: &RecordEvent) -> Result<()>;
}

/// Listener registration interface of a data engine.
pub trait LifecycleHooks {
    /// Registers `hook` at `point`.
    fn on(&mut self, point: HookPoint, hook: Arc<dyn RecordHook>);

    fn on_after_create(&mut self, hook: Arc<dyn RecordHook>) {
        self.on(HookPoint::AfterCreate, hook);
    }

    fn on_after_update(&mut self, hook: Arc<dyn RecordHook>) {
        self.on(HookPoint::AfterUpdate, hook);
    }

    fn on_after_delete(&mut self, hook: Arc<dyn RecordHook>) {
        self.on(HookPoint::AfterDelete, hook);
    }
}

/// In-process hook table an engine can embed.
///
/// Handlers run in registration order. Registration happens once at startup,
/// so the table takes `&mut self` and needs no locking afterwards.
#[derive(Default)]
pub struct HookRegistry {
    handlers: HashMap<HookPoint, Vec<Arc<dyn RecordHook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of handlers registered at `point`.
    pub fn len(&self, point: HookPoint) -> usize {
        self.handlers.get(&point).map_or(0, Vec::len)
    }

    /// Returns whether no handler is registered at all.
    pub fn is_empty(&self) -> bool {
        self.handlers.values().all(Vec::is_empty)
    }

    /// Runs every handler registered at `point`, stopping at the first error.
    pub async fn trigger(&self, point: HookPoint, event: &RecordEvent) -> Result<()> {
        let Some(handlers) = self.handlers.get(&point) else {
            return Ok(());
        };

        tracing::trace!(
            target: TRACING_TARGET,
            point = %point,
            collection = %event.collection,
            record_id = %event.record.id,
            handlers = handlers.len(),
            "Triggering hook point"
        );

        for handler in handlers {
            handler.handle(event).await?;
        }

        Ok(())
    }
}

impl LifecycleHooks for HookRegistry {
    fn on(&mut self, point: HookPoint, hook: Arc<dyn RecordHook>) {
        self.handlers.entry(point).or_default().push(hook);
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self
            .handlers
            .iter()
            .map(|(point, handlers)| (point.as_ref(), handlers.len()))
            .collect();

        f.debug_struct("HookRegistry")
            .field("handlers", &counts)
            .finish()
    }
}

/// Forwards an after-commit hook to the [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct DispatchHook {
    dispatcher: Dispatcher,
    operation: Operation,
}

impl DispatchHook {
    pub fn new(dispatcher: Dispatcher, operation: Operation) -> Self {
        Self {
            dispatcher,
            operation,
        }
    }
}

#[async_trait::async_trait]
impl RecordHook for DispatchHook {
    async fn handle(&self, event: &RecordEvent) -> Result<()> {
        let result = self
            .dispatcher
            .handle_change(&event.collection, self.operation, event.record.clone())
            .await;

        match &result {
            Err(error) if logged_by_service(error) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    collection = %event.collection,
                    op = %self.operation,
                    record_id = %event.record.id,
                    error = %error,
                    "Record change delivery failed"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    collection = %event.collection,
                    op = %self.operation,
                    record_id = %event.record.id,
                    lookup_failure = error.is_lookup_failure(),
                    error = %error,
                    "Record change dispatch failed"
                );
            }
            Ok(_) => {}
        }

        result.map(|_| ())
    }
}

/// Transport failures are already logged at error by the webhook service.
fn logged_by_service(error: &Error) -> bool {
    error.is_transport_failure()
}
