use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Params, and Actions)
// =============================================================================

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    /// Name of the entity kind, used in logs.
    const KIND: &'static str;

    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type UpdateParams: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full Entity from the ID and creation parameters
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn on_update(&mut self, update: Self::UpdateParams) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Errors produced by the framework itself, wrapping the entity's own error type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError<E> {
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("a conflicting item already exists")]
    Conflict,
    #[error("{0}")]
    Entity(E),
    #[error("actor closed")]
    ActorClosed,
    #[error("actor dropped the response")]
    ActorDropped,
}

/// Predicate evaluated inside the actor against stored entities.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, FrameworkError<E>>>;

pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T, T::Error>,
    },
    /// Create only if no stored entity matches `conflicts`. Check and insert
    /// happen in the same actor turn.
    CreateUnique {
        params: T::CreateParams,
        conflicts: Filter<T>,
        respond_to: Response<T, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    /// Batch lookup. Unknown ids are skipped.
    GetMany {
        ids: Vec<T::Id>,
        respond_to: Response<Vec<T>, T::Error>,
    },
    List {
        filter: Option<Filter<T>>,
        respond_to: Response<Vec<T>, T::Error>,
    },
    Update {
        id: T::Id,
        params: T::UpdateParams,
        respond_to: Response<T, T::Error>,
    },
    /// Update the first entity matching `matches`, or create one from `create`.
    Upsert {
        matches: Filter<T>,
        create: T::CreateParams,
        update: T::UpdateParams,
        respond_to: Response<T, T::Error>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<T, T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
    /// All-or-nothing: if any action fails, every entity touched by the batch
    /// is restored before the error is returned.
    Batch {
        actions: Vec<(T::Id, T::Action)>,
        respond_to: Response<Vec<T::ActionResult>, T::Error>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

type Outcome<R, T> = Result<R, FrameworkError<<T as Entity>::Error>>;

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        (actor, ResourceClient::new(sender))
    }

    /// Serves requests until every client has been dropped.
    #[instrument(name = "resource_actor", skip(self), fields(kind = T::KIND))]
    pub async fn run(mut self) {
        info!("Actor starting");
        while let Some(msg) = self.receiver.recv().await {
            self.handle(msg);
        }
        info!(stored = self.store.len(), "Actor stopped");
    }

    fn handle(&mut self, msg: ResourceRequest<T>) {
        match msg {
            ResourceRequest::Create { params, respond_to } => {
                let _ = respond_to.send(self.create(params));
            }
            ResourceRequest::CreateUnique {
                params,
                conflicts,
                respond_to,
            } => {
                let result = if self.store.values().any(|item| conflicts(item)) {
                    debug!("Create rejected by uniqueness check");
                    Err(FrameworkError::Conflict)
                } else {
                    self.create(params)
                };
                let _ = respond_to.send(result);
            }
            ResourceRequest::Get { id, respond_to } => {
                let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
            }
            ResourceRequest::GetMany { ids, respond_to } => {
                let items = ids
                    .iter()
                    .filter_map(|id| self.store.get(id).cloned())
                    .collect();
                let _ = respond_to.send(Ok(items));
            }
            ResourceRequest::List { filter, respond_to } => {
                let items = self
                    .store
                    .values()
                    .filter(|item| filter.as_ref().map_or(true, |keep| keep(*item)))
                    .cloned()
                    .collect();
                let _ = respond_to.send(Ok(items));
            }
            ResourceRequest::Update {
                id,
                params,
                respond_to,
            } => {
                let _ = respond_to.send(self.update(id, params));
            }
            ResourceRequest::Upsert {
                matches,
                create,
                update,
                respond_to,
            } => {
                let existing = self
                    .store
                    .iter()
                    .find(|(_, item)| matches(*item))
                    .map(|(id, _)| id.clone());
                let result = match existing {
                    Some(id) => self.update(id, update),
                    None => self.create(create),
                };
                let _ = respond_to.send(result);
            }
            ResourceRequest::Delete { id, respond_to } => {
                let _ = respond_to.send(self.delete(id));
            }
            ResourceRequest::Action {
                id,
                action,
                respond_to,
            } => {
                let _ = respond_to.send(self.act(id, action));
            }
            ResourceRequest::Batch {
                actions,
                respond_to,
            } => {
                let _ = respond_to.send(self.batch(actions));
            }
        }
    }

    fn create(&mut self, params: T::CreateParams) -> Outcome<T, T> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create_params(id.clone(), params).map_err(FrameworkError::Entity)?;
        item.on_create().map_err(FrameworkError::Entity)?;
        debug!(id = %id, "Created");
        self.store.insert(id, item.clone());
        Ok(item)
    }

    // Hooks run against a copy so a failing hook leaves the stored entity untouched.
    fn update(&mut self, id: T::Id, params: T::UpdateParams) -> Outcome<T, T> {
        let item = self
            .store
            .get_mut(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let mut updated = item.clone();
        updated.on_update(params).map_err(FrameworkError::Entity)?;
        *item = updated.clone();
        Ok(updated)
    }

    fn delete(&mut self, id: T::Id) -> Outcome<T, T> {
        match self.store.get(&id) {
            Some(item) => item.on_delete().map_err(FrameworkError::Entity)?,
            None => return Err(FrameworkError::NotFound(id.to_string())),
        }
        self.store
            .remove(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))
    }

    fn act(&mut self, id: T::Id, action: T::Action) -> Outcome<T::ActionResult, T> {
        let item = self
            .store
            .get_mut(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let mut working = item.clone();
        let result = working.handle_action(action).map_err(FrameworkError::Entity)?;
        *item = working;
        Ok(result)
    }

    fn batch(&mut self, actions: Vec<(T::Id, T::Action)>) -> Outcome<Vec<T::ActionResult>, T> {
        let mut originals: Vec<(T::Id, T)> = Vec::new();
        let mut results = Vec::with_capacity(actions.len());

        for (id, action) in actions {
            let outcome = match self.store.get_mut(&id) {
                Some(item) => {
                    if !originals.iter().any(|(seen, _)| *seen == id) {
                        originals.push((id.clone(), item.clone()));
                    }
                    item.handle_action(action).map_err(FrameworkError::Entity)
                }
                None => Err(FrameworkError::NotFound(id.to_string())),
            };

            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    let restored = originals.len();
                    for (id, original) in originals {
                        self.store.insert(id, original);
                    }
                    warn!(restored, error = %e, "Batch rolled back");
                    return Err(e);
                }
            }
        }

        Ok(results)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError<T::Error>> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    pub async fn create_unique(
        &self,
        params: T::CreateParams,
        conflicts: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::CreateUnique {
            params,
            conflicts: Box::new(conflicts),
            respond_to,
        })
        .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn get_many(&self, ids: Vec<T::Id>) -> Result<Vec<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::GetMany { ids, respond_to })
            .await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::List {
            filter: None,
            respond_to,
        })
        .await
    }

    pub async fn list_where(
        &self,
        filter: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Vec<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::List {
            filter: Some(Box::new(filter)),
            respond_to,
        })
        .await
    }

    pub async fn update(
        &self,
        id: T::Id,
        params: T::UpdateParams,
    ) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Update {
            id,
            params,
            respond_to,
        })
        .await
    }

    pub async fn upsert(
        &self,
        matches: impl Fn(&T) -> bool + Send + Sync + 'static,
        create: T::CreateParams,
        update: T::UpdateParams,
    ) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Upsert {
            matches: Box::new(matches),
            create,
            update,
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Action {
            id,
            action,
            respond_to,
        })
        .await
    }

    pub async fn perform_batch(
        &self,
        actions: Vec<(T::Id, T::Action)>,
    ) -> Result<Vec<T::ActionResult>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Batch {
            actions,
            respond_to,
        })
        .await
    }
}
