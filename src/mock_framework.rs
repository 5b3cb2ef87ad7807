//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_get_many`] or [`expect_batch`] to assert behavior.

use crate::actor_framework::{Entity, Filter, ResourceClient, ResourceRequest, Response};
use tokio::sync::mpsc;

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// The checkout saga lives in `OrderClient`, so it can be tested without
/// spinning up any `ResourceActor`. The mock client sends its requests to a
/// channel we control (`receiver`); the test inspects each request and answers
/// it, which lets it simulate store failures deterministically.
pub fn create_mock_client<T: Entity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
#[allow(dead_code)]
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Response<T, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a CreateUnique request
pub async fn expect_create_unique<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Filter<T>, Response<T, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::CreateUnique {
            params,
            conflicts,
            respond_to,
        }) => Some((params, conflicts, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a GetMany request
pub async fn expect_get_many<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Vec<T::Id>, Response<Vec<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::GetMany { ids, respond_to }) => Some((ids, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a List request
pub async fn expect_list<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Option<Filter<T>>, Response<Vec<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::List { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Batch request
pub async fn expect_batch<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Vec<(T::Id, T::Action)>, Response<Vec<T::ActionResult>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Batch {
            actions,
            respond_to,
        }) => Some((actions, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::FrameworkError;
    use crate::admin_actor::AdminError;
    use crate::clients::AdminClient;
    use crate::domain::{Admin, AdminCreate};

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Admin>(10);

        let create_task = tokio::spawn(async move {
            let admin = AdminCreate {
                username: "root".to_string(),
                password_hash: "hash".to_string(),
            };
            client.create(admin).await
        });

        let (payload, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(payload.username, "root");
        let admin = Admin {
            id: "admin_1".to_string(),
            username: payload.username,
            password_hash: payload.password_hash,
        };
        responder.send(Ok(admin.clone())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(admin));
    }

    #[tokio::test]
    async fn test_conflict_is_reported_with_username() {
        let (inner, mut receiver) = create_mock_client::<Admin>(10);
        let client = AdminClient::new(inner);

        let task = tokio::spawn(async move {
            client
                .create_admin(AdminCreate {
                    username: " root ".to_string(),
                    password_hash: "hash".to_string(),
                })
                .await
        });

        let (_, conflicts, responder) = expect_create_unique(&mut receiver)
            .await
            .expect("Expected CreateUnique request");
        let existing = Admin {
            id: "admin_1".to_string(),
            username: "root".to_string(),
            password_hash: "other".to_string(),
        };
        assert!(conflicts(&existing));
        responder.send(Err(FrameworkError::Conflict)).unwrap();

        assert_eq!(
            task.await.unwrap(),
            Err(AdminError::AlreadyExists("root".to_string()))
        );
    }
}
