use tracing::{debug, instrument};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::admin_actor::AdminError;
use crate::domain::{Admin, AdminCreate};

/// Client for interacting with the Admin actor.
#[derive(Clone)]
pub struct AdminClient {
    inner: ResourceClient<Admin>,
}

impl_basic_client!(AdminClient, Admin, AdminError, admin);

impl AdminClient {
    /// Creates the account unless the username is taken. Check and insert are one actor turn.
    #[instrument(skip(self, params), fields(username = %params.username))]
    pub async fn create_admin(&self, params: AdminCreate) -> Result<Admin, AdminError> {
        debug!("Sending request");
        let username = params.username.trim().to_string();
        let taken = username.clone();
        match self
            .inner
            .create_unique(params, move |a: &Admin| a.username == taken)
            .await
        {
            Err(FrameworkError::Conflict) => Err(AdminError::AlreadyExists(username)),
            other => Ok(other?),
        }
    }

    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, AdminError> {
        debug!("Sending request");
        let wanted = username.to_string();
        let mut found = self
            .inner
            .list_where(move |a: &Admin| a.username == wanted)
            .await?;
        Ok(found.pop())
    }
}
