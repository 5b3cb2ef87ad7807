use super::error::AdminError;
use crate::actor_framework::Entity;
use crate::domain::{Admin, AdminCreate};

impl Entity for Admin {
    const KIND: &'static str = "admin";

    type Id = String;
    type CreateParams = AdminCreate;
    type UpdateParams = ();
    type Action = ();
    type ActionResult = ();
    type Error = AdminError;

    /// Creates a new Admin from an already hashed password.
    fn from_create_params(id: String, params: AdminCreate) -> Result<Self, AdminError> {
        let username = params.username.trim().to_string();
        if username.is_empty() || params.password_hash.is_empty() {
            return Err(AdminError::ValidationError(
                "username and password are required".into(),
            ));
        }
        Ok(Self {
            id,
            username,
            password_hash: params.password_hash,
        })
    }

    /// Admin accounts are immutable once bootstrapped.
    fn on_update(&mut self, _update: ()) -> Result<(), AdminError> {
        Err(AdminError::ValidationError("admin accounts cannot be modified".into()))
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), AdminError> {
        Ok(())
    }
}
