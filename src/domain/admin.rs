pub type AdminId = String;

/// An administrator account. Never serialized: the hash must not leave the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Admin {
    pub id: AdminId,
    pub username: String,
    pub password_hash: String,
}

/// Parameters for creating an admin. The password is already hashed.
#[derive(Debug, Clone)]
pub struct AdminCreate {
    pub username: String,
    pub password_hash: String,
}
