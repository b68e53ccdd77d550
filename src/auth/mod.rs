pub mod token;

pub use token::{AuthContext, Role, require_role, ADMIN_ROLES};
