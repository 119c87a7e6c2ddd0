mod authorizer;
pub mod permissions;

pub use authorizer::{Authorizer, StaticTokenAuthorizer, TokenGrant};
pub use permissions::{Actor, Permission, UserRole};
