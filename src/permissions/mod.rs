pub mod requirement;
pub mod resolver;

pub use requirement::{PermissionRequirement, PUBLIC};
pub use resolver::AuthorizationResolver;
