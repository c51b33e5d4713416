pub mod error;
pub mod identity;
pub mod records;
pub mod roles;

pub use error::{AuthError, AuthorizationError, StoreError};
pub use identity::Identity;
pub use records::{
    Document, Project, ProjectLinks, Record, RecordKind, Skill, SocialLinks, TeamMember,
};
pub use roles::{Role, RoleMap};
