//! Type definitions for the resource graph

pub mod outputs;
pub mod policy;
pub mod resources;

pub use outputs::{NamedOutput, NamedOutputs, OutputValue};
pub use policy::{
    Effect, GrantBreadth, ManagedPolicy, PermissionStatement, ResourceScope, RolePermissions,
    TokenClaims, TrustAnchor, TrustCondition, TrustPolicy,
};
pub use resources::{
    AttributeRef, EncryptionKey, EncryptionMode, IdentityRole, PublicAccessBlock, RemovalPolicy,
    ResourceKind, ResourceRef, Store,
};
