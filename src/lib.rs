pub mod argocd;
pub mod assisted;
mod builder;
mod clients;
mod condition;
pub mod egress;
mod error;
mod error_codes;
pub mod lca;
pub mod monitoring;
pub mod ocm;
mod poll;
pub mod rbac;
pub mod route;
pub mod scc;
mod store;
pub mod testing;

pub use crate::builder::{Builder, ResourceKind};
pub use crate::clients::{ApiClient, ClientError};
pub use crate::condition::{ExpectedCondition, HasConditions};
pub use crate::error::{BuilderError, ValidationError};
pub use crate::poll::{DEFAULT_INTERVAL, PollError, STATUS_INTERVAL, poll_until};
pub use crate::store::{ObjectStore, SchemeRegistry, StoreError};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
