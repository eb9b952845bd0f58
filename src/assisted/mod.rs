//! Builders for the assisted-installer operator family.

mod types;

pub mod agent;
pub mod agentclusterinstall;
pub mod agentserviceconfig;
pub mod infraenv;
