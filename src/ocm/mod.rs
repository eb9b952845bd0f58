//! Builders for the open-cluster-management operator family.

mod types;

pub mod klusterlet;
pub mod managedcluster;
pub mod multiclusterengine;
