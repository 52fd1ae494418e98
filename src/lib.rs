//! Collab Projects - Collaborative project lifecycle with peer review
//!
//! Members form a project by filling roles, then score each other on one or
//! more review topics. Completed review cycles yield a contribution share per
//! role and a consensuality score per topic, which decides whether a manager
//! has to sign off before the project finishes.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
