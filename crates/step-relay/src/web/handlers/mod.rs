//! HTTP request handlers, organized by domain

pub mod accounts;
pub mod attempts;
pub mod events;
pub mod health;
pub mod stats;
