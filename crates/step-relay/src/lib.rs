//! step-relay library
//!
//! A service that submits a per-account step count to a remote endpoint on an
//! individually configurable daily schedule, and durably records every attempt.

pub mod config;
pub mod database;
pub mod entities;
pub mod errors;
pub mod models;
pub mod scheduling;
pub mod services;
pub mod web;
