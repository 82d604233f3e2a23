//! Identity delegation seam and session bookkeeping.
//!
//! # Responsibility
//! - Define the port an external identity provider plugs into.
//! - Orchestrate sign-in/sign-up around that port: validate inputs,
//!   mirror the returned identity into the local `users` table, track
//!   the current session uid.
//!
//! # Invariants
//! - No credential storage, hashing, or token handling happens here;
//!   all of that stays behind the provider.
//! - A failed provider call never leaves a session behind.

pub mod provider;
pub mod service;
