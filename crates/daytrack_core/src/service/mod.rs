//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and schedule math into use-case APIs.
//! - Keep UI/FFI layers decoupled from storage details.
//!
//! # Invariants
//! - Services never bypass repository validation contracts.
//! - Services are generic over repository traits and carry no storage
//!   state of their own.

pub mod calendar_service;
pub mod goal_service;
pub mod task_service;
