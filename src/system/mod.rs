//! # System Interaction Layer
//!
//! This module provides the boundary between the import logic and the operating system.
//!
//! ## Modules
//!
//! - **`executor`**: Spawns external programs (the cloud CLI) synchronously and captures
//!   their standard output.

/// Running external programs.
pub mod executor;
