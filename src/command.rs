//! Command execution for changelog-pr.
//!
//! A run has two stages, each reported in its own log group:
//!
//! 1. **Prerequisite checks**: resolve the target branch, make sure both
//!    branches exist and look up an already open pull request.
//! 2. **Pull request processing**: compose the changelog body and create
//!    or update the pull request with it.
//!
//! The pull request is only mutated once the whole body has been composed,
//! so a failing run leaves it untouched.

/// Create or refresh the changelog pull request.
pub mod open_pr;
