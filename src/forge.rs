//! GitHub access for changelog-pr.
//!
//! Everything the action needs from the hosting platform sits behind the
//! [`traits::Forge`] trait so the changelog logic can be exercised against
//! mocks.

/// Connection settings and authentication.
pub mod config;

/// GitHub REST API client.
pub mod github;

/// Request and response types shared by forge implementations.
pub mod request;

/// Trait abstracting the hosting platform.
pub mod traits;
