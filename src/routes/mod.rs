//! Router Module Index
//!
//! Routes are split by the access they require; access control is applied
//! per module (layers in `create_router`, permission checks in handlers).

/// Routes open to anonymous callers.
pub mod public;

/// Routes behind the `AuthUser` middleware.
pub mod authenticated;

/// Back-office routes under `/admin`, guarded by permission codes.
pub mod admin;
