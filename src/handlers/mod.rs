//! HTTP handlers, grouped by resource. Handlers extract, delegate to
//! `services`, and map the result to a response; they hold no business rules.

pub mod account;
pub mod auth_content;
pub mod departments;
pub mod nav_types;
pub mod users;

/// Emits the operation line written for every mutating admin call.
macro_rules! op_log {
    ($name:expr, $kind:expr, $actor:expr, $target:expr) => {
        tracing::info!(
            operation = $name,
            op_type = $kind,
            actor = $actor,
            resource = $target,
            "admin operation"
        )
    };
}

pub(crate) use op_log;
