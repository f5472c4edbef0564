//! Typed AWS clients for one-off ECS task runs.
//!
//! Wraps the ECS API (reference lookup, task-definition registration,
//! task run, status polling) and the CloudWatch Logs API (log-group
//! management, output retrieval). All remote failures surface as typed
//! errors carrying the formatted service message; nothing here retries
//! beyond the bounded stopped-state poller in [`wait`].

pub mod config;
pub mod ecs;
pub mod logs;
pub mod wait;
