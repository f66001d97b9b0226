//! Data models for the admin backend.
//!
//! Field names match the JSON files and the mobile app's payloads (camelCase).

mod erp;
mod system;
mod template;
mod ticket;
mod user;
mod workday;

pub use erp::*;
pub use system::*;
pub use template::*;
pub use ticket::*;
pub use user::*;
pub use workday::*;
