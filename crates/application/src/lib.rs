//! Application services and ports.

#![forbid(unsafe_code)]

mod gate;
mod permission_context;
mod permission_ports;
mod permission_resolver;

pub use gate::{Gate, GateOutput, GateState};
pub use permission_context::{PermissionContext, PermissionStatus};
pub use permission_ports::{PermissionCache, PermissionSource};
pub use permission_resolver::{DEFAULT_FETCH_TIMEOUT, PermissionDebugSnapshot, PermissionResolver};
