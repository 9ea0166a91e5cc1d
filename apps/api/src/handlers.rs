pub mod health;
pub mod permission_cache;
pub mod permissions;
