mod cache;
mod source;

pub use cache::PermissionCache;
pub use source::PermissionSource;
