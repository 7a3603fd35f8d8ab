pub mod client;
pub mod resource;
pub mod types;

pub use client::ApiClient;
pub use resource::{ResourceData, ResourceKey};
pub use types::{Employee, JobTitle};
