mod builds;
mod client;
mod links;
mod provider;
mod stages;
mod types;

pub use provider::JenkinsProvider;
pub use types::{Build, Stage};
