pub mod jenkins;

pub use jenkins::{Build, JenkinsProvider, Stage};
