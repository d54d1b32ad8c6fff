use thiserror::Error;

use crate::resources::ResourceKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] calloop::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// One failed resource load, as reported by the loader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to load {kind} resource `{name}`: {reason}")]
pub struct LoadError {
    pub kind: ResourceKind,
    pub name: String,
    pub reason: String,
}

impl LoadError {
    pub fn new(kind: ResourceKind, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }
}
