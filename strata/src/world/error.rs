use std::fmt;

/// A problem with how a [`World`](super::World) is wired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// A component was looked up but never given a store.
    Unconfigured(&'static str),
    /// A component was given a store twice.
    Duplicate(&'static str),
    /// Components marked as required were never given a store.
    Missing(Vec<&'static str>),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WorldError::Unconfigured(name) => {
                write!(f, "component {name} has no store configured in this world")
            }
            WorldError::Duplicate(name) => {
                write!(f, "component {name} was configured more than once")
            }
            WorldError::Missing(names) => {
                write!(f, "required components without a store: {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for WorldError {}
