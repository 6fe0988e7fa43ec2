use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// no environment name was given in the invocation context.
    #[error("Usage: s3hosting <synth|deploy> --context env=<domainName>")]
    Usage,

    #[error("Invalid properties for environment '{env}': {message}")]
    InvalidProps {
        env: String,
        message: String,
    },

    /// props handed straight to a stack, without going through an environment.
    #[error("Invalid properties for stack '{stack}': {message}")]
    IncompleteProps {
        stack: String,
        message: String,
    },

    #[error("Failed to read context file {path:?}\n{message}")]
    ContextFile {
        path: PathBuf,
        message: String,
    },

    #[error("Invalid context argument '{0}'. Expected key=value")]
    InvalidContextArg(String),

    #[error("Invalid stack name {name}\n{restriction}")]
    InvalidStackName {
        name: String,
        restriction: &'static str,
    },

    #[error("Validation failed on resource '{resource}'\n{message}")]
    Validation {
        resource: String,
        message: String,
    },

    #[error("Failed to serialize template\n{0}")]
    Serialize(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialize(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialize(e.to_string())
    }
}
