use discern_evidence::MassError;

/// This error will be returned if an attempt to load or parse a fixture file
/// fails.
#[derive(thiserror::Error, Debug)]
pub enum FixtureError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("missing section: '{0}'")]
    MissingSection(String),
    #[error("malformed input header: '{0}'")]
    MalformedHeader(String),
    #[error("malformed element: '{0}'")]
    MalformedElement(String),
    #[error("invalid bpa: '{0}'")]
    InvalidBpa(String),
    #[error("unknown combination rule: '{0}'")]
    UnknownRule(String),
    #[error("unexpected end of fixture")]
    UnexpectedEof,
    #[error(transparent)]
    Mass(#[from] MassError),
}
