use discern_evidence::MassError;

/// This error will be returned if a source cannot turn its measurements into a
/// mass distribution.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("no classification attribute named '{0}'")]
    UnknownAttribute(String),
    #[error(transparent)]
    Mass(#[from] MassError),
}
