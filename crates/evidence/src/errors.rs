/// This error will be returned if an attempt to construct a mass distribution fails.
#[derive(thiserror::Error, Debug)]
pub enum MassError {
    #[error("hypothesis '{0}' does not belong to the frame of discernment")]
    MalformedFrame(String),
    #[error("focal element has no hypotheses")]
    EmptyElement,
    #[error("bpa {0} is outside the 0.0 to 1.0 range")]
    OutOfRange(f64),
    #[error("bpa values sum to {0}, should sum to one")]
    InvalidMass(f64),
}

/// This error will be returned if a combination operator cannot produce a valid
/// joint mass distribution from its inputs.
#[derive(thiserror::Error, Debug)]
pub enum CombinationError {
    #[error("combination requires at least two mass distributions, got {0}")]
    CombinationNotPossible(usize),
    #[error("total conflict between sources, all intersection mass is empty")]
    TotalConflict,
    #[error("combined bpa values sum to {0}, should sum to one")]
    InvalidResult(f64),
    #[error("malformed frame of discernment: {0}")]
    MalformedFrame(String),
    #[error("scalar product over an empty body of evidence")]
    DegenerateDistance,
    #[error(transparent)]
    Mass(#[from] MassError),
}
