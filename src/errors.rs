#[derive(thiserror::Error, Debug)]
pub enum CliArgumentError {
    #[error("invalid combination rule: {0}")]
    InvalidRule(String),
    #[error("missing subcommand")]
    MissingSubcommand,
}

#[derive(thiserror::Error, Debug)]
pub enum CheckError {
    #[error("fixture records no expected outputs")]
    NoExpectedOutputs,
    #[error("joint distribution deviates from expected output for: {0}")]
    Mismatch(String),
}
