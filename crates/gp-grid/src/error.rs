use thiserror::Error;

/// Errors surfaced while describing or expanding the parameter grid.
///
/// All of these are configuration problems: they are raised before any
/// trial is dispatched and abort the run.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("axis step must be non-zero")]
    ZeroStep,

    #[error("axis step {step} does not move begin {begin} toward end {end}")]
    StepDirection { begin: f64, end: f64, step: f64 },

    #[error("invalid axis range {input:?}: expected \"begin,end,step\" or \"null\"")]
    InvalidRange { input: String },

    #[error("at least one parameter axis must be swept")]
    AllAxesDisabled,
}
