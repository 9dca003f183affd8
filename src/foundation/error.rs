/// Result alias used across the crate boundary.
pub type IntroResult<T> = Result<T, IntroError>;

/// Boundary errors.
///
/// The sequencer itself never fails at runtime: missing handles and denied playback degrade
/// silently. Errors only surface when loading configuration, probing a clip, or parsing a
/// simulation script.
#[derive(thiserror::Error, Debug)]
pub enum IntroError {
    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),

    /// The motion clip could not be opened or decoded.
    #[error("probe error: {0}")]
    Probe(String),

    /// A simulation script could not be parsed or run.
    #[error("script error: {0}")]
    Script(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntroError {
    /// Build a [`IntroError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`IntroError::Probe`].
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Build a [`IntroError::Script`].
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }
}
