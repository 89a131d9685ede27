#![forbid(unsafe_code)]

//! Scroll-spy public facade crate.
//!
//! Re-exports the stable surface of the internal crates and offers a small
//! prelude. The `web` feature (default) adds the host-driven session bridge.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use scrollspy_core::{
    Bounds, Catalog, Color, ConfigError, ElementHandle, Event, ScrollDirection, ScrollTracker,
    SpyConfig, WatchSample,
};

// --- Runtime re-exports ----------------------------------------------------

pub use scrollspy_runtime::{
    ActiveItemResolver, Cmd, Intent, ItemStatus, Model, Program, ResolverConfig, ScrollSpy,
    ScrollWatch, SpyView, SubscriptionChange, VisibilityStore,
};

// --- Web re-exports --------------------------------------------------------

#[cfg(feature = "web")]
pub use scrollspy_web::{HostError, HostEvent, StepSession, WebOutputs};

// --- Errors ---------------------------------------------------------------

/// Top-level error type.
#[derive(Debug)]
pub enum Error {
    /// Page configuration was rejected.
    Config(ConfigError),
    /// A host payload could not be decoded or encoded.
    #[cfg(feature = "web")]
    Host(HostError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            #[cfg(feature = "web")]
            Self::Host(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            #[cfg(feature = "web")]
            Self::Host(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(feature = "web")]
impl From<HostError> for Error {
    fn from(err: HostError) -> Self {
        Self::Host(err)
    }
}

/// Standard result type for scroll-spy APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Build an initialized program from a JSON page configuration.
pub fn program_from_json(config: &str) -> Result<Program<ScrollSpy>> {
    let config = SpyConfig::from_json(config)?;
    let mut program = Program::new(ScrollSpy::from_config(&config)?);
    program.init();
    Ok(program)
}

/// Build an initialized host session from a JSON page configuration.
#[cfg(feature = "web")]
pub fn session_from_json(config: &str) -> Result<StepSession> {
    let config = SpyConfig::from_json(config)?;
    let mut session = StepSession::from_config(&config)?;
    session.init();
    Ok(session)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Bounds, Cmd, Color, ElementHandle, Error, Event, Model, Program, Result, ScrollSpy,
        SpyConfig, SpyView,
    };

    #[cfg(feature = "web")]
    pub use crate::{HostEvent, StepSession};

    pub use crate::{core, runtime};
}

pub use scrollspy_core as core;
pub use scrollspy_runtime as runtime;
#[cfg(feature = "web")]
pub use scrollspy_web as web;
