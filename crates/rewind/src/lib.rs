//! # Rewind
//!
//! Client for Rewind DMR relay servers.
//!
//! The client subscribes to one talkgroup on one relay server, keeps the
//! session alive, answers authentication challenges, and hands every DMR
//! audio frame payload to an [`AudioSink`](rewind_session::AudioSink).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rewind::prelude::*;
//!
//! // let config = ClientConfig::load("config.json")?;
//! // RewindClient::new(config)
//! //     .run(std::io::stdout(), shutdown_signal())
//! //     .await
//! ```

mod client;
mod config;
mod error;

pub use client::RewindClient;
pub use config::{ClientConfig, ConfigError};
pub use error::RewindError;

pub use rewind_protocol as protocol;
pub use rewind_session as session;
pub use rewind_timer as timer;
pub use rewind_transport as transport;

pub mod prelude {
    pub use crate::{ClientConfig, ConfigError, RewindClient, RewindError};
    pub use rewind_protocol::{Frame, PacketType};
    pub use rewind_session::{AudioSink, FatalError, SessionConfig, SessionState};
}
