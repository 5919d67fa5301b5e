pub mod alloc;
pub mod bits;
pub mod config;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod latency;
pub mod organization;
pub mod request;
pub mod topcache;
pub mod trace;
pub mod translate;

pub use crate::config::{Cli, SchemeChoice};
pub use crate::decoder::{AddrScheme, Decoder};
pub use crate::engine::{DispatchOutcome, Engine, EngineParams, Stats};
pub use crate::error::{ConfigError, OrganizationError};
pub use crate::organization::{DramLevel, DramOrganization};
pub use crate::request::{Op, Request};
pub use crate::trace::Trace;
pub use crate::translate::{MigrationParams, Translator};
