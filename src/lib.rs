//! Google Compute Engine bootstrap for a build agent.
//!
//! At agent startup, once the host framework reports that configuration has
//! finished loading, the probe issues a single GET against the local GCE
//! metadata endpoint. On a 200 it decodes the instance document plus the
//! embedded registration payload and applies both to the agent
//! configuration: agent name, server URL, external IP as an alternative
//! address, custom parameters, and the idle-shutdown timeout. Every failure
//! path — no DNS (not on GCE), transport fault, non-200, undecodable
//! document or payload — logs at info/debug and leaves the configuration
//! untouched.
//!
//! There is deliberately no retry, no caching, and no refresh: one blocking
//! attempt per process lifetime.

#![cfg_attr(test, allow(clippy::expect_used))]

pub mod configuration;
pub mod metadata;
pub mod probe;
pub mod registration;

pub use configuration::{AgentConfiguration, IdleShutdown, INSTANCE_NAME_PARAMETER};
pub use metadata::{decode_instance_metadata, InstanceMetadata};
pub use probe::{
    apply_configuration, fetch_configuration, FetchError, GceMetadataReader,
    GoogleMetadataService, MetadataService, METADATA_URL,
};
pub use registration::{JsonRegistrationCodec, RegistrationCodec, RegistrationData};
