//! Collaborator contracts mutated by the bootstrap probe — enables test
//! doubles for the agent's configuration store and idle-shutdown subsystem.

use std::time::Duration;

/// Configuration-parameter key under which the GCE instance name is
/// published. Always set when the probe succeeds.
pub const INSTANCE_NAME_PARAMETER: &str = "gce.instance.name";

/// Mutable agent configuration store, owned by the host agent framework.
///
/// The probe is the only writer during the bootstrap phase; the host
/// framework guarantees no concurrent mutator. The production implementation
/// lives in the agent, not in this crate.
pub trait AgentConfiguration {
    /// Set the name under which the agent registers on the server.
    fn set_name(&mut self, name: &str);

    /// Set the server URL the agent registers with.
    fn set_server_url(&mut self, url: &str);

    /// Register a secondary network address at which the agent may be
    /// reached, in addition to its primary address.
    fn add_alternative_address(&mut self, address: &str);

    /// Add a key/value configuration parameter. Later writes to the same key
    /// follow the store's own semantics; the probe never writes a key twice.
    fn add_configuration_parameter(&mut self, key: &str, value: &str);
}

/// Idle-shutdown subsystem — powers off the agent after a configured
/// duration of inactivity.
pub trait IdleShutdown {
    /// Set the inactivity duration after which the agent shuts down.
    fn set_idle_time(&mut self, timeout: Duration);
}
