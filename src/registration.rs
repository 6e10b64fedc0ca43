//! Registration data embedded in instance metadata — server address, custom
//! agent parameters, and the optional idle-shutdown timeout.

use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;

/// Agent registration data carried inside the instance metadata's opaque
/// payload attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationData {
    /// URL of the server the agent should register with.
    pub server_address: String,

    /// Extra configuration parameters to publish on the agent, applied in
    /// insertion order.
    pub custom_agent_configuration_parameters: IndexMap<String, String>,

    /// Inactivity duration after which the agent should shut down.
    pub idle_timeout: Option<Duration>,
}

/// Decoder for the registration payload string.
///
/// The payload's wire format belongs to the agent-push protocol, not to this
/// crate, so the decode step stays behind a trait: production wires in
/// [`JsonRegistrationCodec`], tests substitute a double. Decode failure is
/// absence, never an error — an instance without a usable payload is simply
/// not a managed agent instance.
pub trait RegistrationCodec {
    /// Decode `raw` (possibly empty) into registration data, or `None` when
    /// the payload is missing or unreadable.
    fn decode(&self, raw: &str) -> Option<RegistrationData>;
}

/// Wire shape of the JSON registration payload.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationWire {
    server_address: String,
    #[serde(default)]
    custom_agent_configuration_parameters: IndexMap<String, String>,
    /// Idle timeout in milliseconds.
    #[serde(default)]
    idle_timeout: Option<u64>,
}

/// Production codec: the payload is a JSON object with `serverAddress`,
/// `customAgentConfigurationParameters`, and an optional `idleTimeout` in
/// milliseconds.
#[derive(Debug, Default)]
pub struct JsonRegistrationCodec;

impl RegistrationCodec for JsonRegistrationCodec {
    fn decode(&self, raw: &str) -> Option<RegistrationData> {
        let wire: RegistrationWire = match serde_json::from_str(raw) {
            Ok(wire) => wire,
            Err(e) => {
                tracing::debug!(error = %e, "failed to decode registration payload");
                return None;
            }
        };
        Some(RegistrationData {
            server_address: wire.server_address,
            custom_agent_configuration_parameters: wire.custom_agent_configuration_parameters,
            idle_timeout: wire.idle_timeout.map(Duration::from_millis),
        })
    }
}
