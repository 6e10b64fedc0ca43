//! GCE instance metadata document — the JSON envelope returned by the
//! instance metadata endpoint with `?recursive=true`.

use serde::{Deserialize, Serialize};

/// Top-level instance metadata document.
///
/// A read-only snapshot of one HTTP response; decoded once per agent startup
/// and discarded after use. Unknown fields are ignored, missing optional
/// fields are tolerated as absent/empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceMetadata {
    /// Instance name, used as the agent name and published as the
    /// instance-name configuration parameter.
    pub name: String,

    /// Custom metadata attributes attached to the instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<InstanceAttributes>,

    /// Network interfaces in the order the metadata service reports them.
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
}

/// Custom metadata attributes. Only the registration payload is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceAttributes {
    /// Opaque registration payload, independently encoded by the server side
    /// that provisioned the instance. Decoded by a [`RegistrationCodec`].
    ///
    /// [`RegistrationCodec`]: crate::registration::RegistrationCodec
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teamcity_data: Option<String>,
}

/// One network interface of the instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(default)]
    pub access_configs: Vec<AccessConfig>,
}

/// External access configuration of a network interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    pub external_ip: String,
}

impl InstanceMetadata {
    /// External IP of the first network interface's first access config.
    ///
    /// Additional interfaces and access configs are ignored; an instance
    /// with no external access simply has no alternative address.
    #[must_use]
    pub fn external_ip(&self) -> Option<&str> {
        self.network_interfaces
            .first()
            .and_then(|interface| interface.access_configs.first())
            .map(|config| config.external_ip.as_str())
    }

    /// Registration payload string, empty when the attribute is absent.
    #[must_use]
    pub fn registration_payload(&self) -> &str {
        self.attributes
            .as_ref()
            .and_then(|attributes| attributes.teamcity_data.as_deref())
            .unwrap_or("")
    }
}

/// Decode the instance metadata envelope.
///
/// Malformed JSON and shape mismatches are never surfaced as errors: the
/// decode detail goes to the debug log and the caller sees `None`, matching
/// the probe's silent-by-default failure policy.
#[must_use]
pub fn decode_instance_metadata(body: &str) -> Option<InstanceMetadata> {
    match serde_json::from_str(body) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            tracing::debug!(error = %e, "failed to decode instance metadata");
            None
        }
    }
}
