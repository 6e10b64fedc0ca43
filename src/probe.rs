//! The metadata probe: one HTTP GET against the local metadata endpoint at
//! agent startup, then a fetch → decode → apply pipeline.
//!
//! Absence of GCE metadata is the expected common case (most agents are not
//! cloud instances), so every failure branch here logs at info/debug and
//! ends the probe; nothing propagates out and agent startup is never
//! disrupted.

use std::time::Duration;

use crate::configuration::{AgentConfiguration, IdleShutdown, INSTANCE_NAME_PARAMETER};
use crate::metadata::decode_instance_metadata;
use crate::registration::{JsonRegistrationCodec, RegistrationCodec};

/// Well-known local metadata endpoint, recursive so one response carries the
/// whole instance document.
pub const METADATA_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/?recursive=true";

/// Connect and read timeout for the single probe request. No retries.
const TIMEOUT: Duration = Duration::from_millis(10_000);

/// Why the instance document could not be fetched.
///
/// Never escapes the probe as a failure — the variants only exist so each
/// branch can log appropriately.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The metadata hostname did not resolve. Expected on non-GCE hosts.
    #[error("could not resolve metadata host")]
    HostNotFound,

    /// The endpoint answered with a status other than 200.
    #[error("HTTP {0}")]
    Status(u16),

    /// Any other transport fault: refused connection, timeout, reset.
    #[error("{0}")]
    Transport(Box<ureq::Error>),

    /// The response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(#[from] std::io::Error),
}

/// Source of the instance metadata document, abstracted so scenario tests
/// can substitute canned transport outcomes.
pub trait MetadataService {
    /// Fetch the raw instance document. `Ok` means HTTP 200 with a readable
    /// body.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] describing why no document is available.
    fn fetch_instance_document(&self) -> Result<String, FetchError>;
}

/// Production metadata service: blocking GET against [`METADATA_URL`] with
/// the `Metadata-Flavor: Google` header and 10 s connect / 10 s read
/// timeouts.
pub struct GoogleMetadataService {
    agent: ureq::Agent,
    url: String,
}

impl GoogleMetadataService {
    #[must_use]
    pub fn new() -> Self {
        Self::with_url(METADATA_URL)
    }

    /// Probe an alternative endpoint. Used by tests to point the service at
    /// a loopback listener.
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(TIMEOUT)
            .timeout_read(TIMEOUT)
            .build();
        Self {
            agent,
            url: url.into(),
        }
    }
}

impl Default for GoogleMetadataService {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataService for GoogleMetadataService {
    fn fetch_instance_document(&self) -> Result<String, FetchError> {
        let response = match self
            .agent
            .get(&self.url)
            .set("Metadata-Flavor", "Google")
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(FetchError::Status(code)),
            Err(ureq::Error::Transport(transport))
                if transport.kind() == ureq::ErrorKind::Dns =>
            {
                return Err(FetchError::HostNotFound);
            }
            Err(e) => return Err(FetchError::Transport(Box::new(e))),
        };
        // ureq maps 4xx/5xx to Err above; anything else non-200 (204, 206)
        // still means "no usable document".
        if response.status() != 200 {
            return Err(FetchError::Status(response.status()));
        }
        Ok(response.into_string()?)
    }
}

/// Run the probe once: fetch the instance document and, if it decodes, apply
/// it to the agent configuration.
pub fn fetch_configuration(
    service: &impl MetadataService,
    codec: &impl RegistrationCodec,
    configuration: &mut impl AgentConfiguration,
    idle_shutdown: &mut impl IdleShutdown,
) {
    let body = match service.fetch_instance_document() {
        Ok(body) => body,
        Err(FetchError::HostNotFound) => {
            tracing::info!(
                "Google Compute integration is not available: could not access {METADATA_URL}"
            );
            return;
        }
        Err(FetchError::Status(code)) => {
            tracing::info!(
                "Google Compute integration is not available: \
                 failed to connect to {METADATA_URL}: HTTP {code}"
            );
            return;
        }
        Err(e) => {
            tracing::info!(
                "Google Compute integration is not available: \
                 failed to connect to {METADATA_URL}: {e}"
            );
            tracing::debug!(error = ?e, "metadata fetch failed");
            return;
        }
    };
    apply_configuration(&body, codec, configuration, idle_shutdown);
}

/// Decode the instance document and mutate the agent configuration.
///
/// Either decode stage failing ends the probe with no mutation. Once both
/// succeed, every apply step runs; only the alternative address is skipped,
/// and only when the instance has no external access config.
pub fn apply_configuration(
    body: &str,
    codec: &impl RegistrationCodec,
    configuration: &mut impl AgentConfiguration,
    idle_shutdown: &mut impl IdleShutdown,
) {
    let Some(metadata) = decode_instance_metadata(body) else {
        tracing::info!("Google Compute integration is not available: invalid instance metadata");
        tracing::debug!(body);
        return;
    };

    let Some(data) = codec.decode(metadata.registration_payload()) else {
        tracing::info!("Google Compute integration is not available: no registration metadata");
        tracing::debug!(body);
        return;
    };

    tracing::info!(
        "Google Compute integration is available, will register agent \"{}\" on server URL \"{}\"",
        metadata.name,
        data.server_address
    );
    configuration.set_name(&metadata.name);
    configuration.set_server_url(&data.server_address);

    if let Some(external_ip) = metadata.external_ip() {
        tracing::info!("Setting external IP address: {external_ip}");
        configuration.add_alternative_address(external_ip);
    }

    configuration.add_configuration_parameter(INSTANCE_NAME_PARAMETER, &metadata.name);
    for (key, value) in &data.custom_agent_configuration_parameters {
        configuration.add_configuration_parameter(key, value);
        tracing::info!("Added configuration parameter: {key} => {value}");
    }

    if let Some(idle_timeout) = data.idle_timeout {
        idle_shutdown.set_idle_time(idle_timeout);
    }
}

/// Lifecycle hook wrapper around the probe.
///
/// The host agent framework constructs one reader at startup and fires
/// [`on_agent_configuration_loaded`] once its configuration store has
/// finished loading. The reader guards against re-entry: the probe runs at
/// most once per reader, matching the once-per-process contract.
///
/// [`on_agent_configuration_loaded`]: GceMetadataReader::on_agent_configuration_loaded
pub struct GceMetadataReader<S = GoogleMetadataService, R = JsonRegistrationCodec> {
    service: S,
    codec: R,
    probed: bool,
}

impl GceMetadataReader {
    /// Reader wired to the real metadata endpoint and production codec.
    #[must_use]
    pub fn new() -> Self {
        Self::with_service(GoogleMetadataService::new(), JsonRegistrationCodec)
    }
}

impl Default for GceMetadataReader {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MetadataService, R: RegistrationCodec> GceMetadataReader<S, R> {
    #[must_use]
    pub fn with_service(service: S, codec: R) -> Self {
        Self {
            service,
            codec,
            probed: false,
        }
    }

    /// Callback for the "agent configuration loaded" lifecycle event.
    ///
    /// Blocks until the probe completes (success or failure, worst case
    /// roughly the connect plus read timeout); callers sequence agent
    /// registration after it. Invocations after the first are no-ops.
    pub fn on_agent_configuration_loaded(
        &mut self,
        configuration: &mut impl AgentConfiguration,
        idle_shutdown: &mut impl IdleShutdown,
    ) {
        if self.probed {
            return;
        }
        self.probed = true;
        fetch_configuration(&self.service, &self.codec, configuration, idle_shutdown);
    }
}
