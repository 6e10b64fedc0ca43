//! Unit tests for the instance-metadata envelope decode.

#![allow(clippy::expect_used)]

use gce_agent_bootstrap::decode_instance_metadata;

#[test]
fn decodes_full_document() {
    let body = r#"{
        "name": "agent-1",
        "networkInterfaces": [ { "accessConfigs": [ { "externalIp": "203.0.113.5" } ] } ],
        "attributes": { "teamcityData": "payload" }
    }"#;
    let metadata = decode_instance_metadata(body).expect("document should decode");
    assert_eq!(metadata.name, "agent-1");
    assert_eq!(metadata.external_ip(), Some("203.0.113.5"));
    assert_eq!(metadata.registration_payload(), "payload");
}

#[test]
fn tolerates_missing_optional_fields() {
    let metadata = decode_instance_metadata(r#"{"name": "agent-1"}"#)
        .expect("minimal document should decode");
    assert_eq!(metadata.name, "agent-1");
    assert!(metadata.network_interfaces.is_empty());
    assert_eq!(metadata.external_ip(), None);
    assert_eq!(metadata.registration_payload(), "");
}

#[test]
fn ignores_unknown_fields() {
    // The real endpoint returns far more than this crate reads: machine
    // type, zone, disks, scheduling, service accounts.
    let body = r#"{
        "name": "agent-1",
        "machineType": "projects/1/machineTypes/n1-standard-1",
        "zone": "projects/1/zones/europe-north1-a",
        "networkInterfaces": [ {
            "accessConfigs": [ { "externalIp": "203.0.113.5", "type": "ONE_TO_ONE_NAT" } ],
            "network": "projects/1/networks/default"
        } ],
        "attributes": { "teamcityData": "payload", "ssh-keys": "..." },
        "scheduling": { "preemptible": "FALSE" }
    }"#;
    let metadata = decode_instance_metadata(body).expect("document should decode");
    assert_eq!(metadata.external_ip(), Some("203.0.113.5"));
}

#[test]
fn malformed_json_is_absent() {
    assert!(decode_instance_metadata("").is_none());
    assert!(decode_instance_metadata("<html>rate limited</html>").is_none());
    assert!(decode_instance_metadata(r#"{"name": 42}"#).is_none());
}

#[test]
fn round_trip_preserves_read_fields() {
    let body = r#"{
        "name": "agent-1",
        "networkInterfaces": [ { "accessConfigs": [ { "externalIp": "203.0.113.5" } ] } ],
        "attributes": { "teamcityData": "payload" }
    }"#;
    let metadata = decode_instance_metadata(body).expect("document should decode");
    let encoded = serde_json::to_string(&metadata).expect("document should re-encode");
    let again = decode_instance_metadata(&encoded).expect("re-encoded document should decode");
    assert_eq!(again.name, metadata.name);
    assert_eq!(again.external_ip(), metadata.external_ip());
    assert_eq!(again.registration_payload(), metadata.registration_payload());
}
