use clap::Parser;
use midiwire::cli::{validate_device, Args};

#[test]
fn test_args_with_device_binding() {
    let args = Args::parse_from(["test", "--bind-to-device", "Mock Device 1"]);
    assert_eq!(args.bind_to_device, Some("Mock Device 1".to_string()));
    assert!(!args.device_list);
    assert!(!args.identity_query);
    assert_eq!(args.timeout_ms, 200);
}

#[test]
fn test_args_without_device_binding() {
    let args = Args::parse_from(["test"]);
    assert_eq!(args.bind_to_device, None);
    assert!(!args.device_list);
}

#[test]
fn test_identity_query_args() {
    let args = Args::parse_from([
        "test",
        "--bind-to-device",
        "Synth",
        "--identity-query",
        "--timeout-ms",
        "50",
    ]);
    assert!(args.identity_query);
    assert_eq!(args.timeout_ms, 50);
}

#[test]
fn test_valid_device_passes_validation() {
    let devices = vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()];
    assert!(validate_device("Mock Device 1", &devices).is_ok());
    // Substring matching, same as the port lookup
    assert!(validate_device("Device 2", &devices).is_ok());
}

#[test]
fn test_invalid_device_fails_validation() {
    let devices = vec!["Mock Device 1".to_string()];
    let err = validate_device("Missing Device", &devices).unwrap_err();
    assert!(err.contains("Missing Device"));
    assert!(err.contains("Mock Device 1"));
}

#[cfg(feature = "test-mock")]
#[test]
fn test_mock_device_list() {
    let devices = midiwire::transport::list_devices();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0], "Mock Device 1");
    assert_eq!(devices[1], "Mock Device 2");
}
