use std::fs::File;
use std::io::Write;

use varelim::pedigree::{family_network, Family};
use varelim::{compute_marginal, BayesError, Event, Network};

#[test]
fn network_survives_a_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("romanoffs.json");

    let network = family_network(&Family::romanoffs()).unwrap();
    let mut file = File::create(&path).unwrap();
    file.write_all(network.to_json_pretty().unwrap().as_bytes()).unwrap();
    drop(file);

    let loaded = Network::from_reader(File::open(&path).unwrap()).unwrap();
    assert_eq!(loaded, network);
    assert_eq!(loaded.fingerprint(), network.fingerprint());

    let event = Event::new().with("H_alexey", "+");
    let a = compute_marginal(&network, ["H_alexey"]).unwrap().lookup(&event).unwrap();
    let b = compute_marginal(&loaded, ["H_alexey"]).unwrap().lookup(&event).unwrap();
    assert_eq!(a, b);
}

#[test]
fn hand_written_network_loads() {
    let json = r#"{
        "domains": {"A": ["0", "1"], "B": ["0", "1"]},
        "factors": [
            {"scope": ["A"], "rows": [
                {"assignment": ["0"], "value": 0.5},
                {"assignment": ["1"], "value": 0.5}
            ]},
            {"scope": ["B"], "rows": [
                {"assignment": ["0"], "value": 0.5},
                {"assignment": ["1"], "value": 0.5}
            ]}
        ]
    }"#;
    let net = Network::from_json(json).unwrap();
    assert_eq!(net.variables(), vec!["A".to_string(), "B".to_string()]);

    let m = compute_marginal(&net, ["A"]).unwrap();
    assert_eq!(m.lookup(&Event::new().with("A", "0")).unwrap(), 0.5);
    assert_eq!(m.lookup(&Event::new().with("A", "1")).unwrap(), 0.5);
}

#[test]
fn incomplete_table_in_json_is_rejected() {
    let json = r#"{
        "domains": {"A": ["0", "1"]},
        "factors": [{"scope": ["A"], "rows": [{"assignment": ["0"], "value": 1.0}]}]
    }"#;
    let err = Network::from_json(json).unwrap_err();
    assert!(matches!(err, BayesError::Serialization { message } if message.contains("expected 2")));
}

#[test]
fn malformed_json_is_a_serialization_error() {
    let err = Network::from_json("{\"domains\": ").unwrap_err();
    assert!(matches!(err, BayesError::Serialization { .. }));
}
