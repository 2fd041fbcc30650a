use gradnet::activations::Activation;
use gradnet::persistence::{from_json, to_json};
use gradnet::{CellFactory, Network};

#[test]
fn snapshot_preserves_cell_names_and_uuids() {
    let mut net = Network::new();
    let cell = CellFactory::rnn(&mut net, 2, 2, Activation::Tanh, true, true, 0.2, 0.1, 0.01)
        .unwrap();
    let original_uuid = net.cells()[cell.0].uuid();
    let original_name = net.cells()[cell.0].name().to_string();

    let json = to_json(&net).unwrap();
    let restored = from_json(&json).unwrap();

    assert_eq!(restored.cells().len(), 1);
    assert_eq!(restored.cells()[0].uuid(), original_uuid);
    assert_eq!(restored.cells()[0].name(), original_name);
    assert_eq!(restored.nodes().len(), net.nodes().len());
    assert_eq!(restored.edges().len(), net.edges().len());
}

#[test]
fn restored_network_requires_reinitialization_before_use() {
    let mut net = Network::new();
    CellFactory::dense(&mut net, 2, 1, Activation::Sigmoid, 0.3, 0.0, 0.0).unwrap();
    let json = to_json(&net).unwrap();
    let mut restored = from_json(&json).unwrap();

    assert!(!restored.is_initialized());
    assert!(restored.forward(&[vec![1.0, 1.0]]).is_err());
    restored.initialize().unwrap();
    restored.forward(&[vec![1.0, 1.0]]).unwrap();
}
