use sap_overheating::input::Input;
use schemars::schema_for;

#[test]
fn test_generate_json_schema() {
    let schema = schema_for!(Input);
    assert!(serde_json::to_string_pretty(&schema).is_ok());
}

#[test]
fn test_schema_describes_both_building_representations() {
    let schema = serde_json::to_value(schema_for!(Input)).unwrap();
    let definitions = schema["definitions"].as_object().unwrap();

    assert!(definitions.contains_key("BuildingInput"));
    assert!(definitions.contains_key("RoomZoneInput"));
    assert!(definitions.contains_key("MassZoneInput"));
    assert!(schema["required"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("building")));
}
