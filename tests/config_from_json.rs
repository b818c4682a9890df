use camino::Utf8Path;
use galorbit::{
    galorbit::{Galorbit, GalorbitConfig},
    galorbit_errors::ErrorCategory,
    potential::PotentialModel,
    GalorbitError,
};

#[test]
fn test_config_file_matches_defaults() {
    let config = GalorbitConfig::from_json_path(Utf8Path::new("tests/data/config.json")).unwrap();
    assert_eq!(config, GalorbitConfig::default());

    let galorbit = Galorbit::new(config).unwrap();
    assert_eq!(galorbit.potential(), &PotentialModel::milky_way());
}

#[test]
fn test_missing_config_file() {
    let err = GalorbitConfig::from_json_path(Utf8Path::new("tests/data/no_such_config.json"))
        .unwrap_err();
    assert!(matches!(err, GalorbitError::IoError(_)));
    assert_eq!(err.category(), ErrorCategory::Io);
}

#[test]
fn test_potential_errors_are_configuration_errors() {
    let config = GalorbitConfig::from_json_str(
        r#"{"potential": [{"kind": "miyamoto_nagai", "m": 6.8e10, "a": 3.0}]}"#,
    )
    .unwrap();
    let err = Galorbit::new(config).unwrap_err();
    assert_eq!(
        err,
        GalorbitError::MissingPotentialParameter {
            component: "miyamoto_nagai",
            parameter: "b"
        }
    );
    assert_eq!(err.category(), ErrorCategory::Configuration);

    let config = GalorbitConfig::from_json_str(r#"{"potential": ["isochrone:m=1e10,b=1"]}"#)
        .unwrap();
    assert_eq!(
        Galorbit::new(config).unwrap_err(),
        GalorbitError::UnknownPotentialComponent("isochrone".into())
    );
}

#[test]
fn test_config_serialization_roundtrip() {
    let config = GalorbitConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(GalorbitConfig::from_json_str(&json).unwrap(), config);
}
