//! Focused unit tests covering locate and stores configuration and runs.

use super::helpers::{ORIGIN, StubPlacesBuilder, Workspace, grocer_north};
use super::*;
use crate::locate::{LocateArgs, LocateConfig, config_from_layers_for_test, locate_with_config};
use crate::report::PollStatus;
use crate::stores::{StoresArgs, StoresConfig, list_stores};
use grocery_core::{DEFAULT_SEARCH_RADIUS_METERS, LocationFixError, LocationProvider};
use rstest::{fixture, rstest};

#[fixture]
fn complete_args() -> LocateArgs {
    LocateArgs {
        latitude: Some(ORIGIN.y),
        longitude: Some(ORIGIN.x),
        accuracy: Some(12.0),
        timestamp_ms: Some(1_700_000_000_000),
        api_key: Some("key".to_owned()),
        ..LocateArgs::default()
    }
}

fn locate_config(workspace: &Workspace, args: LocateArgs) -> LocateConfig {
    let mut config = LocateConfig::try_from(args).expect("config should build");
    config.database = workspace.database.clone();
    config
}

#[rstest]
#[case::latitude(ARG_LATITUDE, ENV_LOCATE_LATITUDE)]
#[case::longitude(ARG_LONGITUDE, ENV_LOCATE_LONGITUDE)]
#[case::accuracy(ARG_ACCURACY, ENV_LOCATE_ACCURACY)]
#[case::api_key(ARG_API_KEY, ENV_LOCATE_API_KEY)]
fn converting_without_required_fields_errors(
    complete_args: LocateArgs,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let mut args = complete_args;
    match field {
        ARG_LATITUDE => args.latitude = None,
        ARG_LONGITUDE => args.longitude = None,
        ARG_ACCURACY => args.accuracy = None,
        _ => args.api_key = None,
    }

    let err = LocateConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn locate_config_applies_defaults(complete_args: LocateArgs) {
    let config = LocateConfig::try_from(complete_args).expect("config should build");

    assert_eq!(config.fix.provider, LocationProvider::Gps);
    assert_eq!(config.database, Utf8PathBuf::from(DEFAULT_DATABASE));
    assert_eq!(config.places.api_key, "key");
    assert_eq!(config.places.radius_meters, DEFAULT_SEARCH_RADIUS_METERS);
    assert_eq!(config.thresholds.search_radius_meters, DEFAULT_SEARCH_RADIUS_METERS);
}

#[rstest]
fn search_radius_reaches_both_filter_and_request(complete_args: LocateArgs) {
    let args = LocateArgs {
        search_radius: Some(250.0),
        provider: Some("network".to_owned()),
        ..complete_args
    };

    let config = LocateConfig::try_from(args).expect("config should build");

    assert_eq!(config.thresholds.search_radius_meters, 250.0);
    assert_eq!(config.places.radius_meters, 250.0);
    assert_eq!(config.fix.provider, LocationProvider::Network);
}

#[rstest]
fn out_of_range_latitude_is_rejected(complete_args: LocateArgs) {
    let args = LocateArgs {
        latitude: Some(123.0),
        ..complete_args
    };

    let err = LocateConfig::try_from(args).expect_err("latitude should be rejected");
    match err {
        CliError::InvalidFix(LocationFixError::InvalidLatitude(value)) => {
            assert_eq!(value, 123.0);
        }
        other => panic!("expected InvalidFix, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "latitude": "north" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "api_key": "from-file",
            "places_base_url": "http://places.from-file",
            "database": "from-file.db",
        }),
        None,
    );
    composer.push_environment(json!({
        "api_key": "from-env",
        "accuracy": 20.0,
    }));
    composer.push_cli(json!({
        "latitude": ORIGIN.y,
        "longitude": ORIGIN.x,
        "database": "from-cli.db",
    }));

    let config = config_from_layers_for_test(composer.layers()).expect("merged config");
    assert_eq!(config.places.api_key, "from-env");
    assert_eq!(config.places.base_url, "http://places.from-file");
    assert_eq!(config.database, Utf8PathBuf::from("from-cli.db"));
    assert_eq!(config.fix.accuracy, 20.0);
}

#[rstest]
fn locate_persists_and_alerts_stores_in_range(complete_args: LocateArgs) {
    let workspace = Workspace::new();
    let builder = StubPlacesBuilder {
        places: vec![
            grocer_north("Near Grocer", 400.0),
            grocer_north("Far Grocer", 2500.0),
        ],
    };

    let report = locate_with_config(locate_config(&workspace, complete_args), &builder)
        .expect("locate should succeed");

    assert!(report.accepted);
    assert_eq!(report.poll, PollStatus::Completed);
    assert_eq!(report.added, 1);
    assert_eq!(report.stores.len(), 1);
    assert_eq!(report.stores[0].name, "Near Grocer");
    let distance = report.stores[0].distance_meters.expect("distance");
    assert!((distance - 400.0).abs() < 5.0, "unexpected distance {distance}");
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].request_code, 0);
}

#[rstest]
fn repeated_locate_is_throttled_by_the_stored_poll_time(complete_args: LocateArgs) {
    let workspace = Workspace::new();
    let builder = StubPlacesBuilder {
        places: vec![grocer_north("Near Grocer", 400.0)],
    };

    locate_with_config(locate_config(&workspace, complete_args.clone()), &builder)
        .expect("first locate");
    let report = locate_with_config(locate_config(&workspace, complete_args), &builder)
        .expect("second locate");

    assert!(report.accepted, "a fresh process has no current location");
    assert_eq!(report.poll, PollStatus::Throttled);
    assert!(report.alerts.is_empty());
    assert_eq!(report.stores.len(), 1, "earlier store is kept");
}

#[rstest]
fn inaccurate_fix_is_rejected_without_polling(complete_args: LocateArgs) {
    let workspace = Workspace::new();
    let args = LocateArgs {
        accuracy: Some(400.0),
        ..complete_args
    };

    let report = locate_with_config(locate_config(&workspace, args), &StubPlacesBuilder::default())
        .expect("locate should succeed");

    assert!(!report.accepted);
    assert_eq!(report.poll, PollStatus::Skipped);
}

#[rstest]
fn stores_require_both_coordinates() {
    let args = StoresArgs {
        latitude: Some(ORIGIN.y),
        ..StoresArgs::default()
    };

    let err = StoresConfig::try_from(args).expect_err("half a location should error");
    assert!(matches!(err, CliError::IncompleteLocation));
}

#[rstest]
fn stores_are_listed_nearest_first(complete_args: LocateArgs) {
    let workspace = Workspace::new();
    let builder = StubPlacesBuilder {
        places: vec![
            grocer_north("Middle Grocer", 600.0),
            grocer_north("Close Grocer", 100.0),
            grocer_north("Edge Grocer", 900.0),
        ],
    };
    locate_with_config(locate_config(&workspace, complete_args), &builder).expect("locate");

    let config = StoresConfig {
        database: workspace.database.clone(),
        origin: Some(ORIGIN),
    };
    let names: Vec<String> = list_stores(&config)
        .expect("stores should list")
        .into_iter()
        .map(|store| store.name)
        .collect();

    assert_eq!(names, ["Close Grocer", "Middle Grocer", "Edge Grocer"]);
}

#[rstest]
fn listing_stores_without_a_database_fails() {
    let workspace = Workspace::new();
    let config = StoresConfig {
        database: workspace.database.clone(),
        origin: None,
    };

    let err = list_stores(&config).expect_err("missing database should error");
    match err {
        CliError::MissingDatabase { path } => assert_eq!(path, workspace.database),
        other => panic!("expected MissingDatabase, found {other:?}"),
    }
}

#[rstest]
#[case::expiring(Some(std::time::Duration::from_secs(2 * 60 * 60)), Some(7200))]
#[case::never_expiring(None, None)]
fn alert_reports_carry_the_expiration(
    #[case] expiration: Option<std::time::Duration>,
    #[case] expected_secs: Option<u64>,
) {
    use crate::report::AlertReport;
    use grocery_core::ProximityAlert;

    let alert = ProximityAlert {
        request_code: 3,
        store_name: "Corner Grocer".to_owned(),
        location: ORIGIN,
        radius_meters: 50.0,
        expiration,
    };

    let report = AlertReport::from(&alert);
    assert_eq!(report.expiration_secs, expected_secs);

    let json = serde_json::to_value(&report).expect("serialise alert");
    assert_eq!(
        json.get("expiration_secs").and_then(serde_json::Value::as_u64),
        expected_secs
    );
}
