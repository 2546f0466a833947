//! Focused unit tests covering solve CLI configuration and instance parsing.

use super::helpers::{workspace, write_instance, write_utf8};
use super::*;
use cabmatch_core::test_support::worked_example;
use crate::solve::{Dispatcher, SolveDispatcherBuilder};
use cabmatch_core::{
    AssignmentError, AssignmentOutcome, CostMatrix, CostParameters, NoSolutionReason,
    SolverUnavailableError, ValidationError,
};
use camino::Utf8Path;
use rstest::rstest;

fn args_for(path: &Utf8Path) -> SolveArgs {
    SolveArgs {
        instance_path: Some(path.to_path_buf()),
        ..SolveArgs::default()
    }
}

fn run_to_string(args: SolveArgs) -> Result<String, CliError> {
    let mut buffer = Vec::new();
    run_solve_with(args, &DefaultSolveDispatcherBuilder, &mut buffer)?;
    Ok(String::from_utf8(buffer).expect("stdout utf-8"))
}

#[rstest]
fn converting_solve_without_instance_errors() {
    let err = SolveConfig::try_from(SolveArgs::default()).expect_err("missing instance");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_SOLVE_INSTANCE);
            assert_eq!(env, ENV_SOLVE_INSTANCE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn solve_config_applies_defaults() {
    let config = SolveConfig::try_from(args_for(Utf8Path::new("instance.json"))).expect("config");
    assert_eq!(config.instance_path, "instance.json");
    assert_eq!(config.engine, "microlp");
    assert_eq!(config.format, OutputFormat::Text);
    assert_eq!(config.overrides, ParameterOverrides::default());
    assert!(!config.show_costs);
}

#[rstest]
#[case::text("text", OutputFormat::Text)]
#[case::json("json", OutputFormat::Json)]
#[case::mixed_case(" JSON ", OutputFormat::Json)]
fn solve_config_parses_formats(#[case] value: &str, #[case] expected: OutputFormat) {
    let args = SolveArgs {
        format: Some(value.to_owned()),
        ..args_for(Utf8Path::new("instance.json"))
    };
    let config = SolveConfig::try_from(args).expect("config");
    assert_eq!(config.format, expected);
}

#[rstest]
fn solve_config_rejects_unknown_format() {
    let args = SolveArgs {
        format: Some("yaml".to_owned()),
        ..args_for(Utf8Path::new("instance.json"))
    };
    let err = SolveConfig::try_from(args).expect_err("unknown format");
    match err {
        CliError::UnknownFormat { value } => assert_eq!(value, "yaml"),
        other => panic!("expected UnknownFormat, found {other:?}"),
    }
}

#[rstest]
fn overrides_replace_only_the_given_parameters() {
    let overrides = ParameterOverrides {
        traveling_cost_rate: Some(12.0),
        detour_time_weight: Some(0.0),
        ..ParameterOverrides::default()
    };
    let mut parameters = CostParameters::default();
    overrides.apply(&mut parameters);

    assert_eq!(parameters.traveling_cost_rate, 12.0);
    assert_eq!(parameters.weights.trip, 1.0);
    assert_eq!(parameters.weights.detour_distance, 1.0);
    assert_eq!(parameters.weights.detour_time, 0.0);
}

#[rstest]
fn validate_sources_reports_missing_instance() {
    let (_tmp, root) = workspace();
    let config = SolveConfig::try_from(args_for(&root.join("absent.json"))).expect("config");

    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_SOLVE_INSTANCE),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file() {
    let (_tmp, root) = workspace();
    let instance_path = root.join("instance.json");
    std::fs::create_dir(&instance_path).expect("instance directory");
    let config = SolveConfig::try_from(args_for(&instance_path)).expect("config");

    let err = config
        .validate_sources()
        .expect_err("expected directory path to fail validation");
    match err {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_SOLVE_INSTANCE);
            assert_eq!(path, instance_path);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn load_instance_decodes_json() {
    let (_tmp, root) = workspace();
    let instance_path = root.join("instance.json");
    let request = worked_example();
    write_instance(&instance_path, &request);

    let decoded = load_instance(&instance_path).expect("instance should decode");
    assert_eq!(decoded, request);
}

#[rstest]
fn load_instance_rejects_invalid_json() {
    let (_tmp, root) = workspace();
    let instance_path = root.join("instance.json");
    write_utf8(&instance_path, b"{ not valid json");

    let err = load_instance(&instance_path).expect_err("invalid json should error");
    match err {
        CliError::ParseInstance { path, .. } => assert_eq!(path, instance_path),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn load_instance_io_error_returns_open_error() {
    let (_tmp, root) = workspace();
    let instance_path = root.join("instance.json");

    let err = load_instance(&instance_path).expect_err("missing instance should error");
    match err {
        CliError::OpenInstance { path, .. } => assert_eq!(path, instance_path),
        other => panic!("expected OpenInstance, found {other:?}"),
    }
}

#[rstest]
fn text_report_matches_reference_batch() {
    let (_tmp, root) = workspace();
    let instance_path = root.join("instance.json");
    write_instance(&instance_path, &worked_example());

    let stdout = run_to_string(args_for(&instance_path)).expect("solve should succeed");
    assert_eq!(
        stdout,
        "Total cost = 336\n\n\
         Cab cab0 assigned to Rider rider2. Cost: 54\n\
         Cab cab1 assigned to Rider rider3. Cost: 64\n\
         Cab cab2 assigned to Rider rider1. Cost: 118\n\
         Cab cab3 assigned to Rider rider0. Cost: 100\n"
    );
}

#[rstest]
fn text_report_prints_cost_matrix_on_request() {
    let (_tmp, root) = workspace();
    let instance_path = root.join("instance.json");
    write_instance(&instance_path, &worked_example());

    let args = SolveArgs {
        show_costs: true,
        ..args_for(&instance_path)
    };
    let stdout = run_to_string(args).expect("solve should succeed");
    assert!(stdout.starts_with("Cost Matrix\n"));
    let matrix = worked_example().cost_matrix().expect("matrix").to_string();
    assert!(stdout.contains(&matrix));
    assert!(stdout.contains("Total cost = 336"));
}

#[rstest]
fn flag_overrides_reach_the_cost_model() {
    let (_tmp, root) = workspace();
    let instance_path = root.join("instance.json");
    write_instance(&instance_path, &worked_example());

    let args = SolveArgs {
        trip_weight: Some(0.0),
        ..args_for(&instance_path)
    };
    let stdout = run_to_string(args).expect("solve should succeed");
    assert!(stdout.starts_with("Total cost = 16\n"), "{stdout}");
}

#[rstest]
fn invalid_override_is_reported_against_the_instance() {
    let (_tmp, root) = workspace();
    let instance_path = root.join("instance.json");
    write_instance(&instance_path, &worked_example());

    let args = SolveArgs {
        traveling_cost_rate: Some(-1.0),
        ..args_for(&instance_path)
    };
    let err = run_to_string(args).expect_err("negative rate should fail");
    match err {
        CliError::InvalidInstance { path, source } => {
            assert_eq!(path, instance_path);
            assert!(matches!(source, ValidationError::InvalidParameter { .. }));
        }
        other => panic!("expected InvalidInstance, found {other:?}"),
    }
}

#[rstest]
fn unknown_engine_surfaces_as_solve_error() {
    let (_tmp, root) = workspace();
    let instance_path = root.join("instance.json");
    write_instance(&instance_path, &worked_example());

    let args = SolveArgs {
        engine: Some("cplex".to_owned()),
        ..args_for(&instance_path)
    };
    let err = run_to_string(args).expect_err("unknown engine should fail");
    match err {
        CliError::Solve { source } => assert_eq!(
            source,
            AssignmentError::SolverUnavailable(SolverUnavailableError::UnknownEngine {
                name: "cplex".to_owned(),
            })
        ),
        other => panic!("expected Solve, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "instance_path": 42 }));

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
            "engine": "default",
            "trip_weight": 2.0,
            "format": "json",
        }),
        None,
    );
    composer.push_environment(json!({
        "instance_path": "from-env.json",
        "trip_weight": 3.0,
    }));
    composer.push_cli(json!({
        "detour_time_weight": 0.5,
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.instance_path, "from-env.json");
    assert_eq!(config.engine, "default");
    assert_eq!(config.format, OutputFormat::Json);
    assert_eq!(config.overrides.trip_weight, Some(3.0));
    assert_eq!(config.overrides.detour_time_weight, Some(0.5));
    assert_eq!(config.overrides.traveling_cost_rate, None);
}

#[rstest]
fn demo_instance_matches_reference_batch() {
    let demo = Utf8Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos/worked_example.json");
    let decoded = load_instance(&demo).expect("demo instance should decode");
    assert_eq!(decoded, worked_example());
}

#[derive(Default)]
struct RecordingBuilder {
    received: std::rc::Rc<std::cell::RefCell<Vec<CostMatrix>>>,
}

struct RecordingDispatcher {
    received: std::rc::Rc<std::cell::RefCell<Vec<CostMatrix>>>,
}

impl Dispatcher for RecordingDispatcher {
    fn engine(&self) -> &str {
        "recording"
    }

    fn solve(&self, matrix: CostMatrix) -> Result<AssignmentOutcome, AssignmentError> {
        self.received.borrow_mut().push(matrix);
        Ok(AssignmentOutcome::NoSolution(NoSolutionReason::Infeasible))
    }
}

impl SolveDispatcherBuilder for RecordingBuilder {
    fn build(&self, _config: &SolveConfig) -> Result<Box<dyn Dispatcher>, CliError> {
        Ok(Box::new(RecordingDispatcher {
            received: std::rc::Rc::clone(&self.received),
        }))
    }
}

#[rstest]
fn prepare_request_prices_the_instance_with_overrides() {
    let (_tmp, root) = workspace();
    let instance_path = root.join("instance.json");
    write_instance(&instance_path, &worked_example());
    let args = SolveArgs {
        trip_weight: Some(0.0),
        ..args_for(&instance_path)
    };
    let config = SolveConfig::try_from(args).expect("config");

    let (request, matrix) = prepare_request(&config).expect("instance prices");
    assert_eq!(request.parameters.weights.trip, 0.0);
    assert_eq!(matrix.row(3), Some(&[0.0, 3.0, 11.0, 15.0][..]));
}

#[rstest]
fn printed_costs_are_the_matrix_handed_to_the_solver() {
    let (_tmp, root) = workspace();
    let instance_path = root.join("instance.json");
    write_instance(&instance_path, &worked_example());
    let args = SolveArgs {
        show_costs: true,
        format: Some("json".to_owned()),
        ..args_for(&instance_path)
    };
    let builder = RecordingBuilder::default();
    let mut buffer = Vec::new();
    run_solve_with(args, &builder, &mut buffer).expect("solve should succeed");

    let received = builder.received.borrow();
    assert_eq!(received.len(), 1);
    let solved = received.first().expect("one matrix");
    let report: serde_json::Value = serde_json::from_slice(&buffer).expect("JSON report");
    assert_eq!(report["engine"], "recording");
    assert_eq!(
        report["cost_matrix"],
        serde_json::to_value(solved).expect("matrix serialises")
    );
    assert_eq!(report["outcome"]["outcome"], "no_solution");
}
