use probe_trace::commands::{execute_run, RunArgs};
use probe_trace::flamegraph::{collapsed_stacks, generate_flamegraph};
use probe_trace::output::{read_report, validate_path, write_report, write_svg, CallTreeReport};
use probe_trace::profiler::{ManualClock, Profiler};
use std::path::Path;

const GAME_UNIT: &str = r#"{
    "type_name": "Game",
    "functions": [
        {
            "name": "tick",
            "params": [{ "name": "fast", "ty": "bool" }],
            "returns": "int",
            "marker": {},
            "body": [
                { "op": "if", "cond": { "var": "fast" }, "then": [
                    { "op": "return", "value": { "int": 0 } }
                ]},
                { "op": "let", "var": "n", "value": { "kind": "call", "function": "draw" } },
                { "op": "return", "value": { "var": "n" } }
            ]
        },
        {
            "name": "draw",
            "receiver": "instance",
            "returns": "int",
            "marker": { "label": "Draw" },
            "body": [
                { "op": "idle", "nanos": 1000 },
                { "op": "return", "value": { "int": 7 } }
            ]
        }
    ]
}"#;

fn sample_profiler() -> Profiler<ManualClock> {
    let clock = ManualClock::new();
    let mut profiler = Profiler::with_clock("frame", clock.clone());
    profiler.push("update");
    clock.advance(100);
    profiler.push("physics");
    clock.advance(300);
    profiler.pop().unwrap();
    profiler.pop().unwrap();
    profiler
}

#[test]
fn test_write_and_read_report() {
    let report = CallTreeReport::from_tree(sample_profiler().tree());
    let temp_file = tempfile::NamedTempFile::new().unwrap();

    write_report(&report, temp_file.path()).unwrap();
    let loaded = read_report(temp_file.path()).unwrap();

    assert_eq!(loaded.root_label, "frame");
    assert_eq!(loaded.find(&["update"]).unwrap().average_ns, Some(400));
    assert_eq!(
        loaded.find(&["update", "physics"]).unwrap().average_ns,
        Some(300)
    );
}

#[test]
fn test_validate_output_path_empty() {
    assert!(validate_path(Path::new("")).is_err());
}

#[test]
fn test_validate_output_path_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    assert!(validate_path(temp_dir.path()).is_err());
}

#[test]
fn test_flamegraph_written_to_nested_path() {
    let stacks = collapsed_stacks(sample_profiler().tree());
    let svg = generate_flamegraph(&stacks, None).unwrap();
    let temp_dir = tempfile::tempdir().unwrap();
    let nested_path = temp_dir.path().join("nested/dirs/flamegraph.svg");

    write_svg(&svg, &nested_path).unwrap();

    assert!(nested_path.exists());
    assert!(std::fs::read_to_string(&nested_path)
        .unwrap()
        .contains("physics"));
}

#[test]
fn test_run_command_end_to_end() {
    let temp_dir = tempfile::tempdir().unwrap();
    let unit_path = temp_dir.path().join("game.json");
    std::fs::write(&unit_path, GAME_UNIT).unwrap();
    let report_path = temp_dir.path().join("out/report.json");
    let svg_path = temp_dir.path().join("out/flamegraph.svg");

    let args = RunArgs {
        inputs: vec![unit_path],
        entry: "Game::tick".to_string(),
        args: vec!["false".parse().unwrap()],
        repeat: 2,
        instrument: true,
        root_label: "session".to_string(),
        report: Some(report_path.clone()),
        flamegraph: Some(svg_path.clone()),
        top_stacks: 3,
        ..Default::default()
    };

    let output = execute_run(&args).unwrap();

    assert!(output.starts_with("|=> session\n|   |=> Game.tick(bool) -> int : "));
    assert!(output.contains("|   |   |=> Draw : "));
    assert!(output.contains("stacks by self time:"));

    let report = read_report(&report_path).unwrap();
    let tick = report.find(&["Game.tick(bool) -> int"]).unwrap();
    assert_eq!(tick.count, 2);
    let draw = report.find(&["Game.tick(bool) -> int", "Draw"]).unwrap();
    assert_eq!(draw.count, 2);
    assert!(draw.min_ns.unwrap() >= 1000);
    assert!(svg_path.exists());
}

#[test]
fn test_run_command_without_instrumentation_records_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let unit_path = temp_dir.path().join("game.json");
    std::fs::write(&unit_path, GAME_UNIT).unwrap();

    let args = RunArgs {
        inputs: vec![unit_path],
        entry: "Game::tick".to_string(),
        args: vec!["true".parse().unwrap()],
        ..Default::default()
    };

    assert_eq!(execute_run(&args).unwrap(), "|=> root");
}
