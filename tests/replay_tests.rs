use gdbprof::commands::{replay_session, validate_replay_args, ReplayArgs};
use gdbprof::output::{format_report, write_report, ReportOptions};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

const SAMPLES: &str = r#"# two threads, four ticks
{"thread_id": 1, "thread_name": "main", "frames": ["main", "work", "io"]}
{"thread_id": 2, "thread_name": "bg", "frames": ["start_thread", "poll"]}
{"thread_id": 1, "thread_name": "main", "frames": ["main", "work", "io"]}
{"thread_id": 2, "thread_name": "bg", "frames": ["start_thread", "poll"]}
{"thread_id": 1, "thread_name": "main", "frames": ["main", "idle"]}
{"thread_id": 2, "thread_name": "bg", "frames": ["start_thread", null]}
"#;

fn sample_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn args(file: &NamedTempFile) -> ReplayArgs {
    ReplayArgs {
        input: file.path().to_path_buf(),
        ..ReplayArgs::default()
    }
}

#[test]
fn test_replay_report() {
    let file = sample_file(SAMPLES);
    let args = args(&file);

    let session = replay_session(&args).unwrap();
    let report = format_report(&session, &args.report);

    let expected = [
        "",
        "Thread: 1 (main) - 3 samples",
        "",
        "+ 100.00% main",
        "  + 66.67% work",
        "  | + 66.67% io",
        "  + 33.33% idle",
        "",
        "Thread: 2 (bg) - 3 samples",
        "",
        "+ 100.00% start_thread",
        "  + 66.67% poll",
        "  + 33.33% ???",
        "",
    ]
    .join("\n");

    assert_eq!(report, expected);
}

#[test]
fn test_replay_inverted() {
    let file = sample_file(SAMPLES);
    let args = ReplayArgs {
        inverted: true,
        ..args(&file)
    };

    let session = replay_session(&args).unwrap();
    let root = session.thread(1).unwrap().root();
    assert_eq!(root.child("io").unwrap().total_samples(), 2);
    assert_eq!(root.child("idle").unwrap().total_samples(), 1);
}

#[test]
fn test_replay_counts_and_chains() {
    let file = sample_file(SAMPLES);
    let args = ReplayArgs {
        report: ReportOptions {
            counts: true,
            top_chains: 2,
            ..ReportOptions::default()
        },
        ..args(&file)
    };

    let session = replay_session(&args).unwrap();
    let report = format_report(&session, &args.report);

    assert!(report.contains("3 - main\n  2 - work\n    2 - io\n  1 - idle\n"));
    assert!(report.contains("Hot chains:\n2\t66.67%\tmain->work->io\n1\t33.33%\tmain->idle\n"));
}

#[test]
fn test_replay_bad_file() {
    let file = sample_file("{\"thread_id\": 1, \"frames\": [\"main\"]}\nnot json\n");
    let error = replay_session(&args(&file)).unwrap_err();
    assert!(format!("{:#}", error).contains("line 2"));
}

#[test]
fn test_replay_missing_file() {
    let args = ReplayArgs {
        input: "does/not/exist.jsonl".into(),
        ..ReplayArgs::default()
    };
    assert!(replay_session(&args).is_err());
}

#[test]
fn test_validate_replay_args() {
    let file = sample_file(SAMPLES);
    assert!(validate_replay_args(&args(&file)).is_ok());

    let negative = ReplayArgs {
        report: ReportOptions {
            threshold: -1.0,
            ..ReportOptions::default()
        },
        ..args(&file)
    };
    assert!(validate_replay_args(&negative).is_err());

    assert!(validate_replay_args(&ReplayArgs::default()).is_err());
}

#[test]
fn test_write_report_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("out/report.txt");

    write_report("Thread: 1 (main) - 0 samples\n", &path).unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "Thread: 1 (main) - 0 samples\n"
    );
}
