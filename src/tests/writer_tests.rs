use super::*;
use crate::console::MemoryConsole;
use regex::Regex;
use serial_test::serial;
use std::fs;
use tempfile::{tempdir, TempDir};

/// Creates a writer aimed at `<tmp>/logs/test.log` with a captured console.
fn test_writer() -> (TempDir, LogWriter, MemoryConsole) {
    let dir = tempdir().expect("Failed to create temp dir");
    let console = MemoryConsole::new();
    let writer = LogWriter::new(dir.path().join("logs").join("test.log")).with_console(console.clone());
    (dir, writer, console)
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("log file should exist")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Restores the working directory when dropped.
struct CwdGuard {
    original: PathBuf,
}

impl CwdGuard {
    fn enter(dir: &Path) -> Self {
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir).unwrap();
        Self { original }
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

#[test]
fn test_write_debug_line() {
    let (_dir, writer, console) = test_writer();
    let trace = writer.trace_context();

    writer.write("debug", "Testing...", &trace);

    let lines = read_lines(writer.file_path());
    assert_eq!(lines.len(), 1);
    let pattern = Regex::new(
        r"^\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2} Debug: Testing\.\.\. on .*writer_tests\.rs:\d+ PID: \d+$",
    )
    .unwrap();
    assert!(pattern.is_match(&lines[0]), "unexpected line: {}", lines[0]);
    assert!(console.lines().is_empty());
}

#[test]
fn test_write_creates_missing_directory() {
    let (dir, writer, _console) = test_writer();
    assert!(!dir.path().join("logs").exists());

    writer.write("info", "first", "here");
    assert!(dir.path().join("logs").is_dir());

    // The second directory check must see the existing directory
    assert_eq!(writer.try_write("info", "second", "here").unwrap(), WriteOutcome::Written);
    assert_eq!(read_lines(writer.file_path()).len(), 2);
}

#[test]
fn test_write_bare_file_name_needs_no_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plain.log");
    let writer = LogWriter::new(&path).with_console(MemoryConsole::new());

    writer.write("notice", "no subdirectory", "here");

    assert_eq!(read_lines(&path).len(), 1);
}

#[test]
fn test_unknown_category_writes_degraded_line_and_warns() {
    let (_dir, writer, console) = test_writer();

    let outcome = writer
        .try_write("not-a-real-category", "X", "caller.rs:1 PID: 1")
        .unwrap();
    assert_eq!(outcome, WriteOutcome::UnknownCategory);

    let lines = read_lines(writer.file_path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("not-a-real-category (non existent category) X on caller.rs:1 PID: 1"));

    let console_lines = console.lines();
    assert_eq!(console_lines.len(), 1);
    assert!(console_lines[0].contains("Warning: The category not-a-real-category does not exist on"));
    assert!(console_lines[0].contains("writer_tests.rs"));
}

#[test]
fn test_unknown_category_uses_current_warning_label() {
    let (_dir, writer, console) = test_writer();
    writer.extend_categories([("warning".to_string(), Category::new("Careful:", "a careful"))]);

    writer.write("missing", "m", "t");

    assert!(console.lines()[0].contains("Careful: The category missing"));
}

#[test]
fn test_n_writes_produce_n_lines() {
    let (_dir, writer, _console) = test_writer();
    let pattern = Regex::new(r"^\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2} Info: line \d+ on t$").unwrap();

    for i in 0..25 {
        writer.write("info", &format!("line {}", i), "t");
    }

    let lines = read_lines(writer.file_path());
    assert_eq!(lines.len(), 25);
    for (i, line) in lines.iter().enumerate() {
        assert!(pattern.is_match(line), "malformed line: {}", line);
        assert!(line.contains(&format!("line {} on", i)));
    }
}

#[test]
fn test_file_deleted_between_writes_is_recreated() {
    let (_dir, writer, console) = test_writer();

    writer.write("info", "before rotation", "t");
    fs::remove_file(writer.file_path()).unwrap();
    writer.write("info", "after rotation", "t");

    let lines = read_lines(writer.file_path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("after rotation"));
    assert!(console.lines().is_empty());
}

#[test]
fn test_directory_blocked_by_file_is_reported() {
    let (dir, writer, console) = test_writer();
    fs::write(dir.path().join("logs"), "occupied").unwrap();

    writer.write("error", "lost", "t");

    assert!(dir.path().join("logs").is_file());
    let console_lines = console.lines();
    assert_eq!(console_lines.len(), 1);
    assert!(console_lines[0].contains("Logit error: path"));
    assert!(console_lines[0].contains("cannot be created on"));
    assert!(console_lines[0].contains(&format!("PID: {}", std::process::id())));
}

#[test]
fn test_try_write_returns_create_dir_error() {
    let (dir, writer, console) = test_writer();
    fs::write(dir.path().join("logs"), "occupied").unwrap();

    let err = writer.try_write("error", "lost", "t").unwrap_err();

    assert!(matches!(err, WriteError::CreateDir { .. }));
    assert_eq!(err.path(), writer.file_path());
    // try_write leaves reporting to the caller
    assert!(console.lines().is_empty());
}

#[test]
fn test_open_failure_is_reported() {
    let dir = tempdir().unwrap();
    let console = MemoryConsole::new();
    let target = dir.path().join("is-a-directory");
    fs::create_dir(&target).unwrap();
    let writer = LogWriter::new(&target).with_console(console.clone());

    assert!(matches!(
        writer.try_write("info", "x", "t"),
        Err(WriteError::Open { .. })
    ));

    writer.write("info", "x", "t");
    let console_lines = console.lines();
    assert_eq!(console_lines.len(), 1);
    assert!(console_lines[0].contains("Logit error: cannot open log file"));
}

#[test]
fn test_unknown_category_warns_even_when_open_fails() {
    let dir = tempdir().unwrap();
    let console = MemoryConsole::new();
    let target = dir.path().join("is-a-directory");
    fs::create_dir(&target).unwrap();
    let writer = LogWriter::new(&target).with_console(console.clone());

    writer.write("bogus", "x", "t");

    let console_lines = console.lines();
    assert_eq!(console_lines.len(), 2);
    assert!(console_lines[0].contains("Warning: The category bogus does not exist"));
    assert!(console_lines[1].contains("Logit error: cannot open log file"));
}

#[test]
fn test_trailing_newline_in_trace_is_not_doubled() {
    let (dir, writer, _console) = test_writer();
    for _ in 0..3 {
        writer.write("info", "x", "t\n");
    }

    let content = fs::read_to_string(dir.path().join("logs").join("test.log")).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(!content.contains("\n\n"));
    assert!(content.ends_with("Info: x on t\n"));
}

#[cfg(unix)]
#[test]
fn test_created_file_is_owner_writable() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, writer, _console) = test_writer();
    writer.write("info", "x", "t");

    let mode = fs::metadata(writer.file_path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o600, 0o600);
    assert_eq!(mode & 0o111, 0, "log files are not executable");
}

#[test]
fn test_extend_categories_through_writer() {
    let (_dir, writer, _console) = test_writer();
    writer.extend_categories([(
        "checkpoint".to_string(),
        Category::new("Checkpoint:", "a checkpoint"),
    )]);

    assert_eq!(
        writer.resolve_category("checkpoint"),
        Some(Category::new("Checkpoint:", "a checkpoint"))
    );
    assert_eq!(writer.try_write("checkpoint", "reached", "t").unwrap(), WriteOutcome::Written);
    assert!(read_lines(writer.file_path())[0].contains("Checkpoint: reached on t"));

    writer.load_categories();
    assert_eq!(writer.resolve_category("checkpoint"), None);
    assert_eq!(writer.categories(), CategoryRegistry::new());
}

#[test]
fn test_with_categories_replaces_registry() {
    let mut registry = CategoryRegistry::new();
    registry.extend_with([("audit".to_string(), Category::new("Audit:", "an audit"))]);

    let writer = LogWriter::new("unused.log").with_categories(registry);
    assert!(writer.resolve_category("audit").is_some());
}

#[test]
fn test_set_file_path_redirects_writes() {
    let (dir, mut writer, _console) = test_writer();
    let other = dir.path().join("other").join("redirected.log");

    writer.set_file_path(&other);
    writer.write("info", "moved", "t");

    assert_eq!(writer.file_path(), other.as_path());
    assert_eq!(read_lines(&other).len(), 1);
    assert!(!dir.path().join("logs").exists());
}

#[test]
fn test_with_file_path_redirects_writes() {
    let (dir, writer, _console) = test_writer();
    let other = dir.path().join("built.log");

    let writer = writer.with_file_path(&other);
    writer.write("notice", "built", "t");

    assert_eq!(writer.file_path(), other.as_path());
    assert_eq!(read_lines(&other).len(), 1);
    assert!(!dir.path().join("logs").exists());
}

#[test]
fn test_concurrent_writes_do_not_interleave() {
    let (_dir, writer, _console) = test_writer();
    let writer = Arc::new(writer);
    let pattern = Regex::new(r"^\S+ \S+ Notice: worker \d+ message \d+ on t$").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let writer = Arc::clone(&writer);
            std::thread::spawn(move || {
                for i in 0..20 {
                    writer.write("notice", &format!("worker {} message {}", worker, i), "t");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = read_lines(writer.file_path());
    assert_eq!(lines.len(), 160);
    assert!(lines.iter().all(|line| pattern.is_match(line)));
}

#[test]
fn test_trace_context_reports_current_pid() {
    let writer = LogWriter::new("unused.log");
    let pattern = Regex::new(&format!(".*PID: {}$", std::process::id())).unwrap();
    assert!(pattern.is_match(&writer.trace_context()));
}

#[test]
#[serial]
fn test_daily_writer_writes_under_relative_logs_dir() {
    let dir = tempdir().unwrap();
    let _cwd = CwdGuard::enter(dir.path());

    let writer = LogWriter::daily().with_console(MemoryConsole::new());
    let file_name = writer.file_path().file_name().and_then(|n| n.to_str()).unwrap();
    assert!(writer.file_path().starts_with("logs"));
    assert!(Regex::new(r"^\d{4}_\d{2}_\d{2}\.log$").unwrap().is_match(file_name));

    writer.write("debug", "Testing...", &writer.trace_context());

    let lines = read_lines(&dir.path().join(writer.file_path()));
    assert!(lines[0].contains("Debug:"));
    assert!(lines[0].contains("Testing..."));
}

#[tokio::test]
async fn test_spawn_write_completes() {
    let (_dir, writer, console) = test_writer();
    let writer = Arc::new(writer);

    writer
        .spawn_write("alert", "from a task", "t")
        .await
        .expect("write task panicked");
    writer
        .spawn_write("nope", "unknown from a task", "t")
        .await
        .expect("write task panicked");

    let lines = read_lines(writer.file_path());
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Alert: from a task on t"));
    assert!(lines[1].contains("nope (non existent category)"));
    // Trace context points at the spawning call, not the worker closure
    assert!(console.lines()[0].contains("writer_tests.rs"));
}
