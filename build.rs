use std::path::{Path, PathBuf};

const MAX_LINES: usize = 750;

const SOURCE_DIR: &str = "src";

/// Calls that change the process working directory.
const CWD_MUTATIONS: &[&str] = &["set_current_dir", "CwdGuard::enter"];

fn main() {
    println!("cargo:rerun-if-changed={}", SOURCE_DIR);

    let files = collect_rust_files();
    for file in &files {
        println!("cargo:rerun-if-changed={}", file.display());
    }

    enforce_line_limits(&files);
    enforce_no_dead_code_allows(&files);
    enforce_serial_for_cwd_mutations(&files);
}

fn collect_rust_files() -> Vec<PathBuf> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set");
    let mut files = Vec::new();
    walk_directory(&PathBuf::from(manifest_dir).join(SOURCE_DIR), &mut files);
    files
}

fn walk_directory(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk_directory(&path, files);
        } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
            files.push(path);
        }
    }
}

fn count_non_empty_lines(content: &str) -> usize {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count()
}

fn enforce_line_limits(files: &[PathBuf]) {
    let mut violations = Vec::new();
    for file in files {
        match std::fs::read_to_string(file) {
            Ok(content) => {
                let line_count = count_non_empty_lines(&content);
                if line_count > MAX_LINES {
                    violations.push((file.clone(), line_count));
                }
            }
            Err(e) => println!(
                "cargo:warning=Could not read file {}: {}",
                file.display(),
                e
            ),
        }
    }

    if !violations.is_empty() {
        eprintln!("\n========================================");
        eprintln!("FILE LINE LIMIT EXCEEDED (max {} lines)", MAX_LINES);
        eprintln!("========================================");
        for (path, lines) in &violations {
            eprintln!(
                "  {} - {} lines (exceeds by {})",
                path.display(),
                lines,
                lines - MAX_LINES
            );
        }
        eprintln!("========================================\n");
        panic!(
            "Build failed: {} file(s) exceed the {} line limit",
            violations.len(),
            MAX_LINES
        );
    }
}

fn enforce_no_dead_code_allows(files: &[PathBuf]) {
    let mut violations: Vec<(PathBuf, usize)> = Vec::new();

    for file in files {
        if let Ok(content) = std::fs::read_to_string(file) {
            for (line_num, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if (trimmed.starts_with("#[allow(") || trimmed.starts_with("#![allow("))
                    && trimmed.contains("dead_code")
                {
                    violations.push((file.clone(), line_num + 1));
                }
            }
        }
    }

    if !violations.is_empty() {
        eprintln!("\n========================================");
        eprintln!("#[allow(dead_code)] IS NOT ALLOWED");
        eprintln!("========================================");
        for (path, line_num) in &violations {
            eprintln!("  {}:{}", path.display(), line_num);
        }
        eprintln!("========================================");
        eprintln!("Delete unused code, or gate test-only code with #[cfg(test)].");
        eprintln!("========================================\n");
        panic!(
            "Build failed: {} #[allow(dead_code)] occurrence(s) found. Remove the dead code.",
            violations.len()
        );
    }
}

/// Requires #[serial] for tests that change the working directory.
///
/// Log paths default to a relative `logs/` directory, so a test that moves the
/// working directory changes where every other test's relative writes land.
fn enforce_serial_for_cwd_mutations(files: &[PathBuf]) {
    let mut violations: Vec<(PathBuf, usize, String)> = Vec::new();

    for file in files {
        let Ok(content) = std::fs::read_to_string(file) else {
            continue;
        };
        let lines: Vec<&str> = content.lines().collect();

        let mut in_test_fn = false;
        let mut test_fn_start = 0;
        let mut test_fn_name = String::new();
        let mut has_serial = false;
        let mut brace_depth = 0i32;

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();

            if trimmed == "#[serial]" || trimmed == "#[serial_test::serial]" {
                has_serial = true;
            }

            if trimmed == "#[test]" || trimmed.starts_with("#[tokio::test") {
                for next in lines.iter().skip(i + 1).take(4) {
                    if let Some(fn_pos) = next.find("fn ") {
                        test_fn_start = i + 1;
                        let after_fn = next.get(fn_pos + 3..).unwrap_or_default();
                        test_fn_name = after_fn
                            .split('(')
                            .next()
                            .unwrap_or_default()
                            .trim()
                            .to_string();
                        in_test_fn = true;
                        brace_depth = 0;
                        break;
                    }
                }
            }

            if !in_test_fn {
                continue;
            }

            for c in line.chars() {
                if c == '{' {
                    brace_depth += 1;
                } else if c == '}' {
                    brace_depth -= 1;
                    if brace_depth == 0 {
                        in_test_fn = false;
                    }
                }
            }

            let mutates_cwd =
                !trimmed.starts_with("//") && CWD_MUTATIONS.iter().any(|m| trimmed.contains(m));
            if mutates_cwd && !has_serial {
                violations.push((file.clone(), test_fn_start, test_fn_name.clone()));
                in_test_fn = false;
            }

            if !in_test_fn {
                has_serial = false;
            }
        }
    }

    if !violations.is_empty() {
        eprintln!("\n========================================");
        eprintln!("CWD MUTATIONS REQUIRE #[serial]");
        eprintln!("========================================");
        for (path, line_num, name) in &violations {
            eprintln!("  {}:{}", path.display(), line_num);
            eprintln!("    test `{}` changes the working directory without #[serial]", name);
        }
        eprintln!("========================================\n");
        panic!(
            "Build failed: {} test(s) change the working directory without #[serial].",
            violations.len()
        );
    }
}
