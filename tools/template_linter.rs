//! Template Linter: checks record files for sigil misuse.
//!
//! Usage: template_linter <file|dir> [--width <n>]
//!
//! Every line of every `.txt` file is linted as a template. Lines of
//! high-priority files (`h_*.txt`) must also parse as event records, and
//! windows written end first are reported as warnings.
//! With `--width`, lines whose length (terminator excluded) differs from
//! `n - 2` are reported as warnings.

use std::path::{Path, PathBuf};
use std::process;
use subjective_time::core::markup::lint::lint_template;
use subjective_time::schema::record::PriorityRecord;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: template_linter <file|dir> [--width <n>]");
        process::exit(0);
    }

    let target = Path::new(&args[1]);
    let mut width: Option<usize> = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--width" && i + 1 < args.len() {
            i += 1;
            match args[i].parse::<usize>() {
                Ok(n) if n > 2 => width = Some(n),
                _ => {
                    eprintln!("ERROR: --width needs a number above 2, got '{}'", args[i]);
                    process::exit(1);
                }
            }
        }
        i += 1;
    }

    let mut files = Vec::new();
    if target.is_file() {
        files.push(target.to_path_buf());
    } else if target.is_dir() {
        collect_files(target, &mut files);
        files.sort();
    } else {
        eprintln!("ERROR: Path '{}' does not exist", target.display());
        process::exit(1);
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut line_total = 0;

    for path in &files {
        let contents = match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                eprintln!("  ERROR reading {}: {}", path.display(), e);
                continue;
            }
        };
        let (file_errors, file_warnings, lines) = lint_file(path, &contents, width);
        println!("  Checked: {} ({} lines)", path.display(), lines);
        errors.extend(file_errors);
        warnings.extend(file_warnings);
        line_total += lines;
    }

    println!("Checked {} records in {} files", line_total, files.len());

    println!("\n=== Template Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_files(&path, files);
            } else if path.extension().and_then(|s| s.to_str()) == Some("txt") {
                files.push(path);
            }
        }
    }
}

fn lint_file(path: &Path, contents: &str, width: Option<usize>) -> (Vec<String>, Vec<String>, usize) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let high_priority = path
        .file_name()
        .and_then(|s| s.to_str())
        .map_or(false, |name| name.starts_with("h_"));

    let mut count = 0;
    for (n, raw) in contents.split('\n').enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        count += 1;
        let at = format!("{}:{}", path.display(), n + 1);

        if let Some(width) = width {
            let len = line.chars().count();
            if len != width - 2 {
                warnings.push(format!("{}: length {} but records are {} wide", at, len, width - 2));
            }
        }

        let template = if high_priority {
            match PriorityRecord::parse(line) {
                Ok(record) => {
                    if record.is_reversed() {
                        warnings.push(format!(
                            "{}: window ends before it starts and will cover the rest of the year",
                            at
                        ));
                    }
                    record.message
                }
                Err(e) => {
                    errors.push(format!("{}: {}", at, e));
                    continue;
                }
            }
        } else {
            line.to_string()
        };

        for issue in lint_template(&template) {
            errors.push(format!("{}: {}", at, issue));
        }
    }
    (errors, warnings, count)
}
