use std::path::{Path, PathBuf};
use std::process::Command;

const MAX_LINES: usize = 750;

const CHECKED_EXTENSIONS: &[&str] = &["rs", "md", "yaml", "toml"];

const EXCLUDED_DIRS: &[&str] = &["target", ".git", "examples"];

const EXCLUDED_FILES: &[&str] = &["Cargo.lock", "spec.md"];

/// Codec used by every generated gRPC method.
const PROST_CODEC: &str = "tonic::codec::ProstCodec";

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/main");

    let sha = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=COLLECTOR_PROXY_GIT_SHA={}", sha);

    compile_collector_service();
    enforce_line_limits();
    enforce_no_dead_code_allows();
    enforce_serial_for_env_mutations();
}

/// Generates the `rpc.Collector` gRPC server and client stubs.
///
/// Message types are hand-written prost structs in `src/grpc/messages.rs`, so
/// only the service plumbing is generated and no `protoc` is required.
fn compile_collector_service() {
    let method = |name: &str, route: &str, input: &str, output: &str| {
        tonic_build::manual::Method::builder()
            .name(name)
            .route_name(route)
            .input_type(format!("crate::grpc::messages::{}", input))
            .output_type(format!("crate::grpc::messages::{}", output))
            .codec_path(PROST_CODEC)
            .build()
    };

    let service = tonic_build::manual::Service::builder()
        .name("Collector")
        .package("rpc")
        .method(method("ping", "Ping", "Empty", "Empty"))
        .method(method("kill", "Kill", "KillRequest", "Empty"))
        .method(method(
            "get_config_policy",
            "GetConfigPolicy",
            "Empty",
            "GetConfigPolicyReply",
        ))
        .method(method(
            "collect_metrics",
            "CollectMetrics",
            "MetricsArg",
            "MetricsReply",
        ))
        .method(method(
            "get_metric_types",
            "GetMetricTypes",
            "GetMetricTypesArg",
            "MetricsReply",
        ))
        .build();

    tonic_build::manual::Builder::new().compile(&[service]);
}

fn enforce_line_limits() {
    let root = manifest_root();
    let files = collect_files_to_check(&root);

    for file in &files {
        println!("cargo:rerun-if-changed={}", file.display());
    }

    let mut violations = Vec::new();
    for file in &files {
        match std::fs::read_to_string(file) {
            Ok(content) => {
                let line_count = content.lines().filter(|l| !l.trim().is_empty()).count();
                if line_count > MAX_LINES {
                    violations.push((relative(file, &root), line_count));
                }
            }
            Err(e) => println!(
                "cargo:warning=Could not read file {}: {}",
                relative(file, &root).display(),
                e
            ),
        }
    }

    if !violations.is_empty() {
        eprintln!("\nFILE LINE LIMIT EXCEEDED (max {} lines)", MAX_LINES);
        for (path, lines) in &violations {
            eprintln!("  {} - {} lines", path.display(), lines);
        }
        panic!(
            "Build failed: {} file(s) exceed the {} line limit",
            violations.len(),
            MAX_LINES
        );
    }
}

fn enforce_no_dead_code_allows() {
    let root = manifest_root();
    let mut violations = Vec::new();

    for file in rust_sources(&root) {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if (trimmed.starts_with("#[allow(") || trimmed.starts_with("#![allow("))
                && trimmed.contains("dead_code")
            {
                violations.push(format!("{}:{}", relative(&file, &root).display(), line_num + 1));
            }
        }
    }

    if !violations.is_empty() {
        eprintln!("\n#[allow(dead_code)] IS NOT ALLOWED");
        for v in &violations {
            eprintln!("  {}", v);
        }
        eprintln!("Delete unused code or gate test-only code behind #[cfg(test)].");
        panic!(
            "Build failed: {} #[allow(dead_code)] occurrence(s) found",
            violations.len()
        );
    }
}

/// Tests that touch process environment must carry `#[serial]`.
fn enforce_serial_for_env_mutations() {
    let root = manifest_root();
    let mut violations = Vec::new();

    for file in rust_sources(&root) {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };

        let mut has_serial = false;
        let mut in_test_fn = false;
        let mut brace_depth = 0i32;

        for (i, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed == "#[serial]" || trimmed == "#[serial_test::serial]" {
                has_serial = true;
            }
            if trimmed == "#[test]" || trimmed.starts_with("#[tokio::test") {
                in_test_fn = true;
                brace_depth = 0;
            }
            if !in_test_fn {
                continue;
            }

            for c in line.chars() {
                match c {
                    '{' => brace_depth += 1,
                    '}' => {
                        brace_depth -= 1;
                        if brace_depth == 0 {
                            in_test_fn = false;
                        }
                    }
                    _ => {}
                }
            }

            let mutates_env = !trimmed.starts_with("//")
                && (trimmed.contains("env::set_var") || trimmed.contains("env::remove_var"));
            if mutates_env && !has_serial {
                violations.push(format!("{}:{}", relative(&file, &root).display(), i + 1));
            }
            if !in_test_fn {
                has_serial = false;
            }
        }
    }

    if !violations.is_empty() {
        eprintln!("\nENV MUTATIONS REQUIRE #[serial]");
        for v in &violations {
            eprintln!("  {}", v);
        }
        panic!(
            "Build failed: {} test(s) mutate env vars without #[serial]",
            violations.len()
        );
    }
}

fn manifest_root() -> PathBuf {
    PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string()))
}

fn relative(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

fn rust_sources(root: &Path) -> Vec<PathBuf> {
    collect_files_to_check(root)
        .into_iter()
        .filter(|p| {
            p.extension().and_then(|e| e.to_str()) == Some("rs")
                && p.file_name().and_then(|n| n.to_str()) != Some("build.rs")
        })
        .collect()
}

fn collect_files_to_check(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk_directory(root, root, &mut files);
    files
}

fn walk_directory(dir: &Path, root: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if path.is_dir() {
            if !EXCLUDED_DIRS.contains(&name) && !name.starts_with('.') {
                walk_directory(&path, root, files);
            }
            continue;
        }

        let checked = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| CHECKED_EXTENSIONS.contains(&ext));
        let excluded = path
            .strip_prefix(root)
            .map(|rel| EXCLUDED_FILES.contains(&rel.to_string_lossy().as_ref()))
            .unwrap_or(false);

        if checked && !excluded {
            files.push(path);
        }
    }
}
