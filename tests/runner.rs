// tests/runner.rs

use std::path::PathBuf;

use procpool::engine::{build_plan, run_plan};
use procpool::errors::ProcpoolError;
use procpool::exec::ProcessPool;
use procpool::fs::mock::MockFileSystem;
use procpool::types::InputMode;
use procpool_test_utils::builders::{ConfigFileBuilder, ToolConfigBuilder};
use procpool_test_utils::{init_tracing, with_timeout};

fn have(program: &str) -> bool {
    if which::which(program).is_ok() {
        return true;
    }
    eprintln!("skipping: `{program}` is necessary to run this test");
    false
}

#[tokio::test(flavor = "multi_thread")]
async fn stdin_tools_receive_file_contents() {
    init_tracing();
    if !have("cat") {
        return;
    }

    let cfg = ConfigFileBuilder::new()
        .with_tool("cat", ToolConfigBuilder::new("cat").build())
        .build();
    let fs = MockFileSystem::new();
    fs.add_file("b.sh", "echo b\n");
    fs.add_file("a.sh", "echo a\n");

    let files = vec![PathBuf::from("b.sh"), PathBuf::from("a.sh")];
    let plan = build_plan(&cfg, &[], &files).unwrap();
    let pool = ProcessPool::new(2);

    let summary = with_timeout(run_plan(&pool, &cfg, &plan, &fs)).await.unwrap();

    assert!(summary.is_success(), "{:?}", summary.failures);
    let got: Vec<_> = summary
        .reports
        .iter()
        .map(|r| (r.file.to_str().unwrap(), r.output.as_str()))
        .collect();
    assert_eq!(got, vec![("a.sh", "echo a\n"), ("b.sh", "echo b\n")]);
}

#[tokio::test(flavor = "multi_thread")]
async fn arg_tools_receive_file_path() {
    init_tracing();
    if !have("echo") {
        return;
    }

    let cfg = ConfigFileBuilder::new()
        .with_tool(
            "echo",
            ToolConfigBuilder::new("echo checking")
                .arg("--")
                .input(InputMode::Arg)
                .build(),
        )
        .build();
    let fs = MockFileSystem::new();
    fs.add_file("dir/x.yml", "key: value\n");
    let plan = build_plan(&cfg, &[], &[PathBuf::from("dir/x.yml")]).unwrap();
    let pool = ProcessPool::new(1);

    let summary = with_timeout(run_plan(&pool, &cfg, &plan, &fs)).await.unwrap();

    assert!(summary.is_success(), "{:?}", summary.failures);
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.reports[0].output, "checking -- dir/x.yml\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn one_failing_tool_does_not_hide_others() {
    init_tracing();
    if !have("cat") || !have("false") {
        return;
    }

    let cfg = ConfigFileBuilder::new()
        .with_tool("broken", ToolConfigBuilder::new("false").input(InputMode::Arg).build())
        .with_tool("cat", ToolConfigBuilder::new("cat").build())
        .build();
    let fs = MockFileSystem::new();
    fs.add_file("f.txt", "content");
    let plan = build_plan(&cfg, &[], &[PathBuf::from("f.txt")]).unwrap();
    let pool = ProcessPool::new(2);

    let summary = with_timeout(run_plan(&pool, &cfg, &plan, &fs)).await.unwrap();

    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].tool, "broken");
    assert!(summary.failures[0].error.contains("stdout was empty"), "{}", summary.failures[0].error);
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.reports[0].output, "content");
}

#[tokio::test(flavor = "multi_thread")]
async fn unreadable_input_is_reported_per_tool() {
    init_tracing();
    if !have("cat") {
        return;
    }

    let cfg = ConfigFileBuilder::new()
        .with_tool("cat", ToolConfigBuilder::new("cat").build())
        .build();
    let fs = MockFileSystem::new();
    fs.add_file("present.txt", "here");
    let files = vec![PathBuf::from("present.txt"), PathBuf::from("missing.txt")];
    let plan = build_plan(&cfg, &[], &files).unwrap();
    let pool = ProcessPool::new(1);

    let summary = with_timeout(run_plan(&pool, &cfg, &plan, &fs)).await.unwrap();

    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].error.contains("missing.txt"));
}

#[tokio::test]
async fn unresolvable_tool_aborts_before_running() {
    init_tracing();
    let cfg = ConfigFileBuilder::new()
        .with_tool("ghost", ToolConfigBuilder::new("this-command-does-not-exist").build())
        .build();
    let fs = MockFileSystem::new();
    let plan = build_plan(&cfg, &[], &[PathBuf::from("f")]).unwrap();
    let pool = ProcessPool::new(1);

    let err = run_plan(&pool, &cfg, &plan, &fs).await.unwrap_err();
    assert!(matches!(err, ProcpoolError::Resolve(_)), "{err:?}");
    assert_eq!(pool.in_flight(), 0);
}
