// Launcher tests against real child processes
// Fake rulesctl binaries are small shell scripts, so these run on Unix only

#![cfg(unix)]


use rulesctl_shim::launcher::{LaunchRequest, launch};
use rulesctl_shim::{ReleaseConfig, ShimError};
use std::ffi::OsString;
use std::fs;
use test_helpers::{TestEnvironment, write_script};

fn config_for(env: &TestEnvironment) -> ReleaseConfig {
    ReleaseConfig::default().with_install_dir(&env.install_dir)
}

fn os_args(list: &[&str]) -> Vec<OsString> {
    list.iter().map(OsString::from).collect()
}

#[tokio::test]
async fn test_exit_codes_propagate() {
    for code in [0, 1, 2, 127] {
        let env = TestEnvironment::new();
        env.install_script(&format!("exit {}", code));

        let request = LaunchRequest::for_host(&config_for(&env), vec![]).unwrap();
        assert_eq!(launch(&request).await.unwrap(), code, "exit {code} not propagated");
    }
}

#[tokio::test]
async fn test_arguments_forwarded_in_order() {
    let env = TestEnvironment::new();
    let out = env.scratch("argv.txt");
    env.install_script(&format!("printf '%s\\n' \"$@\" > '{}'", out.display()));

    let args = os_args(&["login", "--token", "abc", "with space", ""]);
    let request = LaunchRequest::for_host(&config_for(&env), args).unwrap();
    assert_eq!(launch(&request).await.unwrap(), 0);

    let recorded = fs::read_to_string(&out).unwrap();
    assert_eq!(recorded, "login\n--token\nabc\nwith space\n\n");
}

#[tokio::test]
async fn test_signal_exit_maps_to_shell_convention() {
    let env = TestEnvironment::new();
    env.install_script("kill -TERM $$");

    let request = LaunchRequest::for_host(&config_for(&env), vec![]).unwrap();
    assert_eq!(launch(&request).await.unwrap(), 128 + 15);
}

#[tokio::test]
async fn test_non_executable_binary_is_spawn_error() {
    let env = TestEnvironment::new();
    fs::create_dir_all(&env.install_dir).unwrap();
    write_script(&env.binary_path(), "exit 0", 0o644);

    let request = LaunchRequest::for_host(&config_for(&env), vec![]).unwrap();
    let err = launch(&request).await.unwrap_err();

    match err {
        ShimError::Spawn { path, .. } => assert_eq!(path, env.binary_path()),
        other => panic!("expected Spawn, got {other:?}"),
    }
}

#[test]
fn test_missing_binary_before_install() {
    let env = TestEnvironment::new();
    let err = LaunchRequest::for_host(&config_for(&env), os_args(&["list"])).unwrap_err();
    assert!(matches!(err, ShimError::BinaryNotFound(_)));
}
