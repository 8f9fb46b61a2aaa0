//! Test CLI commands
#[cfg(test)]
use serial_test::serial;

#[cfg(test)]
#[serial]
mod test_cli {
    use std::process::{Command, Output};

    fn run(args: &[&str]) -> Output {
        Command::new("cargo")
            .arg("run")
            .arg("--")
            .args(args)
            .output()
            .unwrap_or_else(|err| panic!("Failed to execute: {err}"))
    }

    fn assert_success(output: &Output) -> String {
        let stdout = String::from_utf8(output.stdout.clone()).unwrap();
        assert!(
            output.status.success(),
            "Failed to execute command: stdout: {}; stderr: {}",
            stdout,
            String::from_utf8(output.stderr.clone()).unwrap()
        );
        stdout
    }

    #[test]
    fn test_help() {
        let output = run(&["--help"]);
        assert_success(&output);
    }

    #[test]
    fn test_check_help() {
        let output = run(&["check", "--help"]);
        let stdout = assert_success(&output);
        assert!(stdout.contains("--group-order"));
    }

    #[test]
    fn test_cli_request_grant() {
        let output = run(&[
            "check",
            "./tests/resources/request_grant.ltl2ba",
            "-p",
            "./tests/resources/simple.part",
        ]);
        let stdout = assert_success(&output);
        assert!(stdout.contains("realizable (k = 0)"), "stdout: {stdout}");
    }

    #[test]
    fn test_cli_debug() {
        let output = run(&[
            "--debug",
            "check",
            "./tests/resources/request_grant.ltl2ba",
            "-p",
            "./tests/resources/simple.part",
            "--direction",
            "forward",
        ]);
        let stdout = assert_success(&output);
        assert!(stdout.contains("DEBUG"), "stdout: {stdout}");
    }

    #[test]
    fn test_cli_logger_config_file() {
        let output = run(&[
            "--logger-config-file",
            "./tests/resources/log_config.yaml",
            "check",
            "./tests/resources/request_grant.ltl2ba",
            "-p",
            "./tests/resources/simple.part",
        ]);
        assert_success(&output);
    }

    #[test]
    fn test_cli_compositional() {
        let output = run(&[
            "check",
            "./tests/resources/grant_1.ltl2ba",
            "./tests/resources/grant_2.ltl2ba",
            "./tests/resources/exclusion.ltl2ba",
            "-p",
            "./tests/resources/two_clients.part",
            "--method",
            "comp",
            "--group-order",
            "((grant_1 grant_2) exclusion)",
            "--k-bound",
            "1",
        ]);
        let stdout = assert_success(&output);
        assert!(stdout.contains("Parenthesizing"), "stdout: {stdout}");
    }

    #[test]
    fn test_cli_config_file() {
        let output = run(&[
            "check",
            "./tests/resources/grant_1.ltl2ba",
            "./tests/resources/grant_2.ltl2ba",
            "-p",
            "./tests/resources/two_clients.part",
            "--config-file",
            "./tests/resources/acacia.toml",
        ]);
        assert_success(&output);
    }

    #[test]
    fn test_cli_missing_config_file() {
        let output = run(&[
            "check",
            "./tests/resources/request_grant.ltl2ba",
            "-p",
            "./tests/resources/simple.part",
            "--config-file",
            "./tests/resources/missing.toml",
        ]);
        assert!(!output.status.success());
    }

    #[test]
    fn test_cli_check_both() {
        let output = run(&[
            "check",
            "./tests/resources/request_grant.ltl2ba",
            "-p",
            "./tests/resources/simple.part",
            "--tocheck",
            "both",
            "--negated",
            "./tests/resources/request_grant_negated.ltl2ba",
        ]);
        let stdout = assert_success(&output);
        assert!(stdout.contains("realizable (k = 0)"), "stdout: {stdout}");
    }

    #[test]
    fn test_cli_unreal_without_negation() {
        let output = run(&[
            "check",
            "./tests/resources/request_grant.ltl2ba",
            "-p",
            "./tests/resources/simple.part",
            "--tocheck",
            "unreal",
        ]);
        assert!(!output.status.success());
    }

    #[test]
    fn test_cli_costs() {
        let output = run(&[
            "check",
            "./tests/resources/request_grant.ltl2ba",
            "-p",
            "./tests/resources/costs.part",
        ]);
        assert_success(&output);
    }

    #[test]
    fn test_cli_inspect() {
        let output = run(&[
            "inspect",
            "./tests/resources/response.ltl2ba",
            "-p",
            "./tests/resources/simple.part",
            "--player",
            "sys",
        ]);
        let stdout = assert_success(&output);
        assert!(stdout.contains("Turn-based automaton"), "stdout: {stdout}");
    }

    #[test]
    fn test_cli_missing_partition() {
        let output = run(&[
            "check",
            "./tests/resources/request_grant.ltl2ba",
            "-p",
            "./tests/resources/missing.part",
        ]);
        assert!(!output.status.success());
    }
}
