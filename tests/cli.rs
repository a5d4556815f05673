use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("primesieve").unwrap()
}

#[test]
fn counts_primes_below_a_stop_value() {
    cmd()
        .arg("100")
        .assert()
        .success()
        .stdout(predicate::str::contains("primes: 25"));
}

#[test]
fn counts_primes_in_an_explicit_start_stop_range() {
    cmd()
        .args(["10", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("primes: 21"));
}

#[test]
fn dist_flag_sets_stop_relative_to_start() {
    cmd()
        .args(["0", "--dist", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("primes: 25"));
}

#[test]
fn counts_twin_primes_with_digit_selector() {
    cmd()
        .args(["100", "-c2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("twin primes: 6"));
}

#[test]
fn prints_primes_one_per_line() {
    cmd()
        .args(["30", "-p"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("2\n3\n5\n7\n"));
}

#[test]
fn nth_prime_reports_the_expected_value() {
    cmd()
        .args(["10", "-n"])
        .assert()
        .success()
        .stdout(predicate::str::contains("29"));
}

#[test]
fn quiet_suppresses_result_output() {
    cmd()
        .args(["100", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn time_flag_reports_elapsed_seconds() {
    cmd()
        .args(["100", "--time"])
        .assert()
        .success()
        .stdout(predicate::str::contains("elapsed:"));
}

#[test]
fn test_flag_runs_known_answer_tests() {
    cmd()
        .arg("--test")
        .assert()
        .success()
        .stdout(predicate::str::contains("all known-answer tests passed"));
}

#[test]
fn rejects_stop_beyond_the_supported_range() {
    cmd()
        .arg("99999999999999999999999999999")
        .assert()
        .failure();
}

#[test]
fn rejects_invalid_count_digit() {
    cmd()
        .args(["100", "-c9"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("primesieve: "));
}

#[test]
fn missing_positional_is_a_user_error_not_a_panic() {
    cmd().assert().failure();
}
