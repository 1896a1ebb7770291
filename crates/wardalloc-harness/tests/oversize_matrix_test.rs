//! Process-boundary matrix for the allocation-failure policy.
//!
//! Spawns the `oversize` binary once per scenario and mode and asserts
//! the observable contract: terminate-mode rejections end the child
//! abnormally with the fixed diagnostic on stderr; ReturnNull-mode
//! rejections print a zero address and exit cleanly; the throwing
//! construction path terminates under both modes.

use assert_cmd::Command;
use predicates::str::contains;

use wardalloc_core::config::MODE_ENV_VAR;
use wardalloc_core::report::TERMINATING_LINE;
use wardalloc_harness::Scenario;

fn oversize(scenario: Scenario) -> Command {
    let mut cmd = Command::cargo_bin("oversize").expect("oversize binary");
    cmd.arg(scenario.name());
    cmd.env_remove(MODE_ENV_VAR);
    cmd
}

#[test]
fn terminate_mode_crashes_every_entry_point() {
    for scenario in Scenario::ALL {
        oversize(scenario)
            .env(MODE_ENV_VAR, "0")
            .assert()
            .failure()
            .stderr(contains(format!("{}:", scenario.name())))
            .stderr(contains(TERMINATING_LINE));
    }
}

#[test]
fn default_mode_is_terminate() {
    oversize(Scenario::Malloc)
        .assert()
        .failure()
        .stderr(contains(TERMINATING_LINE));
}

#[test]
fn return_null_mode_returns_zero_and_continues() {
    for scenario in Scenario::ALL {
        if !scenario.may_return_null() {
            continue;
        }
        oversize(scenario)
            .env(MODE_ENV_VAR, "1")
            .assert()
            .success()
            .stderr(contains(format!("{}:", scenario.name())))
            .stderr(contains("x: 0"));
    }
}

#[test]
fn throwing_construction_terminates_even_when_null_is_allowed() {
    oversize(Scenario::New)
        .env(MODE_ENV_VAR, "1")
        .assert()
        .failure()
        .stderr(contains(TERMINATING_LINE))
        .stderr(contains("construct"));
}

#[test]
fn diagnostic_names_the_rejecting_entry_point() {
    oversize(Scenario::CallocOverflow)
        .env(MODE_ENV_VAR, "0")
        .assert()
        .failure()
        .stderr(contains("alloc_zeroed"))
        .stderr(contains("overflows the address space"));

    oversize(Scenario::ReallocAfterMalloc)
        .env(MODE_ENV_VAR, "0")
        .assert()
        .failure()
        .stderr(contains("resize"))
        .stderr(contains("exceeds maximum supported size"));
}

#[test]
fn rejected_resize_leaves_the_existing_block_readable() {
    // The scenario itself asserts the byte value 42 survives the rejected
    // resize; a clean zero exit means the assertion held in the child.
    oversize(Scenario::ReallocAfterMalloc)
        .env(MODE_ENV_VAR, "1")
        .assert()
        .success()
        .stderr(contains("x: 0"));
}

#[test]
fn unrecognized_mode_values_fall_back_to_terminate() {
    oversize(Scenario::Malloc)
        .env(MODE_ENV_VAR, "definitely-not-a-mode")
        .assert()
        .failure()
        .stderr(contains(TERMINATING_LINE));
}
