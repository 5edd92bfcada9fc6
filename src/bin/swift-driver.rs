//! Thin executable wrapper: resolve the configuration, plan the build, print
//! the plan. Diagnostics go to stderr; any error-severity diagnostic (or a
//! fatal planning error) makes the exit code non-zero.

use std::process::ExitCode;
use swift_driver::{Driver, Result};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(std::env::args().collect()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<ExitCode> {
    let driver = Driver::new(args)?;
    let plan = driver.plan_build();

    for diag in driver.diagnostics.diagnostics() {
        eprintln!("{diag}");
    }
    if driver.diagnostics.has_errors() {
        return Ok(ExitCode::FAILURE);
    }

    // No job executor is wired up here; the planned invocations are the
    // product, exactly as `-driver-print-jobs` shows them.
    for job in plan? {
        println!("{job}");
    }
    Ok(ExitCode::SUCCESS)
}
