use std::process::ExitCode;

use healthcheck::{
    DatabaseOptions, LoggingBuilder, RunPlan, RunnerError, RunnerOptions, RunnerResult,
    load_configuration,
};
use healthcheck_config::{ConfigError, Resolver};
use tracing::{debug, info};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunnerError::Config(ConfigError::CommandLine(e))) => {
            let status = u8::try_from(e.exit_code()).unwrap_or(2);
            let _ = e.print();
            ExitCode::from(status)
        }
        Err(e) => {
            eprintln!("healthcheck: {e}");
            ExitCode::from(e.exit_status())
        }
    }
}

fn run() -> RunnerResult<()> {
    let backing = load_configuration(std::env::args_os())?;
    let options = Resolver::<dyn RunnerOptions>::shared(backing.clone())?;

    LoggingBuilder::from_options(&options)?.try_init()?;
    debug!("Resolved configuration:\n{options}");

    let database = Resolver::<dyn DatabaseOptions>::shared(backing)?;
    let plan = RunPlan::resolve(&database, &options)?;

    if options.is_show_config() {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        info!(
            server = %plan.connection.url(),
            databases = ?plan.databases,
            tests = ?plan.selection.tests,
            groups = ?plan.selection.groups,
            output = %plan.output,
            "Healthcheck run configured"
        );
    }
    Ok(())
}
