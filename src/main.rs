use clap::Parser;
use std::process::ExitCode;
use syntax_catalogue::cli::{self, Command};
use syntax_catalogue::commands::{self, codes};
use syntax_catalogue::logging::{self, Verbosity};

fn main() -> ExitCode {
    let args = cli::Args::parse();
    let verbosity = Verbosity::from_flags(args.verbose, args.quiet);
    logging::init(verbosity);

    let result = match args.command {
        Command::Run(ref run_args) => {
            commands::execute_run(run_args, verbosity).map(|status| status.exit_code())
        }
        Command::List(ref list_args) => commands::execute_list(list_args).map(|()| codes::SUCCESS),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(codes::LOAD_ERROR)
        }
    }
}
