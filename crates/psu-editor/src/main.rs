use std::io;
use std::process::ExitCode;

use psu_editor::cli::{print_error, print_outcome, Args, Invocation, Session};
use psu_editor::shell::run_interactive;
use psu_editor::{load_settings, Settings};

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    let settings = match &args.config {
        Some(path) => match load_settings(path) {
            Ok(settings) => settings,
            Err(err) => {
                let _ = print_error(&mut io::stderr(), &err);
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    match args.command.into_invocation() {
        Invocation::Interactive(path) => {
            let session = Session::new(path, settings);
            match run_interactive(&session, io::stdin().lock(), &mut io::stdout()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("{err}");
                    ExitCode::FAILURE
                }
            }
        }
        Invocation::Run(path, operation) => {
            let session = Session::new(path, settings);
            match session.run(&operation) {
                Ok(outcome) => {
                    let _ = print_outcome(&mut io::stdout(), &outcome);
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    let _ = print_error(&mut io::stderr(), &err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
