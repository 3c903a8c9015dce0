use std::process::ExitCode;

fn main() -> ExitCode {
    type_resolvers::cli::run_cli()
}
