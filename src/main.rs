use std::process::ExitCode;

fn main() -> ExitCode {
    ownbioscan_lib::run()
}
