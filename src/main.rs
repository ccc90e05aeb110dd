use std::process::ExitCode;

fn main() -> ExitCode {
    req2test_lib::run()
}
