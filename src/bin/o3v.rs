use core::fmt::Arguments;
use op3nvoice::{error, O3vError, O3vLog, O3vTool};
use tracing_subscriber::EnvFilter;
use yansi::Paint;

struct O3vLogger;

impl O3vLogger {
    fn new() -> O3vLogger {
        O3vLogger {}
    }
}

impl O3vLog for O3vLogger {
    fn output(self: &Self, args: Arguments) {
        println!("{}", args);
    }
    fn warning(self: &Self, args: Arguments) {
        eprintln!("{}", format!("warning: {}", Paint::yellow(args)));
    }
    fn error(self: &Self, args: Arguments) {
        eprintln!("{}", format!("error: {}", Paint::red(args)));
    }
}

#[tokio::main]
async fn main() {
    // Request tracing goes to stderr, enabled with e.g. RUST_LOG=op3nvoice=debug
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let logger = O3vLogger::new();

    if let Err(error) = O3vTool::new(&logger).run(std::env::args_os()).await {
        error!(logger, "{}", error);

        if let Some(api_error) = error.downcast_ref::<O3vError>().and_then(O3vError::api_error) {
            if api_error.is_conflict() {
                error!(logger, "The version given is stale; fetch the resource and retry");
            }
        }

        std::process::exit(1);
    }
}
