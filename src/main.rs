use std::error::Error;
use std::io;
use std::path::PathBuf;

use trivia_core::api::{self, ApiServer};
use trivia_core::config::Config;
use trivia_core::interactive::Console;
use trivia_core::logging;
use trivia_core::store::TriviaStore;

struct Args {
    serve: bool,
    config: Option<PathBuf>,
    data: Option<PathBuf>,
}

fn flag_value(flag: &str, value: Option<String>) -> Result<PathBuf, String> {
    match value {
        Some(v) if !v.starts_with("--") => Ok(PathBuf::from(v)),
        _ => Err(format!("missing value for {flag}")),
    }
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        serve: false,
        config: None,
        data: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--serve" | "--api" => args.serve = true,
            "--config" => args.config = Some(flag_value(&arg, iter.next())?),
            "--data" => args.data = Some(flag_value(&arg, iter.next())?),
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if args.data.is_some() {
        config.data_path = args.data;
    }

    if let Err(err) = logging::init(&config.log_filter, config.log_file.as_deref()) {
        eprintln!("Logging disabled: {err}");
    }

    let mut store = match &config.data_path {
        Some(path) => TriviaStore::load(path)?,
        None => {
            tracing::warn!("No data file configured; starting with an empty store");
            TriviaStore::new()
        }
    };
    store.set_autosave(config.autosave);
    let mut server = ApiServer::new(store, config.questions_per_page);

    if args.serve {
        let stdin = io::stdin();
        let stdout = io::stdout();
        api::run_server_mode(&mut server, &mut stdin.lock(), &mut stdout.lock())?;
    } else {
        let stdin = io::stdin();
        let stdout = io::stdout();
        Console::new(server).run(stdin.lock(), &mut stdout.lock())?;
    }

    Ok(())
}
