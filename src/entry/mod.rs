use std::ffi::OsString;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use loadgen::app::{run_load, summarize};
use loadgen::args::LoadArgs;
use loadgen::config::{DEFAULT_CONFIG_FILES, load_config, resolve_config};
use loadgen::error::{AppError, AppResult};

use crate::system::{logger::init_logging, summary_lines};

pub(crate) fn run() -> AppResult<()> {
    let Some((args, matches)) = parse_args()? else {
        return Ok(());
    };

    init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(&args, &matches))
}

fn parse_args() -> AppResult<Option<(LoadArgs, ArgMatches)>> {
    let mut cmd = LoadArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = LoadArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty || std::env::var_os("LOADGEN_URL").is_some() {
        return false;
    }

    !DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

async fn run_async(args: &LoadArgs, matches: &ArgMatches) -> AppResult<()> {
    let file = load_config(args.config.as_deref())?;
    let config = resolve_config(args, matches, file.as_ref())?;

    let outcome = run_load(&config).await?;
    if let Some(err) = outcome.fatal {
        return Err(AppError::http(err));
    }

    let summary = summarize(&outcome.sink).await?;
    for line in summary_lines(&summary) {
        println!("{}", line);
    }
    Ok(())
}
