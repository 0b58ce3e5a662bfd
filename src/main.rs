// SPDX-FileCopyrightText: 2021-2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

mod cli;

use std::path::PathBuf;

use clap::crate_name;
use cli_utils::{logging, BoxResult};
use fair_submit_proxy::{server, settings};
use tracing_subscriber::filter::LevelFilter;

#[allow(clippy::print_stdout)]
fn print_version_and_exit(quiet: bool) {
    if !quiet {
        print!("{} ", clap::crate_name!());
    }
    println!("{}", fair_submit_proxy::VERSION);
    std::process::exit(0);
}

#[tokio::main]
async fn main() -> BoxResult<()> {
    let log_reload_handle = logging::setup(crate_name!())?;
    let args = cli::args_matcher().get_matches();

    let quiet = args.get_flag(cli::A_L_QUIET);
    let version = args.get_flag(cli::A_L_VERSION);
    if version {
        print_version_and_exit(quiet);
    }

    let verbose = args.get_flag(cli::A_L_VERBOSE);

    let log_level = if verbose {
        LevelFilter::TRACE
    } else if quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    logging::set_log_level_tracing(&log_reload_handle, log_level)?;

    let config_file = args.get_one::<PathBuf>(cli::A_L_CONFIG);
    let mut run_settings = settings::load(config_file.map(PathBuf::as_path))?;
    if let Some(bind) = args.get_one::<String>(cli::A_L_BIND) {
        run_settings.bind.clone_from(bind);
    }

    tracing::info!("Starting {} {} ...", crate_name!(), fair_submit_proxy::VERSION);
    server::serve(&run_settings).await?;

    Ok(())
}
