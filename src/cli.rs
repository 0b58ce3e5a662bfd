// SPDX-FileCopyrightText: 2021-2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;

use clap::{command, value_parser, Arg, ArgAction, Command, ValueHint};

pub const A_L_CONFIG: &str = "config";
pub const A_S_CONFIG: char = 'c';
pub const A_L_BIND: &str = "bind";
pub const A_S_BIND: char = 'b';
pub const A_L_QUIET: &str = "quiet";
pub const A_S_QUIET: char = 'q';
pub const A_L_VERBOSE: &str = "verbose";
pub const A_S_VERBOSE: char = 'v';
pub const A_L_VERSION: &str = "version";
pub const A_S_VERSION: char = 'V';

fn arg_config() -> Arg {
    Arg::new(A_L_CONFIG)
        .help("The configuration file to use; defaults to 'config.yml', if it exists")
        .long_help(
            "The configuration file to use; defaults to 'config.yml', if it exists.
Any setting may also be given as environment variable,
prefixed with 'FAIR_PROXY__' and with '__' as separator,
e.g. 'FAIR_PROXY__REGISTRY__AUTH_URL'.",
        )
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .value_name("FILE")
        .value_hint(ValueHint::FilePath)
        .short(A_S_CONFIG)
        .long(A_L_CONFIG)
        .action(ArgAction::Set)
}

fn arg_bind() -> Arg {
    Arg::new(A_L_BIND)
        .help("The address (IP:port) to listen on, e.g. '127.0.0.1:8000'")
        .num_args(1)
        .value_name("ADDRESS")
        .value_hint(ValueHint::Other)
        .short(A_S_BIND)
        .long(A_L_BIND)
        .action(ArgAction::Set)
}

fn arg_quiet() -> Arg {
    Arg::new(A_L_QUIET)
        .help("Minimize or suppress output to stdout")
        .action(ArgAction::SetTrue)
        .short(A_S_QUIET)
        .long(A_L_QUIET)
        .conflicts_with(A_L_VERBOSE)
}

fn arg_verbose() -> Arg {
    Arg::new(A_L_VERBOSE)
        .help("More verbose log output")
        .action(ArgAction::SetTrue)
        .short(A_S_VERBOSE)
        .long(A_L_VERBOSE)
}

fn arg_version() -> Arg {
    Arg::new(A_L_VERSION)
        .help("Print version information and exit. May be combined with -q,--quiet, to really only output the version string.")
        .short(A_S_VERSION)
        .long(A_L_VERSION)
        .action(ArgAction::SetTrue)
}

pub fn args_matcher() -> Command {
    command!()
        .about(
            "Accepts RDF (Turtle) metadata records of assessment components \
and JSON registry entries over HTTP, \
and routes them to GitHub and FAIRsharing respectively.",
        )
        .bin_name(clap::crate_name!())
        .disable_version_flag(true)
        .arg(arg_config())
        .arg(arg_bind())
        .arg(arg_quiet())
        .arg(arg_verbose())
        .arg(arg_version())
}
