// Copyright (c) 2020-present, UMD Database Group.
//
// This program is free software: you can use, redistribute, and/or modify
// it under the terms of the GNU Affero General Public License, version 3
// or later ("AGPL"), as published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! FlexConnect CLI lists the configured functions and calls them in-process.

mod args;
mod call;
mod list;

use anyhow::Result;
use clap::{crate_version, Command};
use flexconnect::launcher::LocalLauncher;
use flexconnect_function::registry_from_settings;
use log::info;

fn cli() -> Command<'static> {
    Command::new("flexconnect-cli")
        .version(crate_version!())
        .about("Command Line Tool for FlexConnect functions")
        .author("UMD Database Group")
        .args(args::get_args())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(list::command_args())
        .subcommand(call::command_args())
}

#[tokio::main]
pub async fn main() -> Result<()> {
    let matches = cli().get_matches();
    args::get_logging(&matches)?.init();

    let settings = args::get_settings(&matches)?;
    let registry = registry_from_settings(&settings)?;
    info!("Serving functions: {:?}", registry.names());
    let launcher = LocalLauncher::new(registry, settings)?;

    match matches.subcommand() {
        Some(("list", _)) => list::command(&launcher)?,
        Some(("call", call_matches)) => call::command(&launcher, call_matches).await?,
        _ => unreachable!("a subcommand is required"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        cli().debug_assert();
    }

    #[test]
    fn parse_call() {
        let matches = cli()
            .try_get_matches_from(vec![
                "flexconnect-cli",
                "-c",
                "a.toml",
                "-c",
                "b.toml",
                "call",
                "-f",
                "SampleFlexConnectFunction",
                "-p",
                "params.json",
                "--columns",
                "fact1,attribute1",
                "-H",
                "x-user=demo",
                "--silent",
            ])
            .unwrap();

        let configs = matches.values_of("config").unwrap().collect::<Vec<_>>();
        assert_eq!(vec!["a.toml", "b.toml"], configs);

        let (name, call_matches) = matches.subcommand().unwrap();
        assert_eq!("call", name);
        assert_eq!(
            Some("SampleFlexConnectFunction"),
            call_matches.value_of("function")
        );
        assert!(call_matches.is_present("silent"));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(cli().try_get_matches_from(vec!["flexconnect-cli"]).is_err());
    }
}
