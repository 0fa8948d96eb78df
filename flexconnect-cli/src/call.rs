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

//! Calls a function through the launcher's Flight path and prints the
//! result.

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use flexconnect::arrow::util::pretty::pretty_format_batches;
use flexconnect::function::Headers;
use flexconnect::launcher::{FunctionInvocation, LocalLauncher};
use flexconnect::runtime::payload::ArrowData;
use log::info;
use serde_json::Value;
use std::fs;

pub fn command_args() -> Command<'static> {
    Command::new("call")
        .about("Calls a function and prints its result")
        .arg(
            Arg::new("function")
                .short('f')
                .long("function")
                .value_name("NAME")
                .help("Sets the function to call")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::new("parameters")
                .short('p')
                .long("parameters")
                .value_name("FILE")
                .help("Sets the JSON file with the call parameters")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::new("columns")
                .long("columns")
                .value_name("COLUMNS")
                .help("Comma-separated columns to ask for")
                .takes_value(true),
        )
        .arg(
            Arg::new("header")
                .short('H')
                .long("header")
                .value_name("NAME=VALUE")
                .help("Adds a call header")
                .takes_value(true)
                .multiple_occurrences(true),
        )
}

/// Parses `name=value` pairs. Repeated names collect their values in order.
pub fn parse_headers<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Result<Headers> {
    let mut headers = Headers::new();
    for pair in pairs {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("header {} is not of the form name=value", pair))?;
        headers
            .entry(name.trim().to_lowercase())
            .or_default()
            .push(value.trim().to_owned());
    }
    Ok(headers)
}

/// Parses a comma-separated column hint. A hint that names no column is no
/// hint at all.
pub fn parse_columns(columns: &str) -> Option<Vec<String>> {
    let columns = columns
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect::<Vec<_>>();
    if columns.is_empty() {
        None
    } else {
        Some(columns)
    }
}

pub async fn command(launcher: &LocalLauncher, matches: &ArgMatches) -> Result<()> {
    let name = matches
        .value_of("function")
        .ok_or_else(|| anyhow!("no function name provided"))?;
    let path = matches
        .value_of("parameters")
        .ok_or_else(|| anyhow!("no parameters file provided"))?;
    let parameters: Value = serde_json::from_str(
        &fs::read_to_string(path).with_context(|| format!("cannot read {}", path))?,
    )
    .with_context(|| format!("{} is not valid JSON", path))?;

    let mut invocation = FunctionInvocation::new(name, parameters);
    if let Some(columns) = matches.value_of("columns").and_then(parse_columns) {
        invocation = invocation.with_columns(columns);
    }
    let headers = parse_headers(matches.values_of("header").into_iter().flatten())?;

    let info = launcher.get_flight_info(&invocation.to_descriptor()?)?;
    let ticket = info
        .endpoint
        .first()
        .and_then(|e| e.ticket.as_ref())
        .ok_or_else(|| anyhow!("no ticket for function {}", name))?;
    info!("Fetching {} with ticket of {} bytes", name, ticket.ticket.len());

    let data = ArrowData::from_flight_data(&launcher.do_get(ticket, &headers).await?)?;
    println!("{}", pretty_format_batches(data.batches())?);
    for message in data.side_messages() {
        println!("{}", serde_json::to_string(message)?);
    }
    Ok(())
}
