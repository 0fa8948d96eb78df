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

//! Prints the functions the launcher serves.

use anyhow::Result;
use clap::Command;
use flexconnect::launcher::LocalLauncher;

pub fn command_args() -> Command<'static> {
    Command::new("list").about("Lists the functions and their schemas")
}

pub fn command(launcher: &LocalLauncher) -> Result<()> {
    for descriptor in launcher.registry().descriptors() {
        println!("{}", descriptor.name);
        for field in descriptor.schema.fields() {
            println!(
                "    {}: {}{}",
                field.name(),
                field.data_type(),
                if field.is_nullable() { "" } else { " NOT NULL" }
            );
        }
    }
    Ok(())
}
