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

#![warn(missing_docs, clippy::needless_borrow)]
// Clippy lints, some should be disabled incrementally
#![allow(
    clippy::float_cmp,
    clippy::module_inception,
    clippy::new_without_default,
    clippy::type_complexity
)]

//! `flexconnect-function` holds the FlexConnect functions this project
//! serves, and builds the registry a host loads them from.

pub mod sample;

use flexconnect::config::Settings;
use flexconnect::error::{FlexConnectError, Result};
use flexconnect::function::FunctionRef;
use flexconnect::registry::FunctionRegistry;
use log::info;
use std::sync::Arc;

/// Returns every function this crate implements.
pub fn available_functions() -> Vec<FunctionRef> {
    vec![Arc::new(sample::SampleFlexConnectFunction)]
}

/// Builds the registry of the functions named by `[flexconnect] functions`.
/// All available functions are registered when the setting is absent.
///
/// # Arguments
/// * `settings` - The process-wide settings.
///
/// # Returns
/// The registry, or a `Config` error if a name does not match any function.
pub fn registry_from_settings(settings: &Settings) -> Result<FunctionRegistry> {
    let available = available_functions();
    let mut registry = FunctionRegistry::new();

    match settings.function_names() {
        None => {
            info!("No functions configured, registering all available");
            for function in available {
                registry.register(function)?;
            }
        }
        Some(names) => {
            for name in names {
                let function = available
                    .iter()
                    .find(|f| f.descriptor().name == name)
                    .ok_or_else(|| {
                        FlexConnectError::Config(format!("unknown function {} in settings", name))
                    })?;
                registry.register(function.clone())?;
            }
        }
    }
    Ok(registry)
}
