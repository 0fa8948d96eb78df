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

//! The in-process launcher.

use super::FunctionInvocation;
use crate::config::Settings;
use crate::error::{FlexConnectError, Result};
use crate::function::Headers;
use crate::registry::FunctionRegistry;
use crate::runtime::payload::ArrowData;
use arrow_flight::{FlightData, FlightDescriptor, FlightEndpoint, FlightInfo, Ticket};
use log::{error, info, warn};
use std::time::Instant;

/// LocalLauncher serves the functions of a registry in the current process.
///
/// Every function is loaded when the launcher is created, so each `on_load`
/// runs once per launcher, before any call through it. Launchers built from
/// clones of one registry share the functions and load each of them again.
#[derive(Debug)]
pub struct LocalLauncher {
    registry: FunctionRegistry,
    settings: Settings,
}

impl LocalLauncher {
    /// Loads every function of the registry, in name order. Functions are not
    /// tracked across launchers: a function served by two launchers is loaded
    /// twice.
    ///
    /// # Arguments
    /// * `registry` - The functions to serve.
    /// * `settings` - The settings handed to each `on_load`.
    ///
    /// # Returns
    /// A launcher, or a `Load` error naming the first function that failed.
    pub fn new(registry: FunctionRegistry, settings: Settings) -> Result<Self> {
        for (name, function) in registry.iter() {
            let start = Instant::now();
            function.on_load(&settings).map_err(|e| {
                error!("Failed to load function {}: {}", name, e);
                FlexConnectError::Load(format!("{}: {}", name, e))
            })?;
            info!("Loaded function {} in {:?}", name, start.elapsed());
        }
        Ok(Self { registry, settings })
    }

    /// The functions this launcher serves.
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// The settings the functions were loaded with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Describes every function: its discovery command and declared schema.
    pub fn list_flights(&self) -> Result<Vec<FlightInfo>> {
        self.registry
            .descriptors()
            .into_iter()
            .map(|d| -> Result<FlightInfo> {
                Ok(FlightInfo::new()
                    .try_with_schema(d.schema.as_ref())?
                    .with_descriptor(FlightDescriptor::new_cmd(d.to_command()?)))
            })
            .collect()
    }

    /// Plans an invocation. The single endpoint of the returned info carries
    /// a ticket for [`LocalLauncher::do_get`].
    pub fn get_flight_info(&self, descriptor: &FlightDescriptor) -> Result<FlightInfo> {
        let invocation = FunctionInvocation::from_descriptor(descriptor)?;
        let function = self.registry.get(&invocation.function_name)?;
        let declared = function.descriptor();

        let schema = match &invocation.columns {
            Some(columns) => declared.project(columns)?,
            None => declared.schema.as_ref().clone(),
        };

        let mut endpoint = FlightEndpoint::new().with_ticket(Ticket::new(invocation.to_bytes()?));
        if let Some(location) = self.settings.advertise_location()? {
            endpoint = endpoint.with_location(location);
        }

        Ok(FlightInfo::new()
            .try_with_schema(&schema)?
            .with_descriptor(descriptor.clone())
            .with_endpoint(endpoint))
    }

    /// Runs the invocation a ticket carries and encodes the result as Flight
    /// data.
    pub async fn do_get(&self, ticket: &Ticket, headers: &Headers) -> Result<Vec<FlightData>> {
        let invocation = FunctionInvocation::from_bytes(&ticket.ticket)?;
        self.invoke(&invocation, headers).await?.to_flight_data()
    }

    /// Calls a function and checks that its result matches the declared
    /// schema.
    pub async fn invoke(
        &self,
        invocation: &FunctionInvocation,
        headers: &Headers,
    ) -> Result<ArrowData> {
        let name = &invocation.function_name;
        let function = self.registry.get(name).map_err(|e| {
            warn!("Invocation of unknown function {}", name);
            e
        })?;
        let declared = function.descriptor();
        if let Some(columns) = &invocation.columns {
            declared.project(columns)?;
        }

        let start = Instant::now();
        let columns = invocation.columns.as_deref();
        let result = function
            .call(&invocation.parameters, columns, headers)
            .await
            .and_then(|data| {
                data.conforms_to(&declared.schema)?;
                Ok(data)
            });

        match &result {
            Ok(data) => info!(
                "Function {} returned {} rows in {:?}",
                name,
                data.num_rows(),
                start.elapsed()
            ),
            Err(e) if e.is_caller_error() => warn!("Function {} rejected call: {}", name, e),
            Err(e) => error!("Function {} failed after {:?}: {}", name, start.elapsed(), e),
        }
        result
    }

    /// Asks the named function to cancel its in-flight call.
    pub fn cancel(&self, name: &str) -> Result<bool> {
        let accepted = self.registry.get(name)?.cancel();
        info!("Cancel of function {} accepted: {}", name, accepted);
        Ok(accepted)
    }
}
