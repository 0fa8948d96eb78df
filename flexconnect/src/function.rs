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

//! The contract between a FlexConnect function and the host that serves it.
//!
//! A function declares a name and a schema, and returns Arrow data when
//! called. The host lists functions by name, calls `on_load` once before the
//! first call it routes, and may call [`FlexConnectFunction::cancel`] while
//! a call is in flight. Neither the launcher nor the function enforces a
//! timeout. Deadlines belong to the caller.

use crate::config::Settings;
use crate::error::{FlexConnectError, Result};
use crate::runtime::payload::ArrowData;
use arrow::datatypes::{Schema, SchemaRef};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Headers of the RPC call that triggered an invocation, passed through
/// untouched.
pub type Headers = HashMap<String, Vec<String>>;

/// The identity of a function: the name the host routes by and the schema of
/// the data it returns.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDescriptor {
    /// Unique within a registry.
    pub name:   String,
    /// The columns the function may return, in order.
    pub schema: SchemaRef,
}

/// The discovery command of a function, `{"functionName": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCommand {
    /// The function name.
    pub function_name: String,
}

impl FunctionDescriptor {
    /// Returns a new descriptor.
    pub fn new(name: impl Into<String>, schema: SchemaRef) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// The JSON command that identifies this function in discovery results.
    pub fn to_command(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&FunctionCommand {
            function_name: self.name.clone(),
        })?)
    }

    /// The declared schema narrowed to `columns`, in the order given. A
    /// column that is not declared, or is named twice, is a caller error.
    pub fn project(&self, columns: &[String]) -> Result<Schema> {
        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(c) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(FlexConnectError::InvalidInvocation(format!(
                "column {} is requested more than once",
                c
            )));
        }
        let indices = columns
            .iter()
            .map(|c| {
                self.schema.index_of(c).map_err(|_| {
                    FlexConnectError::InvalidInvocation(format!(
                        "column {} is not declared by function {}",
                        c, self.name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.schema.project(&indices)?)
    }
}

/// A FlexConnect function.
///
/// The host may run several calls of the same function at once, so an
/// implementation that keeps mutable state across calls has to synchronize
/// it itself.
#[async_trait]
pub trait FlexConnectFunction: Send + Sync {
    /// Returns the name and the schema of the function. This must not fail
    /// and must return the same value every time.
    fn descriptor(&self) -> FunctionDescriptor;

    /// One-time initialization, e.g. opening a connection pool. A launcher
    /// calls it once, before the first call it routes to the function. A
    /// function served by several launchers is loaded by each of them. An
    /// error here is fatal and is not retried. Resources created here live
    /// as long as the function.
    ///
    /// # Arguments
    /// * `settings` - The process-wide settings.
    fn on_load(&self, _settings: &Settings) -> Result<()> {
        Ok(())
    }

    /// Computes the result of one invocation.
    ///
    /// # Arguments
    /// * `parameters` - The invocation parameters. Calls from a conformant
    ///   caller carry an execution context, see
    ///   [`ExecutionContext::from_parameters`](crate::runtime::context::ExecutionContext::from_parameters).
    /// * `columns` - The columns the caller needs, always a subset of the
    ///   declared schema. A function may return only these columns to save
    ///   bandwidth. It must not change how rows are computed because of them.
    /// * `headers` - The headers of the RPC call.
    ///
    /// # Returns
    /// Data whose columns are a subset of the declared schema.
    async fn call(
        &self,
        parameters: &Value,
        columns: Option<&[String]>,
        headers: &Headers,
    ) -> Result<ArrowData>;

    /// Asks an in-flight call to stop. Returns `true` if the request was
    /// accepted, `false` if the function does not support cancellation or
    /// there is nothing to cancel. Must return promptly.
    fn cancel(&self) -> bool {
        false
    }
}

impl std::fmt::Debug for dyn FlexConnectFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlexConnectFunction")
            .field("name", &self.descriptor().name)
            .finish()
    }
}

/// A shared handle to a function.
pub type FunctionRef = Arc<dyn FlexConnectFunction>;
