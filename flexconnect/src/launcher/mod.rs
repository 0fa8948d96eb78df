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

//! This module hosts functions the way a Flight RPC server does, but
//! in-process: discovery, invocation by Flight descriptor and ticket, and
//! cancellation. The transport itself belongs to the host.

pub mod local;
pub use local::LocalLauncher;

use crate::error::{FlexConnectError, Result};
use arrow_flight::flight_descriptor::DescriptorType;
use arrow_flight::FlightDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The command a caller sends to invoke a function:
///
/// ```json
/// { "functionName": "SampleFlexConnectFunction", "parameters": {...}, "columns": ["fact1"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInvocation {
    /// The function to call.
    pub function_name: String,
    /// The invocation parameters, passed to the function as they are.
    #[serde(default)]
    pub parameters:    Value,
    /// The columns the caller needs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns:       Option<Vec<String>>,
}

impl FunctionInvocation {
    /// Returns an invocation without a column hint.
    pub fn new(function_name: impl Into<String>, parameters: Value) -> Self {
        Self {
            function_name: function_name.into(),
            parameters,
            columns: None,
        }
    }

    /// Sets the column hint.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Parses an invocation from its JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            FlexConnectError::InvalidInvocation(format!("malformed invocation command: {}", e))
        })
    }

    /// Serializes the invocation to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parses an invocation from a command descriptor. Path descriptors are
    /// rejected.
    pub fn from_descriptor(descriptor: &FlightDescriptor) -> Result<Self> {
        if descriptor.r#type != DescriptorType::Cmd as i32 {
            return Err(FlexConnectError::InvalidInvocation(
                "functions are invoked with command descriptors".to_owned(),
            ));
        }
        Self::from_bytes(&descriptor.cmd)
    }

    /// Returns the command descriptor of the invocation.
    pub fn to_descriptor(&self) -> Result<FlightDescriptor> {
        Ok(FlightDescriptor::new_cmd(self.to_bytes()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_format() -> Result<()> {
        let invocation = FunctionInvocation::new("F", json!({"a": 1}))
            .with_columns(vec!["x".to_owned()]);
        let descriptor = invocation.to_descriptor()?;
        assert_eq!(
            br#"{"functionName":"F","parameters":{"a":1},"columns":["x"]}"#.to_vec(),
            descriptor.cmd.to_vec()
        );
        assert_eq!(invocation, FunctionInvocation::from_descriptor(&descriptor)?);
        Ok(())
    }

    #[test]
    fn defaults() -> Result<()> {
        let invocation = FunctionInvocation::from_bytes(br#"{"functionName":"F"}"#)?;
        assert_eq!(Value::Null, invocation.parameters);
        assert_eq!(None, invocation.columns);
        Ok(())
    }

    #[test]
    fn malformed_commands() {
        assert!(matches!(
            FunctionInvocation::from_bytes(b"not json"),
            Err(FlexConnectError::InvalidInvocation(_))
        ));
        assert!(matches!(
            FunctionInvocation::from_bytes(br#"{"parameters":{}}"#),
            Err(FlexConnectError::InvalidInvocation(_))
        ));
        assert!(matches!(
            FunctionInvocation::from_descriptor(&FlightDescriptor::new_path(vec![
                "F".to_owned()
            ])),
            Err(FlexConnectError::InvalidInvocation(_))
        ));
    }
}
