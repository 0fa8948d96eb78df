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

//! A reference function that serves a small static table.
//!
//! It shows how a function reads its execution context and branches on the
//! execution type. The computation itself ignores the request: every call
//! returns the same six rows.

use async_trait::async_trait;
use flexconnect::arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use flexconnect::arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use flexconnect::arrow::record_batch::RecordBatch;
use flexconnect::prelude::*;
use lazy_static::lazy_static;
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;

/// The name the function is registered under.
pub const NAME: &str = "SampleFlexConnectFunction";

/// The settings section read by `on_load`.
pub const SETTINGS_SECTION: &str = "sample";

lazy_static! {
    /// The declared schema.
    pub static ref SCHEMA: SchemaRef = Arc::new(Schema::new(vec![
        Field::new("attribute1", DataType::Utf8, true),
        Field::new("attribute2", DataType::Utf8, true),
        Field::new("attribute3", DataType::Boolean, true),
        Field::new("fact1", DataType::Float64, true),
        Field::new("fact2", DataType::Float64, true),
        Field::new("fact3", DataType::Int64, true),
    ]));
}

/// The sample function. It keeps no state, so it has nothing to cancel.
#[derive(Debug, Default, Clone, Copy)]
pub struct SampleFlexConnectFunction;

impl SampleFlexConnectFunction {
    /// The static table every call returns.
    pub fn static_data() -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![
                "id1", "id2", "id3", "id4", "id5", "id6",
            ])),
            Arc::new(StringArray::from(vec![
                "value1", "value2", "value3", "value1", "value2", "value3",
            ])),
            Arc::new(BooleanArray::from(vec![
                true, true, true, false, false, false,
            ])),
            Arc::new(Float64Array::from(vec![
                123.456, 23.45, 8.76, 1.23, 34.56, 567.89,
            ])),
            Arc::new(Float64Array::from(vec![0.1, 0.2, 0.3, 0.15, 0.25, 0.35])),
            Arc::new(Int64Array::from(vec![111, 222, 333, 444, 555, 666])),
        ];
        Ok(RecordBatch::try_new(SCHEMA.clone(), columns)?)
    }
}

#[async_trait]
impl FlexConnectFunction for SampleFlexConnectFunction {
    fn descriptor(&self) -> FunctionDescriptor {
        FunctionDescriptor::new(NAME, SCHEMA.clone())
    }

    fn on_load(&self, settings: &Settings) -> Result<()> {
        match settings.get(SETTINGS_SECTION, "greeting") {
            Some(greeting) => info!("{} loaded: {}", NAME, greeting),
            None => info!("{} loaded", NAME),
        }
        Ok(())
    }

    async fn call(
        &self,
        parameters: &Value,
        columns: Option<&[String]>,
        headers: &Headers,
    ) -> Result<ArrowData> {
        info!("function_called: {}", NAME);
        debug!("Call parameters: {}, headers: {:?}", parameters, headers);

        let ctx = ExecutionContext::from_parameters(parameters).ok_or_else(|| {
            FlexConnectError::InvalidInvocation(
                "Function did not receive execution context.".to_owned(),
            )
        })?;
        info!("execution_context: {:?}", ctx);

        match ctx.execution_type {
            ExecutionType::Report => {
                info!("report_execution: {:?}", ctx.report_execution_request())
            }
            ExecutionType::LabelElements => info!(
                "label_elements: {:?}",
                ctx.label_elements_execution_request()
            ),
            ExecutionType::Unknown => {
                warn!("Received unknown execution request, returning the full table")
            }
        }

        let data = ArrowData::from_batch(Self::static_data()?);
        match columns {
            Some(columns) => data.select_columns(columns),
            None => Ok(data),
        }
    }
}
