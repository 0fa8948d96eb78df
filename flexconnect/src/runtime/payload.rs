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

//! This module contains the [`ArrowData`] type, which packages up the
//! record batches a function returns together with its side messages, and
//! converts them to and from the Arrow Flight Data format.

use crate::error::{FlexConnectError, Result};
use crate::runtime::message::*;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow_flight::utils::{batches_to_flight_data, flight_data_to_arrow_batch};
use arrow_flight::FlightData;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The result of a function call.
///
/// All batches share one schema, and Arrow guarantees that the columns of a
/// batch have the same length.
#[derive(Debug, Clone)]
pub struct ArrowData {
    schema:        SchemaRef,
    batches:       Vec<RecordBatch>,
    side_messages: Vec<SideMessage>,
}

impl ArrowData {
    /// Returns a new result. Fails if a batch does not have the fields of
    /// `schema`.
    pub fn try_new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        if let Some(batch) = batches
            .iter()
            .find(|b| b.schema().fields() != schema.fields())
        {
            return Err(FlexConnectError::Execution(format!(
                "record batch schema {:?} does not match result schema {:?}",
                batch.schema(),
                schema
            )));
        }
        Ok(Self {
            schema,
            batches,
            side_messages: vec![],
        })
    }

    /// Returns a result holding a single batch.
    pub fn from_batch(batch: RecordBatch) -> Self {
        Self {
            schema:        batch.schema(),
            batches:       vec![batch],
            side_messages: vec![],
        }
    }

    /// Attaches a side message.
    pub fn with_side_message(mut self, message: SideMessage) -> Self {
        self.side_messages.push(message);
        self
    }

    /// The schema of the result.
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// The record batches of the result.
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// The side messages of the result.
    pub fn side_messages(&self) -> &[SideMessage] {
        &self.side_messages
    }

    /// Returns the record batches and drops everything else.
    pub fn into_batches(self) -> Vec<RecordBatch> {
        self.batches
    }

    /// The total number of rows over all batches.
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    /// The number of columns.
    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    /// Keeps only the given columns, in the given order.
    ///
    /// Rows are left untouched. A column that is not part of the result, or
    /// is named twice, is a caller error.
    pub fn select_columns(self, columns: &[String]) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(c) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(FlexConnectError::InvalidInvocation(format!(
                "column {} is selected more than once",
                c
            )));
        }
        let indices = columns
            .iter()
            .map(|c| {
                self.schema.index_of(c).map_err(|_| {
                    FlexConnectError::InvalidInvocation(format!(
                        "column {} is not part of the result",
                        c
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let schema = Arc::new(self.schema.project(&indices)?);
        let batches = self
            .batches
            .iter()
            .map(|b| b.project(&indices))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            schema,
            batches,
            side_messages: self.side_messages,
        })
    }

    /// Checks that every column of the result is declared in `declared` with
    /// the same data type.
    pub fn conforms_to(&self, declared: &Schema) -> Result<()> {
        for field in self.schema.fields() {
            match declared.field_with_name(field.name()) {
                Ok(f) if f.data_type() == field.data_type() => {}
                Ok(f) => {
                    return Err(FlexConnectError::Execution(format!(
                        "column {} has type {} but is declared as {}",
                        field.name(),
                        field.data_type(),
                        f.data_type()
                    )))
                }
                Err(_) => {
                    return Err(FlexConnectError::Execution(format!(
                        "column {} is not declared in the function schema",
                        field.name()
                    )))
                }
            }
        }
        Ok(())
    }

    /// Encodes the result in the Arrow Flight Data format: one schema message
    /// followed by one message per batch. Side messages travel in the schema
    /// metadata.
    pub fn to_flight_data(&self) -> Result<Vec<FlightData>> {
        let schema = if self.side_messages.is_empty() {
            self.schema.as_ref().clone()
        } else {
            let mut metadata = self.schema.metadata().clone();
            metadata.insert(
                SIDE_MESSAGES_METADATA_KEY.to_owned(),
                encode_side_messages(&self.side_messages)?,
            );
            self.schema.as_ref().clone().with_metadata(metadata)
        };
        Ok(batches_to_flight_data(&schema, self.batches.clone())?)
    }

    /// Decodes a result produced by [`ArrowData::to_flight_data`].
    pub fn from_flight_data(flight_data: &[FlightData]) -> Result<Self> {
        let (head, tail) = flight_data.split_first().ok_or_else(|| {
            FlexConnectError::Execution("flight data does not contain a schema".to_owned())
        })?;
        let mut schema = Schema::try_from(head)?;

        let side_messages = match schema.metadata.remove(SIDE_MESSAGES_METADATA_KEY) {
            Some(s) => decode_side_messages(&s)?,
            None => vec![],
        };

        let schema = Arc::new(schema);
        let dictionaries_by_id = HashMap::new();
        let batches = tail
            .iter()
            .map(|d| flight_data_to_arrow_batch(d, schema.clone(), &dictionaries_by_id))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            schema,
            batches,
            side_messages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, BooleanArray, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field};
    use serde_json::json;

    fn batch() -> Result<RecordBatch> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("city", DataType::Utf8, false),
            Field::new("capital", DataType::Boolean, false),
            Field::new("lat", DataType::Float64, false),
            Field::new("population", DataType::Int64, false),
        ]));
        Ok(RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["Elgin", "Stirling", "Edinburgh"])),
                Arc::new(BooleanArray::from(vec![false, false, true])),
                Arc::new(Float64Array::from(vec![57.653484, 56.116523, 55.953251])),
                Arc::new(Int64Array::from(vec![23_128, 37_610, 506_520])),
            ],
        )?)
    }

    #[test]
    fn select_columns_keeps_hint_order() -> Result<()> {
        let data = ArrowData::from_batch(batch()?)
            .select_columns(&["population".to_owned(), "city".to_owned()])?;

        assert_eq!(2, data.num_columns());
        assert_eq!(3, data.num_rows());
        assert_eq!("population", data.schema().field(0).name());
        assert_eq!("city", data.schema().field(1).name());

        let cities = data.batches()[0]
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or("expected a string column")?;
        assert_eq!("Stirling", cities.value(1));
        Ok(())
    }

    #[test]
    fn select_unknown_column() -> Result<()> {
        let res = ArrowData::from_batch(batch()?).select_columns(&["country".to_owned()]);
        assert!(matches!(res, Err(FlexConnectError::InvalidInvocation(_))));
        Ok(())
    }

    #[test]
    fn select_repeated_column() -> Result<()> {
        let res = ArrowData::from_batch(batch()?)
            .select_columns(&["lat".to_owned(), "city".to_owned(), "lat".to_owned()]);
        assert!(matches!(res, Err(FlexConnectError::InvalidInvocation(_))));
        Ok(())
    }

    #[test]
    fn conforms_to_declared_schema() -> Result<()> {
        let data = ArrowData::from_batch(batch()?);
        data.conforms_to(&data.schema())?;

        let narrower = Schema::new(vec![Field::new("city", DataType::Utf8, false)]);
        assert!(data.conforms_to(&narrower).is_err());

        let retyped = Schema::new(vec![
            Field::new("city", DataType::Utf8, false),
            Field::new("capital", DataType::Boolean, false),
            Field::new("lat", DataType::Float32, false),
            Field::new("population", DataType::Int64, false),
        ]);
        assert!(matches!(
            data.conforms_to(&retyped),
            Err(FlexConnectError::Execution(_))
        ));

        let projected = data.select_columns(&["lat".to_owned()])?;
        assert!(projected.conforms_to(&narrower).is_err());
        Ok(())
    }

    #[test]
    fn mismatched_batches_are_rejected() -> Result<()> {
        let b = batch()?;
        let other = Arc::new(Schema::new(vec![Field::new("x", DataType::Int64, false)]));
        assert!(ArrowData::try_new(other, vec![b.clone()]).is_err());

        let data = ArrowData::try_new(b.schema(), vec![b.clone(), b])?;
        assert_eq!(6, data.num_rows());
        Ok(())
    }

    #[test]
    fn flight_data_carries_side_messages() -> Result<()> {
        let data = ArrowData::from_batch(batch()?)
            .with_side_message(SideMessage::new("test", "lineage", json!({"rows": 3})))
            .with_side_message(SideMessage::new("test", "diagnostics", json!(["ok"])));

        let flight_data = data.to_flight_data()?;
        assert_eq!(2, flight_data.len());

        let decoded = ArrowData::from_flight_data(&flight_data)?;
        assert_eq!(data.side_messages(), decoded.side_messages());
        assert_eq!(data.schema().fields(), decoded.schema().fields());
        assert!(decoded.schema().metadata().is_empty());
        assert_eq!(3, decoded.num_rows());

        let lat = decoded.batches()[0]
            .column(2)
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or("expected a float column")?;
        assert_eq!(55.953251, lat.value(2));
        Ok(())
    }

    #[test]
    fn empty_result_keeps_schema() -> Result<()> {
        let b = batch()?;
        let data = ArrowData::try_new(b.schema(), vec![])?;

        let decoded = ArrowData::from_flight_data(&data.to_flight_data()?)?;
        assert_eq!(0, decoded.num_rows());
        assert_eq!(4, decoded.num_columns());
        assert!(decoded.side_messages().is_empty());
        assert!(ArrowData::from_flight_data(&[]).is_err());
        Ok(())
    }

    #[test]
    fn column_lengths_are_equal() -> Result<()> {
        let data = ArrowData::from_batch(batch()?);
        for b in data.batches() {
            assert!(b.columns().iter().all(|c| c.len() == b.num_rows()));
        }
        Ok(())
    }
}
