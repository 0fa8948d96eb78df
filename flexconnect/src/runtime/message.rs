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

//! Side messages carry small JSON payloads (lineage, diagnostics) next to
//! the result table without touching its columns.

use crate::error::{FlexConnectError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

/// The schema metadata key under which side messages travel.
pub const SIDE_MESSAGES_METADATA_KEY: &str = "side_messages";

/// An out-of-band message attached to a function result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideMessage {
    /// Unique within the messages of one invocation.
    pub correlation_id: String,
    /// Who produced the message.
    pub source:         String,
    /// What kind of message this is.
    #[serde(rename = "type")]
    pub message_type:   String,
    /// The message payload.
    pub data:           Value,
}

impl SideMessage {
    /// Returns a new message with a random correlation id.
    pub fn new(source: impl Into<String>, message_type: impl Into<String>, data: Value) -> Self {
        Self {
            correlation_id: Uuid::new_v4().to_string(),
            source: source.into(),
            message_type: message_type.into(),
            data,
        }
    }

    /// Replaces the correlation id.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }
}

fn check_unique(messages: &[SideMessage]) -> Result<()> {
    let mut seen = HashSet::with_capacity(messages.len());
    for message in messages {
        if !seen.insert(message.correlation_id.as_str()) {
            return Err(FlexConnectError::Execution(format!(
                "duplicate side message correlation id: {}",
                message.correlation_id
            )));
        }
    }
    Ok(())
}

/// Serializes side messages to a JSON array.
pub fn encode_side_messages(messages: &[SideMessage]) -> Result<String> {
    check_unique(messages)?;
    Ok(serde_json::to_string(messages)?)
}

/// Parses a JSON array of side messages.
pub fn decode_side_messages(s: &str) -> Result<Vec<SideMessage>> {
    let messages: Vec<SideMessage> = serde_json::from_str(s)?;
    check_unique(&messages)?;
    Ok(messages)
}
