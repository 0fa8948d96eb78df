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

//! A "prelude" for users of the flexconnect crate.
//!
//! Like the standard library's prelude, this module simplifies importing of
//! common items. Unlike the standard prelude, the contents of this module must
//! be imported manually:
//!
//! ```
//! use flexconnect::prelude::*;
//! ```

pub use crate::config::Settings;
pub use crate::error::{FlexConnectError, Result};
pub use crate::function::{FlexConnectFunction, FunctionDescriptor, FunctionRef, Headers};
pub use crate::launcher::{FunctionInvocation, LocalLauncher};
pub use crate::registry::FunctionRegistry;
pub use crate::runtime::context::{self, ExecutionContext, ExecutionType};
pub use crate::runtime::message::SideMessage;
pub use crate::runtime::payload::ArrowData;
