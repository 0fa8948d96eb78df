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

//! The set of functions a host serves, keyed by name.

use crate::error::{FlexConnectError, Result};
use crate::function::{FunctionDescriptor, FunctionRef};
use log::info;
use std::collections::BTreeMap;

/// Functions by name. Iteration is in name order.
#[derive(Debug, Default, Clone)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, FunctionRef>,
}

impl FunctionRegistry {
    /// Returns an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a function under its declared name. Fails if the name is taken.
    pub fn register(&mut self, function: FunctionRef) -> Result<()> {
        let name = function.descriptor().name;
        if self.functions.contains_key(&name) {
            return Err(FlexConnectError::Registration(format!(
                "function {} is already registered",
                name
            )));
        }
        info!("Registered function {}", name);
        self.functions.insert(name, function);
        Ok(())
    }

    /// Returns the function with the given name.
    pub fn get(&self, name: &str) -> Result<FunctionRef> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| FlexConnectError::FunctionNotFound(name.to_owned()))
    }

    /// The names of all functions, sorted.
    pub fn names(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }

    /// The descriptors of all functions, sorted by name.
    pub fn descriptors(&self) -> Vec<FunctionDescriptor> {
        self.functions.values().map(|f| f.descriptor()).collect()
    }

    /// Iterates over the functions in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FunctionRef)> {
        self.functions.iter()
    }

    /// The number of functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if there are no functions.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{FlexConnectFunction, Headers};
    use crate::runtime::payload::ArrowData;
    use arrow::datatypes::Schema;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    struct Named(&'static str);

    #[async_trait]
    impl FlexConnectFunction for Named {
        fn descriptor(&self) -> FunctionDescriptor {
            FunctionDescriptor::new(self.0, Arc::new(Schema::empty()))
        }

        async fn call(
            &self,
            _parameters: &Value,
            _columns: Option<&[String]>,
            _headers: &Headers,
        ) -> Result<ArrowData> {
            ArrowData::try_new(Arc::new(Schema::empty()), vec![])
        }
    }

    #[test]
    fn register_and_get() -> Result<()> {
        let mut registry = FunctionRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(Named("Zeta")))?;
        registry.register(Arc::new(Named("Alpha")))?;

        assert_eq!(2, registry.len());
        assert_eq!(vec!["Alpha", "Zeta"], registry.names());
        assert_eq!("Zeta", registry.get("Zeta")?.descriptor().name);
        assert_eq!(
            vec!["Alpha", "Zeta"],
            registry
                .descriptors()
                .into_iter()
                .map(|d| d.name)
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn duplicate_names() -> Result<()> {
        let mut registry = FunctionRegistry::new();
        registry.register(Arc::new(Named("Same")))?;
        assert!(matches!(
            registry.register(Arc::new(Named("Same"))),
            Err(FlexConnectError::Registration(_))
        ));
        assert_eq!(1, registry.len());
        Ok(())
    }

    #[test]
    fn unknown_name() {
        let registry = FunctionRegistry::new();
        assert!(matches!(
            registry.get("Missing"),
            Err(FlexConnectError::FunctionNotFound(_))
        ));
    }
}
