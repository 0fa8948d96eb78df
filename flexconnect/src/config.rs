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

//! Configuration settings shared by the launcher and the functions it loads.
//!
//! Settings are merged from three layers, later layers winning:
//!
//! 1. the defaults compiled into the crate (`config.toml`),
//! 2. config files, in the order they are given,
//! 3. environment variables of the form `GOODDATA_FLIGHT_<SECTION>__<KEY>`,
//!    which map to `key` in `[section]` (both lower-cased).
//!
//! Config files are TOML, except files with the `.ini` extension, which are
//! read as ini. TOML values are kept as strings: arrays become
//! comma-separated lists and nested tables become dotted sections.

use crate::error::{FlexConnectError, Result};
use ini::Ini;
use log::debug;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Prefix of the environment variables that override settings.
pub const ENV_PREFIX: &str = "GOODDATA_FLIGHT_";

/// Separator between the section and the key in an environment variable.
pub const ENV_SEPARATOR: &str = "__";

/// The section holding the FlexConnect settings.
pub const FLEXCONNECT_SECTION: &str = "flexconnect";

/// The section holding the server settings.
pub const SERVER_SECTION: &str = "server";

/// Process-wide settings handed to every function's `on_load`.
#[derive(Clone)]
pub struct Settings {
    conf: Ini,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (section, properties) in self.conf.iter() {
            for (key, value) in properties.iter() {
                match section {
                    Some(section) => map.entry(&format!("{}.{}", section, key), &value),
                    None => map.entry(&key, &value),
                };
            }
        }
        map.finish()
    }
}

/// Renders a TOML value the way settings store it.
fn toml_to_setting(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items
            .iter()
            .map(toml_to_setting)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

impl Settings {
    /// Returns the settings compiled into the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_str(include_str!("./config.toml"))
    }

    /// Returns empty settings.
    pub fn empty() -> Self {
        Self { conf: Ini::new() }
    }

    /// Loads the embedded defaults, then each config file in turn, then the
    /// process environment.
    pub fn load<P: AsRef<Path>>(files: &[P]) -> Result<Self> {
        let mut settings = Self::embedded()?;
        for file in files {
            let path = file.as_ref();
            debug!("Loading settings from {}", path.display());
            settings
                .merge_file(path)
                .map_err(|e| FlexConnectError::Config(format!("{}: {}", path.display(), e)))?;
        }
        settings.merge_env(std::env::vars());
        Ok(settings)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        if path.extension().map_or(false, |ext| ext == "ini") {
            let conf = Ini::load_from_file(path)?;
            self.merge(&conf);
        } else {
            self.merge_toml(&std::fs::read_to_string(path)?)?;
        }
        Ok(())
    }

    /// Parses settings from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        let mut settings = Self::empty();
        settings.merge_toml(s)?;
        Ok(settings)
    }

    /// Overrides the current settings with every value of a TOML document.
    /// Top-level keys that are not tables are ignored.
    pub fn merge_toml(&mut self, s: &str) -> Result<()> {
        let table = s.parse::<toml::Table>()?;
        for (name, value) in table.iter() {
            match value {
                toml::Value::Table(section) => self.merge_toml_section(name, section),
                _ => debug!("Ignoring top-level setting {}", name),
            }
        }
        Ok(())
    }

    fn merge_toml_section(&mut self, section: &str, table: &toml::Table) {
        for (key, value) in table.iter() {
            match value {
                toml::Value::Table(nested) => {
                    self.merge_toml_section(&format!("{}.{}", section, key), nested)
                }
                value => self.set(section, key, &toml_to_setting(value)),
            }
        }
    }

    /// Overrides the current settings with every value in `conf`.
    pub fn merge(&mut self, conf: &Ini) {
        for (section, properties) in conf.iter() {
            for (key, value) in properties.iter() {
                self.conf.with_section(section).set(key, value);
            }
        }
    }

    /// Overrides the current settings with the variables that carry
    /// [`ENV_PREFIX`]. Other variables are ignored.
    pub fn merge_env<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let rest = match name.strip_prefix(ENV_PREFIX) {
                Some(rest) => rest,
                None => continue,
            };
            match rest.split_once(ENV_SEPARATOR) {
                Some((section, key)) if !section.is_empty() && !key.is_empty() => {
                    debug!("Setting [{}] {} from {}", section, key, name);
                    self.set(&section.to_lowercase(), &key.to_lowercase(), &value);
                }
                _ => debug!("Ignoring environment variable {}", name),
            }
        }
    }

    /// Returns the raw value of `key` in `section`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.conf.section(Some(section)).and_then(|p| p.get(key))
    }

    /// Returns the value of `key` in `section` parsed as `T`.
    pub fn get_parsed<T>(&self, section: &str, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(section, key) {
            Some(value) => value.trim().parse::<T>().map(Some).map_err(|e| {
                FlexConnectError::Config(format!("[{}] {} = {}: {}", section, key, value, e))
            }),
            None => Ok(None),
        }
    }

    /// Sets `key` in `section`, replacing any previous value.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.conf.with_section(Some(section)).set(key, value);
    }

    /// Returns the names of the functions to load, or `None` when the
    /// setting is absent.
    pub fn function_names(&self) -> Option<Vec<String>> {
        self.get(FLEXCONNECT_SECTION, "functions").map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect()
        })
    }

    /// Returns the location clients should use to fetch results, built from
    /// `[server] advertise_host`, `advertise_port` and `use_tls`.
    pub fn advertise_location(&self) -> Result<Option<String>> {
        let host = match self.get(SERVER_SECTION, "advertise_host") {
            Some(host) => host.trim(),
            None => return Ok(None),
        };
        let port = self.get_parsed::<u16>(SERVER_SECTION, "advertise_port")?;
        let scheme = if self
            .get_parsed::<bool>(SERVER_SECTION, "use_tls")?
            .unwrap_or(false)
        {
            "grpc+tls"
        } else {
            "grpc+tcp"
        };
        Ok(Some(match port {
            Some(port) => format!("{}://{}:{}", scheme, host, port),
            None => format!("{}://{}", scheme, host),
        }))
    }
}
