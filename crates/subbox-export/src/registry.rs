//! # Generator Registry
//!
//! Maps each [`ClientType`] to its generator function. Supporting another
//! client is a [`GeneratorRegistry::register`] call.

use std::collections::HashMap;

use serde_json::Value;
use subbox_core::{ClientType, ParsedServer};

use crate::error::ExportError;
use crate::options::ExportOptions;
use crate::{clash, mihomo, singbox, xray};

/// A config generator: pure function of the servers and options.
pub type GeneratorFn = fn(&[ParsedServer], &ExportOptions) -> Value;

/// Registry of config generators keyed by client type.
#[derive(Clone)]
pub struct GeneratorRegistry {
    generators: HashMap<ClientType, GeneratorFn>,
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("clients", &self.clients())
            .finish()
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ClientType::SingBox, singbox::generate);
        registry.register(ClientType::Clash, clash::generate);
        registry.register(ClientType::Xray, xray::generate);
        registry.register(ClientType::Mihomo, mihomo::generate);
        registry
    }
}

impl GeneratorRegistry {
    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    /// Register (or replace) the generator for a client.
    pub fn register(&mut self, client: ClientType, generator: GeneratorFn) -> &mut Self {
        self.generators.insert(client, generator);
        self
    }

    pub fn contains(&self, client: ClientType) -> bool {
        self.generators.contains_key(&client)
    }

    /// Clients with a registered generator, in declaration order.
    pub fn clients(&self) -> Vec<ClientType> {
        let mut clients: Vec<ClientType> = self.generators.keys().copied().collect();
        clients.sort();
        clients
    }

    /// Generate a config for `client`.
    pub fn generate(
        &self,
        client: ClientType,
        servers: &[ParsedServer],
        options: &ExportOptions,
    ) -> Result<Value, ExportError> {
        let generator = self
            .generators
            .get(&client)
            .ok_or(ExportError::NoGenerator(client))?;
        Ok(generator(servers, options))
    }
}
