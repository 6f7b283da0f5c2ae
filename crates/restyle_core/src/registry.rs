//! Plugin registry.
//!
//! The registry owns every registered plugin together with its current
//! [`PluginValue`], and keeps the execution order. A plugin that declares a
//! run-before target always executes ahead of that target once both are
//! registered. Ordering is a stable topological sort: plugins are laid out in
//! registration order, except that a plugin is pulled forward to sit ahead of
//! the plugin it must run before.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use restyle_tree::Syntax;

use crate::{Plugin, PluginValue, RegistryError, Settings};

/// A plugin together with its configured value.
pub struct RegisteredPlugin {
    plugin: Box<dyn Plugin>,
    value: PluginValue,
}

impl RegisteredPlugin {
    /// The plugin.
    pub fn plugin(&self) -> &dyn Plugin {
        self.plugin.as_ref()
    }

    /// The plugin name.
    pub fn name(&self) -> &str {
        self.plugin.name()
    }

    /// The current value.
    pub fn value(&self) -> &PluginValue {
        &self.value
    }

    /// Returns true if the plugin participates in runs.
    pub fn is_enabled(&self) -> bool {
        self.value.is_enabled()
    }
}

impl std::fmt::Debug for RegisteredPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredPlugin")
            .field("name", &self.plugin.name())
            .field("value", &self.value)
            .finish()
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// The registered plugin's name.
    pub name: String,
    /// Index of the plugin in the execution order right after registration.
    pub position: usize,
    /// Run-before target that is not registered yet.
    pub pending_target: Option<String>,
    /// Plugins that were waiting for this one and are now ordered ahead of it.
    pub resolved_waiters: Vec<String>,
}

/// Ordered collection of plugins.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    /// Plugins in registration order.
    entries: Vec<RegisteredPlugin>,
    /// Name to index into `entries`.
    index: HashMap<String, usize>,
    /// Indices into `entries`, in execution order.
    order: Vec<usize>,
    /// Union of every registered plugin's dialects.
    syntaxes: BTreeSet<Syntax>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin with the default (enabled) value.
    ///
    /// Fails without touching the registry if the name is taken or the
    /// plugin's run-before chain leads back to itself.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<Registration, RegistryError> {
        let name = plugin.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }

        let target = plugin.run_before().map(str::to_string);
        if let Some(target) = &target {
            self.check_cycle(&name, target)?;
        }

        let resolved_waiters: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.plugin.run_before() == Some(name.as_str()))
            .map(|entry| entry.name().to_string())
            .collect();

        self.syntaxes.extend(plugin.syntaxes().iter().copied());
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(RegisteredPlugin {
            plugin,
            value: PluginValue::default(),
        });
        self.reorder();

        let position = self
            .order
            .iter()
            .position(|&idx| self.entries[idx].name() == name)
            .unwrap_or(self.order.len());
        let pending_target = target.filter(|target| !self.index.contains_key(target));

        debug!(
            "Registered plugin '{}' at position {} of {}",
            name,
            position,
            self.order.len()
        );

        Ok(Registration {
            name,
            position,
            pending_target,
            resolved_waiters,
        })
    }

    /// Follows the run-before chain from `target` through registered plugins.
    fn check_cycle(&self, name: &str, target: &str) -> Result<(), RegistryError> {
        let cycle = || RegistryError::Cycle {
            plugin: name.to_string(),
            target: target.to_string(),
        };

        let mut next = Some(target);
        let mut steps = 0;
        while let Some(current) = next {
            if current == name {
                return Err(cycle());
            }
            // Every registered chain is acyclic, so it ends within len steps.
            if steps > self.entries.len() {
                break;
            }
            steps += 1;
            next = self
                .index
                .get(current)
                .and_then(|&idx| self.entries[idx].plugin.run_before());
        }
        Ok(())
    }

    /// Recomputes the execution order.
    fn reorder(&mut self) {
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); self.entries.len()];
        for (idx, entry) in self.entries.iter().enumerate() {
            if let Some(&target) = entry
                .plugin
                .run_before()
                .and_then(|target| self.index.get(target))
            {
                predecessors[target].push(idx);
            }
        }

        let mut placed = vec![false; self.entries.len()];
        let mut order = Vec::with_capacity(self.entries.len());
        for idx in 0..self.entries.len() {
            place(idx, &predecessors, &mut placed, &mut order);
        }
        self.order = order;
    }

    /// Sets a plugin's value. Returns false if the plugin is not registered.
    pub fn configure(&mut self, name: &str, value: PluginValue) -> bool {
        match self.index.get(name) {
            Some(&idx) => {
                self.entries[idx].value = value;
                true
            }
            None => false,
        }
    }

    /// Puts every plugin back to the default value.
    pub fn reset_values(&mut self) {
        for entry in &mut self.entries {
            entry.value = PluginValue::default();
        }
    }

    /// Iterates over plugins in execution order.
    pub fn plugins(&self) -> impl Iterator<Item = &RegisteredPlugin> {
        self.order.iter().map(|&idx| &self.entries[idx])
    }

    /// Plugin names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins().map(RegisteredPlugin::name).collect()
    }

    /// Returns the position of a plugin in the execution order.
    pub fn position(&self, name: &str) -> Option<usize> {
        let &idx = self.index.get(name)?;
        self.order.iter().position(|&i| i == idx)
    }

    /// Looks up a plugin by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredPlugin> {
        self.index.get(name).map(|&idx| &self.entries[idx])
    }

    /// Returns true if a plugin with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Dialects declared by at least one registered plugin.
    pub fn supported_syntaxes(&self) -> &BTreeSet<Syntax> {
        &self.syntaxes
    }

    /// Returns true if some registered plugin declares the dialect.
    pub fn supports(&self, syntax: Syntax) -> bool {
        self.syntaxes.contains(&syntax)
    }

    /// Run-before targets that are not registered yet, mapped to the plugins
    /// waiting for them in registration order.
    pub fn pending(&self) -> BTreeMap<String, Vec<String>> {
        let mut pending: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in &self.entries {
            if let Some(target) = entry.plugin.run_before()
                && !self.index.contains_key(target)
            {
                pending
                    .entry(target.to_string())
                    .or_default()
                    .push(entry.name().to_string());
            }
        }
        pending
    }

    /// Values of every enabled plugin.
    pub fn settings(&self) -> Settings {
        Settings::new(
            self.entries
                .iter()
                .filter_map(|entry| {
                    entry
                        .value
                        .options()
                        .map(|value| (entry.name().to_string(), value.clone()))
                })
                .collect(),
        )
    }

    /// Removes every plugin.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.order.clear();
        self.syntaxes.clear();
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Places `idx` after everything that must run before it.
fn place(idx: usize, predecessors: &[Vec<usize>], placed: &mut [bool], order: &mut Vec<usize>) {
    if placed[idx] {
        return;
    }
    placed[idx] = true;
    for &pred in &predecessors[idx] {
        place(pred, predecessors, placed, order);
    }
    order.push(idx);
}
