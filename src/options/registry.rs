//! Option builder registry and pipeline runner

use std::fmt;

use super::{ConnectionOption, Result};
use crate::config::ConfigView;

/// Contributes zero or one option based on configuration
///
/// Builders must not keep the view beyond the call; every run gets its own.
pub trait OptionBuilder: Send + Sync {
    /// Name used in logs and registry listings
    fn name(&self) -> &str;

    /// Inspect the configuration and return this feature's option, if any
    fn build(&self, config: &ConfigView) -> Result<Option<ConnectionOption>>;
}

/// Builder backed by a plain function
pub struct FnBuilder<F> {
    name: String,
    func: F,
}

impl<F> FnBuilder<F>
where
    F: Fn(&ConfigView) -> Result<Option<ConnectionOption>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        FnBuilder {
            name: name.into(),
            func,
        }
    }
}

impl<F> OptionBuilder for FnBuilder<F>
where
    F: Fn(&ConfigView) -> Result<Option<ConnectionOption>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, config: &ConfigView) -> Result<Option<ConnectionOption>> {
        (self.func)(config)
    }
}

/// Ordered collection of option builders
///
/// Populated once during startup, then shared read-only by every connection
/// attempt. Registration needs `&mut self`, so it cannot race a run.
#[derive(Default)]
pub struct OptionRegistry {
    builders: Vec<Box<dyn OptionBuilder>>,
}

impl OptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the connection defaults followed by TLS
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        super::defaults::register(&mut registry);
        crate::tls::register(&mut registry);
        registry
    }

    /// Append a builder; it runs after every builder registered before it
    pub fn register<B: OptionBuilder + 'static>(&mut self, builder: B) -> &mut Self {
        tracing::debug!(target: "connopts::options", builder = builder.name(), "registered option builder");
        self.builders.push(Box::new(builder));
        self
    }

    /// Append a function as a builder
    pub fn register_fn<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&ConfigView) -> Result<Option<ConnectionOption>> + Send + Sync + 'static,
    {
        self.register(FnBuilder::new(name, func))
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Builder names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.builders.iter().map(|b| b.name()).collect()
    }

    /// Run every builder against `config` in registration order
    ///
    /// Builders that contribute nothing are skipped. The first error aborts
    /// the run and no options are returned.
    pub fn run(&self, config: &ConfigView) -> Result<Vec<ConnectionOption>> {
        let mut options = Vec::with_capacity(self.builders.len());
        for builder in &self.builders {
            match builder.build(config) {
                Ok(Some(option)) => {
                    tracing::debug!(
                        target: "connopts::options",
                        builder = builder.name(),
                        option = %option,
                        "option contributed"
                    );
                    options.push(option);
                }
                Ok(None) => {
                    tracing::debug!(target: "connopts::options", builder = builder.name(), "no option contributed");
                }
                Err(e) => {
                    tracing::debug!(
                        target: "connopts::options",
                        builder = builder.name(),
                        error = %e,
                        "option builder failed; aborting"
                    );
                    return Err(e);
                }
            }
        }
        Ok(options)
    }
}

impl fmt::Debug for OptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionRegistry")
            .field("builders", &self.names())
            .finish()
    }
}
