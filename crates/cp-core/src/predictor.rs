//! Predictor capability contracts and the named factory registry.
//!
//! The engine never trains a concrete learner itself. Every model it owns
//! (base, region decider, per-region patches) is produced by a
//! [`PredictorFactory`] and used only through the [`Predictor`] trait.
//! Region awareness is an optional capability probed at runtime through
//! [`Predictor::as_region_aware`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use cp_common::{Dataset, Label, PatchError, Record, RegionId, Result};
use cp_config::PredictorNames;

/// A supervised learner over [`Dataset`]s.
///
/// `classify` must fail with [`PatchError::Classification`] (or another
/// classification-category error) when the predictor has not been
/// trained, and must never panic on a record that fits the training
/// schema.
pub trait Predictor: Send + Sync {
    /// Short identifier used in logs and descriptions.
    fn name(&self) -> &str;

    /// Fit the predictor to `data`, replacing anything learned before.
    fn train(&mut self, data: &Dataset) -> Result<()>;

    /// Predict a label for `record`.
    fn classify(&self, record: &Record) -> Result<Label>;

    /// The region-aware view of this predictor, if it has one.
    fn as_region_aware(&self) -> Option<&dyn RegionAware> {
        None
    }
}

/// Capability of a predictor that partitions its input space into regions.
pub trait RegionAware {
    /// Number of regions; fixed once the predictor is trained.
    fn region_count(&self) -> usize;

    /// Predict a label and report which region produced it.
    fn classify_with_region(&self, record: &Record) -> Result<(Label, RegionId)>;

    /// Region used when the predictor cannot place a record.
    fn default_region(&self) -> Option<RegionId> {
        None
    }
}

/// Produces fresh, untrained predictors.
pub trait PredictorFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn Predictor>>;
}

impl<F> PredictorFactory for F
where
    F: Fn() -> Result<Box<dyn Predictor>> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn Predictor>> {
        self()
    }
}

/// The three model roles the engine instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Base,
    Decider,
    Patch,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Base, Role::Decider, Role::Patch];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Base => "base",
            Role::Decider => "decider",
            Role::Patch => "patch",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named predictor factories, resolved against the configured names.
#[derive(Default, Clone)]
pub struct PredictorRegistry {
    factories: BTreeMap<String, Arc<dyn PredictorFactory>>,
}

impl PredictorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a factory under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: PredictorFactory + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: PredictorFactory + 'static,
    {
        self.register(name, factory);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PredictorFactory>> {
        self.factories.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Look up the factory for every role.
    pub fn resolve(&self, names: &PredictorNames) -> Result<PredictorFactories> {
        let lookup = |role: Role, name: &str| {
            self.get(name).ok_or_else(|| PatchError::UnknownPredictor {
                role: role.to_string(),
                name: name.to_string(),
            })
        };
        Ok(PredictorFactories {
            base: lookup(Role::Base, &names.base)?,
            decider: lookup(Role::Decider, &names.decider)?,
            patch: lookup(Role::Patch, &names.patch)?,
        })
    }
}

impl fmt::Debug for PredictorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// One factory per role.
#[derive(Clone)]
pub struct PredictorFactories {
    pub base: Arc<dyn PredictorFactory>,
    pub decider: Arc<dyn PredictorFactory>,
    pub patch: Arc<dyn PredictorFactory>,
}

impl PredictorFactories {
    pub fn new(
        base: impl PredictorFactory + 'static,
        decider: impl PredictorFactory + 'static,
        patch: impl PredictorFactory + 'static,
    ) -> Self {
        PredictorFactories {
            base: Arc::new(base),
            decider: Arc::new(decider),
            patch: Arc::new(patch),
        }
    }

    pub fn get(&self, role: Role) -> &dyn PredictorFactory {
        match role {
            Role::Base => self.base.as_ref(),
            Role::Decider => self.decider.as_ref(),
            Role::Patch => self.patch.as_ref(),
        }
    }

    /// Create a fresh predictor for `role`.
    pub fn create(&self, role: Role) -> Result<Box<dyn Predictor>> {
        self.get(role).create()
    }

    /// Create one predictor per role and throw it away.
    ///
    /// Surfaces broken factories at construction time as
    /// [`PatchError::FactoryFailed`] instead of in the middle of a stream.
    pub fn probe(&self) -> Result<()> {
        for role in Role::ALL {
            self.create(role).map_err(|err| PatchError::FactoryFailed {
                role: role.to_string(),
                message: err.to_string(),
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for PredictorFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictorFactories").finish_non_exhaustive()
    }
}
