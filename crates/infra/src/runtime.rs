//! Runtime bootstrap
//!
//! Assembles the feature state chain from configuration:
//! `readonly-guard → cache (when enabled) → store → listener`.

use std::sync::Arc;
use std::time::Duration;

use featuregate_core::{
    CachingLink, ContextProvider, FeatureManager, FeatureRegistry, FeatureStateChain,
    FeatureTester, ListenerLink, LoggingListener, ReadonlyGuardLink, StateChangeListener,
    StateStore, StoreLink, StrategyRegistry,
};
use featuregate_domain::{
    EntryPointPolicy, FeatureGateConfig, Result, StoreBackend, StoreSettings,
};
use tracing::info;

use crate::cache::MokaCacheBackend;
use crate::database::{DbManager, InMemoryStateStore, SqliteStateStore};

/// Fully wired feature gating services.
pub struct FeatureGateRuntime {
    config: FeatureGateConfig,
    registry: Arc<FeatureRegistry>,
    chain: Arc<FeatureStateChain>,
    manager: Arc<FeatureManager>,
    store: Arc<dyn StateStore>,
    cache: Option<Arc<MokaCacheBackend>>,
    db: Option<Arc<DbManager>>,
}

impl FeatureGateRuntime {
    /// Build the runtime with the logging listener as the only observer.
    pub fn from_config(
        config: FeatureGateConfig,
        registry: FeatureRegistry,
        context_provider: Arc<dyn ContextProvider>,
    ) -> Result<Self> {
        Self::from_config_with_listeners(config, registry, context_provider, Vec::new())
    }

    /// Build the runtime, notifying `listeners` after the logging listener on
    /// every committed toggle.
    pub fn from_config_with_listeners(
        config: FeatureGateConfig,
        registry: FeatureRegistry,
        context_provider: Arc<dyn ContextProvider>,
        listeners: Vec<Arc<dyn StateChangeListener>>,
    ) -> Result<Self> {
        config.validate()?;

        let (store, db) = open_store(&config.store)?;

        let mut builder = FeatureStateChain::builder()
            .link(ReadonlyGuardLink)
            .link(StoreLink::new(Arc::clone(&store)));

        let cache = if config.cache.enabled {
            let backend = Arc::new(MokaCacheBackend::new(&config.cache));
            builder = builder.link(CachingLink::new(
                Arc::clone(&backend),
                Duration::from_secs(config.cache.ttl_seconds),
                config.cache.key_prefix.clone(),
            ));
            Some(backend)
        } else {
            info!("State cache disabled; every read goes to the store");
            None
        };

        let observers = listeners
            .into_iter()
            .fold(ListenerLink::new().with_listener(Arc::new(LoggingListener)), |link, l| {
                link.with_listener(l)
            });
        let chain = Arc::new(builder.link(observers).build()?);

        let manager = Arc::new(
            FeatureManager::new(chain.clone())
                .with_strategies(Arc::new(StrategyRegistry::with_builtins()))
                .with_context_provider(context_provider),
        );

        info!(
            links = ?chain.link_names(),
            store = %config.store.backend,
            features = registry.len(),
            entry_point_policy = %config.gate.entry_point_policy,
            "Feature gating initialised"
        );
        manager.log_feature_states(&registry);

        Ok(Self { config, registry: Arc::new(registry), chain, manager, store, cache, db })
    }

    /// Toggle surface and default [`FeatureTester`].
    pub fn manager(&self) -> &Arc<FeatureManager> {
        &self.manager
    }

    /// Tester handle for wrapping targets with `feature_gated!`.
    pub fn tester(&self) -> Arc<dyn FeatureTester> {
        self.manager.clone()
    }

    pub fn chain(&self) -> &Arc<FeatureStateChain> {
        &self.chain
    }

    pub fn registry(&self) -> &Arc<FeatureRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// The state cache, when caching is enabled.
    pub fn cache(&self) -> Option<&Arc<MokaCacheBackend>> {
        self.cache.as_ref()
    }

    pub fn entry_point_policy(&self) -> EntryPointPolicy {
        self.config.gate.entry_point_policy
    }

    pub fn config(&self) -> &FeatureGateConfig {
        &self.config
    }

    /// Check the durable store. Always healthy for the in-memory backend.
    pub fn health_check(&self) -> Result<()> {
        self.db.as_ref().map_or(Ok(()), |db| db.health_check())
    }
}

impl std::fmt::Debug for FeatureGateRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureGateRuntime")
            .field("links", &self.chain.link_names())
            .field("features", &self.registry.names())
            .field("store", &self.config.store.backend)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

type OpenedStore = (Arc<dyn StateStore>, Option<Arc<DbManager>>);

fn open_store(settings: &StoreSettings) -> Result<OpenedStore> {
    match settings.backend {
        StoreBackend::Sqlite => {
            let db = Arc::new(DbManager::new(&settings.path, settings.pool_size)?);
            db.run_migrations()?;
            let store: Arc<dyn StateStore> = Arc::new(SqliteStateStore::new(Arc::clone(&db)));
            Ok((store, Some(db)))
        }
        StoreBackend::Memory => {
            info!("Using in-memory feature state store; toggles are lost on restart");
            Ok((Arc::new(InMemoryStateStore::new()), None))
        }
    }
}
