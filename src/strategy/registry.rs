//! Ordered, append-only strategy registry.

use std::sync::Arc;

use crate::config::{COLUMN_ERR_PREFIX, MAX_STRATEGIES};
use crate::error_handling::InitializationError;

use super::tls::{FingerprintProfile, RustlsStrategy};
use super::ProbeStrategy;

/// Strategies in registration order.
///
/// Position `i` owns bit `i` of the failure mask and the `i`-th `err_*`
/// column. Entries are never removed or reordered, so a recorded mask keeps
/// its meaning for the whole run.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn ProbeStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a strategy and returns its position.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::RegistryError` if the name is empty,
    /// already registered, or the mask has no bit left.
    pub fn register(
        &mut self,
        strategy: Arc<dyn ProbeStrategy>,
    ) -> Result<usize, InitializationError> {
        let name = strategy.name();
        if name.is_empty() {
            return Err(InitializationError::RegistryError(
                "strategy name must not be empty".to_string(),
            ));
        }
        if self.strategies.iter().any(|s| s.name() == name) {
            return Err(InitializationError::RegistryError(format!(
                "strategy '{name}' is already registered"
            )));
        }
        if self.strategies.len() >= MAX_STRATEGIES {
            return Err(InitializationError::RegistryError(format!(
                "at most {MAX_STRATEGIES} strategies fit in the failure mask"
            )));
        }
        self.strategies.push(strategy);
        Ok(self.strategies.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ProbeStrategy>> {
        self.strategies.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// `err_<name>` for every strategy, in registry order.
    pub fn error_columns(&self) -> Vec<String> {
        self.strategies
            .iter()
            .map(|s| format!("{COLUMN_ERR_PREFIX}{}", s.name()))
            .collect()
    }
}

/// The standard registry: `tls`, `utls`, `utlslight`, in that order.
///
/// # Errors
///
/// Returns an error if a rustls configuration is rejected.
pub fn default_registry() -> Result<StrategyRegistry, InitializationError> {
    let mut registry = StrategyRegistry::new();
    for (name, profile) in [
        ("tls", FingerprintProfile::Standard),
        ("utls", FingerprintProfile::ChromeLike),
        ("utlslight", FingerprintProfile::Light),
    ] {
        registry.register(Arc::new(RustlsStrategy::with_webpki_roots(name, profile)?))?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ProbeError;
    use crate::strategy::Handshake;
    use async_trait::async_trait;
    use tokio::net::TcpStream;

    struct Named(String);

    #[async_trait]
    impl ProbeStrategy for Named {
        fn name(&self) -> &str {
            &self.0
        }

        async fn handshake(
            &self,
            _conn: TcpStream,
            _server_name: &str,
        ) -> Result<Handshake, ProbeError> {
            Err(ProbeError::handshake("not used"))
        }
    }

    fn named(name: &str) -> Arc<dyn ProbeStrategy> {
        Arc::new(Named(name.to_string()))
    }

    #[test]
    fn test_register_preserves_order_and_returns_position() {
        let mut registry = StrategyRegistry::new();
        assert_eq!(registry.register(named("a")).unwrap(), 0);
        assert_eq!(registry.register(named("b")).unwrap(), 1);
        assert_eq!(registry.register(named("c")).unwrap(), 2);
        assert_eq!(registry.names(), vec!["a", "b", "c"]);
        assert_eq!(registry.error_columns(), vec!["err_a", "err_b", "err_c"]);
    }

    #[test]
    fn test_register_rejects_duplicates_and_empty_names() {
        let mut registry = StrategyRegistry::new();
        registry.register(named("a")).unwrap();
        assert!(matches!(
            registry.register(named("a")),
            Err(InitializationError::RegistryError(_))
        ));
        assert!(registry.register(named("")).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_stops_at_mask_width() {
        let mut registry = StrategyRegistry::new();
        for i in 0..MAX_STRATEGIES {
            registry.register(named(&format!("s{i}"))).unwrap();
        }
        assert!(registry.register(named("overflow")).is_err());
        assert_eq!(registry.len(), MAX_STRATEGIES);
    }

    #[test]
    fn test_empty_registry() {
        let registry = StrategyRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.error_columns().is_empty());
    }

    #[test]
    fn test_default_registry_columns() {
        let registry = default_registry().expect("built-in profiles are valid");
        assert_eq!(
            registry.error_columns(),
            vec!["err_tls", "err_utls", "err_utlslight"]
        );
    }
}
