//! Trust registry lookup.
//!
//! Finds the adapter's application-service registration and resolves the
//! service-account configuration from it once, at startup.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use roomgate_core::{
    CoreError, CoreResult, RegisteredService, Sender, ServiceAccountConfig,
    ServiceAccountRegistry, SharedSecret, ADAPTER_SERVICE_ID,
};
use roomgate_notify::EndpointConfig;

// ---------------------------------------------------------------------------
// DetectedService — what the lookup found, field by field
// ---------------------------------------------------------------------------

/// Fields extracted from the adapter's registration.
///
/// Every field is independently optional; an empty value counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectedService {
    pub localpart: Option<String>,
    pub url: Option<String>,
    pub hs_token: Option<SharedSecret>,
}

impl DetectedService {
    pub fn is_empty(&self) -> bool {
        self.localpart.is_none() && self.url.is_none() && self.hs_token.is_none()
    }
}

/// Look up the adapter's entry in `registry`.
///
/// A registry error or a missing entry is logged and yields an empty
/// `DetectedService`; it is never propagated.
pub fn lookup_adapter_service(registry: &dyn ServiceAccountRegistry) -> DetectedService {
    let services = match registry.registered_services() {
        Ok(services) => services,
        Err(e) => {
            tracing::error!(error = %e, "failed to load application service registry");
            return DetectedService::default();
        }
    };

    let Some(service) = services.into_iter().find(|s| s.id == ADAPTER_SERVICE_ID) else {
        tracing::error!(
            service_id = ADAPTER_SERVICE_ID,
            "adapter application service not found, using defaults"
        );
        return DetectedService::default();
    };

    let detected = DetectedService {
        localpart: service
            .sender
            .as_ref()
            .map(Sender::localpart)
            .filter(|lp| !lp.is_empty()),
        url: service.url.filter(|u| !u.is_empty()).and_then(usable_endpoint),
        hs_token: service.hs_token.filter(|t| !t.is_empty()),
    };

    tracing::info!(
        service_id = ADAPTER_SERVICE_ID,
        sender = detected.localpart.as_deref().unwrap_or("-"),
        url = detected.url.as_deref().unwrap_or("-"),
        hs_token = detected.hs_token.is_some(),
        "found adapter application service"
    );
    detected
}

/// Keep `url` only if the dispatcher can deliver to it.
fn usable_endpoint(url: String) -> Option<String> {
    let endpoint = EndpointConfig {
        base_url: url,
        secret: None,
    };
    match endpoint.validate() {
        Ok(()) => Some(endpoint.base_url),
        Err(reason) => {
            tracing::error!(
                service_id = ADAPTER_SERVICE_ID,
                url = %endpoint.base_url,
                reason,
                "unusable adapter url, using default endpoint"
            );
            None
        }
    }
}

/// Resolve the service-account configuration for `server_domain`.
///
/// Each field missing from the registry falls back to its own default.
pub fn resolve_service_account(
    registry: &dyn ServiceAccountRegistry,
    server_domain: &str,
) -> ServiceAccountConfig {
    let detected = lookup_adapter_service(registry);
    let mut config = ServiceAccountConfig::fallback(server_domain);

    if let Some(localpart) = detected.localpart {
        config.service_localpart = localpart;
    }
    if let Some(url) = detected.url {
        config.adapter_endpoint = url;
    }
    config.shared_secret = detected.hs_token;

    tracing::info!(
        service_account = %config.service_user_id(),
        adapter = %config.adapter_endpoint,
        token = if config.has_secret() { "configured" } else { "NOT FOUND" },
        "room gate initialized"
    );
    config
}

// ---------------------------------------------------------------------------
// StaticRegistry — fixed in-memory list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    services: Vec<RegisteredService>,
}

impl StaticRegistry {
    pub fn new(services: Vec<RegisteredService>) -> Self {
        Self { services }
    }
}

impl ServiceAccountRegistry for StaticRegistry {
    fn registered_services(&self) -> CoreResult<Vec<RegisteredService>> {
        Ok(self.services.clone())
    }
}

// ---------------------------------------------------------------------------
// RegistrationFileRegistry — application-service registration YAML files
// ---------------------------------------------------------------------------

/// On-disk shape of an application-service registration.
#[derive(Debug, Deserialize)]
struct RegistrationFile {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    hs_token: Option<String>,
    #[serde(default)]
    sender_localpart: Option<String>,
    /// Explicit sender; takes precedence over `sender_localpart`.
    #[serde(default)]
    sender: Option<Sender>,
}

impl From<RegistrationFile> for RegisteredService {
    fn from(file: RegistrationFile) -> Self {
        RegisteredService {
            id: file.id,
            sender: file.sender.or(file.sender_localpart.map(Sender::Name)),
            url: file.url,
            hs_token: file.hs_token.map(SharedSecret::new),
        }
    }
}

/// Reads the registration files listed in the configuration.
///
/// All files are re-read on every call. Any unreadable or unparsable file
/// makes the whole registry unavailable.
#[derive(Debug, Clone, Default)]
pub struct RegistrationFileRegistry {
    paths: Vec<PathBuf>,
}

impl RegistrationFileRegistry {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn read_one(path: &Path) -> CoreResult<RegisteredService> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CoreError::RegistryUnavailable(format!("{}: {}", path.display(), e))
        })?;
        let file: RegistrationFile = serde_yaml::from_str(&contents).map_err(|e| {
            CoreError::RegistryUnavailable(format!("{}: {}", path.display(), e))
        })?;
        Ok(file.into())
    }
}

impl ServiceAccountRegistry for RegistrationFileRegistry {
    fn registered_services(&self) -> CoreResult<Vec<RegisteredService>> {
        self.paths.iter().map(|p| Self::read_one(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "roomgate-registry-test-{}-{}",
            std::process::id(),
            n
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    struct Offline;

    impl ServiceAccountRegistry for Offline {
        fn registered_services(&self) -> CoreResult<Vec<RegisteredService>> {
            Err(CoreError::RegistryUnavailable("offline".into()))
        }
    }

    fn adapter(sender: Option<Sender>, url: Option<&str>, token: Option<&str>) -> RegisteredService {
        RegisteredService {
            id: ADAPTER_SERVICE_ID.into(),
            sender,
            url: url.map(String::from),
            hs_token: token.map(SharedSecret::new),
        }
    }

    #[test]
    fn test_lookup_full_entry() {
        let registry = StaticRegistry::new(vec![
            RegisteredService {
                id: "bridge".into(),
                sender: Some(Sender::Name("bridge-bot".into())),
                url: Some("http://bridge:9000".into()),
                hs_token: None,
            },
            adapter(
                Some(Sender::Name("@alkemio-bot:alkem.io".into())),
                Some("http://adapter:8080"),
                Some("hs-secret"),
            ),
        ]);

        let detected = lookup_adapter_service(&registry);
        assert_eq!(detected.localpart.as_deref(), Some("alkemio-bot"));
        assert_eq!(detected.url.as_deref(), Some("http://adapter:8080"));
        assert_eq!(detected.hs_token.unwrap().expose(), "hs-secret");
    }

    #[test]
    fn test_lookup_missing_entry_is_empty() {
        let registry = StaticRegistry::new(vec![RegisteredService {
            id: "bridge".into(),
            sender: None,
            url: None,
            hs_token: None,
        }]);
        assert!(lookup_adapter_service(&registry).is_empty());
    }

    #[test]
    fn test_lookup_registry_failure_is_empty() {
        assert!(lookup_adapter_service(&Offline).is_empty());
    }

    #[test]
    fn test_lookup_empty_fields_are_absent() {
        let registry = StaticRegistry::new(vec![adapter(
            Some(Sender::Name(String::new())),
            Some(""),
            Some(""),
        )]);
        assert!(lookup_adapter_service(&registry).is_empty());
    }

    #[test]
    fn test_lookup_unusable_url_is_absent() {
        let registry = StaticRegistry::new(vec![adapter(
            Some(Sender::Name("bot".into())),
            Some("matrix-adapter:8080"),
            Some("tok"),
        )]);
        let detected = lookup_adapter_service(&registry);
        assert!(detected.url.is_none());
        assert_eq!(detected.localpart.as_deref(), Some("bot"));

        let config = resolve_service_account(&registry, "example.org");
        assert_eq!(config.adapter_endpoint, "http://localhost:8080");
        assert_eq!(config.service_localpart, "bot");
        assert!(config.has_secret());
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() {
        let config = resolve_service_account(&StaticRegistry::default(), "example.org");
        assert_eq!(config, ServiceAccountConfig::fallback("example.org"));
        assert_eq!(config.service_user_id(), "@matrix-adapter:example.org");
        assert!(!config.has_secret());

        let config = resolve_service_account(&Offline, "example.org");
        assert_eq!(config.adapter_endpoint, "http://localhost:8080");
    }

    #[test]
    fn test_resolve_fields_fall_back_independently() {
        let registry = StaticRegistry::new(vec![adapter(None, Some("http://adapter:8080"), None)]);
        let config = resolve_service_account(&registry, "example.org");
        assert_eq!(config.service_localpart, "matrix-adapter");
        assert_eq!(config.adapter_endpoint, "http://adapter:8080");
        assert!(config.shared_secret.is_none());

        let registry = StaticRegistry::new(vec![adapter(
            Some(Sender::Name("bot".into())),
            None,
            Some("tok"),
        )]);
        let config = resolve_service_account(&registry, "example.org");
        assert_eq!(config.service_localpart, "bot");
        assert_eq!(config.adapter_endpoint, "http://localhost:8080");
        assert!(config.has_secret());
    }

    #[test]
    fn test_resolve_parsed_user_sender() {
        let sender = Sender::User(roomgate_core::UserId::parse("@adapter:alkem.io").unwrap());
        let registry = StaticRegistry::new(vec![adapter(Some(sender), None, None)]);
        let config = resolve_service_account(&registry, "alkem.io");
        assert_eq!(config.service_localpart, "adapter");
    }

    #[test]
    fn test_registration_file_with_sender_localpart() {
        let dir = temp_dir();
        let path = dir.join("adapter.yaml");
        std::fs::write(
            &path,
            r#"
id: alkemio-matrix-adapter
url: http://matrix-adapter:8080
as_token: as-secret
hs_token: hs-secret
sender_localpart: alkemio-adapter
namespaces:
  users: []
"#,
        )
        .unwrap();

        let registry = RegistrationFileRegistry::new(vec![path]);
        let services = registry.registered_services().unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].id, ADAPTER_SERVICE_ID);
        assert_eq!(services[0].sender, Some(Sender::Name("alkemio-adapter".into())));

        let config = resolve_service_account(&registry, "alkem.io");
        assert_eq!(config.service_user_id(), "@alkemio-adapter:alkem.io");
        assert_eq!(config.adapter_endpoint, "http://matrix-adapter:8080");
        assert_eq!(config.shared_secret.unwrap().expose(), "hs-secret");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_registration_file_explicit_sender_wins() {
        let dir = temp_dir();
        let path = dir.join("adapter.yaml");
        std::fs::write(
            &path,
            "id: alkemio-matrix-adapter\nurl: null\nsender_localpart: ignored\nsender: \"@real:alkem.io\"\n",
        )
        .unwrap();

        let registry = RegistrationFileRegistry::new(vec![path]);
        let config = resolve_service_account(&registry, "alkem.io");
        assert_eq!(config.service_localpart, "real");
        assert_eq!(config.adapter_endpoint, "http://localhost:8080");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unreadable_file_makes_registry_unavailable() {
        let dir = temp_dir();
        let good = dir.join("good.yaml");
        std::fs::write(&good, "id: alkemio-matrix-adapter\nsender_localpart: bot\n").unwrap();

        let registry = RegistrationFileRegistry::new(vec![good, dir.join("missing.yaml")]);
        assert!(matches!(
            registry.registered_services(),
            Err(CoreError::RegistryUnavailable(_))
        ));
        // And resolution falls back entirely.
        let config = resolve_service_account(&registry, "example.org");
        assert_eq!(config.service_localpart, "matrix-adapter");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unparsable_file_makes_registry_unavailable() {
        let dir = temp_dir();
        let path = dir.join("broken.yaml");
        std::fs::write(&path, "id: [unclosed\n").unwrap();

        let registry = RegistrationFileRegistry::new(vec![path]);
        assert!(registry.registered_services().is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_no_files_is_empty_registry() {
        let registry = RegistrationFileRegistry::default();
        assert!(registry.registered_services().unwrap().is_empty());
        assert!(registry.paths().is_empty());
    }
}
