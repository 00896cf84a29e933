use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// A simulated application and the places its pods run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppProfile {
    pub name: String,
    pub containers: Vec<String>,
    pub namespaces: Vec<String>,
    pub error_rate: f64,
}

/// The fleet the generator draws from, in declaration order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Catalog {
    pub applications: Vec<AppProfile>,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog has no applications")]
    Empty,
    #[error("application '{0}' has no containers")]
    NoContainers(String),
    #[error("application '{0}' has no namespaces")]
    NoNamespaces(String),
    #[error("application '{name}' has error_rate {rate}, expected a value in [0, 1]")]
    InvalidErrorRate { name: String, rate: f64 },
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
}

fn profile(name: &str, containers: &[&str], namespaces: &[&str], error_rate: f64) -> AppProfile {
    AppProfile {
        name: name.to_string(),
        containers: containers.iter().map(|c| c.to_string()).collect(),
        namespaces: namespaces.iter().map(|n| n.to_string()).collect(),
        error_rate,
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            applications: vec![
                profile("web-frontend", &["nginx", "app"], &["default", "frontend"], 0.15),
                profile("user-service", &["app", "istio-proxy"], &["default", "backend"], 0.12),
                profile("payment-service", &["app", "istio-proxy"], &["default", "backend"], 0.18),
                profile(
                    "kube-system",
                    &["coredns", "aws-load-balancer-controller"],
                    &["kube-system"],
                    0.08,
                ),
                profile("monitoring", &["prometheus", "grafana"], &["monitoring"], 0.05),
                profile("database", &["postgres"], &["database"], 0.20),
                profile("redis", &["redis"], &["cache"], 0.10),
                profile("logging", &["fluent-bit"], &["kube-system", "logging"], 0.07),
                profile("istio-system", &["istio-proxy", "pilot"], &["istio-system"], 0.09),
                profile("cert-manager", &["cert-manager", "webhook"], &["cert-manager"], 0.06),
            ],
        }
    }
}

impl Catalog {
    /// Load a catalog from YAML and validate it.
    pub fn from_yaml_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalog: Catalog =
            serde_yaml::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.applications.is_empty() {
            return Err(CatalogError::Empty);
        }
        for app in &self.applications {
            if app.containers.is_empty() {
                return Err(CatalogError::NoContainers(app.name.clone()));
            }
            if app.namespaces.is_empty() {
                return Err(CatalogError::NoNamespaces(app.name.clone()));
            }
            if !(0.0..=1.0).contains(&app.error_rate) {
                return Err(CatalogError::InvalidErrorRate {
                    name: app.name.clone(),
                    rate: app.error_rate,
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&AppProfile> {
        self.applications.iter().find(|a| a.name == name)
    }

    /// Whether `(app, container, namespace)` is a combination this catalog declares.
    #[allow(dead_code)]
    pub fn allows(&self, app: &str, container: &str, namespace: &str) -> bool {
        self.get(app).is_some_and(|profile| {
            profile.containers.iter().any(|c| c == container)
                && profile.namespaces.iter().any(|n| n == namespace)
        })
    }
}
