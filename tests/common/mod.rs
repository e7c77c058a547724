//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_rules(rules::SERVICE_FOR_DEPLOYMENT);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{manifests, rules, templates};
    pub use super::TestFixture;
}

/// Rule files used across tests.
#[allow(dead_code)]
pub mod rules {
    /// Label every Deployment and give it a Service that points back at it.
    pub const SERVICE_FOR_DEPLOYMENT: &str = r#"
rules:
  - match:
      kind: Deployment
    inject:
      metadata:
        labels:
          team: {{var.team}}
    newResources:
      - service.yaml
    patches: deployment-patch.yaml
"#;

    /// A rule set that applies nothing.
    pub const EMPTY: &str = "rules: []\n";

    /// Not a valid rule file.
    pub const INVALID: &str = "rules: [unclosed\n";

    /// References a template that does not exist.
    pub const MISSING_TEMPLATE: &str = r#"
rules:
  - match: {kind: Deployment}
    patches: nowhere.yaml
"#;
}

/// Templates matching [`rules::SERVICE_FOR_DEPLOYMENT`].
#[allow(dead_code)]
pub mod templates {
    pub const SERVICE: &str = r#"kind: Service
metadata:
  name: {{resource "kind.Deployment & metadata.name"}}-svc
spec:
  clusterIP: 10.0.0.42
"#;

    pub const DEPLOYMENT_PATCH: &str = r#"spec:
  template:
    metadata:
      annotations:
        service-ip: "{{resource "kind.Service & spec.clusterIP"}}"
"#;
}

/// Input manifests.
#[allow(dead_code)]
pub mod manifests {
    pub const DEPLOYMENT: &str = r#"kind: Deployment
metadata:
  name: web
spec:
  replicas: 2
"#;

    pub const CONFIG_MAP: &str = r#"kind: ConfigMap
metadata:
  name: settings
data:
  mode: fast
"#;
}

/// A temporary directory holding a rule file, values and templates.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `rules.yaml`.
    pub fn with_rules(self, content: &str) -> Self {
        self.with_file("rules.yaml", content)
    }

    /// Write `values.yaml` beside the rules.
    pub fn with_values(self, content: &str) -> Self {
        self.with_file("values.yaml", content)
    }

    /// The rule set, values and templates of the Deployment/Service scenario.
    pub fn with_service_scenario(self) -> Self {
        self.with_rules(rules::SERVICE_FOR_DEPLOYMENT)
            .with_values("team: payments\n")
            .with_file("service.yaml", templates::SERVICE)
            .with_file("deployment-patch.yaml", templates::DEPLOYMENT_PATCH)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the rule file.
    pub fn rules_path(&self) -> PathBuf {
        self.temp_dir.path().join("rules.yaml")
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
