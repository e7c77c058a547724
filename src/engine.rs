//! The rule engine
//!
//! [`RuleEngine::build`] turns a document stream into a [`Graph`] in two
//! phases:
//!
//! 1. **Parse**: split the stream, decode every document and validate its
//!    `kind`.
//! 2. **Apply**: walk the graph by index, re-reading its length every step.
//!    Each document is tested against every rule in order; for a matching
//!    rule the engine merges `inject`, renders and appends `newResources`,
//!    then renders and merges `patches`.
//!
//! Documents appended in phase 2 are themselves visited later in the same
//! loop, so rules cascade over generated resources. Every render borrows the
//! graph as it is at that moment: a template can reference anything appended
//! before it started rendering, including resources created by the same rule
//! a moment earlier, and nothing appended after.

use log::{debug, info};
use serde_yaml::Mapping;

use crate::codec::{self, Codec};
use crate::config::{Rule, RuleSet};
use crate::error::{Error, Result};
use crate::graph::{Document, Graph};
use crate::matcher::matches;
use crate::merge::merge;
use crate::template::{TemplateRenderer, TemplateSource};

/// Default cap on the number of documents a run may hold.
pub const DEFAULT_DOCUMENT_LIMIT: usize = 10_000;

/// Applies a rule set to document streams.
pub struct RuleEngine<'a> {
    rules: &'a RuleSet,
    vars: &'a Mapping,
    templates: &'a dyn TemplateSource,
    renderer: &'a dyn TemplateRenderer,
    codec: &'a dyn Codec,
    document_limit: usize,
}

impl<'a> RuleEngine<'a> {
    pub fn new(
        rules: &'a RuleSet,
        vars: &'a Mapping,
        templates: &'a dyn TemplateSource,
        renderer: &'a dyn TemplateRenderer,
        codec: &'a dyn Codec,
    ) -> Self {
        Self {
            rules,
            vars,
            templates,
            renderer,
            codec,
            document_limit: DEFAULT_DOCUMENT_LIMIT,
        }
    }

    /// Cap the graph size; exceeding it aborts with [`Error::DocumentLimit`].
    pub fn with_document_limit(mut self, limit: usize) -> Self {
        self.document_limit = limit;
        self
    }

    /// Parse `raw` and apply every rule to the result.
    pub fn build(&self, raw: &str) -> Result<Graph> {
        let mut graph = self.parse(raw)?;
        self.apply(&mut graph)?;
        Ok(graph)
    }

    /// Phase 1: decode the input stream into a graph.
    pub fn parse(&self, raw: &str) -> Result<Graph> {
        let graph: Graph = codec::parse_documents(self.codec, raw)?
            .into_iter()
            .collect();
        self.check_limit(&graph)?;
        info!("Parsed {} input document(s)", graph.len());
        Ok(graph)
    }

    /// Phase 2: apply the rule set to every document, including the ones
    /// appended while applying it.
    pub fn apply(&self, graph: &mut Graph) -> Result<()> {
        let mut index = 0;
        while index < graph.len() {
            for (rule_index, rule) in self.rules.iter().enumerate() {
                if !matches(graph[index].body(), &rule.pattern) {
                    continue;
                }
                debug!(
                    "Rule {} matched document {} ({})",
                    rule_index,
                    index,
                    graph[index].kind()
                );
                self.apply_rule(graph, index, rule)?;
            }
            index += 1;
        }
        info!("Graph holds {} document(s) after applying rules", graph.len());
        Ok(())
    }

    fn apply_rule(&self, graph: &mut Graph, index: usize, rule: &Rule) -> Result<()> {
        if let Some(inject) = &rule.inject {
            merge(body_mut(graph, index)?, inject);
        }

        for reference in &rule.new_resources {
            let rendered = self.render(reference, graph)?;
            for fragment in codec::split_documents(&rendered) {
                let value = self.codec.parse(fragment)?;
                graph.push(Document::from_value(value, fragment)?);
                self.check_limit(graph)?;
            }
            debug!(
                "Rendered new resources from '{}'; graph now holds {} document(s)",
                reference,
                graph.len()
            );
        }

        if let Some(reference) = &rule.patch {
            let rendered = self.render(reference, graph)?;
            let patch = codec::parse_mapping(self.codec, &rendered)?;
            merge(body_mut(graph, index)?, &patch);
        }

        Ok(())
    }

    /// Render template `reference` against the graph as it is right now.
    fn render(&self, reference: &str, graph: &Graph) -> Result<String> {
        let template = self.templates.load(reference)?;
        self.renderer
            .render(reference, &template, self.vars, Some(graph))
    }

    fn check_limit(&self, graph: &Graph) -> Result<()> {
        if graph.len() > self.document_limit {
            return Err(Error::DocumentLimit {
                limit: self.document_limit,
            });
        }
        Ok(())
    }
}

fn body_mut(graph: &mut Graph, index: usize) -> Result<&mut Mapping> {
    let len = graph.len();
    graph
        .get_mut(index)
        .map(Document::body_mut)
        .ok_or_else(|| Error::Input {
            message: format!("document index {} out of range for graph of {}", index, len),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::YamlCodec;
    use crate::config;
    use crate::template::{HandlebarsRenderer, MemorySource};
    use serde_yaml::Value;

    fn run(rules: &str, templates: &MemorySource, input: &str) -> Result<Graph> {
        let rules = config::parse(rules).unwrap();
        let vars = Mapping::new();
        let renderer = HandlebarsRenderer::new();
        RuleEngine::new(&rules, &vars, templates, &renderer, &YamlCodec).build(input)
    }

    fn at<'g>(graph: &'g Graph, index: usize, path: &str) -> &'g Value {
        let mut current = graph[index].body().get(path.split('.').next().unwrap()).unwrap();
        for segment in path.split('.').skip(1) {
            current = current.get(segment).unwrap();
        }
        current
    }

    #[test]
    fn test_no_rules_passes_documents_through() {
        let graph = run("rules: []", &MemorySource::new(), "kind: A\n---\nkind: B").unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph[0].kind(), "A");
        assert_eq!(graph[1].kind(), "B");
    }

    #[test]
    fn test_inject_merges_into_matching_documents_only() {
        let rules = r#"
rules:
  - match: {kind: Deployment}
    inject:
      metadata:
        labels:
          managed: "true"
"#;
        let input = "kind: Deployment\nmetadata:\n  name: app\n---\nkind: Service\nmetadata:\n  name: app-svc";
        let graph = run(rules, &MemorySource::new(), input).unwrap();
        assert_eq!(at(&graph, 0, "metadata.labels.managed"), &Value::from("true"));
        assert_eq!(at(&graph, 0, "metadata.name"), &Value::from("app"));
        assert!(graph[1].body()["metadata"].get("labels").is_none());
    }

    #[test]
    fn test_inject_cascades_to_later_rules() {
        let rules = r#"
rules:
  - match: {kind: A}
    inject: {stage: one}
  - match: {stage: one}
    inject: {stage: two, seen: true}
"#;
        let graph = run(rules, &MemorySource::new(), "kind: A").unwrap();
        assert_eq!(at(&graph, 0, "stage"), &Value::from("two"));
        assert_eq!(at(&graph, 0, "seen"), &Value::Bool(true));
    }

    #[test]
    fn test_inject_does_not_cascade_to_earlier_rules() {
        let rules = r#"
rules:
  - match: {stage: one}
    inject: {late: true}
  - match: {kind: A}
    inject: {stage: one}
"#;
        let graph = run(rules, &MemorySource::new(), "kind: A").unwrap();
        assert!(graph[0].body().get("late").is_none());
    }

    #[test]
    fn test_new_resources_are_appended_in_order() {
        let rules = r#"
rules:
  - match: {kind: Deployment}
    newResources: [svc.yaml, extra.yaml]
"#;
        let templates = MemorySource::new()
            .with("svc.yaml", "kind: Service\nmetadata:\n  name: svc")
            .with("extra.yaml", "kind: ConfigMap\n---\nkind: Secret");
        let graph = run(rules, &templates, "kind: Deployment\n---\nkind: Other").unwrap();
        let kinds: Vec<&str> = graph.iter().map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec!["Deployment", "Other", "Service", "ConfigMap", "Secret"]
        );
    }

    #[test]
    fn test_new_resources_are_processed_by_rules() {
        let rules = r#"
rules:
  - match: {kind: Deployment}
    newResources: [svc.yaml]
  - match: {kind: Service}
    inject: {touched: true}
"#;
        let templates = MemorySource::new().with("svc.yaml", "kind: Service");
        let graph = run(rules, &templates, "kind: Deployment").unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(at(&graph, 1, "touched"), &Value::Bool(true));
    }

    #[test]
    fn test_patch_sees_resources_created_by_same_rule() {
        let rules = r#"
rules:
  - match: {kind: Deployment}
    newResources: [svc.yaml]
    patches: patch.yaml
"#;
        let templates = MemorySource::new()
            .with("svc.yaml", "kind: Service\nspec:\n  clusterIP: 10.1.2.3")
            .with(
                "patch.yaml",
                "spec:\n  serviceIP: {{resource \"kind.Service & spec.clusterIP\"}}",
            );
        let graph = run(rules, &templates, "kind: Deployment").unwrap();
        assert_eq!(at(&graph, 0, "spec.serviceIP"), &Value::from("10.1.2.3"));
    }

    #[test]
    fn test_new_resource_cannot_see_itself_before_append() {
        let rules = r#"
rules:
  - match: {kind: Deployment}
    newResources: [svc.yaml]
"#;
        let templates = MemorySource::new().with(
            "svc.yaml",
            "kind: Service\nspec:\n  peer: \"{{resource \"kind.Service & kind\"}}\"",
        );
        let graph = run(rules, &templates, "kind: Deployment").unwrap();
        assert_eq!(at(&graph, 1, "spec.peer"), &Value::from("<no match>"));
    }

    #[test]
    fn test_later_documents_see_earlier_generated_resources() {
        let rules = r#"
rules:
  - match: {kind: Deployment}
    newResources: [svc.yaml]
  - match: {kind: Job}
    patches: job-patch.yaml
"#;
        let templates = MemorySource::new()
            .with("svc.yaml", "kind: Service\nmetadata:\n  name: generated")
            .with(
                "job-patch.yaml",
                "target: {{resource \"kind.Service & metadata.name\"}}",
            );
        let graph = run(rules, &templates, "kind: Deployment\n---\nkind: Job").unwrap();
        assert_eq!(at(&graph, 1, "target"), &Value::from("generated"));
    }

    #[test]
    fn test_earlier_documents_do_not_see_later_generated_resources() {
        let rules = r#"
rules:
  - match: {kind: Job}
    patches: job-patch.yaml
  - match: {kind: Deployment}
    newResources: [svc.yaml]
"#;
        let templates = MemorySource::new()
            .with("svc.yaml", "kind: Service\nmetadata:\n  name: generated")
            .with(
                "job-patch.yaml",
                "target: \"{{resource \"kind.Service & metadata.name\"}}\"",
            );
        let graph = run(rules, &templates, "kind: Job\n---\nkind: Deployment").unwrap();
        assert_eq!(at(&graph, 0, "target"), &Value::from("<no match>"));
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_patch_concatenates_lists() {
        let rules = r#"
rules:
  - match: {kind: Deployment}
    patches: patch.yaml
"#;
        let templates = MemorySource::new().with("patch.yaml", "args: [--verbose]");
        let graph = run(rules, &templates, "kind: Deployment\nargs: [--port=80]").unwrap();
        let expected: Value = serde_yaml::from_str("[--port=80, --verbose]").unwrap();
        assert_eq!(at(&graph, 0, "args"), &expected);
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let rules = "rules:\n  - match: {kind: A}\n    patches: empty.yaml";
        let templates = MemorySource::new().with("empty.yaml", "{{#if var.off}}x: 1{{/if}}");
        let graph = run(rules, &templates, "kind: A\ny: 2").unwrap();
        assert_eq!(graph[0].body().len(), 2);
    }

    #[test]
    fn test_new_resource_missing_kind_is_fatal() {
        let rules = "rules:\n  - match: {kind: A}\n    newResources: [bad.yaml]";
        let templates = MemorySource::new().with("bad.yaml", "metadata:\n  name: nokind");
        let err = run(rules, &templates, "kind: A").unwrap_err();
        assert!(matches!(err, Error::MissingKind { .. }));
    }

    #[test]
    fn test_input_missing_kind_is_fatal() {
        let err = run("rules: []", &MemorySource::new(), "kind: A\n---\nname: x").unwrap_err();
        assert!(matches!(err, Error::MissingKind { .. }));
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let rules = "rules:\n  - match: {kind: A}\n    patches: nowhere.yaml";
        let err = run(rules, &MemorySource::new(), "kind: A").unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { .. }));
    }

    #[test]
    fn test_selector_syntax_error_is_fatal() {
        let rules = "rules:\n  - match: {kind: A}\n    patches: p.yaml";
        let templates = MemorySource::new().with("p.yaml", "x: {{resource \"kind.A\"}}");
        let err = run(rules, &templates, "kind: A").unwrap_err();
        assert!(matches!(err, Error::SelectorSyntax { .. }));
    }

    #[test]
    fn test_self_spawning_rule_hits_document_limit() {
        let rules = "rules:\n  - newResources: [again.yaml]";
        let templates = MemorySource::new().with("again.yaml", "kind: Loop");
        let parsed = config::parse(rules).unwrap();
        let vars = Mapping::new();
        let renderer = HandlebarsRenderer::new();
        let err = RuleEngine::new(&parsed, &vars, &templates, &renderer, &YamlCodec)
            .with_document_limit(50)
            .build("kind: Seed")
            .unwrap_err();
        assert!(matches!(err, Error::DocumentLimit { limit: 50 }));
    }

    #[test]
    fn test_reapplying_inject_duplicates_lists() {
        let rules = r#"
rules:
  - match: {kind: A}
    inject: {items: [x]}
  - match: {kind: A}
    inject: {items: [x]}
"#;
        let graph = run(rules, &MemorySource::new(), "kind: A").unwrap();
        let expected: Value = serde_yaml::from_str("[x, x]").unwrap();
        assert_eq!(at(&graph, 0, "items"), &expected);
    }

    #[test]
    fn test_vars_available_in_templates() {
        let parsed = config::parse("rules:\n  - match: {kind: A}\n    patches: p.yaml").unwrap();
        let vars: Mapping = serde_yaml::from_str("env: prod").unwrap();
        let templates = MemorySource::new().with("p.yaml", "env: {{var.env}}");
        let renderer = HandlebarsRenderer::new();
        let graph = RuleEngine::new(&parsed, &vars, &templates, &renderer, &YamlCodec)
            .build("kind: A")
            .unwrap();
        assert_eq!(at(&graph, 0, "env"), &Value::from("prod"));
    }
}
