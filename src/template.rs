//! Template loading and rendering
//!
//! Rules refer to patch and new-resource templates by name. A
//! [`TemplateSource`] turns a name into template text and a
//! [`TemplateRenderer`] turns text plus bindings into document text.
//!
//! ## Bindings
//!
//! Every render sees the user's values under `var`. When the engine passes
//! the graph, templates may also call `resource`:
//!
//! ```text
//! clusterIP: {{resource "kind.Service.metadata.name.api & spec.clusterIP"}}
//! ports:
//! {{indent 2 (toYaml (resource "kind.Service & spec.ports"))}}
//! ```
//!
//! The graph is borrowed for the duration of one render, so a template sees
//! every document appended before it started rendering.

use base64::Engine as _;
use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperDef, HelperResult, JsonValue as Json,
    Output, RenderContext, RenderError, RenderErrorReason, ScopedJson,
};
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::selector;
use crate::value::stringify;

/// Resolves template references to template text.
pub trait TemplateSource {
    fn load(&self, reference: &str) -> Result<String>;
}

/// Templates stored as files relative to a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl TemplateSource for DirectorySource {
    fn load(&self, reference: &str) -> Result<String> {
        let path = self.root.join(reference);
        std::fs::read_to_string(&path).map_err(|err| Error::TemplateNotFound {
            reference: path.display().to_string(),
            message: err.to_string(),
        })
    }
}

/// Templates held in memory, keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template.
    pub fn add(&mut self, reference: &str, text: &str) {
        self.templates
            .insert(reference.to_string(), text.to_string());
    }

    /// Builder form of [`MemorySource::add`].
    pub fn with(mut self, reference: &str, text: &str) -> Self {
        self.add(reference, text);
        self
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, reference: &str) -> Result<String> {
        self.templates
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::TemplateNotFound {
                reference: reference.to_string(),
                message: "not present in template store".to_string(),
            })
    }
}

/// Renders template text with bindings.
pub trait TemplateRenderer {
    /// Render `template`. `name` is used in error messages. When `graph` is
    /// given, the template can cross-reference its documents.
    fn render(
        &self,
        name: &str,
        template: &str,
        vars: &Mapping,
        graph: Option<&Graph>,
    ) -> Result<String>;

    /// Check that `template` is syntactically valid without rendering it.
    fn check(&self, name: &str, template: &str) -> Result<()>;
}

/// `resource` helper bound to one graph for the duration of a render.
///
/// Used inline, the resolved value is written in its canonical text form, so
/// mappings and sequences come out as YAML flow collections. Used as a
/// subexpression, it yields structured data for helpers such as `toYaml`.
///
/// Selector syntax errors are stashed in `failure` so the caller can report
/// them as [`Error::SelectorSyntax`] rather than as a generic render error.
struct ResourceHelper<'g> {
    graph: &'g Graph,
    failure: Arc<Mutex<Option<Error>>>,
}

impl ResourceHelper<'_> {
    fn lookup(&self, h: &Helper<'_>) -> std::result::Result<Value, RenderError> {
        let query = h
            .param(0)
            .and_then(|v| v.value().as_str())
            .ok_or_else(|| {
                RenderErrorReason::Other("resource expects a selector string".to_string())
            })?;

        match selector::resolve(self.graph, query) {
            Ok(resolution) => Ok(resolution.into_value()),
            Err(err) => {
                let message = err.to_string();
                if let Ok(mut slot) = self.failure.lock() {
                    slot.get_or_insert(err);
                }
                Err(RenderErrorReason::Other(message).into())
            }
        }
    }
}

impl HelperDef for ResourceHelper<'_> {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let value = self.lookup(h)?;
        out.write(&stringify(&value))?;
        Ok(())
    }

    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> std::result::Result<ScopedJson<'rc>, RenderError> {
        let value = self.lookup(h)?;
        Ok(ScopedJson::Derived(to_json_value(&value)))
    }
}

/// Convert a YAML value into the renderer's data model.
///
/// Mapping keys become their canonical text, so `80` and `null` keys survive
/// as `"80"` and `"null"`. Tags are dropped.
fn to_json_value(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Json::from(i)
            } else if let Some(u) = n.as_u64() {
                Json::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Json::Number)
                    .unwrap_or_else(|| Json::String(n.to_string()))
            }
        }
        Value::String(s) => Json::String(s.clone()),
        Value::Sequence(seq) => Json::Array(seq.iter().map(to_json_value).collect()),
        Value::Mapping(map) => Json::Object(mapping_to_json(map)),
        Value::Tagged(tagged) => to_json_value(&tagged.value),
    }
}

fn mapping_to_json(map: &Mapping) -> serde_json::Map<String, Json> {
    map.iter()
        .map(|(k, v)| (stringify(k), to_json_value(v)))
        .collect()
}

/// `toYaml`: block YAML text of its argument, without the trailing newline.
struct ToYamlHelper;

impl HelperDef for ToYamlHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> std::result::Result<ScopedJson<'rc>, RenderError> {
        let value = h
            .param(0)
            .map(|v| v.value())
            .ok_or_else(|| RenderErrorReason::ParamNotFoundForIndex("toYaml", 0))?;
        let text = serde_yaml::to_string(value)
            .map_err(|err| RenderErrorReason::Other(format!("toYaml: {}", err)))?;
        Ok(ScopedJson::Derived(Json::String(text.trim_end().to_string())))
    }
}

/// Whether sprig's `default` would treat `value` as unset.
fn is_empty(value: &Json) -> bool {
    match value {
        Json::Null => true,
        Json::Bool(b) => !b,
        Json::Number(n) => n.as_f64() == Some(0.0),
        Json::String(s) => s.is_empty(),
        Json::Array(items) => items.is_empty(),
        Json::Object(map) => map.is_empty(),
    }
}

fn indent_lines(width: u64, text: &str) -> String {
    let pad = " ".repeat(width as usize);
    text.lines()
        .map(|line| if line.is_empty() { String::new() } else { format!("{}{}", pad, line) })
        .collect::<Vec<_>>()
        .join("\n")
}

handlebars_helper!(to_json: |value: Json| value.to_string());

handlebars_helper!(quote: |value: Json| {
    let text = match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    };
    Json::String(text).to_string()
});

handlebars_helper!(indent: |width: u64, text: str| indent_lines(width, text));

handlebars_helper!(nindent: |width: u64, text: str| format!("\n{}", indent_lines(width, text)));

handlebars_helper!(default_or: |fallback: Json, value: Json| {
    if is_empty(value) { fallback.clone() } else { value.clone() }
});

handlebars_helper!(upper: |text: str| text.to_uppercase());

handlebars_helper!(lower: |text: str| text.to_lowercase());

handlebars_helper!(b64enc: |text: str| base64::engine::general_purpose::STANDARD.encode(text));

/// [`TemplateRenderer`] backed by `handlebars`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlebarsRenderer {
    strict: bool,
}

impl HandlebarsRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on references to missing variables instead of rendering nothing.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn registry<'g>(&self) -> Handlebars<'g> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(self.strict);
        registry.register_helper("toYaml", Box::new(ToYamlHelper));
        registry.register_helper("toJson", Box::new(to_json));
        registry.register_helper("quote", Box::new(quote));
        registry.register_helper("indent", Box::new(indent));
        registry.register_helper("nindent", Box::new(nindent));
        registry.register_helper("default", Box::new(default_or));
        registry.register_helper("upper", Box::new(upper));
        registry.register_helper("lower", Box::new(lower));
        registry.register_helper("b64enc", Box::new(b64enc));
        registry
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(
        &self,
        name: &str,
        template: &str,
        vars: &Mapping,
        graph: Option<&Graph>,
    ) -> Result<String> {
        let mut registry = self.registry();
        let failure = Arc::new(Mutex::new(None));
        if let Some(graph) = graph {
            registry.register_helper(
                "resource",
                Box::new(ResourceHelper {
                    graph,
                    failure: Arc::clone(&failure),
                }),
            );
        }

        let mut data = serde_json::Map::new();
        data.insert("var".to_string(), Json::Object(mapping_to_json(vars)));

        let rendered = registry.render_template(template, &Json::Object(data));

        if let Some(err) = failure.lock().ok().and_then(|mut slot| slot.take()) {
            return Err(err);
        }

        rendered.map_err(|err| Error::Template {
            message: err.to_string(),
            template: Some(name.to_string()),
        })
    }

    fn check(&self, name: &str, template: &str) -> Result<()> {
        handlebars::Template::compile(template)
            .map(|_| ())
            .map_err(|err| Error::Template {
                message: err.to_string(),
                template: Some(name.to_string()),
            })
    }
}
