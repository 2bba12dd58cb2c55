//! Template compilation: token detection and payload binding.
//!
//! Tokens are `{}` / `{name}` with `name` in `[A-Za-z0-9_]*`. Mismatches are
//! tolerated both ways: tokens with no payload entry stay in the text
//! verbatim, payload entries no token references are dropped.

use crate::{
    criteria::node::{BoundParam, TemplateShape},
    value::Value,
};
use regex::Regex;
use std::sync::LazyLock;

// constant pattern: compilation cannot fail
#[allow(clippy::expect_used)]
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]*)\}").expect("template token pattern is valid"));

///
/// TemplatePiece
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TemplatePiece {
    Text(String),
    Param(String),
}

///
/// TemplatePayload
///
/// Candidate values for a template. Only one shape is bound; by default the
/// first non-empty of single, list, map.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TemplatePayload {
    pub single: Option<Value>,
    pub list: Vec<Value>,
    pub map: Vec<(String, Value)>,
}

impl TemplatePayload {
    #[must_use]
    pub fn detect_shape(&self) -> Option<TemplateShape> {
        if self.single.is_some() {
            Some(TemplateShape::Single)
        } else if !self.list.is_empty() {
            Some(TemplateShape::List)
        } else if !self.map.is_empty() {
            Some(TemplateShape::Map)
        } else {
            None
        }
    }

    fn entries(&self, shape: Option<TemplateShape>) -> Vec<&Value> {
        match shape {
            Some(TemplateShape::Single) => self.single.iter().collect(),
            Some(TemplateShape::List) => self.list.iter().collect(),
            Some(TemplateShape::Map) => self.map.iter().map(|(_, v)| v).collect(),
            None => Vec::new(),
        }
    }

    // index into `entries(shape)` for one token
    fn lookup(&self, shape: Option<TemplateShape>, name: &str, next: &mut usize) -> Option<usize> {
        match shape {
            Some(TemplateShape::Single) => self.single.as_ref().map(|_| 0),
            Some(TemplateShape::List) => {
                let index = if name.is_empty() {
                    let index = *next;
                    *next += 1;
                    index
                } else {
                    name.parse::<usize>().ok()?
                };
                (index < self.list.len()).then_some(index)
            }
            Some(TemplateShape::Map) => self.map.iter().position(|(k, _)| k == name),
            None => None,
        }
    }
}

///
/// CompiledTemplate
///

#[derive(Debug, Default)]
pub(crate) struct CompiledTemplate {
    pub(crate) pieces: Vec<TemplatePiece>,
    pub(crate) params: Vec<BoundParam>,
    pub(crate) unresolved: Vec<String>,
    pub(crate) unused: usize,
}

/// Split `pattern` into text and parameter pieces, allocating each
/// referenced payload entry exactly once (first reference wins the key).
pub(crate) fn compile_template(
    pattern: &str,
    shape: Option<TemplateShape>,
    payload: &TemplatePayload,
    allocate: &mut dyn FnMut(Value) -> BoundParam,
) -> CompiledTemplate {
    let entries = payload.entries(shape);
    let mut keys: Vec<Option<String>> = vec![None; entries.len()];
    let mut out = CompiledTemplate::default();
    let mut next = 0;
    let mut last = 0;

    for caps in TOKEN.captures_iter(pattern) {
        let Some(token) = caps.get(0) else {
            continue;
        };
        let name = caps.get(1).map_or("", |m| m.as_str());

        if token.start() > last {
            out.pieces
                .push(TemplatePiece::Text(pattern[last..token.start()].to_string()));
        }
        last = token.end();

        match payload.lookup(shape, name, &mut next) {
            Some(index) => {
                let key = match &keys[index] {
                    Some(key) => key.clone(),
                    None => {
                        let param = allocate(entries[index].clone());
                        let key = param.key.clone();
                        out.params.push(param);
                        keys[index] = Some(key.clone());
                        key
                    }
                };
                out.pieces.push(TemplatePiece::Param(key));
            }
            None => {
                out.unresolved.push(token.as_str().to_string());
                out.pieces
                    .push(TemplatePiece::Text(token.as_str().to_string()));
            }
        }
    }

    if last < pattern.len() {
        out.pieces
            .push(TemplatePiece::Text(pattern[last..].to_string()));
    }
    out.unused = keys.iter().filter(|key| key.is_none()).count();

    out
}
