//! Rendering of criteria into SQL text.
//!
//! Connective normalization is structural: the writer knows which node is
//! first in its scope and never emits that node's connective. Free-text
//! nodes (template, raw) that open a scope have leading whitespace and one
//! leading `AND`/`OR` token removed instead, since their connective lives
//! inside the text. A template whose slot carries a keyword never repeats
//! a connective spelled in its text.

use crate::{
    config::PlaceholderStyle,
    criteria::node::{Criterion, Slot, Target, TemplatePiece},
};

///
/// RenderContext
/// Per-pass rendering inputs shared by every node in the tree.
///

#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    qualifier: &'a str,
    placeholder: PlaceholderStyle,
}

impl<'a> RenderContext<'a> {
    /// `qualifier` is the `alias.` prefix (or empty).
    #[must_use]
    pub const fn new(qualifier: &'a str, placeholder: PlaceholderStyle) -> Self {
        Self {
            qualifier,
            placeholder,
        }
    }

    #[must_use]
    pub const fn placeholder(&self) -> PlaceholderStyle {
        self.placeholder
    }
}

impl Default for RenderContext<'_> {
    fn default() -> Self {
        Self::new("", PlaceholderStyle::default())
    }
}

/// Render `nodes` as one scope: single-space joined, first connective dropped.
pub(crate) fn render_scope(nodes: &[Criterion], ctx: &RenderContext<'_>) -> String {
    let mut out = String::new();
    write_scope(nodes, ctx, &mut out);
    out
}

/// Split one leading `AND`/`OR` token off `text`. Leading whitespace is
/// ignored; the token must end at whitespace or at the end of the text.
/// Returns the connective and the remainder with its leading whitespace
/// removed.
pub(crate) fn split_leading_connective(text: &str) -> Option<(Slot, &str)> {
    let text = text.trim_start();
    for (token, slot) in [("AND", Slot::And), ("OR", Slot::Or)] {
        let Some(head) = text.get(..token.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(token) {
            continue;
        }

        let rest = &text[token.len()..];
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Some((slot, rest.trim_start()));
        }
    }

    None
}

/// `text` without leading whitespace and without one leading connective.
pub(crate) fn strip_leading_connective(text: &str) -> &str {
    split_leading_connective(text).map_or_else(|| text.trim_start(), |(_, rest)| rest)
}

fn write_scope(nodes: &[Criterion], ctx: &RenderContext<'_>, out: &mut String) {
    for (i, node) in nodes.iter().enumerate() {
        let first = i == 0;
        if !first {
            out.push(' ');
        }
        write_node(node, first, ctx, out);
    }
}

fn write_node(node: &Criterion, first: bool, ctx: &RenderContext<'_>, out: &mut String) {
    match node {
        Criterion::Comparison {
            op,
            target,
            slot,
            param,
            ..
        } => {
            write_connective(*slot, first, out);
            write_target(target, ctx, out);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            ctx.placeholder.write(&param.key, out);
        }

        Criterion::Range {
            op,
            target,
            slot,
            params,
            ..
        } => {
            write_connective(*slot, first, out);
            if params.is_empty() {
                out.push_str(op.empty_condition());
                return;
            }

            write_target(target, ctx, out);
            out.push(' ');
            out.push_str(op.symbol());
            out.push_str(" (");
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                ctx.placeholder.write(&param.key, out);
            }
            out.push(')');
        }

        Criterion::Between {
            op,
            target,
            slot,
            begin,
            end,
            ..
        } => {
            write_connective(*slot, first, out);
            write_target(target, ctx, out);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            ctx.placeholder.write(&begin.key, out);
            out.push_str(" AND ");
            ctx.placeholder.write(&end.key, out);
        }

        Criterion::FuzzyMatch {
            op,
            target,
            slot,
            escape,
            param,
            ..
        } => {
            write_connective(*slot, first, out);
            write_target(target, ctx, out);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            ctx.placeholder.write(&param.key, out);
            if let Some(c) = escape {
                out.push_str(" ESCAPE '");
                if *c == '\'' {
                    out.push_str("''");
                } else {
                    out.push(*c);
                }
                out.push('\'');
            }
        }

        Criterion::Nullability {
            op, target, slot, ..
        } => {
            write_connective(*slot, first, out);
            write_target(target, ctx, out);
            out.push(' ');
            out.push_str(op.symbol());
        }

        Criterion::Nested {
            slot,
            negate,
            children,
            ..
        } => {
            write_connective(*slot, first, out);
            if *negate {
                out.push_str("NOT ");
            }
            out.push('(');
            write_scope(children, ctx, out);
            out.push(')');
        }

        Criterion::Template { slot, pieces, .. } => {
            write_connective(*slot, first, out);

            let mut text = String::new();
            for piece in pieces {
                match piece {
                    TemplatePiece::Text(literal) => text.push_str(literal),
                    TemplatePiece::Param(key) => ctx.placeholder.write(key, &mut text),
                }
            }
            // a keyword slot already supplied the connective
            if first || slot.keyword().is_some() {
                out.push_str(strip_leading_connective(&text));
            } else {
                out.push_str(text.trim_start());
            }
        }

        Criterion::RawSql { text } => {
            if first {
                out.push_str(strip_leading_connective(text));
            } else {
                out.push_str(text.trim_start());
            }
        }
    }
}

fn write_connective(slot: Slot, first: bool, out: &mut String) {
    if first {
        return;
    }
    if let Some(keyword) = slot.keyword() {
        out.push_str(keyword);
        out.push(' ');
    }
}

// already-qualified raw names are left alone
fn write_target(target: &Target, ctx: &RenderContext<'_>, out: &mut String) {
    let column = target.column();
    if !column.contains('.') {
        out.push_str(ctx.qualifier);
    }
    out.push_str(column);
}
