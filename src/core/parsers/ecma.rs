//! swc parsing helpers for JSON, JavaScript and TypeScript content.

use std::{path::Path, sync::Arc};

use anyhow::{Result, anyhow};
use swc_common::{FileName, GLOBALS, Globals, SourceFile, SourceMap, Span, Spanned};
use swc_ecma_ast::{Expr, Lit, Module, ObjectLit, Prop, PropName, PropOrSpread};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use super::{RawEntry, join_key};

const BOM: char = '\u{feff}';

pub struct ParsedModule {
    pub module: Module,
    pub source_file: Arc<SourceFile>,
    /// Bytes stripped from the start of the content before parsing.
    pub base: usize,
}

impl ParsedModule {
    /// Byte range of `span` in the original content.
    pub fn range(&self, span: Span) -> (usize, usize) {
        token_range(&self.source_file, span, self.base)
    }
}

/// Pick the parser syntax from the file extension.
pub fn syntax_for(path: &Path) -> Syntax {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ts" | "mts" | "cts") => Syntax::Typescript(TsSyntax::default()),
        Some("tsx") => Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
        _ => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
    }
}

fn strip_bom(code: &str) -> (&str, usize) {
    match code.strip_prefix(BOM) {
        Some(rest) => (rest, BOM.len_utf8()),
        None => (code, 0),
    }
}

/// Parse a JavaScript/TypeScript module.
///
/// Each call uses its own `SourceMap` and swc globals, so it is safe to call from
/// parallel iterators.
pub fn parse_module_source(code: &str, path: &Path) -> Result<ParsedModule> {
    let (code, base) = strip_bom(code);
    let source_map: Arc<SourceMap> = Default::default();

    GLOBALS.set(&Globals::new(), || {
        let source_file = source_map.new_source_file(
            FileName::Real(path.to_path_buf()).into(),
            code.to_string(),
        );

        let mut parser = Parser::new(syntax_for(path), StringInput::from(&*source_file), None);
        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse {}: {:?}", path.display(), e))?;

        Ok(ParsedModule {
            module,
            source_file,
            base,
        })
    })
}

pub struct ParsedExpression {
    pub expr: Box<Expr>,
    pub source_file: Arc<SourceFile>,
    pub base: usize,
}

/// Parse content consisting of a single expression (a JSON document).
pub fn parse_expression_source(code: &str, path: &Path) -> Result<ParsedExpression> {
    let (code, base) = strip_bom(code);
    let source_map: Arc<SourceMap> = Default::default();

    GLOBALS.set(&Globals::new(), || {
        let source_file = source_map.new_source_file(
            FileName::Real(path.to_path_buf()).into(),
            code.to_string(),
        );

        let mut parser = Parser::new(
            Syntax::Es(EsSyntax::default()),
            StringInput::from(&*source_file),
            None,
        );
        let expr = parser
            .parse_expr()
            .map_err(|e| anyhow!("Failed to parse {}: {:?}", path.display(), e))?;

        Ok(ParsedExpression {
            expr,
            source_file,
            base,
        })
    })
}

/// Byte offset and length of `span` within the content of `source_file`.
pub fn token_range(source_file: &SourceFile, span: Span, base: usize) -> (usize, usize) {
    let offset = span.lo.0.saturating_sub(source_file.start_pos.0) as usize;
    let length = span.hi.0.saturating_sub(span.lo.0) as usize;
    (offset + base, length)
}

/// Unwrap parentheses and TypeScript type assertions.
/// Handles: `(expr)`, `expr as T`, `expr as const`, `expr satisfies T`
pub fn unwrap_ts_expr(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_ts_expr(&paren.expr),
        Expr::TsAs(ts_as) => unwrap_ts_expr(&ts_as.expr),
        Expr::TsConstAssertion(ts_const) => unwrap_ts_expr(&ts_const.expr),
        Expr::TsSatisfies(ts_sat) => unwrap_ts_expr(&ts_sat.expr),
        _ => expr,
    }
}

/// Static string value of a string literal or an expression-free template.
pub fn string_value(expr: &Expr) -> Option<String> {
    match unwrap_ts_expr(expr) {
        Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|s| s.to_string()),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl
            .quasis
            .first()
            .and_then(|quasi| quasi.cooked.as_ref())
            .and_then(|cooked| cooked.as_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}

/// Extract a static property name.
pub fn extract_prop_name(name: &PropName) -> Option<String> {
    match name {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => s.value.as_str().map(|s| s.to_string()),
        PropName::Num(n) => Some(
            n.raw
                .as_ref()
                .map_or_else(|| n.value.to_string(), |raw| raw.to_string()),
        ),
        _ => None,
    }
}

/// Flatten an object literal into string leaves.
///
/// Offsets point at each leaf's property name token.
pub fn flatten_object(
    object: &ObjectLit,
    parent: &str,
    source_file: &SourceFile,
    base: usize,
    out: &mut Vec<RawEntry>,
) {
    for prop in &object.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        let Prop::KeyValue(kv) = &**prop else {
            continue;
        };
        let Some(segment) = extract_prop_name(&kv.key) else {
            continue;
        };
        let key = join_key(parent, &segment);

        match unwrap_ts_expr(&kv.value) {
            Expr::Object(nested) => flatten_object(nested, &key, source_file, base, out),
            value => {
                if let Some(text) = string_value(value) {
                    let (offset, length) = token_range(source_file, kv.key.span(), base);
                    out.push(RawEntry {
                        key,
                        segment,
                        value: text,
                        offset,
                        length,
                    });
                }
            }
        }
    }
}
