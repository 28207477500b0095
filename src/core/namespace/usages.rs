//! Call-site scanning: where source files use translation keys.
//!
//! A call counts as a translation call when its callee is bound to a namespace hook
//! result in an enclosing scope, or is one of the configured unbound translation
//! functions (`t`, `$t`, `i18n.t`). Only static first arguments are recorded.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use rayon::prelude::*;
use swc_common::Spanned;
use swc_ecma_ast::{
    ArrowExpr, CallExpr, Callee, Expr, Function, MemberProp, ObjectLit, ObjectPatProp, Pat,
    Prop, PropOrSpread, VarDecl,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::{
    binding_context::{Binding, BindingContext},
    get_full_key, split_namespaced,
};
use crate::config::Config;
use crate::core::{
    data::FileRef,
    parsers::{
        build_line_index,
        ecma::{ParsedModule, extract_prop_name, parse_module_source, string_value, unwrap_ts_expr},
        offset_to_line,
    },
    scanner::TranslationScanner,
};

/// One static key argument of a translation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyUsage {
    pub file: FileRef,
    /// Byte offset of the key literal, quotes included.
    pub offset: usize,
    pub length: usize,
    pub line: usize,
    /// The key as written at the call site.
    pub partial_key: String,
    /// Namespace bound to the translator, if any.
    pub namespace: Option<String>,
}

impl KeyUsage {
    pub fn full_key(&self) -> String {
        get_full_key(self.namespace.as_deref(), &self.partial_key)
    }

    /// True if the call site names its namespace, through a binding or `ns:key`.
    pub fn is_qualified(&self) -> bool {
        self.namespace.as_deref().is_some_and(|ns| !ns.is_empty())
            || split_namespaced(&self.partial_key).is_some()
    }

    /// Returns true if this call site may resolve to `key`.
    ///
    /// Qualified call sites match on the full key only. Unqualified ones match on the
    /// partial key itself or as the tail of a dotted key.
    pub fn refers_to(&self, key: &str) -> bool {
        if self.is_qualified() {
            return self.full_key() == key;
        }
        self.partial_key == key
            || key
                .strip_suffix(self.partial_key.as_str())
                .is_some_and(|head| head.ends_with('.'))
    }

    /// The key text to write at this call site so it resolves to `new_key` instead of
    /// `old_key`, or `None` if the call site cannot express `new_key`.
    pub fn rewritten_key(&self, old_key: &str, new_key: &str) -> Option<String> {
        if let Some((namespace, _)) = split_namespaced(&self.partial_key) {
            return strip_namespace(new_key, namespace)
                .map(|rest| format!("{}:{}", namespace, rest));
        }
        if let Some(namespace) = self.namespace.as_deref().filter(|ns| !ns.is_empty()) {
            return strip_namespace(new_key, namespace).map(str::to_string);
        }
        if self.partial_key == old_key {
            return Some(new_key.to_string());
        }
        let scope = old_key.strip_suffix(self.partial_key.as_str())?;
        new_key
            .strip_prefix(scope)
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
    }
}

fn strip_namespace<'k>(key: &'k str, namespace: &str) -> Option<&'k str> {
    key.strip_prefix(namespace.trim_end_matches('.'))
        .and_then(|rest| rest.strip_prefix('.'))
        .filter(|rest| !rest.is_empty())
}

/// Scan every source file of the project for translation calls.
///
/// Files that cannot be read or parsed contribute nothing.
pub fn collect_usages(root: &Path, config: &Config) -> Vec<KeyUsage> {
    let scanner = TranslationScanner::new(root, config);
    let files = scanner.scan_sources().files;
    tracing::debug!("scanning {} source files for translation calls", files.len());

    files
        .par_iter()
        .flat_map_iter(|path| {
            let result = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))
                .and_then(|content| {
                    collect_file_usages(&content, &FileRef::from(path.as_path()), config)
                });
            match result {
                Ok(usages) => usages,
                Err(e) => {
                    tracing::debug!("skipping {}: {:#}", path.display(), e);
                    Vec::new()
                }
            }
        })
        .collect()
}

/// Translation calls of one source file, in document order.
pub fn collect_file_usages(
    content: &str,
    file: &FileRef,
    config: &Config,
) -> Result<Vec<KeyUsage>> {
    let parsed = parse_module_source(content, file.path())?;
    let mut collector = UsageCollector {
        file,
        parsed: &parsed,
        line_index: build_line_index(content),
        hooks: &config.namespace_hooks,
        functions: &config.translation_functions,
        bindings: BindingContext::new(),
        usages: Vec::new(),
    };
    parsed.module.visit_with(&mut collector);
    Ok(collector.usages)
}

struct UsageCollector<'a> {
    file: &'a FileRef,
    parsed: &'a ParsedModule,
    line_index: Vec<usize>,
    hooks: &'a [String],
    functions: &'a [String],
    bindings: BindingContext,
    usages: Vec<KeyUsage>,
}

impl UsageCollector<'_> {
    fn is_hook(&self, name: &str) -> bool {
        self.hooks.iter().any(|h| h == name)
    }

    fn is_function(&self, name: &str) -> bool {
        self.functions.iter().any(|f| f == name)
    }

    /// The namespace hook call initializing a declaration, looking through `await`.
    fn hook_call<'e>(&self, init: &'e Expr) -> Option<&'e CallExpr> {
        let call = match unwrap_ts_expr(init) {
            Expr::Call(call) => call,
            Expr::Await(await_expr) => match unwrap_ts_expr(&await_expr.arg) {
                Expr::Call(call) => call,
                _ => return None,
            },
            _ => return None,
        };
        let Callee::Expr(callee) = &call.callee else {
            return None;
        };
        match &**callee {
            Expr::Ident(ident) if self.is_hook(ident.sym.as_str()) => Some(call),
            _ => None,
        }
    }

    fn bind_translators(&mut self, pat: &Pat, namespace: Option<String>) {
        match pat {
            Pat::Ident(binding) => {
                self.bindings.insert_binding(
                    binding.id.sym.to_string(),
                    Binding::Translator { namespace },
                );
            }
            Pat::Object(object) => {
                for prop in &object.props {
                    let (name, local) = match prop {
                        ObjectPatProp::Assign(assign) => {
                            (assign.key.sym.to_string(), assign.key.sym.to_string())
                        }
                        ObjectPatProp::KeyValue(kv) => {
                            let Some(name) = extract_prop_name(&kv.key) else {
                                continue;
                            };
                            let Pat::Ident(local) = &*kv.value else {
                                continue;
                            };
                            (name, local.id.sym.to_string())
                        }
                        ObjectPatProp::Rest(_) => continue,
                    };
                    if self.is_function(&name) {
                        self.bindings.insert_binding(
                            local,
                            Binding::Translator {
                                namespace: namespace.clone(),
                            },
                        );
                    }
                }
            }
            _ => {}
        }
    }

    /// Hide outer translators redeclared by `pat`.
    fn shadow(&mut self, pat: &Pat) {
        let mut names = Vec::new();
        binding_names(pat, &mut names);
        for name in names {
            if matches!(
                self.bindings.get_binding(&name),
                Some(Binding::Translator { .. })
            ) && !self.bindings.is_in_current_scope(&name)
            {
                self.bindings.insert_binding(name, Binding::Shadowed);
            }
        }
    }

    /// Namespace of a call's callee, or `None` if it is not a translation call.
    fn translation_namespace(&self, callee: &Callee) -> Option<Option<String>> {
        let Callee::Expr(callee) = callee else {
            return None;
        };
        match &**callee {
            Expr::Ident(ident) => {
                let name = ident.sym.as_str();
                match self.bindings.get_binding(name) {
                    Some(Binding::Translator { namespace }) => Some(namespace.clone()),
                    Some(Binding::Shadowed) => None,
                    None => self.is_function(name).then_some(None),
                }
            }
            Expr::Member(member) => match &member.prop {
                MemberProp::Ident(prop) if self.is_function(prop.sym.as_str()) => Some(None),
                _ => None,
            },
            _ => None,
        }
    }

    fn record(&mut self, call: &CallExpr, namespace: Option<String>) {
        let Some(arg) = call.args.first().filter(|arg| arg.spread.is_none()) else {
            return;
        };
        let expr = unwrap_ts_expr(&arg.expr);
        let Some(partial_key) = string_value(expr) else {
            return;
        };
        let (offset, length) = self.parsed.range(expr.span());
        self.usages.push(KeyUsage {
            file: self.file.clone(),
            offset,
            length,
            line: offset_to_line(&self.line_index, offset),
            partial_key,
            namespace,
        });
    }
}

impl Visit for UsageCollector<'_> {
    fn visit_function(&mut self, node: &Function) {
        self.bindings.enter_scope();
        for param in &node.params {
            self.shadow(&param.pat);
        }
        node.visit_children_with(self);
        self.bindings.exit_scope();
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        self.bindings.enter_scope();
        for param in &node.params {
            self.shadow(param);
        }
        node.visit_children_with(self);
        self.bindings.exit_scope();
    }

    fn visit_var_decl(&mut self, node: &VarDecl) {
        for decl in &node.decls {
            match decl.init.as_deref().and_then(|init| self.hook_call(init)) {
                Some(call) => {
                    let namespace = hook_namespace(call);
                    self.bind_translators(&decl.name, namespace);
                }
                None => self.shadow(&decl.name),
            }
            decl.visit_children_with(self);
        }
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Some(namespace) = self.translation_namespace(&node.callee) {
            self.record(node, namespace);
        }
        node.visit_children_with(self);
    }
}

/// Namespace declared by a hook call.
///
/// Handles `hook("ns")`, `hook(["ns", ...])`, `hook({ namespace: "ns" })` and a
/// `keyPrefix` option in the second argument, which qualifies the namespace further.
fn hook_namespace(call: &CallExpr) -> Option<String> {
    let mut args = call.args.iter().map(|arg| unwrap_ts_expr(&arg.expr));

    let namespace = match args.next() {
        Some(Expr::Object(options)) => object_string(options, "namespace"),
        Some(Expr::Array(array)) => array
            .elems
            .first()
            .and_then(|elem| elem.as_ref())
            .and_then(|elem| string_value(&elem.expr)),
        Some(expr) => string_value(expr),
        None => None,
    };
    let key_prefix = match args.next() {
        Some(Expr::Object(options)) => object_string(options, "keyPrefix"),
        _ => None,
    };

    match (namespace, key_prefix) {
        (Some(namespace), Some(prefix)) => Some(get_full_key(Some(&namespace), &prefix)),
        (namespace, None) => namespace,
        (None, prefix) => prefix,
    }
}

fn object_string(object: &ObjectLit, name: &str) -> Option<String> {
    object.props.iter().find_map(|prop| {
        let PropOrSpread::Prop(prop) = prop else {
            return None;
        };
        let Prop::KeyValue(kv) = &**prop else {
            return None;
        };
        if extract_prop_name(&kv.key).as_deref() == Some(name) {
            string_value(&kv.value)
        } else {
            None
        }
    })
}

fn binding_names(pat: &Pat, out: &mut Vec<String>) {
    match pat {
        Pat::Ident(binding) => out.push(binding.id.sym.to_string()),
        Pat::Assign(assign) => binding_names(&assign.left, out),
        Pat::Rest(rest) => binding_names(&rest.arg, out),
        Pat::Array(array) => {
            for elem in array.elems.iter().flatten() {
                binding_names(elem, out);
            }
        }
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue(kv) => binding_names(&kv.value, out),
                    ObjectPatProp::Assign(assign) => out.push(assign.key.sym.to_string()),
                    ObjectPatProp::Rest(rest) => binding_names(&rest.arg, out),
                }
            }
        }
        _ => {}
    }
}
