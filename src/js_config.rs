//! Loading of `tailwind.config.{js,cjs,mjs,ts}` modules.
//!
//! The module is parsed with SWC and its exported object literal is evaluated
//! statically. Only literal data is accepted: strings, numbers, booleans,
//! `null`, arrays and objects, plus `require(...)` calls and default imports in
//! the `plugins` list. Anything that would need a JavaScript runtime to
//! evaluate is rejected with the line it appears on.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use swc_core::common::{FileName, Globals, SourceMap, Spanned, GLOBALS};
use swc_core::ecma::ast::*;
use swc_core::ecma::parser::{parse_file_as_module, EsSyntax, Syntax, TsSyntax};

use crate::config::{BuildConfiguration, Plugin};
use crate::errors::{ContentError, Result};

/// Upper bound on `const a = b; const b = {...}` indirections
const MAX_ALIAS_DEPTH: usize = 16;

/// Parse a config module and evaluate its export into a [`BuildConfiguration`]
pub fn parse_config_module(source: &str, path: &Path) -> Result<BuildConfiguration> {
    let source_map = Arc::new(SourceMap::default());
    let source_file = source_map.new_source_file(
        FileName::Real(path.to_path_buf()).into(),
        source.to_string(),
    );

    let syntax = match path.extension().and_then(|s| s.to_str()) {
        Some("ts") | Some("mts") | Some("cts") => Syntax::Typescript(TsSyntax {
            no_early_errors: true,
            ..Default::default()
        }),
        _ => Syntax::Es(EsSyntax::default()),
    };

    let module = GLOBALS.set(&Globals::new(), || {
        parse_file_as_module(
            &source_file,
            syntax,
            EsVersion::latest(),
            None,
            &mut vec![],
        )
        .map_err(|e| ContentError::ParseError {
            path: path.display().to_string(),
            message: format!("Failed to parse JavaScript/TypeScript: {:?}", e),
        })
    })?;

    let evaluator = ConfigEvaluator::new(&module, path.display().to_string(), source_map);
    evaluator.evaluate()
}

/// Static evaluator over a parsed config module
struct ConfigEvaluator<'a> {
    module: &'a Module,
    path: String,
    source_map: Arc<SourceMap>,
    /// Top-level `const`/`let`/`var` initializers by name
    bindings: HashMap<String, &'a Expr>,
    /// Default imports by local name, mapped to their module specifier
    imports: HashMap<String, String>,
}

impl<'a> ConfigEvaluator<'a> {
    fn new(module: &'a Module, path: String, source_map: Arc<SourceMap>) -> Self {
        let mut bindings = HashMap::new();
        let mut imports = HashMap::new();

        for item in &module.body {
            match item {
                ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => {
                    for decl in &var.decls {
                        if let (Pat::Ident(binding), Some(init)) = (&decl.name, &decl.init) {
                            bindings.insert(binding.id.sym.to_string(), &**init);
                        }
                    }
                }
                ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                    for specifier in &import.specifiers {
                        if let ImportSpecifier::Default(default) = specifier {
                            imports.insert(default.local.sym.to_string(), import.src.value.to_string());
                        }
                    }
                }
                _ => {}
            }
        }

        Self {
            module,
            path,
            source_map,
            bindings,
            imports,
        }
    }

    fn evaluate(&self) -> Result<BuildConfiguration> {
        let exported = self.find_export().ok_or_else(|| ContentError::ParseError {
            path: self.path.clone(),
            message: "no `module.exports = {...}` or `export default {...}` found".to_string(),
        })?;

        let object = match self.resolve(exported)? {
            Expr::Object(object) => object,
            other => return Err(self.unsupported(other, "the exported config must be an object literal")),
        };

        let mut fields = Map::new();
        for (key, value) in self.entries(object)? {
            let value = if key == "plugins" {
                self.plugins(value)?
            } else {
                self.value(value)?
            };
            fields.insert(key, value);
        }

        serde_json::from_value(Value::Object(fields)).map_err(|e| ContentError::ParseError {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Last `module.exports = ...` or `export default ...` in the module
    fn find_export(&self) -> Option<&'a Expr> {
        let mut exported = None;
        for item in &self.module.body {
            match item {
                ModuleItem::Stmt(Stmt::Expr(stmt)) => {
                    if let Expr::Assign(assign) = &*stmt.expr {
                        if is_module_exports(&assign.left) {
                            exported = Some(&*assign.right);
                        }
                    }
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                    exported = Some(&*export.expr);
                }
                _ => {}
            }
        }
        exported
    }

    /// Strip parentheses and type assertions and follow identifier bindings
    fn resolve(&self, expr: &'a Expr) -> Result<&'a Expr> {
        let mut current = expr;
        for _ in 0..MAX_ALIAS_DEPTH {
            current = match current {
                Expr::Paren(paren) => &*paren.expr,
                Expr::TsSatisfies(satisfies) => &*satisfies.expr,
                Expr::TsAs(as_expr) => &*as_expr.expr,
                Expr::TsConstAssertion(assertion) => &*assertion.expr,
                Expr::Ident(ident) => match self.bindings.get(&*ident.sym) {
                    Some(bound) => *bound,
                    None => return Ok(current),
                },
                _ => return Ok(current),
            };
        }
        Err(self.unsupported(current, "identifier aliases nest too deeply"))
    }

    fn entries(&self, object: &'a ObjectLit) -> Result<Vec<(String, &'a Expr)>> {
        let mut entries = Vec::with_capacity(object.props.len());
        for prop in &object.props {
            match prop {
                PropOrSpread::Prop(prop) => match &**prop {
                    Prop::KeyValue(kv) => entries.push((self.key(&kv.key)?, &*kv.value)),
                    Prop::Shorthand(ident) => match self.bindings.get(&*ident.sym) {
                        Some(bound) => entries.push((ident.sym.to_string(), *bound)),
                        None => {
                            return Err(self.unsupported_at(
                                ident.span.lo,
                                &format!("shorthand property `{}` has no constant binding", ident.sym),
                            ))
                        }
                    },
                    other => {
                        return Err(self.unsupported_at(
                            other.span().lo,
                            "methods, getters and setters are not supported",
                        ))
                    }
                },
                PropOrSpread::Spread(spread) => {
                    return Err(self.unsupported_at(spread.dot3_token.lo, "object spread is not supported"))
                }
            }
        }
        Ok(entries)
    }

    fn key(&self, key: &PropName) -> Result<String> {
        match key {
            PropName::Ident(ident) => Ok(ident.sym.to_string()),
            PropName::Str(s) => Ok(s.value.to_string()),
            PropName::Num(n) => Ok(format_number_key(n.value)),
            other => Err(self.unsupported_at(other.span().lo, "computed keys are not supported")),
        }
    }

    /// Evaluate a literal-only expression into JSON
    fn value(&self, expr: &'a Expr) -> Result<Value> {
        let expr = self.resolve(expr)?;
        match expr {
            Expr::Lit(Lit::Str(s)) => Ok(Value::String(s.value.to_string())),
            Expr::Lit(Lit::Num(n)) => self.number(n.value, expr),
            Expr::Lit(Lit::Bool(b)) => Ok(Value::Bool(b.value)),
            Expr::Lit(Lit::Null(_)) => Ok(Value::Null),
            Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
                let mut text = String::new();
                for quasi in &tpl.quasis {
                    match &quasi.cooked {
                        Some(cooked) => text.push_str(cooked),
                        None => text.push_str(&quasi.raw),
                    }
                }
                Ok(Value::String(text))
            }
            Expr::Tpl(_) => Err(self.unsupported(expr, "template literals with substitutions are not supported")),
            Expr::Unary(unary) if unary.op == UnaryOp::Minus => match self.resolve(&unary.arg)? {
                Expr::Lit(Lit::Num(n)) => self.number(-n.value, expr),
                _ => Err(self.unsupported(expr, "unary minus only applies to number literals")),
            },
            Expr::Array(array) => {
                let mut items = Vec::with_capacity(array.elems.len());
                for elem in &array.elems {
                    items.push(self.value(self.element(elem, expr)?)?);
                }
                Ok(Value::Array(items))
            }
            Expr::Object(object) => {
                let mut map = Map::new();
                for (key, value) in self.entries(object)? {
                    map.insert(key, self.value(value)?);
                }
                Ok(Value::Object(map))
            }
            Expr::Ident(ident) => Err(self.unsupported(
                expr,
                &format!("identifier `{}` has no constant binding", ident.sym),
            )),
            _ => Err(self.unsupported(expr, "only literal values are supported")),
        }
    }

    fn element(&self, elem: &'a Option<ExprOrSpread>, array: &'a Expr) -> Result<&'a Expr> {
        match elem {
            Some(ExprOrSpread { spread: None, expr }) => Ok(&**expr),
            Some(ExprOrSpread { spread: Some(span), .. }) => {
                Err(self.unsupported_at(span.lo, "array spread is not supported"))
            }
            None => Err(self.unsupported(array, "array holes are not supported")),
        }
    }

    fn number(&self, value: f64, expr: &Expr) -> Result<Value> {
        if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
            return Ok(Value::from(value as i64));
        }
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .ok_or_else(|| self.unsupported(expr, "non-finite numbers are not supported"))
    }

    /// Evaluate the `plugins` array into serialized [`Plugin`] values
    fn plugins(&self, expr: &'a Expr) -> Result<Value> {
        let array = match self.resolve(expr)? {
            Expr::Array(array) => array,
            other => return Err(self.unsupported(other, "`plugins` must be an array literal")),
        };

        let mut plugins = Vec::with_capacity(array.elems.len());
        for elem in &array.elems {
            let plugin = self.plugin(self.element(elem, expr)?)?;
            plugins.push(serde_json::to_value(plugin)?);
        }
        Ok(Value::Array(plugins))
    }

    fn plugin(&self, expr: &'a Expr) -> Result<Plugin> {
        if let Expr::Ident(ident) = expr {
            if let Some(module) = self.imports.get(&*ident.sym) {
                return Ok(Plugin::Module(module.clone()));
            }
        }

        match self.resolve(expr)? {
            Expr::Lit(Lit::Str(s)) => Ok(Plugin::Module(s.value.to_string())),
            Expr::Call(call) => {
                if let Some(module) = self.plugin_module(call)? {
                    return Ok(Plugin::Module(module));
                }

                // require('plugin')(options) or importedPlugin(options)
                let callee = match &call.callee {
                    Callee::Expr(callee) => &**callee,
                    _ => return Err(self.unsupported_at(call.span.lo, "unsupported plugin call")),
                };
                let module = match callee {
                    Expr::Ident(ident) => self.imports.get(&*ident.sym).cloned(),
                    Expr::Call(inner) => self.plugin_module(inner)?,
                    _ => None,
                };
                let Some(module) = module else {
                    return Err(self.unsupported_at(call.span.lo, "plugins must come from require() or a default import"));
                };

                match call.args.as_slice() {
                    [] => Ok(Plugin::Module(module)),
                    [ExprOrSpread { spread: None, expr }] => Ok(Plugin::Configured {
                        module,
                        options: self.value(expr)?,
                    }),
                    _ => Err(self.unsupported_at(call.span.lo, "plugin options must be a single argument")),
                }
            }
            other => Err(self.unsupported(
                other,
                "plugins must be `require('name')`, `require('name')(options)` or a default import",
            )),
        }
    }

    /// Module name of a `require('name')` call, `None` for other calls
    fn plugin_module(&self, call: &'a CallExpr) -> Result<Option<String>> {
        let Callee::Expr(callee) = &call.callee else {
            return Ok(None);
        };
        let Expr::Ident(ident) = &**callee else {
            return Ok(None);
        };
        if &*ident.sym != "require" {
            return Ok(None);
        }

        match call.args.as_slice() {
            [ExprOrSpread { spread: None, expr }] => match self.resolve(expr)? {
                Expr::Lit(Lit::Str(s)) => Ok(Some(s.value.to_string())),
                other => Err(self.unsupported(other, "require() takes a string literal")),
            },
            _ => Err(self.unsupported_at(call.span.lo, "require() takes a single argument")),
        }
    }

    fn unsupported(&self, expr: &Expr, message: &str) -> ContentError {
        self.unsupported_at(expr.span().lo, message)
    }

    fn unsupported_at(&self, pos: swc_core::common::BytePos, message: &str) -> ContentError {
        let loc = self.source_map.lookup_char_pos(pos);
        ContentError::UnsupportedExpression {
            path: self.path.clone(),
            line: loc.line,
            message: message.to_string(),
        }
    }
}

fn is_module_exports(target: &AssignTarget) -> bool {
    match target {
        AssignTarget::Simple(SimpleAssignTarget::Member(member)) => {
            matches!(&*member.obj, Expr::Ident(obj) if &*obj.sym == "module")
                && matches!(&member.prop, MemberProp::Ident(prop) if &*prop.sym == "exports")
        }
        _ => false,
    }
}

fn format_number_key(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
