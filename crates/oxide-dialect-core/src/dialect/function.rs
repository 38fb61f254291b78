//! Function registry.
//!
//! A dialect registers how generic function names render on its
//! database. Functions that are not registered render as
//! `name(arg, ...)`.

use std::collections::HashMap;

use super::pattern::{Fragment, Pattern};
use crate::error::Result;

/// How a registered function renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionRenderer {
    /// A `?N` pattern.
    Pattern(Pattern),
    /// The arguments are passed to a differently named function.
    Alias(String),
    /// Fixed SQL taking no arguments and no parentheses.
    NoArgs(String),
    /// `least`/`greatest` emulated with a CASE over any number of arguments.
    CaseLeastGreatest {
        /// True for `greatest`.
        greatest: bool,
    },
}

impl FunctionRenderer {
    /// Renders a call with translated arguments.
    ///
    /// # Errors
    ///
    /// Fails when a pattern references a missing argument.
    pub fn render(&self, name: &str, distinct: bool, args: &[Fragment]) -> Result<Fragment> {
        match self {
            Self::Pattern(pattern) => pattern.render(args),
            Self::Alias(target) => Ok(render_call(target, distinct, args)),
            Self::NoArgs(sql) => Ok(Fragment::text(sql.clone())),
            Self::CaseLeastGreatest { greatest } => {
                if args.len() < 2 {
                    return Ok(render_call(name, distinct, args));
                }
                Ok(render_case_least_greatest(*greatest, args))
            }
        }
    }
}

/// Renders `name([distinct ]a,b,...)`.
#[must_use]
pub fn render_call(name: &str, distinct: bool, args: &[Fragment]) -> Fragment {
    let mut out = Fragment::text(format!("{name}("));
    if distinct {
        out.sql.push_str("distinct ");
    }
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.sql.push(',');
        }
        out.push(arg);
    }
    out.sql.push(')');
    out
}

// case when a<=b and a<=c then a when b<=c then b else c end
fn render_case_least_greatest(greatest: bool, args: &[Fragment]) -> Fragment {
    let operator = if greatest { ">=" } else { "<=" };
    let last = args.len() - 1;
    let mut out = Fragment::text("case");
    for (i, current) in args[..last].iter().enumerate() {
        out.sql.push_str(" when ");
        for (k, other) in args[i + 1..].iter().enumerate() {
            if k > 0 {
                out.sql.push_str(" and ");
            }
            out.push(current);
            out.sql.push_str(operator);
            out.push(other);
        }
        out.sql.push_str(" then ");
        out.push(current);
    }
    out.sql.push_str(" else ");
    out.push(&args[last]);
    out.sql.push_str(" end");
    out
}

/// Function renderers keyed by lower-case function name.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionRenderer>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a renderer, replacing any previous one.
    pub fn register(&mut self, name: &str, renderer: FunctionRenderer) {
        self.functions.insert(name.to_ascii_lowercase(), renderer);
    }

    /// Registers a `?N` pattern.
    pub fn register_pattern(&mut self, name: &str, pattern: &str) {
        self.register(name, FunctionRenderer::Pattern(Pattern::parse(pattern)));
    }

    /// Registers `name` as an alias of `target`.
    pub fn register_alias(&mut self, name: &str, target: &str) {
        self.register(name, FunctionRenderer::Alias(target.to_string()));
    }

    /// Registers a function rendered as fixed text.
    pub fn register_no_args(&mut self, name: &str, sql: &str) {
        self.register(name, FunctionRenderer::NoArgs(sql.to_string()));
    }

    /// Looks up a function by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FunctionRenderer> {
        self.functions.get(&name.to_ascii_lowercase())
    }

    /// Returns true if the function is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Renders a call to `name`, falling back to `name(args)`.
    ///
    /// # Errors
    ///
    /// Fails when a pattern references a missing argument.
    pub fn render(&self, name: &str, distinct: bool, args: &[Fragment]) -> Result<Fragment> {
        match self.get(name) {
            Some(renderer) => renderer.render(name, distinct, args),
            None => Ok(render_call(name, distinct, args)),
        }
    }
}

/// Registration helpers shared by several dialects.
pub mod common {
    use super::{FunctionRegistry, FunctionRenderer};

    /// `least` and `greatest` as CASE emulations.
    pub fn least_greatest_case(registry: &mut FunctionRegistry) {
        registry.register("least", FunctionRenderer::CaseLeastGreatest { greatest: false });
        registry.register("greatest", FunctionRenderer::CaseLeastGreatest { greatest: true });
    }

    /// `bit_length` as `length(x)*8`.
    pub fn bit_length_from_length(registry: &mut FunctionRegistry) {
        registry.register_pattern("bit_length", "length(?1)*8");
    }

    /// `bit_length` as `octet_length(x)*8`.
    pub fn bit_length_from_octet_length(registry: &mut FunctionRegistry) {
        registry.register_pattern("bit_length", "octet_length(?1)*8");
    }

    /// `locate(pattern, string)` as `position(pattern in string)`.
    pub fn locate_position(registry: &mut FunctionRegistry) {
        registry.register_pattern("locate", "position(?1 in ?2)");
    }

    /// `locate(pattern, string)` as `charindex(pattern, string)`.
    pub fn locate_charindex(registry: &mut FunctionRegistry) {
        registry.register_pattern("locate", "charindex(?1,?2)");
    }

    /// `locate(pattern, string)` as `instr(string, pattern)`.
    pub fn locate_instr(registry: &mut FunctionRegistry) {
        registry.register_pattern("locate", "instr(?2,?1)");
    }

    /// `cot(x)` as `1/tan(x)`.
    pub fn cot_from_tan(registry: &mut FunctionRegistry) {
        registry.register_pattern("cot", "(1/tan(?1))");
    }

    /// `log(base, x)` as `ln(x)/ln(base)`.
    pub fn log_from_ln(registry: &mut FunctionRegistry) {
        registry.register_pattern("log", "(ln(?2)/ln(?1))");
    }

    /// `mod(a, b)` as `a % b`.
    pub fn mod_operator(registry: &mut FunctionRegistry) {
        registry.register_pattern("mod", "(?1%?2)");
    }

    /// `repeat` via `lpad`, for databases without `repeat`.
    pub fn repeat_lpad(registry: &mut FunctionRegistry) {
        registry.register_pattern("repeat", "lpad('',(?2)*length(?1),?1)");
    }

    /// `truncate` as `trunc`.
    pub fn truncate_trunc(registry: &mut FunctionRegistry) {
        registry.register_alias("truncate", "trunc");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::ParameterBinding;

    fn param(position: usize) -> Fragment {
        Fragment {
            sql: "?".into(),
            parameters: vec![ParameterBinding::Query(position)],
        }
    }

    #[test]
    fn test_unregistered_function() {
        let registry = FunctionRegistry::new();
        let out = registry
            .render("upper", false, &[Fragment::text("name")])
            .unwrap();
        assert_eq!(out.sql, "upper(name)");
        let out = registry
            .render("count", true, &[Fragment::text("id")])
            .unwrap();
        assert_eq!(out.sql, "count(distinct id)");
    }

    #[test]
    fn test_pattern_and_alias() {
        let mut registry = FunctionRegistry::new();
        common::locate_charindex(&mut registry);
        registry.register_alias("substring", "substr");
        registry.register_no_args("current_user", "user");

        let out = registry
            .render("LOCATE", false, &[Fragment::text("'a'"), Fragment::text("s")])
            .unwrap();
        assert_eq!(out.sql, "charindex('a',s)");
        let out = registry
            .render("substring", false, &[Fragment::text("s"), Fragment::text("1")])
            .unwrap();
        assert_eq!(out.sql, "substr(s,1)");
        assert_eq!(registry.render("current_user", false, &[]).unwrap().sql, "user");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_case_least() {
        let mut registry = FunctionRegistry::new();
        common::least_greatest_case(&mut registry);
        let out = registry
            .render("least", false, &[param(1), Fragment::text("b"), Fragment::text("c")])
            .unwrap();
        assert_eq!(
            out.sql,
            "case when ?<=b and ?<=c then ? when b<=c then b else c end"
        );
        assert_eq!(out.parameters.len(), 3);

        let out = registry
            .render("greatest", false, &[Fragment::text("a"), Fragment::text("b")])
            .unwrap();
        assert_eq!(out.sql, "case when a>=b then a else b end");
    }
}
