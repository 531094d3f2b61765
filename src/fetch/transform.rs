// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Response transforms.
//!
//! A transform is JavaScript source text compiled into a one-argument
//! function that maps the raw upstream body to the normalized payload. Two
//! forms are accepted:
//!
//! * a function expression: `data => data.map(x => x.value)` or
//!   `function (rows) { return rows.slice(0, 5); }`
//! * a function body, run as `function (data) { ... }`:
//!   `return data.items.filter(item => item.active);`
//!
//! Every compile and every evaluation gets a fresh engine holding only the
//! ECMAScript built-ins. Nothing from the host is bound into it: no files,
//! network, timers, process or console. Loop iterations and recursion depth
//! are capped. The body crosses into the engine as JSON and the result must
//! come back as JSON.
//!
//! # Example
//! ```
//! use dashboard_relay::fetch::Transform;
//! use serde_json::json;
//!
//! let transform = Transform::compile("data => data.map(x => x.value)").unwrap();
//! let out = transform.apply(&json!([{"value": 1}, {"value": 2}])).unwrap();
//! assert_eq!(out, json!([1, 2]));
//! ```

use boa_engine::{Context, JsValue, Source};
use serde_json::Value;

use crate::errors::FetchError;
use crate::observability::messages::fetch::TransformRejected;
use crate::observability::messages::StructuredLog;

/// Loop iterations one evaluation may run before it is aborted.
const LOOP_ITERATION_LIMIT: u64 = 1_000_000;
/// Maximum call depth inside one evaluation.
const RECURSION_LIMIT: usize = 256;

/// How the source text becomes a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformForm {
    /// The source evaluates to a function.
    Function,
    /// The source is the body of `function (data) { ... }`.
    Body,
}

/// A transform whose source compiled to a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    source: String,
    form: TransformForm,
}

impl Transform {
    /// Compile `source` without running it against any data.
    ///
    /// The function-expression form is tried first; when the source does not
    /// evaluate to a function it is compiled as a function body. Fails with
    /// [`FetchError::TransformFailed`] when the source is empty or neither
    /// form parses.
    pub fn compile(source: &str) -> Result<Self, FetchError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(reject(source, "transform is empty"));
        }

        let mut context = sandbox();
        let form = match context.eval(Source::from_bytes(&as_expression(source))) {
            Ok(value) if value.is_callable() => TransformForm::Function,
            _ => {
                context
                    .eval(Source::from_bytes(&as_body(source)))
                    .map_err(|e| reject(source, &format!("failed to compile: {}", e)))?;
                TransformForm::Body
            }
        };

        Ok(Self {
            source: source.to_string(),
            form,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn form(&self) -> TransformForm {
        self.form
    }

    /// Call the transform with `input`. The input is never modified.
    ///
    /// A thrown error, an exceeded limit, an `undefined` result or a result
    /// that cannot be expressed as JSON all fail with
    /// [`FetchError::TransformFailed`].
    pub fn apply(&self, input: &Value) -> Result<Value, FetchError> {
        let mut context = sandbox();
        let wrapped = match self.form {
            TransformForm::Function => as_expression(&self.source),
            TransformForm::Body => as_body(&self.source),
        };

        let function = context
            .eval(Source::from_bytes(&wrapped))
            .map_err(|e| reject(&self.source, &format!("failed to compile: {}", e)))?;
        let Some(callable) = function.as_callable() else {
            return Err(reject(&self.source, "transform is not a function"));
        };

        let argument = JsValue::from_json(input, &mut context)
            .map_err(|e| reject(&self.source, &format!("input is not representable: {}", e)))?;
        let result = callable
            .call(&JsValue::undefined(), &[argument], &mut context)
            .map_err(|e| reject(&self.source, &format!("transform threw: {}", e)))?;

        if result.is_undefined() {
            return Err(reject(&self.source, "transform returned undefined"));
        }
        result
            .to_json(&mut context)
            .map_err(|e| reject(&self.source, &format!("result is not JSON: {}", e)))
    }
}

fn sandbox() -> Context {
    let mut context = Context::default();
    let limits = context.runtime_limits_mut();
    limits.set_loop_iteration_limit(LOOP_ITERATION_LIMIT);
    limits.set_recursion_limit(RECURSION_LIMIT);
    context
}

fn as_expression(source: &str) -> String {
    format!("(\n{}\n)", source.trim_end_matches(';'))
}

fn as_body(source: &str) -> String {
    format!("(function (data) {{\n{}\n}})", source)
}

fn reject(source: &str, reason: &str) -> FetchError {
    TransformRejected {
        expression: source,
        reason,
    }
    .log();
    FetchError::transform(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> Value {
        json!({
            "data": {
                "items": [
                    {"name": "north", "active": true},
                    {"name": "south", "active": false}
                ],
                "label": "regions"
            }
        })
    }

    fn assert_fails(source: &str, input: &Value) {
        let result = Transform::compile(source).and_then(|t| t.apply(input));
        assert!(
            matches!(result, Err(FetchError::TransformFailed { .. })),
            "transform should fail: {:?} gave {:?}",
            source,
            result
        );
    }

    #[test]
    fn test_arrow_function_maps_values() {
        let transform = Transform::compile("data => data.map(x => x.value)").unwrap();
        assert_eq!(transform.form(), TransformForm::Function);
        let out = transform
            .apply(&json!([{"value": 1}, {"value": 2}]))
            .unwrap();
        assert_eq!(out, json!([1, 2]));
    }

    #[test]
    fn test_function_body_form() {
        let transform = Transform::compile(
            "return data.data.items.filter(function (item) { return item.active; })\n  .map(function (item) { return item.name; });",
        )
        .unwrap();
        assert_eq!(transform.form(), TransformForm::Body);
        assert_eq!(transform.apply(&body()).unwrap(), json!(["north"]));
    }

    #[test]
    fn test_function_keyword_expression() {
        let transform =
            Transform::compile("function (payload) { return payload.data.label; };").unwrap();
        assert_eq!(transform.form(), TransformForm::Function);
        assert_eq!(transform.apply(&body()).unwrap(), json!("regions"));
    }

    #[test]
    fn test_result_can_be_any_json() {
        let transform = Transform::compile(
            "data => ({ names: data.data.items.map(i => i.name), empty: null, ok: true })",
        )
        .unwrap();
        assert_eq!(
            transform.apply(&body()).unwrap(),
            json!({"names": ["north", "south"], "empty": null, "ok": true})
        );
    }

    #[test]
    fn test_thrown_error_fails() {
        assert_fails("data => { throw new Error('bad shape'); }", &body());
        assert_fails("data => data.missing.deeper", &body());
    }

    #[test]
    fn test_compile_rejects_bad_source() {
        for source in ["", "   ", "data => {", "return (", "function ("] {
            assert!(
                matches!(
                    Transform::compile(source),
                    Err(FetchError::TransformFailed { .. })
                ),
                "source should be rejected: {:?}",
                source
            );
        }
    }

    #[test]
    fn test_undefined_result_fails() {
        assert_fails("data.map(x => x.value)", &json!([{"value": 1}]));
        assert_fails("data => undefined", &json!([]));
    }

    #[test]
    fn test_runaway_loop_is_stopped() {
        assert_fails("data => { while (true) {} }", &json!([]));
        assert_fails("function f(n) { return f(n + 1); }", &json!(0));
    }

    #[test]
    fn test_host_is_not_reachable() {
        let transform = Transform::compile(
            "() => [typeof require, typeof process, typeof fetch, typeof console]",
        )
        .unwrap();
        assert_eq!(
            transform.apply(&json!(null)).unwrap(),
            json!(["undefined", "undefined", "undefined", "undefined"])
        );
    }

    #[test]
    fn test_apply_does_not_touch_input() {
        let input = json!(["a", "b"]);
        let before = input.clone();
        let transform = Transform::compile("data => { data.push('c'); return data; }").unwrap();

        assert_eq!(transform.apply(&input).unwrap(), json!(["a", "b", "c"]));
        assert_eq!(input, before);
    }

    #[test]
    fn test_evaluations_do_not_share_state() {
        let transform =
            Transform::compile("data => { globalThis.seen = (globalThis.seen || 0) + 1; return globalThis.seen > 1; }")
                .unwrap();
        assert_eq!(transform.apply(&json!(null)).unwrap(), json!(false));
        assert_eq!(transform.apply(&json!(null)).unwrap(), json!(false));
    }
}
