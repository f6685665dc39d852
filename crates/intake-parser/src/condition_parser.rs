//! Conditional-logic payload parser
//!
//! Authoring tools store a step's conditional logic as free-form JSON (or as a
//! string holding JSON). This parser accepts the shapes below and produces the
//! closed [`Condition`] tree, rejecting everything else.
//!
//! # Syntax
//!
//! ## Shorthand predicates
//! ```yaml
//! conditional_logic: smoker == "yes"
//! conditional_logic: symptoms contains "chest_pain"
//! conditional_logic: allergies excludes ["penicillin", "latex"]
//! conditional_logic: age >= 18
//! ```
//!
//! ## Structured predicates
//! ```yaml
//! conditional_logic:
//!   step: age
//!   op: gte
//!   value: 18
//! ```
//!
//! ## Groups (exactly one key per group, lists must be non-empty)
//! ```yaml
//! conditional_logic:
//!   all:
//!     - sex == "female"
//!     - any:
//!         - age < 18
//!         - not: pregnant == "no"
//! ```
//!
//! A top-level list is read as `all`. A `not` holding a list negates `any` of its items.

use crate::error::{ParseError, Result};
use intake_core::ast::{ComparisonOperator, Condition, Predicate, PredicateKind};
use intake_core::Value;
use serde_json::{Map, Value as JsonValue};

const STEP_KEYS: [&str; 3] = ["step", "step_id", "stepId"];

/// Parser for conditional-logic payloads
#[derive(Debug, Default, Clone, Copy)]
pub struct ConditionParser;

impl ConditionParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse an optional payload; an absent or `null` payload means "always shown"
    pub fn parse_optional(&self, payload: Option<&JsonValue>) -> Result<Option<Condition>> {
        match payload {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => self.parse(value).map(Some),
        }
    }

    /// Parse a conditional-logic payload
    pub fn parse(&self, payload: &JsonValue) -> Result<Condition> {
        match payload {
            JsonValue::String(text) => self.parse_text(text),
            JsonValue::Array(items) => Ok(Condition::All(self.parse_list(items, payload)?)),
            JsonValue::Object(map) => self.parse_object(map, payload),
            other => Err(ParseError::condition(
                other,
                "expected a string, list or object",
            )),
        }
    }

    /// Text payloads are either shorthand predicates or serialized JSON
    fn parse_text(&self, text: &str) -> Result<Condition> {
        let trimmed = text.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            let decoded: JsonValue = serde_json::from_str(trimmed)
                .map_err(|e| ParseError::condition(trimmed, format!("invalid JSON: {}", e)))?;
            return self.parse(&decoded);
        }
        self.parse_expression(trimmed)
    }

    fn parse_list(&self, items: &[JsonValue], whole: &JsonValue) -> Result<Vec<Condition>> {
        if items.is_empty() {
            return Err(ParseError::condition(whole, "empty condition list"));
        }
        items.iter().map(|item| self.parse(item)).collect()
    }

    fn parse_object(&self, map: &Map<String, JsonValue>, whole: &JsonValue) -> Result<Condition> {
        let group_keys: Vec<&str> = ["all", "any", "not"]
            .into_iter()
            .filter(|k| map.contains_key(*k))
            .collect();

        if !group_keys.is_empty() {
            if map.len() != 1 {
                return Err(ParseError::condition(
                    whole,
                    "a group must contain exactly one of 'all', 'any' or 'not'",
                ));
            }
            let key = group_keys[0];
            let inner = &map[key];
            return match key {
                "all" => Ok(Condition::All(self.parse_list(self.as_list(inner, whole)?, whole)?)),
                "any" => Ok(Condition::Any(self.parse_list(self.as_list(inner, whole)?, whole)?)),
                _ => match inner {
                    JsonValue::Array(items) => Ok(Condition::not(Condition::Any(
                        self.parse_list(items, whole)?,
                    ))),
                    other => Ok(Condition::not(self.parse(other)?)),
                },
            };
        }

        if STEP_KEYS.iter().any(|k| map.contains_key(*k)) {
            return self.parse_predicate_object(map, whole);
        }

        Err(ParseError::condition(
            whole,
            "object is neither a group nor a predicate",
        ))
    }

    fn as_list<'a>(&self, value: &'a JsonValue, whole: &JsonValue) -> Result<&'a [JsonValue]> {
        value
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| ParseError::condition(whole, "'all'/'any' must hold a list"))
    }

    fn parse_predicate_object(
        &self,
        map: &Map<String, JsonValue>,
        whole: &JsonValue,
    ) -> Result<Condition> {
        let allowed = ["op", "operator", "value"];
        if let Some(unknown) = map
            .keys()
            .find(|k| !STEP_KEYS.contains(&k.as_str()) && !allowed.contains(&k.as_str()))
        {
            return Err(ParseError::condition(
                whole,
                format!("unknown predicate key '{}'", unknown),
            ));
        }

        let step = STEP_KEYS
            .iter()
            .find_map(|k| map.get(*k))
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ParseError::condition(whole, "predicate 'step' must be a non-empty string"))?;

        let op = map
            .get("op")
            .or_else(|| map.get("operator"))
            .and_then(JsonValue::as_str)
            .ok_or_else(|| ParseError::condition(whole, "predicate is missing 'op'"))?;

        let raw_value = map
            .get("value")
            .ok_or_else(|| ParseError::condition(whole, "predicate is missing 'value'"))?;
        let value: Value = serde_json::from_value(raw_value.clone())
            .map_err(|_| ParseError::condition(whole, "predicate value must be a scalar or a list"))?;

        self.build_predicate(step, op, value, whole)
    }

    /// Parse a shorthand predicate such as `age >= 18` or `symptoms contains "cough"`
    pub fn parse_expression(&self, expr: &str) -> Result<Condition> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(ParseError::condition(expr, "empty condition"));
        }

        let step_end = expr
            .find(|c: char| c.is_whitespace() || "<>=!".contains(c))
            .unwrap_or(expr.len());
        let step = &expr[..step_end];
        if step.is_empty() {
            return Err(ParseError::condition(expr, "missing step reference"));
        }

        let rest = expr[step_end..].trim_start();
        let symbolic = [">=", "<=", "==", "!=", ">", "<"];
        let words = ["equals", "contains", "excludes"];

        let (op, value_str) = if let Some(sym) = symbolic.iter().find(|s| rest.starts_with(**s)) {
            (*sym, &rest[sym.len()..])
        } else if let Some(word) = words.iter().find(|w| {
            rest.starts_with(**w)
                && rest[w.len()..]
                    .chars()
                    .next()
                    .is_some_and(char::is_whitespace)
        }) {
            (*word, &rest[word.len()..])
        } else {
            return Err(ParseError::condition(expr, "no operator found"));
        };

        if op == "!=" {
            return Err(ParseError::condition(
                expr,
                "'!=' is not supported; use 'excludes' or a 'not' group",
            ));
        }

        let value_str = value_str.trim();
        if value_str.is_empty() {
            return Err(ParseError::condition(expr, "missing value"));
        }

        let value = self.parse_value(value_str)?;
        let condition = self.build_predicate(step, op, value, &expr)?;
        log::trace!("parsed shorthand condition '{}' as {}", expr, condition);
        Ok(condition)
    }

    fn build_predicate(
        &self,
        step: &str,
        op: &str,
        value: Value,
        whole: &dyn std::fmt::Display,
    ) -> Result<Condition> {
        let normalized = op.trim().to_ascii_lowercase();
        let kind = match normalized.as_str() {
            "==" | "eq" | "equals" | "is" => PredicateKind::Equals(value),
            "contains" | "includes" => PredicateKind::Contains(value),
            "excludes" | "not_contains" | "not_includes" => PredicateKind::Excludes(value),
            other => match ComparisonOperator::from_symbol(other) {
                Some(cmp) => {
                    let number = match &value {
                        Value::Array(_) => None,
                        v => v.as_number(),
                    }
                    .ok_or_else(|| {
                        ParseError::condition(whole, "numeric comparison needs a number")
                    })?;
                    PredicateKind::Compare { op: cmp, value: number }
                }
                None => return Err(ParseError::InvalidOperator(op.to_string())),
            },
        };

        match &kind {
            PredicateKind::Equals(Value::Null)
            | PredicateKind::Contains(Value::Null)
            | PredicateKind::Excludes(Value::Null) => {
                return Err(ParseError::condition(whole, "null is not a comparable value"));
            }
            PredicateKind::Contains(Value::Array(items))
            | PredicateKind::Excludes(Value::Array(items))
                if items.is_empty() =>
            {
                return Err(ParseError::condition(whole, "empty value list"));
            }
            _ => {}
        }

        Ok(Condition::Predicate(Predicate::new(step, kind)))
    }

    /// Parse a literal value string
    ///
    /// Supported formats:
    /// - Quoted strings: `"value"` or `'value'`
    /// - Numbers: `100`, `3.14`, `-42`
    /// - Booleans: `true`, `false`
    /// - Lists: `["a", "b", 1]`
    /// - Anything else is read as a bare string (e.g. an option id)
    pub fn parse_value(&self, value_str: &str) -> Result<Value> {
        let value_str = value_str.trim();

        if value_str.len() >= 2
            && ((value_str.starts_with('"') && value_str.ends_with('"'))
                || (value_str.starts_with('\'') && value_str.ends_with('\'')))
        {
            return Ok(Value::String(value_str[1..value_str.len() - 1].to_string()));
        }

        match value_str {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            "null" | "nil" => return Ok(Value::Null),
            _ => {}
        }

        if value_str.starts_with('[') {
            if !value_str.ends_with(']') {
                return Err(ParseError::condition(value_str, "unterminated list"));
            }
            let elements = self.parse_array_elements(&value_str[1..value_str.len() - 1])?;
            return Ok(Value::Array(elements));
        }

        if let Ok(num) = value_str.parse::<f64>() {
            return Ok(Value::Number(num));
        }

        Ok(Value::String(value_str.to_string()))
    }

    /// Parse list elements from a string like `"a", "b", 1, 2`
    fn parse_array_elements(&self, content: &str) -> Result<Vec<Value>> {
        let mut elements = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut string_char = '"';

        for c in content.chars() {
            match c {
                '"' | '\'' if !in_string => {
                    in_string = true;
                    string_char = c;
                    current.push(c);
                }
                c if c == string_char && in_string => {
                    in_string = false;
                    current.push(c);
                }
                ',' if !in_string => {
                    let trimmed = current.trim();
                    if !trimmed.is_empty() {
                        elements.push(self.parse_value(trimmed)?);
                    }
                    current.clear();
                }
                _ => current.push(c),
            }
        }

        if in_string {
            return Err(ParseError::condition(content, "unterminated string in list"));
        }

        let trimmed = current.trim();
        if !trimmed.is_empty() {
            elements.push(self.parse_value(trimmed)?);
        }

        Ok(elements)
    }
}
