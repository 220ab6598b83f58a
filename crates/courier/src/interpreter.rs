//! Rule interpretation: one field's rule tokens to a typed descriptor.
//!
//! # Overview
//!
//! Tokens are applied in order. Type rules overwrite each other (last one
//! wins), bounds and enum lists are recorded, and `required` is sticky: once
//! seen it is never cleared by a later token. Unknown rules are skipped so new
//! validation rules in the host application never break generation.
//!
//! The example value is picked in priority order:
//!
//! 1. the first `in:` value,
//! 2. the configured example for the field type, clamped into `[min, max]`
//!    for `integer` and `numeric` fields (a configured value no bound moves is
//!    used as is),
//! 3. the configured string example.
//!
//! Dates with a `date_format:` rule render the current time in that format.
//! Formats use the host framework's PHP-style letters (`Y-m-d H:i:s`) and are
//! translated to strftime first; an untranslatable format falls back to the
//! configured date example.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use courier_core::{FieldDescriptor, FieldType, RuleToken};
use serde_json::{Number, Value};

use crate::config::ExampleValues;

/// Interpret `tokens` for the field at `path`, rendering dates against the
/// current time.
pub fn interpret(path: &str, tokens: &[RuleToken], examples: &ExampleValues) -> FieldDescriptor {
    interpret_at(path, tokens, examples, Utc::now())
}

/// Same as [`interpret`] with an explicit clock.
pub fn interpret_at(
    path: &str,
    tokens: &[RuleToken],
    examples: &ExampleValues,
    now: DateTime<Utc>,
) -> FieldDescriptor {
    let mut field = FieldDescriptor::new(path);
    for token in tokens {
        match token {
            RuleToken::Rule { name, args } => apply_rule(&mut field, name, args),
            RuleToken::Opaque { implies_required } => {
                if *implies_required {
                    field.required = true;
                }
            }
        }
    }
    field.example = example_for(&field, examples, now);
    field
}

fn apply_rule(field: &mut FieldDescriptor, name: &str, args: &[String]) {
    match name {
        "required" => field.required = true,
        "in" => {
            let values: Vec<String> = args.iter().filter(|a| !a.is_empty()).cloned().collect();
            if !values.is_empty() {
                field.enum_values = Some(values);
            }
        }
        "min" => {
            if let Some(min) = parse_bound(args.first()) {
                field.min = Some(min);
            }
        }
        "max" => {
            if let Some(max) = parse_bound(args.first()) {
                field.max = Some(max);
            }
        }
        "between" => {
            if let (Some(min), Some(max)) = (parse_bound(args.first()), parse_bound(args.get(1))) {
                field.min = Some(min);
                field.max = Some(max);
            }
        }
        other => {
            let Some(field_type) = FieldType::from_rule(other) else {
                return;
            };
            field.field_type = field_type;
            if field_type == FieldType::Date
                && let Some(format) = args.first().filter(|f| !f.is_empty())
            {
                field.format = Some(format.clone());
            }
        }
    }
}

fn parse_bound(arg: Option<&String>) -> Option<f64> {
    arg?.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn example_for(field: &FieldDescriptor, examples: &ExampleValues, now: DateTime<Utc>) -> Value {
    if let Some(first) = field.enum_values.as_ref().and_then(|values| values.first()) {
        return Value::String(first.clone());
    }

    match field.field_type {
        field_type if field_type.is_numeric() => {
            let configured = examples
                .get(field.field_type)
                .cloned()
                .unwrap_or_else(|| Value::from(0));
            clamp_number(field, configured)
        }
        FieldType::Date => field
            .format
            .as_deref()
            .and_then(|format| render_date(format, now))
            .map(Value::String)
            .or_else(|| examples.get(FieldType::Date).cloned())
            .unwrap_or_else(|| string_example(examples)),
        field_type => examples
            .get(field_type)
            .cloned()
            .unwrap_or_else(|| string_example(examples)),
    }
}

fn string_example(examples: &ExampleValues) -> Value {
    examples
        .get(FieldType::String)
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}

/// Clamp a configured numeric example into the field's bounds. A value no
/// bound moves is returned untouched; non-numeric examples pass through.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn clamp_number(field: &FieldDescriptor, configured: Value) -> Value {
    let Some(value) = configured.as_f64() else {
        return configured;
    };

    let (min, max) = if field.field_type == FieldType::Integer {
        (field.min.map(f64::ceil), field.max.map(f64::floor))
    } else {
        (field.min, field.max)
    };

    let mut clamped = value;
    if let Some(min) = min
        && clamped < min
    {
        clamped = min;
    }
    if let Some(max) = max
        && clamped > max
    {
        clamped = max;
    }

    if (clamped - value).abs() < f64::EPSILON {
        return configured;
    }
    if field.field_type == FieldType::Integer || clamped.fract() == 0.0 {
        return Value::from(clamped.trunc() as i64);
    }
    Number::from_f64(clamped).map_or(configured, Value::Number)
}

/// Render `now` in a PHP-style date format, or `None` when the format uses a
/// letter with no strftime equivalent.
fn render_date(format: &str, now: DateTime<Utc>) -> Option<String> {
    let Some(pattern) = php_to_strftime(format) else {
        tracing::warn!(format, "unsupported date format, using configured date example");
        return None;
    };
    let mut out = String::new();
    if write!(out, "{}", now.format(&pattern)).is_err() {
        tracing::warn!(format, "date format failed to render, using configured date example");
        return None;
    }
    Some(out)
}

fn php_to_strftime(format: &str) -> Option<String> {
    let mut pattern = String::with_capacity(format.len() * 2);
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        let spec = match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    push_literal(&mut pattern, escaped);
                }
                continue;
            }
            'd' => "%d",
            'D' => "%a",
            'j' => "%-d",
            'l' => "%A",
            'N' => "%u",
            'w' => "%w",
            'W' => "%V",
            'F' => "%B",
            'm' => "%m",
            'M' => "%b",
            'n' => "%-m",
            'Y' => "%Y",
            'y' => "%y",
            'a' => "%P",
            'A' => "%p",
            'g' => "%-I",
            'G' => "%-H",
            'h' => "%I",
            'H' => "%H",
            'i' => "%M",
            's' => "%S",
            'u' => "%6f",
            'v' => "%3f",
            'T' => "%Z",
            'P' => "%:z",
            'O' => "%z",
            'U' => "%s",
            'c' => "%Y-%m-%dT%H:%M:%S%:z",
            c if c.is_ascii_alphabetic() => return None,
            c => {
                push_literal(&mut pattern, c);
                continue;
            }
        };
        pattern.push_str(spec);
    }
    Some(pattern)
}

fn push_literal(pattern: &mut String, c: char) {
    if c == '%' {
        pattern.push_str("%%");
    } else {
        pattern.push(c);
    }
}
