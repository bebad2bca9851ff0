use crate::statics;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt::Write as _;

/// A number as found in a form schema. Every integer that fits in `i64` is an
/// `Int`, whatever sign the parser reported, so stored ids compare equal to
/// ids built by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormNumber {
    Int(i64),
    Float(f64),
}

impl FormNumber {
    fn from_unsigned(v: u64) -> Self {
        i64::try_from(v).map_or(FormNumber::Float(v as f64), FormNumber::Int)
    }

    pub fn as_i64(self) -> Option<i64> {
        match self {
            FormNumber::Int(v) => Some(v),
            FormNumber::Float(_) => None,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            FormNumber::Int(v) => v == 0,
            FormNumber::Float(v) => v == 0.0,
        }
    }
}

/// A value in a persisted form schema (JSON5 subset).
/// Objects keep insertion order so a saved document diffs cleanly against its source.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormValue {
    #[default]
    Null,
    Bool(bool),
    Number(FormNumber),
    String(String),
    Array(Vec<FormValue>),
    Object(IndexMap<String, FormValue>),
}

impl FormValue {
    pub fn as_object(&self) -> Option<&IndexMap<String, FormValue>> {
        match self {
            FormValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut IndexMap<String, FormValue>> {
        match self {
            FormValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FormValue]> {
        match self {
            FormValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FormValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer members such as `channel`, `statement` and item `value`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FormValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Flag semantics used by `0|1` toggles: numbers are on when non-zero.
    pub fn is_truthy(&self) -> bool {
        match self {
            FormValue::Null => false,
            FormValue::Bool(v) => *v,
            FormValue::Number(n) => !n.is_zero(),
            FormValue::String(s) => !s.is_empty(),
            FormValue::Array(_) | FormValue::Object(_) => true,
        }
    }

    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.as_object()?.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FormValue> {
        self.as_object_mut()?.get_mut(key)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FormValue::Null => "null",
            FormValue::Bool(_) => "bool",
            FormValue::Number(_) => "number",
            FormValue::String(_) => "string",
            FormValue::Array(_) => "array",
            FormValue::Object(_) => "object",
        }
    }

    pub fn parse_json5(text: &str) -> anyhow::Result<FormValue> {
        Ok(json5::from_str::<FormValue>(text)?)
    }

    /// Multi-line document form: two-space indent, trailing commas, final newline.
    pub fn to_json5_pretty(&self) -> String {
        let mut out = String::new();
        Json5Writer { out: &mut out, pretty: true }.value(self, 0);
        out.push_str(statics::NL_LF);
        out
    }

    /// Single-line form, used in logs and composite ids.
    pub fn to_json5_compact(&self) -> String {
        let mut out = String::new();
        Json5Writer { out: &mut out, pretty: false }.value(self, 0);
        out
    }
}

struct Json5Writer<'a> {
    out: &'a mut String,
    pretty: bool,
}

impl Json5Writer<'_> {
    fn value(&mut self, value: &FormValue, depth: usize) {
        match value {
            FormValue::Null => self.out.push_str("null"),
            FormValue::Bool(v) => self.out.push_str(if *v { "true" } else { "false" }),
            FormValue::Number(n) => self.number(*n),
            FormValue::String(s) => self.string(s),
            FormValue::Array(values) => self.block(('[', ']'), depth, values.iter().map(|v| (None, v))),
            FormValue::Object(map) => {
                self.block(('{', '}'), depth, map.iter().map(|(k, v)| (Some(k.as_str()), v)))
            }
        }
    }

    /// Arrays and objects share one layout; object entries carry a key.
    fn block<'v>(
        &mut self,
        (open, close): (char, char),
        depth: usize,
        entries: impl ExactSizeIterator<Item = (Option<&'v str>, &'v FormValue)>,
    ) {
        self.out.push(open);
        let len = entries.len();
        for (i, (key, value)) in entries.enumerate() {
            if self.pretty {
                self.out.push_str(statics::NL_LF);
                self.indent(depth + 1);
            } else if i > 0 {
                self.out.push_str(", ");
            }
            if let Some(key) = key {
                self.key(key);
                self.out.push_str(": ");
            }
            self.value(value, depth + 1);
            if self.pretty {
                self.out.push(',');
            }
        }
        if self.pretty && len > 0 {
            self.out.push_str(statics::NL_LF);
            self.indent(depth);
        }
        self.out.push(close);
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str("  ");
        }
    }

    /// Identifier-like keys are written bare, everything else quoted.
    fn key(&mut self, key: &str) {
        let mut chars = key.chars();
        let bare = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if bare {
            self.out.push_str(key);
        } else {
            self.string(key);
        }
    }

    fn number(&mut self, n: FormNumber) {
        match n {
            FormNumber::Int(v) => {
                let _ = write!(self.out, "{v}");
            }
            FormNumber::Float(v) if v.is_nan() => self.out.push_str("NaN"),
            FormNumber::Float(v) if v.is_infinite() => {
                self.out.push_str(if v < 0.0 { "-Infinity" } else { "Infinity" })
            }
            FormNumber::Float(v) => self.out.push_str(ryu::Buffer::new().format_finite(v)),
        }
    }

    fn string(&mut self, s: &str) {
        self.out.push('"');
        for ch in s.chars() {
            let escaped = match ch {
                '"' => "\\\"",
                '\\' => "\\\\",
                '\n' => "\\n",
                '\r' => "\\r",
                '\t' => "\\t",
                c if c.is_control() => {
                    let _ = write!(self.out, "\\u{:04x}", c as u32);
                    continue;
                }
                c => {
                    self.out.push(c);
                    continue;
                }
            };
            self.out.push_str(escaped);
        }
        self.out.push('"');
    }
}

impl From<i64> for FormValue {
    fn from(v: i64) -> Self {
        FormValue::Number(FormNumber::Int(v))
    }
}

impl From<bool> for FormValue {
    fn from(v: bool) -> Self {
        FormValue::Bool(v)
    }
}

impl From<&str> for FormValue {
    fn from(v: &str) -> Self {
        FormValue::String(v.to_owned())
    }
}

impl From<String> for FormValue {
    fn from(v: String) -> Self {
        FormValue::String(v)
    }
}

impl<T: Into<FormValue>> From<Option<T>> for FormValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FormValue::Null, Into::into)
    }
}

impl Serialize for FormValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FormValue::Null => serializer.serialize_unit(),
            FormValue::Bool(v) => serializer.serialize_bool(*v),
            FormValue::Number(FormNumber::Int(v)) => serializer.serialize_i64(*v),
            FormValue::Number(FormNumber::Float(v)) => serializer.serialize_f64(*v),
            FormValue::String(s) => serializer.serialize_str(s),
            FormValue::Array(values) => values.serialize(serializer),
            FormValue::Object(map) => map.serialize(serializer),
        }
    }
}

struct FormValueVisitor;

impl<'de> de::Visitor<'de> for FormValueVisitor {
    type Value = FormValue;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("a form schema value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<FormValue, E> {
        Ok(FormValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<FormValue, E> {
        Ok(FormValue::Null)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<FormValue, E> {
        Ok(FormValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<FormValue, E> {
        Ok(FormValue::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<FormValue, E> {
        Ok(FormValue::Number(FormNumber::from_unsigned(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<FormValue, E> {
        Ok(FormValue::Number(FormNumber::Float(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<FormValue, E> {
        Ok(FormValue::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<FormValue, E> {
        Ok(FormValue::String(v))
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<FormValue, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element()? {
            values.push(value);
        }
        Ok(FormValue::Array(values))
    }

    fn visit_map<A: de::MapAccess<'de>>(self, mut access: A) -> Result<FormValue, A::Error> {
        let mut map = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(FormValue::Object(map))
    }
}

impl<'de> Deserialize<'de> for FormValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FormValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{FormNumber, FormValue};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn parsed_ids_equal_built_ids() {
        let v = FormValue::parse_json5("{ type: 'radio-preference', channel: 3, statement: 4, }").unwrap();
        let obj = v.as_object().unwrap();

        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["type", "channel", "statement"]);
        assert_eq!(obj.get("channel"), Some(&FormValue::from(3)));
        assert_eq!(v.get("statement").and_then(FormValue::as_i64), Some(4));
        assert_eq!(FormValue::parse_json5("-2").unwrap(), FormValue::from(-2));
    }

    #[test]
    fn integers_beyond_i64_become_floats() {
        let v = FormValue::parse_json5("18446744073709551615").unwrap();
        assert!(matches!(v, FormValue::Number(FormNumber::Float(_))));
        assert_eq!(v.as_i64(), None);
    }

    #[test]
    fn float_ids_are_not_integers() {
        let v = FormValue::parse_json5("{ channel: 3.5 }").unwrap();
        assert_eq!(v.get("channel").and_then(FormValue::as_i64), None);
    }

    #[test]
    fn truthiness_follows_toggle_semantics() {
        assert!(FormValue::from(1).is_truthy());
        assert!(!FormValue::from(0).is_truthy());
        assert!(!FormValue::parse_json5("0.0").unwrap().is_truthy());
        assert!(!FormValue::Null.is_truthy());
        assert!(FormValue::Bool(true).is_truthy());
        assert!(!FormValue::from("").is_truthy());
    }

    #[test]
    fn compact_output_uses_bare_keys() {
        let mut map = IndexMap::new();
        map.insert("id".to_string(), FormValue::from("3|4"));
        map.insert("default".to_string(), FormValue::Null);
        map.insert("border-t".to_string(), FormValue::from("1px"));
        let v = FormValue::Object(map);
        assert_eq!(v.to_json5_compact(), r#"{id: "3|4", default: null, "border-t": "1px"}"#);
    }

    #[test]
    fn pretty_output_has_trailing_commas() {
        let v = FormValue::parse_json5("{ a: [1, 'x'], b: {}, c: [] }").unwrap();
        assert_eq!(
            v.to_json5_pretty(),
            "{\n  a: [\n    1,\n    \"x\",\n  ],\n  b: {},\n  c: [],\n}\n"
        );
    }

    #[test]
    fn pretty_output_reparses_to_same_value() {
        let v = FormValue::parse_json5(
            "{ schema: { a: { type: 'object', schema: { b: { items: [{ value: 1, label: 'Yes \"please\"\\n' }], w: 0.25 } } } } }",
        )
        .unwrap();
        let text = v.to_json5_pretty();
        assert_eq!(FormValue::parse_json5(&text).unwrap(), v);
    }

    #[test]
    fn option_converts_to_null_when_absent() {
        assert_eq!(FormValue::from(None::<i64>), FormValue::Null);
        assert_eq!(FormValue::from(Some(2_i64)), FormValue::from(2));
    }
}
