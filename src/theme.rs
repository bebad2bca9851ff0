use crate::error::{Error, Result};
use crate::fields::FieldPatch;
use crate::statics;
use crate::value::FormValue;
use indexmap::IndexMap;
use tracing::{debug, error};

/// Resolve a length to pixels, following `var(--vf-<name>)` references through
/// `data` for at most `MAX_VARIABLE_DEPTH` hops.
pub fn resolve_length(data: &IndexMap<String, FormValue>, field: &str, value: &str) -> Result<f64> {
    let mut current = value.trim().to_string();

    for _ in 0..=statics::MAX_VARIABLE_DEPTH {
        if let Some(px) = parse_unit(&current, statics::THEME_UNIT_PX) {
            return Ok(px);
        }
        if let Some(rem) = parse_unit(&current, statics::THEME_UNIT_REM) {
            return Ok(rem * statics::THEME_REM_IN_PX);
        }
        let Some(variable) = variable_name(&current) else {
            return Err(Error::UnresolvedLength {
                field: field.to_string(),
                value: current,
            });
        };
        current = data
            .get(variable)
            .and_then(FormValue::as_str)
            .map(|v| v.trim().to_string())
            .ok_or_else(|| Error::MissingVariable {
                field: field.to_string(),
                variable: variable.to_string(),
            })?;
    }

    Err(Error::LengthReferenceTooDeep {
        field: field.to_string(),
        depth: statics::MAX_VARIABLE_DEPTH,
    })
}

/// Editor value of a border width stored as four side members. Resolution
/// failures are logged and leave the field empty.
pub fn load_border_width(data: &IndexMap<String, FormValue>, field: &str) -> Option<f64> {
    let key = side_key(field, statics::THEME_SIDES[0]);
    let Some(value) = data.get(&key).and_then(FormValue::as_str) else {
        debug!(field, "no stored border width");
        return None;
    };

    match resolve_length(data, &key, value) {
        Ok(px) => Some(px),
        Err(err) => {
            error!(field, %err, "could not load border width");
            None
        }
    }
}

/// One width applied to every side.
pub fn save_border_width(field: &str, px: f64) -> FieldPatch {
    let mut patch = FieldPatch::default();
    for side in statics::THEME_SIDES {
        patch.update.insert(
            side_key(field, side),
            FormValue::from(format!("{px}{}", statics::THEME_UNIT_PX)),
        );
    }
    patch
}

/// Editor value of a color member: named colors become hex, and a variable
/// reference is replaced by the referenced member (one hop).
pub fn load_color(data: &IndexMap<String, FormValue>, field: &str) -> Option<String> {
    let value = data.get(field)?.as_str()?.to_lowercase();
    if value.is_empty() {
        return None;
    }

    for (name, hex) in [
        statics::THEME_COLOR_TRANSPARENT,
        statics::THEME_COLOR_WHITE,
        statics::THEME_COLOR_BLACK,
    ] {
        if value == name {
            return Some(hex.to_string());
        }
    }

    match variable_name(&value) {
        Some(variable) => data.get(variable)?.as_str().map(str::to_string),
        None => Some(value),
    }
}

fn side_key(field: &str, side: &str) -> String {
    format!("{field}-{side}")
}

fn variable_name(value: &str) -> Option<&str> {
    value
        .strip_prefix(statics::THEME_VAR_PREFIX)?
        .strip_suffix(statics::THEME_VAR_SUFFIX)
        .filter(|name| !name.is_empty() && !name.contains(')'))
}

/// `<digits>[.<digits>]<unit>`; signs, exponents and bare units are rejected.
fn parse_unit(value: &str, unit: &str) -> Option<f64> {
    let number = value.strip_suffix(unit)?;
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    number.parse().ok()
}
