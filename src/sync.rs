use crate::host::Host;
use crate::schema::{ElementKind, Mode};
use crate::statics;
use crate::value::FormValue;
use std::fmt;
use tracing::{debug, warn};

/// Recompute a derived member from the element path and its source values, in declared order.
pub type Recompute = fn(&str, &[FormValue]) -> FormValue;

/// A derived member: whenever one of `sources` changes, `target` is recomputed
/// from the current values of all of them.
#[derive(Clone, Copy)]
pub struct Watcher {
    pub target: &'static str,
    pub sources: &'static [&'static str],
    pub recompute: Recompute,
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("target", &self.target)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

impl Watcher {
    pub fn watches(&self, key: &str) -> bool {
        self.sources.iter().any(|source| *source == key)
    }

    /// Compute the target value from the element's current source members.
    pub fn evaluate<H: Host + ?Sized>(&self, host: &H, path: &str) -> FormValue {
        let values: Vec<FormValue> = self
            .sources
            .iter()
            .map(|source| host.field_value(path, source).unwrap_or_default())
            .collect();
        (self.recompute)(path, &values)
    }
}

/// The watchers active for one element kind.
#[derive(Debug, Clone, Default)]
pub struct WatchTable {
    watchers: Vec<Watcher>,
}

impl WatchTable {
    pub fn new(watchers: Vec<Watcher>) -> Self {
        Self { watchers }
    }

    pub fn for_kind(kind: ElementKind) -> Self {
        Self::new(
            kind.property_fields()
                .iter()
                .flat_map(|field| field.watchers().iter().copied())
                .collect(),
        )
    }

    pub fn watchers(&self) -> &[Watcher] {
        &self.watchers
    }

    /// Recompute every watcher that lists `changed_key`. Returns the targets rewritten;
    /// a target whose value is already current is left alone.
    pub fn dispatch<H: Host + ?Sized>(&self, host: &mut H, path: &str, changed_key: &str) -> Vec<&'static str> {
        let mut rewritten = Vec::new();

        for watcher in self.watchers.iter().filter(|w| w.watches(changed_key)) {
            let next = watcher.evaluate(&*host, path);
            let current = host.field_value(path, watcher.target).unwrap_or_default();
            if current == next {
                continue;
            }

            debug!(
                path,
                source = changed_key,
                target = watcher.target,
                value = %next.to_json5_compact(),
                "recomputed derived field"
            );
            match host.set_field_value(path, watcher.target, next) {
                Ok(()) => rewritten.push(watcher.target),
                Err(err) => warn!(path, target = watcher.target, %err, "derived field rejected"),
            }
        }

        rewritten
    }
}

/// `"<channel>|<statement>"`, with empty parts for unset sources.
pub fn composite_id(_path: &str, sources: &[FormValue]) -> FormValue {
    let parts: Vec<String> = sources.iter().map(id_part).collect();
    FormValue::from(parts.join(statics::ID_SEPARATOR))
}

/// Binary mode with opt-in allowed offers no "no change" option, so no default is forced.
/// Every other combination defaults to "no change".
pub fn default_for_mode(_path: &str, sources: &[FormValue]) -> FormValue {
    let mode = Mode::from_value(sources.first());
    let only_allow_opt_out = sources.get(1).is_some_and(FormValue::is_truthy);

    if mode == Mode::Binary && !only_allow_opt_out {
        FormValue::Null
    } else {
        FormValue::from(statics::OPTION_NO_CHANGE)
    }
}

fn id_part(value: &FormValue) -> String {
    match value {
        FormValue::Number(_) => value.to_json5_compact(),
        FormValue::String(s) => s.clone(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::host::{SelectOption, TickTask};
    use crate::schema::SchemaTree;
    use std::collections::HashMap;

    /// Flat member store for one element.
    #[derive(Default)]
    struct MapHost {
        members: HashMap<String, FormValue>,
        reject: Option<&'static str>,
    }

    impl Host for MapHost {
        fn tree(&self) -> SchemaTree {
            SchemaTree::default()
        }

        fn field_value(&self, _path: &str, key: &str) -> Option<FormValue> {
            self.members.get(key).cloned()
        }

        fn set_field_value(&mut self, path: &str, key: &str, value: FormValue) -> Result<()> {
            if self.reject == Some(key) {
                return Err(Error::ElementNotFound { path: path.to_string() });
            }
            self.members.insert(key.to_string(), value);
            Ok(())
        }

        fn remove_field(&mut self, _path: &str, key: &str) {
            self.members.remove(key);
        }

        fn selected_path(&self) -> Option<String> {
            Some("p".to_string())
        }

        fn set_field_options(&mut self, _key: &str, _options: Vec<SelectOption>) {}

        fn schedule_next_tick(&mut self, _task: TickTask) {}
    }

    #[test]
    fn composite_id_uses_empty_parts() {
        assert_eq!(composite_id("p", &[FormValue::Null, FormValue::Null]), FormValue::from("|"));
        assert_eq!(composite_id("p", &[FormValue::from(3), FormValue::Null]), FormValue::from("3|"));
        assert_eq!(composite_id("p", &[FormValue::from(3), FormValue::from(4)]), FormValue::from("3|4"));
    }

    #[test]
    fn default_rule_covers_every_combination() {
        let binary = FormValue::from("binary");
        let trinary = FormValue::from("trinary");
        let on = FormValue::from(1);
        let off = FormValue::from(0);

        assert_eq!(default_for_mode("p", &[binary.clone(), off.clone()]), FormValue::Null);
        assert_eq!(default_for_mode("p", &[binary, on.clone()]), FormValue::from(2));
        assert_eq!(default_for_mode("p", &[trinary.clone(), off]), FormValue::from(2));
        assert_eq!(default_for_mode("p", &[trinary, on]), FormValue::from(2));
        // Unset members read as the editor defaults: binary, opt-in allowed.
        assert_eq!(default_for_mode("p", &[FormValue::Null, FormValue::Null]), FormValue::Null);
    }

    #[test]
    fn dispatch_feeds_all_sources_and_skips_unrelated_keys() {
        let table = WatchTable::for_kind(ElementKind::Radio);
        let mut host = MapHost::default();
        host.members.insert("channel".into(), FormValue::from(3));
        host.members.insert("statement".into(), FormValue::from(4));

        assert!(table.dispatch(&mut host, "p", "label").is_empty());
        assert_eq!(table.dispatch(&mut host, "p", "statement"), vec!["id"]);
        assert_eq!(host.members.get("id"), Some(&FormValue::from("3|4")));

        // Already current: nothing rewritten.
        assert!(table.dispatch(&mut host, "p", "channel").is_empty());
    }

    #[test]
    fn dispatch_updates_default_for_mode_changes() {
        let table = WatchTable::for_kind(ElementKind::Radio);
        let mut host = MapHost::default();
        host.members.insert("mode".into(), FormValue::from("trinary"));

        assert_eq!(table.dispatch(&mut host, "p", "mode"), vec!["default"]);
        assert_eq!(host.members.get("default"), Some(&FormValue::from(2)));

        host.members.insert("mode".into(), FormValue::from("binary"));
        assert_eq!(table.dispatch(&mut host, "p", "mode"), vec!["default"]);
        assert_eq!(host.members.get("default"), Some(&FormValue::Null));
    }

    #[test]
    fn checkbox_has_no_default_watcher() {
        let table = WatchTable::for_kind(ElementKind::Checkbox);
        let targets: Vec<&str> = table.watchers().iter().map(|w| w.target).collect();
        assert_eq!(targets, vec!["id"]);
    }

    #[test]
    fn rejected_write_is_not_reported() {
        let table = WatchTable::for_kind(ElementKind::Toggle);
        let mut host = MapHost {
            reject: Some("id"),
            ..MapHost::default()
        };
        host.members.insert("channel".into(), FormValue::from(1));
        assert!(table.dispatch(&mut host, "p", "channel").is_empty());
    }
}
