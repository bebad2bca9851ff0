use crate::catalog::{Catalog, ChannelId};
use crate::controller::{SelectionController, UpdateMode};
use crate::document::FormDocument;
use crate::error::{Error, Result};
use crate::fields::{FieldPatch, PropertyField, SchemaContext, SubField};
use crate::host::{Host, SelectOption, TickTask};
use crate::items::{self, EditableItem};
use crate::schema::{ElementKind, SchemaTree};
use crate::statics;
use crate::sync::WatchTable;
use crate::value::FormValue;
use indexmap::IndexMap;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tracing::{debug, warn};

/// Host state backed by a document.
///
/// Option lists handed to a widget stay pending until the next render commit;
/// the statement widget of the selected element refuses values that are not
/// among its visible options.
#[derive(Debug)]
pub struct DocumentHost {
    document: FormDocument,
    selected: Option<String>,
    pending_options: HashMap<String, Vec<SelectOption>>,
    visible_options: HashMap<String, Vec<SelectOption>>,
    ticks: VecDeque<TickTask>,
    changes: Vec<(String, String)>,
}

impl DocumentHost {
    pub fn new(document: FormDocument) -> Self {
        Self {
            document,
            selected: None,
            pending_options: HashMap::new(),
            visible_options: HashMap::new(),
            ticks: VecDeque::new(),
            changes: Vec::new(),
        }
    }

    pub fn document(&self) -> &FormDocument {
        &self.document
    }

    pub fn into_document(self) -> FormDocument {
        self.document
    }

    /// Move the selection. A remount drops every widget's option list.
    pub fn select(&mut self, path: Option<String>, remount: bool) {
        if remount {
            self.pending_options.clear();
            self.visible_options.clear();
        }
        self.selected = path;
    }

    /// Make pending option lists visible.
    pub fn commit_options(&mut self) {
        self.visible_options.extend(self.pending_options.drain());
    }

    pub fn visible_options(&self, key: &str) -> &[SelectOption] {
        self.visible_options.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn take_ticks(&mut self) -> Vec<TickTask> {
        self.ticks.drain(..).collect()
    }

    /// Members written since the last call, as `(path, key)`.
    pub fn take_changes(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.changes)
    }

    pub fn apply_patch(&mut self, path: &str, patch: &FieldPatch) -> Result<()> {
        for (key, value) in &patch.update {
            self.set_field_value(path, key, value.clone())?;
        }
        for key in &patch.remove {
            self.remove_field(path, key);
        }
        Ok(())
    }

    fn check_rendered(&self, path: &str, key: &str, value: &FormValue) -> Result<()> {
        if key != statics::FIELD_STATEMENT || self.selected.as_deref() != Some(path) {
            return Ok(());
        }
        let Some(v) = value.as_i64() else {
            return Ok(());
        };
        if self.visible_options(key).iter().any(|o| o.value == v) {
            Ok(())
        } else {
            Err(Error::OptionNotRendered {
                field: key.to_string(),
                value: v,
            })
        }
    }
}

impl Host for DocumentHost {
    fn tree(&self) -> SchemaTree {
        self.document.tree()
    }

    fn field_value(&self, path: &str, key: &str) -> Option<FormValue> {
        self.document.element(path)?.get(key).cloned()
    }

    fn set_field_value(&mut self, path: &str, key: &str, value: FormValue) -> Result<()> {
        self.check_rendered(path, key, &value)?;
        let element = self
            .document
            .element_mut(path)
            .ok_or_else(|| Error::ElementNotFound { path: path.to_string() })?;

        if element.get(key) == Some(&value) {
            return Ok(());
        }
        element.insert(key.to_string(), value);
        self.document.mark_dirty();
        self.changes.push((path.to_string(), key.to_string()));
        Ok(())
    }

    fn remove_field(&mut self, path: &str, key: &str) {
        let Some(element) = self.document.element_mut(path) else {
            return;
        };
        if element.shift_remove(key).is_some() {
            self.document.mark_dirty();
            self.changes.push((path.to_string(), key.to_string()));
        }
    }

    fn selected_path(&self) -> Option<String> {
        self.selected.clone()
    }

    fn set_field_options(&mut self, key: &str, options: Vec<SelectOption>) {
        self.pending_options.insert(key.to_string(), options);
    }

    fn schedule_next_tick(&mut self, task: TickTask) {
        self.ticks.push_back(task);
    }
}

/// The property panel of one preference element at a time.
#[derive(Debug)]
pub struct EditorSession {
    host: DocumentHost,
    controller: SelectionController,
    kind: Option<ElementKind>,
    displayed_channel: Option<ChannelId>,
    panel: IndexMap<String, FormValue>,
}

impl EditorSession {
    pub fn new(document: FormDocument, catalog: Rc<Catalog>) -> Self {
        Self {
            host: DocumentHost::new(document),
            controller: SelectionController::new(catalog),
            kind: None,
            displayed_channel: None,
            panel: IndexMap::new(),
        }
    }

    pub fn document(&self) -> &FormDocument {
        self.host.document()
    }

    pub fn into_document(self) -> FormDocument {
        self.host.into_document()
    }

    pub fn host(&self) -> &DocumentHost {
        &self.host
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    pub fn selected_path(&self) -> Option<String> {
        self.host.selected_path()
    }

    /// Current member of the selected element.
    pub fn field_value(&self, key: &str) -> Option<FormValue> {
        let path = self.host.selected_path()?;
        self.host.field_value(&path, key)
    }

    /// Navigate to a preference element and populate the panel from its stored members.
    ///
    /// Switching between two elements of the same kind reuses the panel's
    /// widgets, so the channel widget only reports a change when the stored
    /// value differs from the one it was showing.
    pub fn select_element(&mut self, path: &str) -> Result<()> {
        let tree = self.host.tree();
        let element = tree
            .preference(path)
            .ok_or_else(|| Error::ElementNotFound { path: path.to_string() })?;

        let remount = self.kind != Some(element.kind);
        if remount {
            self.displayed_channel = None;
        }
        self.kind = Some(element.kind);
        self.host.select(Some(path.to_string()), remount);

        let empty = IndexMap::new();
        let data = self.host.document().element(path).unwrap_or(&empty);
        self.panel = element
            .kind
            .property_fields()
            .iter()
            .filter_map(|field| field.load(data))
            .flatten()
            .collect();

        let stored = self
            .host
            .field_value(path, statics::FIELD_CHANNEL)
            .and_then(|v| v.as_i64())
            .map(ChannelId);
        debug!(path, kind = element.kind.type_name(), channel = ?stored, remount, "element selected");

        let shown = self.displayed_channel;
        self.displayed_channel = stored;
        self.controller
            .on_channel_change(&mut self.host, stored, shown, UpdateMode::Loading)?;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.host.select(None, true);
        self.kind = None;
        self.displayed_channel = None;
        self.panel.clear();
    }

    /// One render tick: commit widget option lists, detect a passive element
    /// switch, then run the tasks deferred to this tick.
    pub fn render(&mut self) {
        self.host.commit_options();
        if self.controller.on_render(&mut self.host) {
            self.host.commit_options();
        }

        for task in self.host.take_ticks() {
            if let Err(err) = self.controller.run_task(&mut self.host, task) {
                warn!(%err, "deferred selection rejected");
            }
        }
        self.settle();
    }

    /// A user edit of one member of the selected element.
    pub fn edit_field(&mut self, key: &str, value: FormValue) -> Result<()> {
        let path = self.host.selected_path().ok_or(Error::NoSelection)?;
        let kind = self.kind.ok_or(Error::NoSelection)?;

        if key == statics::FIELD_CHANNEL {
            let channel = value.as_i64().map(ChannelId);
            if let Some(c) = channel {
                if !self.channel_options().iter().any(|o| o.value == c.0) {
                    return Err(Error::OptionNotRendered {
                        field: key.to_string(),
                        value: c.0,
                    });
                }
            }
            let shown = self.displayed_channel;
            self.controller
                .on_channel_change(&mut self.host, channel, shown, UpdateMode::User)?;
            self.displayed_channel = channel;
        } else {
            let old = self.host.field_value(&path, key);
            let field = kind.property_fields().iter().find(|f| f.key() == key);
            match field.and_then(|f| f.save(&value, old.as_ref(), key, &path)) {
                Some(patch) => self.host.apply_patch(&path, &patch)?,
                None => self.host.set_field_value(&path, key, value.clone())?,
            }
            if key == statics::FIELD_ITEMS {
                let rows = items::load_items(Some(&value));
                self.panel.insert(key.to_string(), items::items_to_value(&rows));
            }
        }

        self.settle();
        Ok(())
    }

    /// Editable option rows of the selected radio preference.
    pub fn editable_items(&self) -> Vec<EditableItem> {
        items::load_items(self.panel.get(statics::FIELD_ITEMS))
    }

    /// Returns false when `index` is out of range.
    pub fn relabel_item(&mut self, index: usize, label: &str) -> Result<bool> {
        let mut rows = self.editable_items();
        let Some(row) = rows.get_mut(index) else {
            return Ok(false);
        };
        row.relabel(label);
        self.edit_field(statics::FIELD_ITEMS, items::items_to_value(&rows))?;
        Ok(true)
    }

    /// Returns false when either index is out of range.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<bool> {
        let mut rows = self.editable_items();
        if !items::move_item(&mut rows, from, to) {
            return Ok(false);
        }
        self.edit_field(statics::FIELD_ITEMS, items::items_to_value(&rows))?;
        Ok(true)
    }

    pub fn channel_options(&self) -> Vec<SelectOption> {
        self.controller.channel_options(&self.host)
    }

    /// The statement list the widget currently shows.
    pub fn statement_options(&self) -> &[SelectOption] {
        self.host.visible_options(statics::FIELD_STATEMENT)
    }

    /// Sub-field descriptions of every property field of the selected element, in panel order.
    pub fn property_schema(&self) -> Result<Vec<(PropertyField, Vec<SubField>)>> {
        let kind = self.kind.ok_or(Error::NoSelection)?;
        let ctx = SchemaContext {
            kind,
            channel_options: self.channel_options(),
        };
        Ok(kind
            .property_fields()
            .iter()
            .map(|field| (*field, field.schema(&ctx)))
            .collect())
    }

    /// Run derived-field watchers until no member changes, bounded by `MAX_SYNC_PASSES`.
    fn settle(&mut self) {
        let tree = self.host.tree();
        for _ in 0..statics::MAX_SYNC_PASSES {
            let changes = self.host.take_changes();
            if changes.is_empty() {
                return;
            }
            for (path, key) in changes {
                let Some(element) = tree.preference(&path) else {
                    continue;
                };
                WatchTable::for_kind(element.kind).dispatch(&mut self.host, &path, &key);
            }
        }
        warn!(passes = statics::MAX_SYNC_PASSES, "derived fields did not settle");
    }
}
