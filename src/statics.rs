// Central place for member keys, UI strings and other non-localized constants.
// Keep these out of the engine modules to reduce duplication and make tweaks safer.

// Schema document structure keys (SC_ prefix)
pub const SC_SCHEMA: &str = "schema";
pub const SC_NAME: &str = "name";
pub const SC_TYPE: &str = "type";

// Container element types.
pub const SC_TYPE_OBJECT: &str = "object";
pub const SC_TYPE_GROUP: &str = "group";

// Preference element types.
pub const SC_TYPE_RADIO_PREFERENCE: &str = "radio-preference";
pub const SC_TYPE_CHECKBOX_PREFERENCE: &str = "checkbox-preference";
pub const SC_TYPE_TOGGLE_PREFERENCE: &str = "toggle-preference";

// Path segments are joined with a dot, composite ids with a pipe.
pub const PATH_SEPARATOR: char = '.';
pub const ID_SEPARATOR: &str = "|";

// Preference element member keys (FIELD_ prefix)
pub const FIELD_TYPE: &str = "type";
pub const FIELD_ID: &str = "id";
pub const FIELD_DEFAULT: &str = "default";
pub const FIELD_VIEW: &str = "view";
pub const FIELD_CHANNEL: &str = "channel";
pub const FIELD_STATEMENT: &str = "statement";
pub const FIELD_MODE: &str = "mode";
pub const FIELD_ONLY_ALLOW_OPT_OUT: &str = "onlyAllowOptOut";
pub const FIELD_SHOW_CHANNEL: &str = "showChannel";
pub const FIELD_ITEMS: &str = "items";
pub const FIELD_SUBTITLE_ITEMS: &str = "subtitle_items";

// Item row member keys.
pub const ITEM_VALUE: &str = "value";
pub const ITEM_LABEL: &str = "label";
pub const ITEM_DISPLAY_LABEL: &str = "displayLabel";

// Mode values.
pub const MODE_BINARY: &str = "binary";
pub const MODE_TRINARY: &str = "trinary";

// View values.
pub const VIEW_DEFAULT: &str = "default";
pub const VIEW_TABS: &str = "tabs";
pub const VIEW_BLOCKS: &str = "blocks";

// Item values. `NoChange` doubles as the forced default sentinel.
pub const OPTION_OPT_OUT: i64 = 0;
pub const OPTION_OPT_IN: i64 = 1;
pub const OPTION_NO_CHANGE: i64 = 2;

// Default persisted labels of the option list.
pub const EN_ITEM_LABEL_OPT_IN: &str = "Opt In";
pub const EN_ITEM_LABEL_OPT_OUT: &str = "Opt Out";
pub const EN_ITEM_LABEL_NO_CHANGE: &str = "No Change";

// Read-only captions shown next to each option row (never persisted).
pub const EN_CAPTION_OPT_IN: &str = "Opt in";
pub const EN_CAPTION_OPT_OUT: &str = "Opt out";
pub const EN_CAPTION_NO_CHANGE: &str = "No change";

// English UI strings (EN_ prefix to make future localization easier)
pub const EN_LABEL_VIEW: &str = "View";
pub const EN_LABEL_CHANNEL: &str = "Channel";
pub const EN_LABEL_STATEMENT: &str = "Statement";
pub const EN_LABEL_ONLY_ALLOW_OPT_OUT: &str = "Only allow opt out";
pub const EN_LABEL_SHOW_CHANNEL: &str = "Show channel name";
pub const EN_LABEL_OPTIONS: &str = "Options";
pub const EN_LABEL_ITEM_PLACEHOLDER: &str = "Label";

pub const EN_CHOICE_DEFAULT: &str = "Default";
pub const EN_CHOICE_TABS: &str = "Tabs";
pub const EN_CHOICE_BLOCKS: &str = "Blocks";
pub const EN_CHOICE_BINARY: &str = "Binary";
pub const EN_CHOICE_TRINARY: &str = "Trinary";
pub const EN_CHOICE_ON: &str = "On";
pub const EN_CHOICE_OFF: &str = "Off";

pub const EN_PLACEHOLDER_CHANNEL: &str = "Select a channel";
pub const EN_PLACEHOLDER_STATEMENT: &str = "Select a statement";
pub const EN_NO_STATEMENTS: &str = "The list is empty (you might need to select a Channel first)";

// Element kinds as listed in the builder palette.
pub const EN_KIND_RADIO_LABEL: &str = "Radio Preference";
pub const EN_KIND_RADIO_DESCRIPTION: &str = "Channel preference using radio";
pub const EN_KIND_CHECKBOX_LABEL: &str = "Checkbox Preference";
pub const EN_KIND_CHECKBOX_DESCRIPTION: &str = "Channel preference using checkbox";
pub const EN_KIND_TOGGLE_LABEL: &str = "Toggle Preference";
pub const EN_KIND_TOGGLE_DESCRIPTION: &str = "Channel preference using toggle";

pub const EN_EMPTY: &str = "";

// Theme variable resolution.
pub const THEME_VAR_PREFIX: &str = "var(--vf-";
pub const THEME_VAR_SUFFIX: &str = ")";
pub const THEME_UNIT_PX: &str = "px";
pub const THEME_UNIT_REM: &str = "rem";
pub const THEME_REM_IN_PX: f64 = 16.0;
pub const THEME_SIDES: [&str; 4] = ["t", "r", "b", "l"];
pub const THEME_COLOR_TRANSPARENT: (&str, &str) = ("transparent", "#00000000");
pub const THEME_COLOR_WHITE: (&str, &str) = ("white", "#ffffff");
pub const THEME_COLOR_BLACK: (&str, &str) = ("black", "#000000");

/// Upper bound on `var(--vf-*)` hops before a length is considered unresolvable.
pub const MAX_VARIABLE_DEPTH: usize = 8;

/// Upper bound on cascading derived-field passes within one reactive update.
pub const MAX_SYNC_PASSES: usize = 16;

// Newline constant (used for document formatting; keep out of value code).
pub const NL_LF: &str = "\n";
