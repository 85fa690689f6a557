// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::ids::RowId;
use crate::record::{FieldValue, Record};
use crate::schema::{ColumnSpec, EditorKind, ToggleMapping};

/// Raw value a user committed in an inline cell editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellInput {
    /// Free text from a text or numeric editor.
    Text(String),
    /// Wire name picked from an enumerated editor.
    Choice(String),
    Toggle(bool),
}

/// A single field change for one row. Consumed once by the row store.
#[derive(Debug, Clone, PartialEq)]
pub struct EditIntent {
    pub row_id: RowId,
    pub field: &'static str,
    pub value: FieldValue,
}

impl EditIntent {
    /// The record with this intent's field replaced, or `None` when the
    /// record rejects the value.
    pub fn apply<R: Record>(&self, record: &R) -> Option<R> {
        let mut next = record.clone();
        next.set_field(self.field, &self.value).then_some(next)
    }
}

/// Parses numeric editor input. Anything that is not a finite number
/// becomes zero.
pub fn coerce_number(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// The option after `current`, wrapping around. Unknown `current` starts at
/// the first option.
pub fn cycle_choice(options: &'static [&'static str], current: &str) -> Option<&'static str> {
    let next = options
        .iter()
        .position(|option| *option == current)
        .map_or(0, |position| (position + 1) % options.len());
    options.get(next).copied()
}

/// Turns an editor commit into an intent. Returns `None` when the column is
/// not editable, the input does not fit the editor, or the value would not
/// change.
pub fn commit_cell<R: Record>(
    record: &R,
    column: &ColumnSpec,
    input: CellInput,
) -> Option<EditIntent> {
    let editor = column.editor?;
    let Some(value) = coerce_input(editor, input) else {
        debug!(
            kind = R::KIND.as_str(),
            field = column.key,
            "cell input does not fit the column editor"
        );
        return None;
    };
    if record.field(column.key).as_ref() == Some(&value) {
        return None;
    }
    Some(EditIntent {
        row_id: record.id().clone(),
        field: column.key,
        value,
    })
}

fn coerce_input(editor: EditorKind, input: CellInput) -> Option<FieldValue> {
    match (editor, input) {
        (EditorKind::Text, CellInput::Text(text)) => Some(FieldValue::Text(text)),
        (EditorKind::Number, CellInput::Text(text)) => {
            Some(FieldValue::Number(coerce_number(&text)))
        }
        (EditorKind::Choice(options), CellInput::Choice(choice)) => options
            .iter()
            .copied()
            .find(|option| *option == choice)
            .map(FieldValue::Choice),
        (EditorKind::Toggle(ToggleMapping::Flag), CellInput::Toggle(on)) => {
            Some(FieldValue::Flag(on))
        }
        (EditorKind::Toggle(ToggleMapping::Choice { on, off }), CellInput::Toggle(state)) => {
            Some(FieldValue::Choice(if state { on } else { off }))
        }
        _ => None,
    }
}

/// Current toggle state of a cell, for editors that flip it.
pub fn toggle_state(mapping: ToggleMapping, value: &FieldValue) -> bool {
    match mapping {
        ToggleMapping::Flag => value.as_flag().unwrap_or(false),
        ToggleMapping::Choice { on, .. } => value.as_choice() == Some(on),
    }
}
