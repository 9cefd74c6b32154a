//! Observable field store backing a form

use super::field::FieldValue;
use super::schema::{FieldKind, FieldSpec, FormSchema};
use crate::error::FormError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tokio::sync::watch;

/// What changed in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    /// Initial value seen by new subscribers before any edit
    Created,
    Field(&'static str),
    Reset,
}

/// Notification sent to subscribers after every mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub version: u64,
    pub change: StoreChange,
}

/// Immutable copy of every field value at one moment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    schema: &'static FormSchema,
    values: Vec<FieldValue>,
}

impl FormSnapshot {
    pub fn form_name(&self) -> &'static str {
        self.schema.form_name
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    /// Fields paired with their values, in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'static FieldSpec, &FieldValue)> {
        self.schema.fields.iter().zip(self.values.iter())
    }
}

impl Serialize for FormSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (spec, value) in self.iter() {
            map.serialize_entry(spec.name, value)?;
        }
        map.end()
    }
}

/// Current value of every field in a schema
///
/// Every field always holds a value; defaults are an empty string or an
/// empty selection.
#[derive(Debug)]
pub struct FieldStore {
    schema: &'static FormSchema,
    values: Vec<FieldValue>,
    version: u64,
    notifier: watch::Sender<StoreEvent>,
}

impl FieldStore {
    pub fn new(schema: &'static FormSchema) -> Self {
        let (notifier, _) = watch::channel(StoreEvent {
            version: 0,
            change: StoreChange::Created,
        });
        Self {
            schema,
            values: Self::defaults(schema),
            version: 0,
            notifier,
        }
    }

    fn defaults(schema: &'static FormSchema) -> Vec<FieldValue> {
        schema
            .fields
            .iter()
            .map(|f| FieldValue::default_for(&f.kind))
            .collect()
    }

    pub fn schema(&self) -> &'static FormSchema {
        self.schema
    }

    /// Number of mutations applied so far
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    /// Observe every change made to this store
    pub fn subscribe(&self) -> watch::Receiver<StoreEvent> {
        self.notifier.subscribe()
    }

    fn lookup(&self, name: &str) -> Result<(usize, &'static FieldSpec), FormError> {
        let index = self
            .schema
            .index_of(name)
            .ok_or_else(|| FormError::InvalidField(name.to_string()))?;
        Ok((index, &self.schema.fields[index]))
    }

    fn notify(&mut self, change: StoreChange) {
        self.version += 1;
        self.notifier.send_replace(StoreEvent {
            version: self.version,
            change,
        });
    }

    /// Overwrite the value of one field
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), FormError> {
        let (index, spec) = self.lookup(name)?;
        if !value.matches_kind(&spec.kind) {
            return Err(FormError::InvalidField(name.to_string()));
        }
        match (&spec.kind, &value) {
            (FieldKind::Choice(options), FieldValue::Text(choice))
                if !choice.is_empty() && !options.contains(&choice.as_str()) =>
            {
                return Err(FormError::InvalidOption {
                    field: name.to_string(),
                    option: choice.clone(),
                });
            }
            (FieldKind::MultiSelect(options), FieldValue::Multi(items)) => {
                if let Some(bad) = items.iter().find(|i| !options.contains(&i.as_str())) {
                    return Err(FormError::InvalidOption {
                        field: name.to_string(),
                        option: bad.clone(),
                    });
                }
            }
            _ => {}
        }

        let value = match value {
            FieldValue::Multi(items) => {
                let mut unique: Vec<String> = Vec::with_capacity(items.len());
                for item in items {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                FieldValue::Multi(unique)
            }
            text => text,
        };

        tracing::debug!(form = self.schema.form_name, field = spec.name, "field set");
        self.values[index] = value;
        self.notify(StoreChange::Field(spec.name));
        Ok(())
    }

    /// Add `option` to a multi-select field, or remove it if already selected
    pub fn toggle_multi_value(&mut self, name: &str, option: &str) -> Result<(), FormError> {
        let (index, spec) = self.lookup(name)?;
        let FieldKind::MultiSelect(options) = spec.kind else {
            return Err(FormError::InvalidField(name.to_string()));
        };
        if !options.contains(&option) {
            return Err(FormError::InvalidOption {
                field: name.to_string(),
                option: option.to_string(),
            });
        }

        if let FieldValue::Multi(items) = &mut self.values[index] {
            if let Some(pos) = items.iter().position(|i| i == option) {
                items.remove(pos);
            } else {
                items.push(option.to_string());
            }
        }
        tracing::debug!(form = self.schema.form_name, field = spec.name, option, "option toggled");
        self.notify(StoreChange::Field(spec.name));
        Ok(())
    }

    /// Push a character onto a text field
    pub fn push_char(&mut self, name: &str, c: char) -> Result<(), FormError> {
        let mut text = self.text_of(name)?;
        text.push(c);
        self.set_field(name, FieldValue::Text(text))
    }

    /// Remove the last character of a text field
    pub fn pop_char(&mut self, name: &str) -> Result<(), FormError> {
        let mut text = self.text_of(name)?;
        if text.pop().is_none() {
            return Ok(());
        }
        self.set_field(name, FieldValue::Text(text))
    }

    fn text_of(&self, name: &str) -> Result<String, FormError> {
        let (index, spec) = self.lookup(name)?;
        match (&spec.kind, &self.values[index]) {
            (FieldKind::Text { .. } | FieldKind::Email, FieldValue::Text(s)) => Ok(s.clone()),
            _ => Err(FormError::InvalidField(name.to_string())),
        }
    }

    /// Restore every field to its default
    pub fn reset(&mut self) {
        self.values = Self::defaults(self.schema);
        tracing::debug!(form = self.schema.form_name, "store reset");
        self.notify(StoreChange::Reset);
    }

    /// Whether every field holds its default
    #[cfg(test)]
    pub fn is_pristine(&self) -> bool {
        self.values == Self::defaults(self.schema)
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            schema: self.schema,
            values: self.values.clone(),
        }
    }
}
