//! Field and resource schema types, deserializable from JSON.

use serde::{Deserialize, Serialize};

/// Value kind of a form field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[serde(alias = "number")]
    Decimal,
    #[serde(alias = "int")]
    Integer,
    Text,
    #[serde(alias = "select")]
    SingleChoice,
    #[serde(alias = "multiselect")]
    MultiChoice,
}

impl FieldKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Decimal | FieldKind::Integer)
    }

    pub fn is_choice(self) -> bool {
        matches!(self, FieldKind::SingleChoice | FieldKind::MultiChoice)
    }
}

/// How a choice value is written into the submit payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueEncoding {
    String,
    Number,
    #[serde(alias = "number[]", alias = "number_array")]
    NumberArray,
}

/// What an empty multi-choice selection submits as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptySelection {
    /// `[]`
    EmptyList,
    /// `null`
    Null,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub label: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, alias = "options", skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    #[serde(
        default,
        alias = "valueEncoding",
        alias = "valueType",
        skip_serializing_if = "Option::is_none"
    )]
    pub value_encoding: Option<ValueEncoding>,
    #[serde(default, alias = "emptySelection", skip_serializing_if = "Option::is_none")]
    pub empty_selection: Option<EmptySelection>,
}

impl FieldSchema {
    fn of_kind(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            min: None,
            max: None,
            step: None,
            optional: false,
            choices: None,
            value_encoding: None,
            empty_selection: None,
        }
    }

    pub fn decimal(name: &str, label: &str) -> Self {
        Self::of_kind(name, label, FieldKind::Decimal)
    }

    pub fn integer(name: &str, label: &str) -> Self {
        Self::of_kind(name, label, FieldKind::Integer)
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::of_kind(name, label, FieldKind::Text)
    }

    pub fn single_choice(name: &str, label: &str, choices: Vec<Choice>) -> Self {
        Self {
            choices: Some(choices),
            ..Self::of_kind(name, label, FieldKind::SingleChoice)
        }
    }

    pub fn multi_choice(name: &str, label: &str, choices: Vec<Choice>) -> Self {
        Self {
            choices: Some(choices),
            ..Self::of_kind(name, label, FieldKind::MultiChoice)
        }
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn encoded_as(mut self, encoding: ValueEncoding) -> Self {
        self.value_encoding = Some(encoding);
        self
    }

    pub fn empty_as(mut self, empty: EmptySelection) -> Self {
        self.empty_selection = Some(empty);
        self
    }

    pub fn choices(&self) -> &[Choice] {
        self.choices.as_deref().unwrap_or(&[])
    }

    /// Encoding actually used on submit. Multi-choice fields default to a list of numbers.
    pub fn encoding(&self) -> ValueEncoding {
        match (self.value_encoding, self.kind) {
            (Some(e), _) => e,
            (None, FieldKind::MultiChoice) => ValueEncoding::NumberArray,
            (None, FieldKind::Decimal | FieldKind::Integer) => ValueEncoding::Number,
            (None, _) => ValueEncoding::String,
        }
    }

    /// Empty multi-choice representation: explicit setting, else `null` when optional and `[]` when required.
    pub fn empty_selection(&self) -> EmptySelection {
        self.empty_selection.unwrap_or(if self.optional {
            EmptySelection::Null
        } else {
            EmptySelection::EmptyList
        })
    }
}

/// A named REST collection and the fields its entry form is built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub resource: String,
    pub title: String,
    pub fields: Vec<FieldSchema>,
}

impl ResourceSchema {
    pub fn new(resource: &str, title: &str, fields: Vec<FieldSchema>) -> Self {
        Self {
            resource: resource.to_string(),
            title: title.to_string(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Add or replace a field, e.g. one whose choices come from data loaded at runtime.
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }
}
