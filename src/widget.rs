use std::{collections::HashMap, fmt, sync::Arc};

use parse_display::{Display, FromStr};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    value::{describe, from_value, to_value},
    FragmentId, SessionState, Value,
};

#[cfg(test)]
mod tests;

/// Identity of a declared widget within a session.
///
/// Keyed widgets are identified by their key.
/// Other widgets are identified by kind and label (and the enclosing form, if any).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[display("{0}")]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn for_key(key: &str) -> Self {
        Self(format!("key:{key}"))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<&str> for WidgetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[display("{0}")]
#[serde(transparent)]
pub struct FormId(String);

impl FormId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<&str> for FormId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr, Serialize, Deserialize)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    TextInput,
    TextArea,
    Selectbox,
    Radio,
    Multiselect,
    Slider,
    NumberInput,
    Checkbox,
    Toggle,
    FileUploader,
    Button,
    FormSubmitButton,
    ChatInput,
}
impl WidgetKind {
    /// Trigger widgets hold their value only for the pass their interaction causes.
    pub fn is_trigger(self) -> bool {
        matches!(self, Self::Button | Self::FormSubmitButton | Self::ChatInput)
    }
}

/// Function called after an interaction is applied and before the next pass runs.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn(&mut SessionState) + Send + Sync>);

impl Callback {
    pub fn new(f: impl Fn(&mut SessionState) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Creates a callback that receives `args` on every call.
    pub fn with_args<A: Send + Sync + 'static>(
        f: impl Fn(&mut SessionState, &A) + Send + Sync + 'static,
        args: A,
    ) -> Self {
        Self::new(move |state| f(state, &args))
    }

    pub(crate) fn call(&self, state: &mut SessionState) {
        (self.0)(state)
    }
}
impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback")
    }
}

/// A file selected by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    #[serde(default)]
    pub mime: String,
    #[serde(default)]
    pub data: Vec<u8>,
}
impl UploadedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            data: data.into(),
        }
    }

    /// Lowercase file extension without the dot.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            None
        } else {
            Some(ext.to_ascii_lowercase())
        }
    }
}

/// Values a widget accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    Text {
        max_chars: Option<usize>,
    },
    Choice {
        options: Vec<String>,
    },
    MultiChoice {
        options: Vec<String>,
        max_selections: Option<usize>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
        integer: bool,
        /// Range of the integer type the value decodes into.
        #[serde(skip)]
        limits: Option<(i128, i128)>,
    },
    Bool,
    File {
        types: Vec<String>,
    },
    Trigger,
    Chat {
        max_chars: Option<usize>,
    },
}

fn expected(what: &str, value: &Value) -> String {
    format!("expected {what}, got {}", describe(value))
}

fn check_text(s: &str, max_chars: Option<usize>) -> Result<(), String> {
    match max_chars {
        Some(max) if s.chars().count() > max => {
            Err(format!("text is longer than {max} characters"))
        }
        _ => Ok(()),
    }
}

fn integer_value(value: &Value, n: f64) -> i128 {
    if let Some(i) = value.as_i64() {
        i128::from(i)
    } else if let Some(u) = value.as_u64() {
        i128::from(u)
    } else {
        n as i128
    }
}

fn check_unique<'a>(items: impl IntoIterator<Item = &'a str>, what: &str) -> Result<(), String> {
    let mut seen = Vec::new();
    for item in items {
        if seen.contains(&item) {
            return Err(format!("duplicate {what} {item:?}"));
        }
        seen.push(item);
    }
    Ok(())
}

impl Constraint {
    /// Validates `value` and returns its normalized form.
    pub fn check(&self, value: &Value) -> Result<Value, String> {
        match self {
            Self::Text { max_chars } => {
                let s = value.as_str().ok_or_else(|| expected("a string", value))?;
                check_text(s, *max_chars)?;
                Ok(value.clone())
            }
            Self::Choice { options } => {
                let s = value.as_str().ok_or_else(|| expected("a string", value))?;
                if options.iter().any(|o| o == s) {
                    Ok(value.clone())
                } else {
                    Err(format!("{s:?} is not one of the options"))
                }
            }
            Self::MultiChoice {
                options,
                max_selections,
            } => {
                let items = value
                    .as_array()
                    .ok_or_else(|| expected("an array of strings", value))?;
                let mut selected = Vec::with_capacity(items.len());
                for item in items {
                    let s = item
                        .as_str()
                        .ok_or_else(|| expected("an array of strings", value))?;
                    if !options.iter().any(|o| o == s) {
                        return Err(format!("{s:?} is not one of the options"));
                    }
                    selected.push(s);
                }
                check_unique(selected, "selection")?;
                match max_selections {
                    Some(max) if items.len() > *max => {
                        Err(format!("at most {max} options can be selected"))
                    }
                    _ => Ok(value.clone()),
                }
            }
            Self::Number {
                min,
                max,
                step,
                integer,
                limits,
            } => {
                let n = value.as_f64().ok_or_else(|| expected("a number", value))?;
                if *integer && n.fract() != 0.0 {
                    return Err(format!("{n} is not an integer"));
                }
                let exact = if *integer {
                    let i = integer_value(value, n);
                    if let Some((lo, hi)) = limits {
                        if i < *lo || i > *hi {
                            return Err(format!("{i} is out of range for the widget ({lo} to {hi})"));
                        }
                    }
                    Some(i)
                } else {
                    None
                };
                if let Some(min) = min {
                    if n < *min {
                        return Err(format!("{n} is less than the minimum {min}"));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(format!("{n} is greater than the maximum {max}"));
                    }
                }
                let Some(i) = exact else {
                    return Ok(Value::from(n));
                };
                if let Some(step) = step {
                    let base = min.unwrap_or(0.0);
                    let k = (n - base) / step;
                    if (k - k.round()).abs() > 1e-9 {
                        return Err(format!("{n} is not a multiple of {step} from {base}"));
                    }
                }
                i64::try_from(i)
                    .map(Value::from)
                    .or_else(|_| u64::try_from(i).map(Value::from))
                    .map_err(|_| format!("{i} is out of range"))
            }
            Self::Bool | Self::Trigger => {
                if value.is_boolean() {
                    Ok(value.clone())
                } else {
                    Err(expected("a boolean", value))
                }
            }
            Self::File { types } => {
                if value.is_null() {
                    return Ok(Value::Null);
                }
                let file: UploadedFile =
                    from_value(value).map_err(|_| expected("an uploaded file", value))?;
                if !types.is_empty() {
                    let accepted = file.extension().is_some_and(|ext| types.contains(&ext));
                    if !accepted {
                        return Err(format!(
                            "{:?} is not an accepted file type ({})",
                            file.name,
                            types.join(", ")
                        ));
                    }
                }
                Ok(value.clone())
            }
            Self::Chat { max_chars } => match value {
                Value::Null => Ok(Value::Null),
                Value::String(s) => {
                    check_text(s, *max_chars)?;
                    Ok(value.clone())
                }
                _ => Err(expected("a string or null", value)),
            },
        }
    }

    pub(crate) fn check_config(&self) -> Result<(), String> {
        match self {
            Self::Choice { options } => {
                if options.is_empty() {
                    return Err("no options".into());
                }
                check_unique(options.iter().map(|o| o.as_str()), "option")
            }
            Self::MultiChoice {
                options,
                max_selections,
            } => {
                if *max_selections == Some(0) {
                    return Err("max_selections must be at least 1".into());
                }
                check_unique(options.iter().map(|o| o.as_str()), "option")
            }
            Self::Number { min, max, step, .. } => {
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        return Err(format!("minimum {min} is greater than maximum {max}"));
                    }
                }
                match step {
                    Some(step) if *step <= 0.0 => Err(format!("step {step} is not positive")),
                    _ => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }
}

/// Declaration of one widget, as produced by the widget builders.
#[derive(Debug, Clone)]
pub struct WidgetSpec {
    pub(crate) kind: WidgetKind,
    pub(crate) label: String,
    pub(crate) key: Option<String>,
    pub(crate) default: Value,
    pub(crate) constraint: Constraint,
    pub(crate) placeholder: Option<String>,
    pub(crate) help: Option<String>,
    pub(crate) disabled: bool,
    pub(crate) callback: Option<Callback>,
}

impl WidgetSpec {
    pub fn new(
        kind: WidgetKind,
        label: impl Into<String>,
        default: Value,
        constraint: Constraint,
    ) -> Self {
        Self {
            kind,
            label: label.into(),
            key: None,
            default,
            constraint,
            placeholder: None,
            help: None,
            disabled: false,
            callback: None,
        }
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }
    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
    pub fn default_value(&self) -> &Value {
        &self.default
    }
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub(crate) fn id(&self, form: Option<&FormId>) -> WidgetId {
        match (&self.key, form) {
            (Some(key), _) => WidgetId::for_key(key),
            (None, Some(form)) => WidgetId(format!("{}:{}@{}", self.kind, self.label, form)),
            (None, None) => WidgetId(format!("{}:{}", self.kind, self.label)),
        }
    }
}

/// A widget builder that can be declared in a pass.
pub trait Widget {
    /// Rust type of the widget's value.
    type Output: DeserializeOwned;
    fn into_spec(self) -> WidgetSpec;
}

/// What the client needs to render one widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetView {
    pub id: WidgetId,
    pub kind: WidgetKind,
    pub label: String,
    pub value: Value,
    pub constraint: Constraint,
    pub placeholder: Option<String>,
    pub help: Option<String>,
    pub disabled: bool,
    pub form: Option<FormId>,
}

macro_rules! common_setters {
    ($callback:ident) => {
        /// Binds the widget's value to this session state key.
        pub fn key(mut self, key: impl Into<String>) -> Self {
            self.spec.key = Some(key.into());
            self
        }
        pub fn help(mut self, help: impl Into<String>) -> Self {
            self.spec.help = Some(help.into());
            self
        }
        pub fn disabled(mut self, disabled: bool) -> Self {
            self.spec.disabled = disabled;
            self
        }
        pub fn $callback(mut self, callback: Callback) -> Self {
            self.spec.callback = Some(callback);
            self
        }
    };
}

macro_rules! simple_widget {
    ($name:ident, $output:ty) => {
        impl Widget for $name {
            type Output = $output;
            fn into_spec(self) -> WidgetSpec {
                self.spec
            }
        }
    };
}

fn text_spec(kind: WidgetKind, label: String) -> WidgetSpec {
    WidgetSpec::new(
        kind,
        label,
        Value::String(String::new()),
        Constraint::Text { max_chars: None },
    )
}

macro_rules! text_setters {
    () => {
        pub fn value(mut self, value: impl Into<String>) -> Self {
            self.spec.default = Value::String(value.into());
            self
        }
        pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
            self.spec.placeholder = Some(placeholder.into());
            self
        }
        pub fn max_chars(mut self, max_chars: usize) -> Self {
            self.spec.constraint = Constraint::Text {
                max_chars: Some(max_chars),
            };
            self
        }
    };
}

/// Single-line text entry.
#[derive(Debug, Clone)]
pub struct TextInput {
    spec: WidgetSpec,
}
impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            spec: text_spec(WidgetKind::TextInput, label.into()),
        }
    }
    text_setters!();
    common_setters!(on_change);
}
simple_widget!(TextInput, String);

/// Multi-line text entry.
#[derive(Debug, Clone)]
pub struct TextArea {
    spec: WidgetSpec,
}
impl TextArea {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            spec: text_spec(WidgetKind::TextArea, label.into()),
        }
    }
    text_setters!();
    common_setters!(on_change);
}
simple_widget!(TextArea, String);

fn choice_spec(kind: WidgetKind, label: String, options: Vec<String>) -> WidgetSpec {
    let default = options.first().cloned().map_or(Value::Null, Value::String);
    WidgetSpec::new(kind, label, default, Constraint::Choice { options })
}

macro_rules! choice_setters {
    () => {
        /// Selects the option at `index` by default.
        pub fn index(mut self, index: usize) -> Self {
            if let Constraint::Choice { options } = &self.spec.constraint {
                self.spec.default = options
                    .get(index)
                    .cloned()
                    .map_or(Value::Null, Value::String);
            }
            self
        }
    };
}

/// Single choice from a drop-down list.
#[derive(Debug, Clone)]
pub struct Selectbox {
    spec: WidgetSpec,
}
impl Selectbox {
    pub fn new(label: impl Into<String>, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let options = options.into_iter().map(Into::into).collect();
        Self {
            spec: choice_spec(WidgetKind::Selectbox, label.into(), options),
        }
    }
    choice_setters!();
    common_setters!(on_change);
}
simple_widget!(Selectbox, String);

/// Single choice from a list of radio buttons.
#[derive(Debug, Clone)]
pub struct Radio {
    spec: WidgetSpec,
}
impl Radio {
    pub fn new(label: impl Into<String>, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let options = options.into_iter().map(Into::into).collect();
        Self {
            spec: choice_spec(WidgetKind::Radio, label.into(), options),
        }
    }
    choice_setters!();
    common_setters!(on_change);
}
simple_widget!(Radio, String);

/// Any number of choices from a list.
#[derive(Debug, Clone)]
pub struct Multiselect {
    spec: WidgetSpec,
}
impl Multiselect {
    pub fn new(label: impl Into<String>, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let options = options.into_iter().map(Into::into).collect();
        Self {
            spec: WidgetSpec::new(
                WidgetKind::Multiselect,
                label,
                Value::Array(Vec::new()),
                Constraint::MultiChoice {
                    options,
                    max_selections: None,
                },
            ),
        }
    }
    pub fn value(mut self, selected: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.spec.default = selected
            .into_iter()
            .map(|s| Value::String(s.into()))
            .collect();
        self
    }
    pub fn max_selections(mut self, max: usize) -> Self {
        if let Constraint::MultiChoice { max_selections, .. } = &mut self.spec.constraint {
            *max_selections = Some(max);
        }
        self
    }
    common_setters!(on_change);
}
simple_widget!(Multiselect, Vec<String>);

/// Numeric types usable by [`Slider`] and [`NumberInput`].
pub trait Number:
    Copy + Default + PartialOrd + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const INTEGER: bool;
    const STEP: Self;
    /// Smallest and largest representable value, for integer types.
    const LIMITS: Option<(i128, i128)>;
    fn to_f64(self) -> f64;
}

macro_rules! impl_number {
    ($($t:ty => $integer:expr, $step:expr, $limits:expr;)*) => {
        $(
            impl Number for $t {
                const INTEGER: bool = $integer;
                const STEP: Self = $step;
                const LIMITS: Option<(i128, i128)> = $limits;
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}
impl_number! {
    i32 => true, 1, Some((i32::MIN as i128, i32::MAX as i128));
    i64 => true, 1, Some((i64::MIN as i128, i64::MAX as i128));
    u32 => true, 1, Some((0, u32::MAX as i128));
    u64 => true, 1, Some((0, u64::MAX as i128));
    usize => true, 1, Some((0, usize::MAX as i128));
    f32 => false, 0.01, None;
    f64 => false, 0.01, None;
}

fn number_value<N: Number>(n: N) -> Value {
    to_value(&n).unwrap_or_default()
}

fn number_constraint<N: Number>(min: Option<N>, max: Option<N>, step: N) -> Constraint {
    Constraint::Number {
        min: min.map(N::to_f64),
        max: max.map(N::to_f64),
        step: Some(step.to_f64()),
        integer: N::INTEGER,
        limits: N::LIMITS,
    }
}

/// Number picked from a bounded range.
#[derive(Debug, Clone)]
pub struct Slider<N> {
    spec: WidgetSpec,
    min: N,
    max: N,
    step: N,
    value: N,
}
impl<N: Number> Slider<N> {
    pub fn new(label: impl Into<String>, min: N, max: N) -> Self {
        Self {
            spec: WidgetSpec::new(WidgetKind::Slider, label, Value::Null, Constraint::Bool),
            min,
            max,
            step: N::STEP,
            value: min,
        }
    }
    pub fn value(mut self, value: N) -> Self {
        self.value = value;
        self
    }
    pub fn step(mut self, step: N) -> Self {
        self.step = step;
        self
    }
    common_setters!(on_change);
}
impl<N: Number> Widget for Slider<N> {
    type Output = N;
    fn into_spec(mut self) -> WidgetSpec {
        self.spec.default = number_value(self.value);
        self.spec.constraint = number_constraint(Some(self.min), Some(self.max), self.step);
        self.spec
    }
}

/// Number typed into a box, optionally bounded.
#[derive(Debug, Clone)]
pub struct NumberInput<N> {
    spec: WidgetSpec,
    min: Option<N>,
    max: Option<N>,
    step: N,
    value: Option<N>,
}
impl<N: Number> NumberInput<N> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            spec: WidgetSpec::new(WidgetKind::NumberInput, label, Value::Null, Constraint::Bool),
            min: None,
            max: None,
            step: N::STEP,
            value: None,
        }
    }
    pub fn min(mut self, min: N) -> Self {
        self.min = Some(min);
        self
    }
    pub fn max(mut self, max: N) -> Self {
        self.max = Some(max);
        self
    }
    pub fn step(mut self, step: N) -> Self {
        self.step = step;
        self
    }
    /// Initial value. Defaults to the minimum, or zero when unbounded.
    pub fn value(mut self, value: N) -> Self {
        self.value = Some(value);
        self
    }
    common_setters!(on_change);
}
impl<N: Number> Widget for NumberInput<N> {
    type Output = N;
    fn into_spec(mut self) -> WidgetSpec {
        let value = self.value.or(self.min).unwrap_or_default();
        self.spec.default = number_value(value);
        self.spec.constraint = number_constraint(self.min, self.max, self.step);
        self.spec
    }
}

/// Boolean check box.
#[derive(Debug, Clone)]
pub struct Checkbox {
    spec: WidgetSpec,
}
impl Checkbox {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            spec: WidgetSpec::new(
                WidgetKind::Checkbox,
                label,
                Value::Bool(false),
                Constraint::Bool,
            ),
        }
    }
    pub fn value(mut self, value: bool) -> Self {
        self.spec.default = Value::Bool(value);
        self
    }
    common_setters!(on_change);
}
simple_widget!(Checkbox, bool);

/// Boolean switch.
#[derive(Debug, Clone)]
pub struct Toggle {
    spec: WidgetSpec,
}
impl Toggle {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            spec: WidgetSpec::new(WidgetKind::Toggle, label, Value::Bool(false), Constraint::Bool),
        }
    }
    pub fn value(mut self, value: bool) -> Self {
        self.spec.default = Value::Bool(value);
        self
    }
    common_setters!(on_change);
}
simple_widget!(Toggle, bool);

/// File selection. The value is `None` until the client selects a file.
#[derive(Debug, Clone)]
pub struct FileUploader {
    spec: WidgetSpec,
}
impl FileUploader {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            spec: WidgetSpec::new(
                WidgetKind::FileUploader,
                label,
                Value::Null,
                Constraint::File { types: Vec::new() },
            ),
        }
    }
    /// Restricts accepted files to these extensions (`"csv"` or `".csv"`).
    pub fn accept(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let types = types
            .into_iter()
            .map(|t| t.into().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self.spec.constraint = Constraint::File { types };
        self
    }
    common_setters!(on_change);
}
simple_widget!(FileUploader, Option<UploadedFile>);

/// Push button. Reads `true` only in the pass caused by its click.
#[derive(Debug, Clone)]
pub struct Button {
    spec: WidgetSpec,
}
impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            spec: WidgetSpec::new(WidgetKind::Button, label, Value::Bool(false), Constraint::Trigger),
        }
    }
    common_setters!(on_click);
}
simple_widget!(Button, bool);

/// Submit button of a form. Reads `true` only in the pass caused by the submission.
#[derive(Debug, Clone)]
pub struct FormSubmitButton {
    spec: WidgetSpec,
}
impl FormSubmitButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            spec: WidgetSpec::new(
                WidgetKind::FormSubmitButton,
                label,
                Value::Bool(false),
                Constraint::Trigger,
            ),
        }
    }
    common_setters!(on_click);
}
simple_widget!(FormSubmitButton, bool);

/// Chat message entry. Reads `Some(text)` only in the pass caused by the submission.
#[derive(Debug, Clone)]
pub struct ChatInput {
    spec: WidgetSpec,
}
impl ChatInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        let mut spec = WidgetSpec::new(
            WidgetKind::ChatInput,
            placeholder.clone(),
            Value::Null,
            Constraint::Chat { max_chars: None },
        );
        spec.placeholder = Some(placeholder);
        Self { spec }
    }
    pub fn max_chars(mut self, max_chars: usize) -> Self {
        self.spec.constraint = Constraint::Chat {
            max_chars: Some(max_chars),
        };
        self
    }
    common_setters!(on_submit);
}
simple_widget!(ChatInput, Option<String>);

/// Form declaration: groups widgets so that their changes are sent together on submit.
#[derive(Debug, Clone)]
pub struct Form {
    pub(crate) id: FormId,
    pub(crate) clear_on_submit: bool,
}
impl Form {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: FormId::new(id),
            clear_on_submit: false,
        }
    }
    /// Resets the form's widgets to their defaults after a submission has been processed.
    pub fn clear_on_submit(mut self, clear: bool) -> Self {
        self.clear_on_submit = clear;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct WidgetEntry {
    pub spec: WidgetSpec,
    pub form: Option<FormId>,
    pub fragment: Option<FragmentId>,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub(crate) struct FormEntry {
    pub fragment: Option<FragmentId>,
    pub clear_on_submit: bool,
    pub submit: Option<WidgetId>,
}

/// Widgets and forms declared by the last pass, used to interpret the next events.
#[derive(Debug, Clone, Default)]
pub(crate) struct WidgetRegistry {
    pub widgets: HashMap<WidgetId, WidgetEntry>,
    pub forms: HashMap<FormId, FormEntry>,
}

impl WidgetRegistry {
    /// Copy of this registry without the entries owned by `fragment`.
    pub fn without_fragment(&self, fragment: &FragmentId) -> Self {
        let owned = |f: &Option<FragmentId>| f.as_ref() == Some(fragment);
        Self {
            widgets: self
                .widgets
                .iter()
                .filter(|(_, e)| !owned(&e.fragment))
                .map(|(id, e)| (id.clone(), e.clone()))
                .collect(),
            forms: self
                .forms
                .iter()
                .filter(|(_, e)| !owned(&e.fragment))
                .map(|(id, e)| (id.clone(), e.clone()))
                .collect(),
        }
    }

    /// Merges the widgets declared by a fragment pass into this registry.
    pub fn absorb(&mut self, other: WidgetRegistry) {
        self.widgets.extend(other.widgets);
        self.forms.extend(other.forms);
    }
}
