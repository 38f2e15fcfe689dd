use std::{error::Error, fmt, path::PathBuf};

use parse_display::Display;

use crate::{FormId, FragmentId, FunctionId, SessionId, WidgetId, WidgetKind};

type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Failure to convert a session state value to or from a Rust type.
#[derive(Debug, Display)]
pub enum StateError {
    #[display("session state key `{key}` cannot be read as `{expected}`: {source}")]
    Decode {
        key: String,
        expected: &'static str,
        source: serde_json::Error,
    },
    #[display("value for session state key `{key}` cannot be stored: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}
impl Error for StateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode { source, .. } | Self::Encode { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Display)]
pub enum CacheError<E> {
    #[display("{0}")]
    Compute(E),
    #[display("cached function `{function}` was called with different argument or result types")]
    TypeMismatch { function: FunctionId },
}
impl<E: Error + 'static> Error for CacheError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Compute(e) => Some(e),
            Self::TypeMismatch { .. } => None,
        }
    }
}

/// Misuse of a widget declaration.
#[non_exhaustive]
#[derive(Debug, Display)]
pub enum WidgetError {
    #[display("widget `{0}` is declared more than once in the same pass")]
    DuplicateId(WidgetId),
    #[display("widget `{id}` has an invalid configuration: {reason}")]
    InvalidConfig { id: WidgetId, reason: String },
    #[display("widget `{id}` has an invalid default value: {reason}")]
    InvalidDefault { id: WidgetId, reason: String },
    #[display("session state for widget `{id}` holds an invalid value: {reason}")]
    InvalidStateValue { id: WidgetId, reason: String },
    #[display("value of widget `{id}` cannot be decoded: {source}")]
    Decode {
        id: WidgetId,
        source: serde_json::Error,
    },
    #[display("form `{0}` is declared more than once in the same pass")]
    DuplicateForm(FormId),
    #[display("form `{0}` is declared inside another form")]
    NestedForm(FormId),
    #[display("form `{0}` has no submit button")]
    FormWithoutSubmit(FormId),
    #[display("submit button `{0}` is declared outside of a form")]
    SubmitOutsideForm(WidgetId),
    #[display("{kind} `{id}` cannot be declared inside form `{form}`")]
    NotAllowedInForm {
        id: WidgetId,
        kind: WidgetKind,
        form: FormId,
    },
    #[display("widget `{id}` inside form `{form}` cannot have a callback; only the submit button can")]
    CallbackInForm { id: WidgetId, form: FormId },
}
impl Error for WidgetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Display, PartialEq, Eq)]
pub enum PageConfigError {
    #[display("page configuration must be declared before any other output")]
    AfterOutput,
    #[display("page configuration is declared more than once in the same pass")]
    Duplicate,
}
impl Error for PageConfigError {}

#[derive(Debug, Display, PartialEq, Eq)]
pub enum NavigationError {
    #[display("navigation requires at least one page")]
    NoPages,
    #[display("more than one page uses the url path `{0}`")]
    DuplicatePage(String),
    #[display("more than one page is marked as default")]
    MultipleDefaults,
}
impl Error for NavigationError {}

#[derive(Debug, Display)]
pub enum SecretsError {
    #[display("no secrets file found (searched {searched:?})")]
    NotFound { searched: Vec<PathBuf> },
    #[display("failed to read secrets file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[display("failed to parse secrets: {source}")]
    Parse { source: toml::de::Error },
    #[display("secret `{0}` is not defined")]
    MissingKey(String),
    #[display("secret `{0}` is not a section")]
    NotASection(String),
    #[display("secret `{key}` has an unexpected type: {source}")]
    Decode {
        key: String,
        source: toml::de::Error,
    },
}
impl Error for SecretsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source } | Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Display)]
pub enum ConfigError {
    #[display("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[display("failed to parse config: {0}")]
    Parse(toml::de::Error),
}
impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
        }
    }
}

/// An error that aborts an execution pass.
///
/// The output emitted before the error is kept and followed by an exception element.
#[non_exhaustive]
#[derive(Debug, Display)]
pub enum ScriptError {
    #[display("{0}")]
    State(StateError),
    #[display("{0}")]
    Widget(WidgetError),
    #[display("{0}")]
    PageConfig(PageConfigError),
    #[display("{0}")]
    Navigation(NavigationError),
    #[display("{0}")]
    Secrets(SecretsError),
    #[display("cache computation failed: {0}")]
    Cache(BoxError),
    #[display("rerun limit of {0} consecutive reruns exceeded")]
    RerunLimit(usize),
    #[display("fragment rerun requested outside of a fragment")]
    NotInFragment,
    #[display("fragment `{0}` is declared more than once in the same pass")]
    DuplicateFragment(FragmentId),
    #[display("fragment `{0}` is declared inside another fragment")]
    NestedFragment(FragmentId),
    #[display("status update requested outside of a status block")]
    NotInStatus,
    #[display("placeholder does not belong to the current pass or fragment")]
    UnknownPlaceholder,
    #[display("dialog `{0}` is opened while another dialog is open")]
    DialogAlreadyOpen(String),
    #[display("{0}")]
    Message(String),
    #[display("{0}")]
    Custom(BoxError),
}
impl ScriptError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
    pub fn custom(e: impl Error + Send + Sync + 'static) -> Self {
        Self::Custom(Box::new(e))
    }
}
impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::State(e) => Some(e),
            Self::Widget(e) => Some(e),
            Self::PageConfig(e) => Some(e),
            Self::Navigation(e) => Some(e),
            Self::Secrets(e) => Some(e),
            Self::Cache(e) | Self::Custom(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<StateError> for ScriptError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}
impl From<WidgetError> for ScriptError {
    fn from(e: WidgetError) -> Self {
        Self::Widget(e)
    }
}
impl From<PageConfigError> for ScriptError {
    fn from(e: PageConfigError) -> Self {
        Self::PageConfig(e)
    }
}
impl From<NavigationError> for ScriptError {
    fn from(e: NavigationError) -> Self {
        Self::Navigation(e)
    }
}
impl From<SecretsError> for ScriptError {
    fn from(e: SecretsError) -> Self {
        Self::Secrets(e)
    }
}
impl<E: Error + Send + Sync + 'static> From<CacheError<E>> for ScriptError {
    fn from(e: CacheError<E>) -> Self {
        match e {
            CacheError::Compute(e) => Self::Cache(Box::new(e)),
            e @ CacheError::TypeMismatch { .. } => Self::Cache(Box::new(e)),
        }
    }
}

/// Which part of the script a rerun re-executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(style = "snake_case")]
pub enum RerunScope {
    App,
    Fragment,
}

/// Control-flow outcome that ends the current pass early.
///
/// Scripts return `Result<(), Interrupt>` and propagate interrupts with `?`;
/// the pass runner in [`Session`](crate::Session) decides what happens next.
#[derive(Debug)]
pub enum Interrupt {
    /// Discard the rest of this pass and run again.
    Rerun(RerunScope),
    /// End the pass here, keeping the output emitted so far.
    Stop,
    /// Abort the pass with an error.
    Failed(ScriptError),
}
impl Interrupt {
    pub fn is_rerun(&self) -> bool {
        matches!(self, Self::Rerun(_))
    }
}
impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rerun(scope) => write!(f, "rerun ({scope})"),
            Self::Stop => write!(f, "stop"),
            Self::Failed(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl From<ScriptError> for Interrupt {
    fn from(e: ScriptError) -> Self {
        Self::Failed(e)
    }
}
impl From<StateError> for Interrupt {
    fn from(e: StateError) -> Self {
        Self::Failed(e.into())
    }
}
impl From<WidgetError> for Interrupt {
    fn from(e: WidgetError) -> Self {
        Self::Failed(e.into())
    }
}
impl From<PageConfigError> for Interrupt {
    fn from(e: PageConfigError) -> Self {
        Self::Failed(e.into())
    }
}
impl From<NavigationError> for Interrupt {
    fn from(e: NavigationError) -> Self {
        Self::Failed(e.into())
    }
}
impl From<SecretsError> for Interrupt {
    fn from(e: SecretsError) -> Self {
        Self::Failed(e.into())
    }
}
impl<E: Error + Send + Sync + 'static> From<CacheError<E>> for Interrupt {
    fn from(e: CacheError<E>) -> Self {
        Self::Failed(e.into())
    }
}

/// A client event that the session refused to apply. No pass runs for it.
#[non_exhaustive]
#[derive(Debug, Display, PartialEq)]
pub enum EventError {
    #[display("session `{0}` does not exist")]
    UnknownSession(SessionId),
    #[display("widget `{0}` was not declared in the last pass")]
    UnknownWidget(WidgetId),
    #[display("form `{0}` was not declared in the last pass")]
    UnknownForm(FormId),
    #[display("widget `{id}` does not belong to form `{form}`")]
    NotInForm { id: WidgetId, form: FormId },
    #[display("page `{0}` is not in the navigation menu")]
    UnknownPage(String),
    #[display("widget `{id}` rejected the value: {reason}")]
    InvalidValue { id: WidgetId, reason: String },
    #[display("widget `{id}` ({kind}) does not accept {event} events")]
    WrongEventKind {
        id: WidgetId,
        kind: WidgetKind,
        event: &'static str,
    },
    #[display("widget `{0}` is disabled")]
    Disabled(WidgetId),
}
impl Error for EventError {}
