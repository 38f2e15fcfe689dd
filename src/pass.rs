use std::{
    collections::HashMap,
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use parse_display::Display;
use serde::{Deserialize, Serialize};

use crate::{
    output::Canvas,
    value::{from_value, to_value},
    widget::{FormEntry, WidgetEntry, WidgetRegistry},
    AlertLevel, App, AppConfig, BlockKind, Button, CacheTable, ChatInput, Checkbox, Element,
    FileUploader, Form, FormId, FormSubmitButton, Interrupt, Multiselect, Navigation, Number,
    NumberInput, Page, PageConfig, PageConfigError, Radio, RerunScope, ScriptError, Secrets,
    Selectbox, SessionId, SessionState, Slider, StatusState, TextArea, TextInput, Toggle,
    UploadedFile, Value, Widget, WidgetError, WidgetId, WidgetKind, WidgetView,
};

pub type PassResult<T = ()> = Result<T, Interrupt>;

type ScriptFn = dyn Fn(&mut Pass) -> PassResult + Send + Sync;

/// A script body: the app script, a page body, or a fragment body.
#[derive(Clone)]
pub struct Script(Arc<ScriptFn>);

impl Script {
    pub fn new(f: impl Fn(&mut Pass) -> PassResult + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
    pub fn call(&self, pass: &mut Pass) -> PassResult {
        (self.0)(pass)
    }
}
impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[display("{0}")]
#[serde(transparent)]
pub struct FragmentId(String);

impl FragmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<&str> for FragmentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Which part of the script a pass executes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum PassScope {
    #[display("app")]
    App,
    #[display("fragment {0}")]
    Fragment(FragmentId),
}

/// Fragment declaration options.
#[derive(Debug, Clone)]
pub struct Fragment {
    id: FragmentId,
    run_every: Option<Duration>,
}
impl Fragment {
    pub fn new(id: impl Into<FragmentId>) -> Self {
        Self {
            id: id.into(),
            run_every: None,
        }
    }
    /// Reruns the fragment on [`Session::tick`](crate::Session::tick) once `interval` has elapsed.
    pub fn run_every(mut self, interval: Duration) -> Self {
        self.run_every = Some(interval);
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FragmentEntry {
    pub body: Script,
    pub run_every: Option<Duration>,
    pub last_run: Instant,
}
impl FragmentEntry {
    pub fn is_due(&self, now: Instant) -> bool {
        match self.run_every {
            Some(interval) => now.saturating_duration_since(self.last_run) >= interval,
            None => false,
        }
    }
}

/// Handle to a slot created by [`Pass::empty`].
///
/// Only the fragment body (or the part of the script outside any fragment) that created it can fill it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placeholder {
    slot: u64,
    region: Option<u64>,
}

/// Status block declaration.
#[derive(Debug, Clone)]
pub struct Status {
    label: String,
    expanded: bool,
}
impl Status {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            expanded: false,
        }
    }
    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusUpdate {
    label: Option<String>,
    state: Option<StatusState>,
    expanded: Option<bool>,
}
impl StatusUpdate {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
    pub fn state(mut self, state: StatusState) -> Self {
        self.state = Some(state);
        self
    }
    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }
}

/// Widget values supplied by the event that triggered a pass.
#[derive(Debug, Default)]
pub(crate) struct Interaction {
    /// Values of keyless widgets.
    pub values: HashMap<WidgetId, Value>,
    /// Keyless trigger widgets among `values`.
    pub triggers: Vec<WidgetId>,
    /// Keyed widgets to restore to these values once the triggered pass has run.
    pub resets: Vec<(String, Value)>,
}
impl Interaction {
    pub fn end_trigger(&mut self, state: &mut SessionState) {
        for id in self.triggers.drain(..) {
            self.values.remove(&id);
        }
        for (key, value) in self.resets.drain(..) {
            state.set(key, value);
        }
    }
}

pub(crate) struct PassInput<'a> {
    pub session_id: SessionId,
    pub number: u64,
    pub scope: PassScope,
    pub now: Instant,
    pub app: &'a App,
    pub state: &'a mut SessionState,
    pub interaction: &'a Interaction,
    pub selected_page: &'a mut Option<String>,
    pub next_slot: u64,
}

pub(crate) struct PassOutput {
    pub elements: Vec<Element>,
    pub registry: WidgetRegistry,
    pub fragments: HashMap<FragmentId, FragmentEntry>,
    pub page_config: Option<PageConfig>,
    pub pages: Option<Vec<String>>,
    pub next_slot: u64,
}

struct OpenForm {
    id: FormId,
    submit: Option<WidgetId>,
}

/// Context of one execution pass, handed to the script.
///
/// Output methods append [`Element`]s to the pass's output tree.
/// Widget methods declare a widget and return its current value.
/// Methods returning [`PassResult`] may interrupt the pass and should be propagated with `?`.
pub struct Pass<'a> {
    session_id: SessionId,
    number: u64,
    scope: PassScope,
    now: Instant,
    app: &'a App,
    state: &'a mut SessionState,
    interaction: &'a Interaction,
    selected_page: &'a mut Option<String>,
    canvas: Canvas,
    registry: WidgetRegistry,
    fragments: HashMap<FragmentId, FragmentEntry>,
    page_config: Option<PageConfig>,
    pages: Option<Vec<String>>,
    form: Option<OpenForm>,
    fragment: Option<FragmentId>,
    /// Fragment body currently running, numbered within this pass.
    region: Option<u64>,
    next_region: u64,
    dialog: bool,
}

impl<'a> Pass<'a> {
    pub(crate) fn new(input: PassInput<'a>) -> Self {
        let fragment = match &input.scope {
            PassScope::App => None,
            PassScope::Fragment(id) => Some(id.clone()),
        };
        Self {
            session_id: input.session_id,
            number: input.number,
            scope: input.scope,
            now: input.now,
            app: input.app,
            state: input.state,
            interaction: input.interaction,
            selected_page: input.selected_page,
            canvas: Canvas::new(input.next_slot),
            registry: WidgetRegistry::default(),
            fragments: HashMap::new(),
            page_config: None,
            pages: None,
            region: fragment.as_ref().map(|_| 0),
            next_region: 1,
            form: None,
            fragment,
            dialog: false,
        }
    }

    pub(crate) fn finish(self) -> PassOutput {
        PassOutput {
            next_slot: self.canvas.next_slot(),
            elements: self.canvas.finish(),
            registry: self.registry,
            fragments: self.fragments,
            page_config: self.page_config,
            pages: self.pages,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
    /// Sequence number of this pass within the session, starting at 1.
    pub fn number(&self) -> u64 {
        self.number
    }
    pub fn scope(&self) -> &PassScope {
        &self.scope
    }
    pub fn now(&self) -> Instant {
        self.now
    }
    pub fn state(&self) -> &SessionState {
        self.state
    }
    pub fn state_mut(&mut self) -> &mut SessionState {
        self.state
    }
    pub fn cache(&self) -> &'a CacheTable {
        self.app.cache()
    }
    pub fn config(&self) -> &'a AppConfig {
        self.app.config()
    }
    pub fn secrets(&self) -> PassResult<Arc<Secrets>> {
        Ok(self.app.secrets()?)
    }

    /// Discards the rest of this pass and runs the whole script again.
    pub fn rerun<T>(&self) -> PassResult<T> {
        Err(Interrupt::Rerun(RerunScope::App))
    }

    /// Discards the rest of the current fragment and runs it again.
    ///
    /// During a full pass this reruns the whole script.
    pub fn rerun_fragment<T>(&self) -> PassResult<T> {
        match self.fragment {
            Some(_) => Err(Interrupt::Rerun(RerunScope::Fragment)),
            None => Err(ScriptError::NotInFragment.into()),
        }
    }

    /// Ends this pass, keeping the output emitted so far.
    pub fn stop<T>(&self) -> PassResult<T> {
        Err(Interrupt::Stop)
    }

    pub fn set_page_config(&mut self, config: PageConfig) -> PassResult {
        if self.scope != PassScope::App {
            return Err(PageConfigError::AfterOutput.into());
        }
        if self.page_config.is_some() {
            return Err(PageConfigError::Duplicate.into());
        }
        if self.canvas.has_output() {
            return Err(PageConfigError::AfterOutput.into());
        }
        self.page_config = Some(config);
        Ok(())
    }

    /// Declares the page menu and selects the page to show.
    ///
    /// The menu is rendered in the sidebar. Call [`Navigation::run`] to render the selected page.
    pub fn navigation(&mut self, pages: impl IntoIterator<Item = Page>) -> PassResult<Navigation> {
        let nav = Navigation::new(pages.into_iter().collect(), self.selected_page.as_deref())?;
        *self.selected_page = Some(nav.selected().path().to_owned());
        self.pages = Some(nav.pages().iter().map(|p| p.path().to_owned()).collect());
        let entries = nav.entries();
        self.block(BlockKind::Sidebar, |pass| {
            pass.canvas.push(Element::Navigation { entries });
            Ok(())
        })?;
        Ok(nav)
    }

    pub fn title(&mut self, body: impl Into<String>) {
        self.canvas.push(Element::Title { body: body.into() });
    }
    pub fn header(&mut self, body: impl Into<String>) {
        self.canvas.push(Element::Header { body: body.into() });
    }
    pub fn subheader(&mut self, body: impl Into<String>) {
        self.canvas.push(Element::Subheader { body: body.into() });
    }
    pub fn write(&mut self, body: impl Into<String>) {
        self.canvas.push(Element::Text { body: body.into() });
    }
    pub fn markdown(&mut self, body: impl Into<String>) {
        self.canvas.push(Element::Markdown { body: body.into() });
    }
    pub fn caption(&mut self, body: impl Into<String>) {
        self.canvas.push(Element::Caption { body: body.into() });
    }
    pub fn code(&mut self, code: impl Into<String>, language: Option<&str>) {
        self.canvas.push(Element::Code {
            code: code.into(),
            language: language.map(str::to_owned),
        });
    }
    pub fn divider(&mut self) {
        self.canvas.push(Element::Divider);
    }
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> PassResult {
        let value = to_value(value).map_err(ScriptError::custom)?;
        self.canvas.push(Element::Json { value });
        Ok(())
    }
    pub fn table<T: Serialize + ?Sized>(&mut self, value: &T) -> PassResult {
        let value = to_value(value).map_err(ScriptError::custom)?;
        self.canvas.push(Element::Table { value });
        Ok(())
    }
    pub fn metric(&mut self, label: impl Into<String>, value: impl fmt::Display) {
        self.canvas.push(Element::Metric {
            label: label.into(),
            value: value.to_string(),
            delta: None,
        });
    }
    pub fn metric_delta(
        &mut self,
        label: impl Into<String>,
        value: impl fmt::Display,
        delta: impl fmt::Display,
    ) {
        self.canvas.push(Element::Metric {
            label: label.into(),
            value: value.to_string(),
            delta: Some(delta.to_string()),
        });
    }
    pub fn alert(&mut self, level: AlertLevel, body: impl Into<String>) {
        self.canvas.push(Element::Alert {
            level,
            body: body.into(),
        });
    }
    pub fn success(&mut self, body: impl Into<String>) {
        self.alert(AlertLevel::Success, body)
    }
    pub fn info(&mut self, body: impl Into<String>) {
        self.alert(AlertLevel::Info, body)
    }
    pub fn warning(&mut self, body: impl Into<String>) {
        self.alert(AlertLevel::Warning, body)
    }
    pub fn error(&mut self, body: impl Into<String>) {
        self.alert(AlertLevel::Error, body)
    }
    pub fn exception(&mut self, message: impl Into<String>) {
        self.canvas.push(Element::Exception {
            message: message.into(),
        });
    }
    pub fn toast(&mut self, body: impl Into<String>, icon: Option<&str>) {
        self.canvas.push(Element::Toast {
            body: body.into(),
            icon: icon.map(str::to_owned),
        });
    }
    pub fn balloons(&mut self) {
        self.canvas.push(Element::Balloons);
    }
    pub fn snow(&mut self) {
        self.canvas.push(Element::Snow);
    }

    fn block<T>(
        &mut self,
        kind: BlockKind,
        f: impl FnOnce(&mut Self) -> PassResult<T>,
    ) -> PassResult<T> {
        self.canvas.open(kind);
        let r = f(self);
        self.canvas.close();
        r
    }

    pub fn sidebar<T>(&mut self, f: impl FnOnce(&mut Self) -> PassResult<T>) -> PassResult<T> {
        self.block(BlockKind::Sidebar, f)
    }
    pub fn container<T>(
        &mut self,
        border: bool,
        f: impl FnOnce(&mut Self) -> PassResult<T>,
    ) -> PassResult<T> {
        self.block(BlockKind::Container { border }, f)
    }
    pub fn expander<T>(
        &mut self,
        label: impl Into<String>,
        expanded: bool,
        f: impl FnOnce(&mut Self) -> PassResult<T>,
    ) -> PassResult<T> {
        let label = label.into();
        self.block(BlockKind::Expander { label, expanded }, f)
    }
    pub fn chat_message<T>(
        &mut self,
        role: impl Into<String>,
        f: impl FnOnce(&mut Self) -> PassResult<T>,
    ) -> PassResult<T> {
        let role = role.into();
        self.block(BlockKind::ChatMessage { role }, f)
    }

    /// Lays out `n` side-by-side columns, calling `f` once per column index.
    pub fn columns(
        &mut self,
        n: usize,
        mut f: impl FnMut(&mut Self, usize) -> PassResult,
    ) -> PassResult {
        self.block(BlockKind::Columns, |pass| {
            for i in 0..n {
                pass.block(BlockKind::Column, |pass| f(pass, i))?;
            }
            Ok(())
        })
    }

    /// Lays out one tab per label, calling `f` once per tab index.
    pub fn tabs<L: Into<String>>(
        &mut self,
        labels: impl IntoIterator<Item = L>,
        mut f: impl FnMut(&mut Self, usize) -> PassResult,
    ) -> PassResult {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        self.block(
            BlockKind::Tabs {
                labels: labels.clone(),
            },
            |pass| {
                for (i, label) in labels.into_iter().enumerate() {
                    pass.block(BlockKind::Tab { label }, |pass| f(pass, i))?;
                }
                Ok(())
            },
        )
    }

    /// Runs `f` while the client shows a waiting indicator. Nothing is added to the output.
    pub fn spinner<T>(
        &mut self,
        label: &str,
        f: impl FnOnce(&mut Self) -> PassResult<T>,
    ) -> PassResult<T> {
        tracing::debug!(session = %self.session_id, label, "spinner");
        f(self)
    }

    /// Expandable progress box.
    ///
    /// When `f` returns, a box that is still running becomes complete, or error if `f` failed.
    pub fn status<T>(
        &mut self,
        status: Status,
        f: impl FnOnce(&mut Self) -> PassResult<T>,
    ) -> PassResult<T> {
        self.canvas.open(BlockKind::Status {
            label: status.label,
            state: StatusState::Running,
            expanded: status.expanded,
        });
        let r = f(self);
        let end = match &r {
            Ok(_) => Some(StatusState::Complete),
            Err(Interrupt::Failed(_)) => Some(StatusState::Error),
            Err(_) => None,
        };
        if let Some(end) = end {
            self.canvas.update_status(|_, state, _| {
                if *state == StatusState::Running {
                    *state = end;
                }
            });
        }
        self.canvas.close();
        r
    }

    /// Changes the innermost enclosing status box.
    pub fn update_status(&mut self, update: StatusUpdate) -> PassResult {
        let found = self.canvas.update_status(|label, state, expanded| {
            if let Some(l) = update.label {
                *label = l;
            }
            if let Some(s) = update.state {
                *state = s;
            }
            if let Some(e) = update.expanded {
                *expanded = e;
            }
        });
        if found {
            Ok(())
        } else {
            Err(ScriptError::NotInStatus.into())
        }
    }

    /// Emits an empty slot whose content can be replaced with [`Pass::fill`].
    pub fn empty(&mut self) -> Placeholder {
        Placeholder {
            slot: self.canvas.slot(),
            region: self.region,
        }
    }

    /// Replaces the content of `placeholder` with the output of `f`.
    pub fn fill<T>(
        &mut self,
        placeholder: Placeholder,
        f: impl FnOnce(&mut Self) -> PassResult<T>,
    ) -> PassResult<T> {
        if placeholder.region != self.region || !self.canvas.fill(placeholder.slot) {
            return Err(ScriptError::UnknownPlaceholder.into());
        }
        let r = f(self);
        self.canvas.close();
        r
    }

    /// Declares a form. Changes to the widgets inside are sent together when it is submitted.
    pub fn form<T>(
        &mut self,
        form: Form,
        f: impl FnOnce(&mut Self) -> PassResult<T>,
    ) -> PassResult<T> {
        let Form {
            id,
            clear_on_submit,
        } = form;
        if self.form.is_some() {
            return Err(WidgetError::NestedForm(id).into());
        }
        if self.registry.forms.contains_key(&id) {
            return Err(WidgetError::DuplicateForm(id).into());
        }
        self.form = Some(OpenForm {
            id: id.clone(),
            submit: None,
        });
        let r = self.block(BlockKind::Form { id: id.clone() }, f);
        let submit = self.form.take().and_then(|f| f.submit);
        let value = r?;
        if submit.is_none() {
            return Err(WidgetError::FormWithoutSubmit(id).into());
        }
        self.registry.forms.insert(
            id,
            FormEntry {
                fragment: self.fragment.clone(),
                clear_on_submit,
                submit,
            },
        );
        Ok(value)
    }

    /// Declares a fragment: a part of the script that can rerun on its own.
    ///
    /// `body` runs immediately. Interactions with widgets declared by `body`
    /// rerun only `body`, leaving the rest of the output unchanged.
    pub fn fragment(
        &mut self,
        id: impl Into<FragmentId>,
        body: impl Fn(&mut Pass) -> PassResult + Send + Sync + 'static,
    ) -> PassResult {
        self.fragment_with(Fragment::new(id), body)
    }

    pub fn fragment_with(
        &mut self,
        fragment: Fragment,
        body: impl Fn(&mut Pass) -> PassResult + Send + Sync + 'static,
    ) -> PassResult {
        let Fragment { id, run_every } = fragment;
        if self.fragment.is_some() {
            return Err(ScriptError::NestedFragment(id).into());
        }
        if self.fragments.contains_key(&id) {
            return Err(ScriptError::DuplicateFragment(id).into());
        }
        let body = Script::new(body);
        self.fragments.insert(
            id.clone(),
            FragmentEntry {
                body: body.clone(),
                run_every,
                last_run: self.now,
            },
        );
        self.fragment = Some(id.clone());
        self.region = Some(self.next_region);
        self.next_region += 1;
        let r = self.block(BlockKind::Fragment { id }, |pass| body.call(pass));
        self.fragment = None;
        self.region = None;
        r
    }

    /// Opens a modal dialog whose content is produced by `body`.
    ///
    /// The dialog stays open as long as its widgets are used, since those interactions
    /// rerun only `body`. It closes on the next full pass that does not open it again,
    /// such as one requested by [`Pass::rerun`] from within `body`.
    pub fn dialog(
        &mut self,
        title: impl Into<String>,
        body: impl Fn(&mut Pass) -> PassResult + Send + Sync + 'static,
    ) -> PassResult {
        let title = title.into();
        if self.dialog {
            return Err(ScriptError::DialogAlreadyOpen(title).into());
        }
        self.dialog = true;
        let id = FragmentId::new(format!("dialog:{title}"));
        self.block(BlockKind::Dialog { title }, |pass| pass.fragment(id, body))
    }

    /// Declares a widget and returns its current value.
    pub fn widget<W: Widget>(&mut self, widget: W) -> PassResult<W::Output> {
        let spec = widget.into_spec();
        let form = self.form.as_ref().map(|f| f.id.clone());
        let id = spec.id(form.as_ref());
        if self.registry.widgets.contains_key(&id) {
            return Err(WidgetError::DuplicateId(id).into());
        }
        if let Err(reason) = spec.constraint.check_config() {
            return Err(WidgetError::InvalidConfig { id, reason }.into());
        }
        let default = match spec.constraint.check(&spec.default) {
            Ok(default) => default,
            Err(reason) => return Err(WidgetError::InvalidDefault { id, reason }.into()),
        };
        match (&form, spec.kind) {
            (None, WidgetKind::FormSubmitButton) => {
                return Err(WidgetError::SubmitOutsideForm(id).into())
            }
            (Some(form), kind @ (WidgetKind::Button | WidgetKind::ChatInput)) => {
                return Err(WidgetError::NotAllowedInForm {
                    id,
                    kind,
                    form: form.clone(),
                }
                .into())
            }
            (Some(form), kind)
                if kind != WidgetKind::FormSubmitButton && spec.callback.is_some() =>
            {
                return Err(WidgetError::CallbackInForm {
                    id,
                    form: form.clone(),
                }
                .into())
            }
            _ => {}
        }

        let value = match &spec.key {
            Some(key) => match self.state.get(key) {
                Some(stored) => match spec.constraint.check(stored) {
                    Ok(value) => value,
                    Err(reason) => {
                        return Err(WidgetError::InvalidStateValue { id, reason }.into())
                    }
                },
                None => {
                    self.state.set(key.clone(), default.clone());
                    default
                }
            },
            None => match self.interaction.values.get(&id) {
                Some(value) => value.clone(),
                None => default,
            },
        };
        let output = match from_value::<W::Output>(&value) {
            Ok(output) => output,
            Err(source) => return Err(WidgetError::Decode { id, source }.into()),
        };

        if spec.kind == WidgetKind::FormSubmitButton {
            if let Some(form) = &mut self.form {
                form.submit.get_or_insert_with(|| id.clone());
            }
        }
        self.canvas.push(Element::Widget(WidgetView {
            id: id.clone(),
            kind: spec.kind,
            label: spec.label.clone(),
            value: value.clone(),
            constraint: spec.constraint.clone(),
            placeholder: spec.placeholder.clone(),
            help: spec.help.clone(),
            disabled: spec.disabled,
            form: form.clone(),
        }));
        self.registry.widgets.insert(
            id,
            WidgetEntry {
                spec,
                form,
                fragment: self.fragment.clone(),
                value,
            },
        );
        Ok(output)
    }

    pub fn text_input(&mut self, label: impl Into<String>) -> PassResult<String> {
        self.widget(TextInput::new(label))
    }
    pub fn text_area(&mut self, label: impl Into<String>) -> PassResult<String> {
        self.widget(TextArea::new(label))
    }
    pub fn selectbox<O: Into<String>>(
        &mut self,
        label: impl Into<String>,
        options: impl IntoIterator<Item = O>,
    ) -> PassResult<String> {
        self.widget(Selectbox::new(label, options))
    }
    pub fn radio<O: Into<String>>(
        &mut self,
        label: impl Into<String>,
        options: impl IntoIterator<Item = O>,
    ) -> PassResult<String> {
        self.widget(Radio::new(label, options))
    }
    pub fn multiselect<O: Into<String>>(
        &mut self,
        label: impl Into<String>,
        options: impl IntoIterator<Item = O>,
    ) -> PassResult<Vec<String>> {
        self.widget(Multiselect::new(label, options))
    }
    pub fn slider<N: Number>(&mut self, label: impl Into<String>, min: N, max: N) -> PassResult<N> {
        self.widget(Slider::new(label, min, max))
    }
    pub fn number_input<N: Number>(&mut self, label: impl Into<String>) -> PassResult<N> {
        self.widget(NumberInput::new(label))
    }
    pub fn checkbox(&mut self, label: impl Into<String>) -> PassResult<bool> {
        self.widget(Checkbox::new(label))
    }
    pub fn toggle(&mut self, label: impl Into<String>) -> PassResult<bool> {
        self.widget(Toggle::new(label))
    }
    pub fn file_uploader(&mut self, label: impl Into<String>) -> PassResult<Option<UploadedFile>> {
        self.widget(FileUploader::new(label))
    }
    pub fn button(&mut self, label: impl Into<String>) -> PassResult<bool> {
        self.widget(Button::new(label))
    }
    pub fn form_submit_button(&mut self, label: impl Into<String>) -> PassResult<bool> {
        self.widget(FormSubmitButton::new(label))
    }
    pub fn chat_input(&mut self, placeholder: impl Into<String>) -> PassResult<Option<String>> {
        self.widget(ChatInput::new(placeholder))
    }
}
