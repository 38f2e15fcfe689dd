use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use parse_display::Display;
use serde::{Deserialize, Serialize};

use crate::{
    output::replace_fragment,
    pass::{FragmentEntry, Interaction, PassInput, PassOutput},
    widget::{WidgetEntry, WidgetRegistry},
    App, Element, EventError, FormId, FragmentId, Interrupt, PageConfig, Pass, PassScope,
    RerunScope, ScriptError, SessionState, Value, WidgetId, WidgetKind, WidgetView,
};


const REDACTED_ERROR: &str = "This app has encountered an error. Details are hidden by the server configuration.";

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a session. Ids are never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[display("{0}")]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
    pub fn get(self) -> u64 {
        self.0
    }
}

/// An interaction reported by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A non-trigger widget received a new value.
    WidgetChanged { id: WidgetId, value: Value },
    /// A button or form submit button was clicked.
    ButtonClicked { id: WidgetId },
    /// A form was submitted together with the values entered in it.
    FormSubmitted {
        form: FormId,
        #[serde(default)]
        values: BTreeMap<WidgetId, Value>,
    },
    ChatSubmitted { id: WidgetId, text: String },
    /// A page of the navigation menu was selected, by url path.
    Navigate { page: String },
    Rerun,
}

impl Event {
    pub fn change(id: impl Into<WidgetId>, value: impl Into<Value>) -> Self {
        Self::WidgetChanged {
            id: id.into(),
            value: value.into(),
        }
    }
    pub fn click(id: impl Into<WidgetId>) -> Self {
        Self::ButtonClicked { id: id.into() }
    }
    pub fn submit(form: impl Into<FormId>) -> Self {
        Self::FormSubmitted {
            form: form.into(),
            values: BTreeMap::new(),
        }
    }
    pub fn chat(id: impl Into<WidgetId>, text: impl Into<String>) -> Self {
        Self::ChatSubmitted {
            id: id.into(),
            text: text.into(),
        }
    }
    pub fn navigate(page: impl Into<String>) -> Self {
        Self::Navigate { page: page.into() }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::WidgetChanged { .. } => "widget_changed",
            Self::ButtonClicked { .. } => "button_clicked",
            Self::FormSubmitted { .. } => "form_submitted",
            Self::ChatSubmitted { .. } => "chat_submitted",
            Self::Navigate { .. } => "navigate",
            Self::Rerun => "rerun",
        }
    }
}

/// How a pass ended.
#[derive(Debug)]
pub enum Outcome {
    Completed,
    /// The script called [`Pass::stop`].
    Stopped,
    Failed(ScriptError),
}

#[derive(Debug)]
pub struct PassReport {
    /// Scope of the pass that produced the committed output.
    pub scope: PassScope,
    /// Sequence number of that pass.
    pub number: u64,
    /// Number of reruns requested before it.
    pub reruns: usize,
    pub outcome: Outcome,
}

impl PassReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, Outcome::Completed)
    }
    pub fn error(&self) -> Option<&ScriptError> {
        match &self.outcome {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// One client's view of an app: its session state and the output of its last passes.
///
/// Passes of a session never overlap; every method that runs a pass takes `&mut self`.
pub struct Session {
    id: SessionId,
    app: Arc<App>,
    state: SessionState,
    registry: WidgetRegistry,
    fragments: HashMap<FragmentId, FragmentEntry>,
    output: Vec<Element>,
    page_config: Option<PageConfig>,
    selected_page: Option<String>,
    pages: Vec<String>,
    form_buffers: HashMap<FormId, BTreeMap<WidgetId, Value>>,
    passes: u64,
    next_slot: u64,
    last_active: Instant,
}

impl Session {
    /// Creates a session without running the script. Call [`Session::start`] to render it.
    pub fn new(app: Arc<App>) -> Self {
        Self {
            id: SessionId::next(),
            app,
            state: SessionState::new(),
            registry: WidgetRegistry::default(),
            fragments: HashMap::new(),
            output: Vec::new(),
            page_config: None,
            selected_page: None,
            pages: Vec::new(),
            form_buffers: HashMap::new(),
            passes: 0,
            next_slot: 0,
            last_active: Instant::now(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }
    pub fn app(&self) -> &Arc<App> {
        &self.app
    }
    pub fn state(&self) -> &SessionState {
        &self.state
    }
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }
    /// Output tree of the last full pass, with fragment passes applied on top.
    pub fn output(&self) -> &[Element] {
        &self.output
    }
    /// Page configuration most recently declared, or the defaults.
    pub fn page_config(&self) -> PageConfig {
        self.page_config.clone().unwrap_or_default()
    }
    pub fn selected_page(&self) -> Option<&str> {
        self.selected_page.as_deref()
    }
    /// Url paths of the pages in the navigation menu of the last full pass.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }
    /// Number of passes run so far, including discarded ones.
    pub fn passes(&self) -> u64 {
        self.passes
    }
    pub fn last_active(&self) -> Instant {
        self.last_active
    }

    /// Finds the rendered view of a widget declared by the last passes.
    pub fn widget(&self, id: &WidgetId) -> Option<&WidgetView> {
        let mut found = None;
        for e in &self.output {
            e.visit(&mut |e| {
                if let Element::Widget(view) = e {
                    if &view.id == id {
                        found = Some(view);
                    }
                }
            });
        }
        found
    }

    /// Values entered into `form` that have not been submitted yet.
    pub fn pending_form_values(&self, form: &FormId) -> Option<&BTreeMap<WidgetId, Value>> {
        self.form_buffers.get(form)
    }

    /// Runs a full pass.
    pub fn start(&mut self) -> PassReport {
        self.run(PassScope::App, Interaction::default(), Instant::now())
    }

    /// Applies `event` and runs the pass it triggers.
    ///
    /// Returns `Ok(None)` if the event was accepted without running a pass,
    /// as for changes to widgets inside a form.
    pub fn dispatch(&mut self, event: Event) -> Result<Option<PassReport>, EventError> {
        let now = Instant::now();
        let name = event.name();
        tracing::debug!(session = %self.id, event = name, "event");
        match self.apply(event) {
            Ok(Some((scope, interaction))) => Ok(Some(self.run(scope, interaction, now))),
            Ok(None) => {
                self.last_active = now;
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(session = %self.id, event = name, error = %e, "event rejected");
                Err(e)
            }
        }
    }

    /// Reruns every fragment whose `run_every` interval has elapsed at `now`.
    pub fn tick(&mut self, now: Instant) -> Vec<PassReport> {
        let mut due: Vec<FragmentId> = self
            .fragments
            .iter()
            .filter(|(_, f)| f.is_due(now))
            .map(|(id, _)| id.clone())
            .collect();
        due.sort();
        let mut reports = Vec::new();
        for id in due {
            if self.fragments.get(&id).is_some_and(|f| f.is_due(now)) {
                reports.push(self.run(PassScope::Fragment(id), Interaction::default(), now));
            }
        }
        reports
    }

    fn apply(&mut self, event: Event) -> Result<Option<(PassScope, Interaction)>, EventError> {
        let mut interaction = Interaction::default();
        let scope = match event {
            Event::Rerun => PassScope::App,
            Event::Navigate { page } => {
                if !self.pages.contains(&page) {
                    return Err(EventError::UnknownPage(page));
                }
                self.selected_page = Some(page);
                PassScope::App
            }
            Event::WidgetChanged { id, value } => {
                let entry = self
                    .entry(&id, "widget_changed", |k| !k.is_trigger())?
                    .clone();
                let value = check(&entry, &id, &value)?;
                if let Some(form) = &entry.form {
                    self.form_buffers
                        .entry(form.clone())
                        .or_default()
                        .insert(id, value);
                    return Ok(None);
                }
                if self.write(&entry, &id, value, &mut interaction) {
                    if let Some(callback) = &entry.spec.callback {
                        callback.call(&mut self.state);
                    }
                }
                scope_of(entry.fragment)
            }
            Event::ButtonClicked { id } => {
                let entry = self
                    .entry(&id, "button_clicked", |k| {
                        matches!(k, WidgetKind::Button | WidgetKind::FormSubmitButton)
                    })?
                    .clone();
                if let Some(form) = entry.form.clone() {
                    return self
                        .submit(form, Some(id), BTreeMap::new())
                        .map(Some);
                }
                self.press(&entry, &id, Value::Bool(true), &mut interaction);
                scope_of(entry.fragment)
            }
            Event::ChatSubmitted { id, text } => {
                let entry = self
                    .entry(&id, "chat_submitted", |k| k == WidgetKind::ChatInput)?
                    .clone();
                let value = check(&entry, &id, &Value::String(text))?;
                self.press(&entry, &id, value, &mut interaction);
                scope_of(entry.fragment)
            }
            Event::FormSubmitted { form, values } => {
                return self.submit(form, None, values).map(Some);
            }
        };
        Ok(Some((scope, interaction)))
    }

    fn entry(
        &self,
        id: &WidgetId,
        event: &'static str,
        accepts: impl Fn(WidgetKind) -> bool,
    ) -> Result<&WidgetEntry, EventError> {
        let Some(entry) = self.registry.widgets.get(id) else {
            return Err(EventError::UnknownWidget(id.clone()));
        };
        if !accepts(entry.spec.kind) {
            return Err(EventError::WrongEventKind {
                id: id.clone(),
                kind: entry.spec.kind,
                event,
            });
        }
        if entry.spec.disabled {
            return Err(EventError::Disabled(id.clone()));
        }
        Ok(entry)
    }

    /// Stores the new value of a non-trigger widget. Returns `true` if the value changed.
    fn write(
        &mut self,
        entry: &WidgetEntry,
        id: &WidgetId,
        value: Value,
        interaction: &mut Interaction,
    ) -> bool {
        match &entry.spec.key {
            Some(key) => {
                let changed = self.state.get(key) != Some(&value);
                self.state.set(key.clone(), value);
                changed
            }
            None => {
                let changed = entry.value != value;
                interaction.values.insert(id.clone(), value);
                changed
            }
        }
    }

    /// Sets a trigger widget for the next pass and runs its callback.
    fn press(
        &mut self,
        entry: &WidgetEntry,
        id: &WidgetId,
        value: Value,
        interaction: &mut Interaction,
    ) {
        match &entry.spec.key {
            Some(key) => {
                interaction
                    .resets
                    .push((key.clone(), entry.spec.default.clone()));
                self.state.set(key.clone(), value);
            }
            None => {
                interaction.values.insert(id.clone(), value);
                interaction.triggers.push(id.clone());
            }
        }
        if let Some(callback) = &entry.spec.callback {
            callback.call(&mut self.state);
        }
    }

    fn submit(
        &mut self,
        form: FormId,
        button: Option<WidgetId>,
        values: BTreeMap<WidgetId, Value>,
    ) -> Result<(PassScope, Interaction), EventError> {
        let Some(form_entry) = self.registry.forms.get(&form).cloned() else {
            return Err(EventError::UnknownForm(form));
        };
        let Some(button) = button.or(form_entry.submit) else {
            return Err(EventError::UnknownForm(form));
        };
        let submit = self
            .entry(&button, "form_submitted", |k| {
                k == WidgetKind::FormSubmitButton
            })?
            .clone();

        let mut pending = self.form_buffers.get(&form).cloned().unwrap_or_default();
        for (id, value) in values {
            let entry = self.entry(&id, "form_submitted", |k| !k.is_trigger())?;
            if entry.form.as_ref() != Some(&form) {
                return Err(EventError::NotInForm { id, form });
            }
            let value = check(entry, &id, &value)?;
            pending.insert(id, value);
        }
        self.form_buffers.remove(&form);

        let mut interaction = Interaction::default();
        for (id, value) in pending {
            if let Some(entry) = self.registry.widgets.get(&id).cloned() {
                self.write(&entry, &id, value, &mut interaction);
            }
        }
        if form_entry.clear_on_submit {
            for entry in self.registry.widgets.values() {
                if entry.form.as_ref() == Some(&form) && entry.spec.kind != WidgetKind::FormSubmitButton {
                    if let Some(key) = &entry.spec.key {
                        interaction
                            .resets
                            .push((key.clone(), entry.spec.default.clone()));
                    }
                }
            }
        }
        self.press(&submit, &button, Value::Bool(true), &mut interaction);
        Ok((scope_of(form_entry.fragment), interaction))
    }

    /// Runs passes until one is not interrupted by a rerun, then commits its output.
    fn run(&mut self, scope: PassScope, mut interaction: Interaction, now: Instant) -> PassReport {
        self.last_active = now;
        let max_reruns = self.app.config().runner.max_reruns;
        let mut scope = scope;
        let mut reruns = 0;
        loop {
            let script = match &scope {
                PassScope::App => self.app.script().clone(),
                PassScope::Fragment(id) => match self.fragments.get(id) {
                    Some(fragment) => fragment.body.clone(),
                    None => {
                        scope = PassScope::App;
                        continue;
                    }
                },
            };
            self.passes += 1;
            let number = self.passes;
            tracing::debug!(session = %self.id, %scope, pass = number, "pass start");

            let mut pass = Pass::new(PassInput {
                session_id: self.id,
                number,
                scope: scope.clone(),
                now,
                app: &self.app,
                state: &mut self.state,
                interaction: &interaction,
                selected_page: &mut self.selected_page,
                next_slot: self.next_slot,
            });
            let result = script.call(&mut pass);
            let output = pass.finish();
            interaction.end_trigger(&mut self.state);

            let outcome = match result {
                Ok(()) => Outcome::Completed,
                Err(Interrupt::Stop) => Outcome::Stopped,
                Err(Interrupt::Failed(e)) => Outcome::Failed(e),
                Err(Interrupt::Rerun(_)) if reruns >= max_reruns => {
                    Outcome::Failed(ScriptError::RerunLimit(max_reruns))
                }
                Err(Interrupt::Rerun(next)) => {
                    reruns += 1;
                    tracing::debug!(session = %self.id, %scope, rerun = %next, "rerun requested");
                    scope = match (next, scope) {
                        (RerunScope::Fragment, PassScope::Fragment(id)) => PassScope::Fragment(id),
                        _ => PassScope::App,
                    };
                    continue;
                }
            };
            self.commit(&scope, output, &outcome, now);
            tracing::debug!(session = %self.id, %scope, pass = number, reruns, "pass end");
            return PassReport {
                scope,
                number,
                reruns,
                outcome,
            };
        }
    }

    fn commit(&mut self, scope: &PassScope, output: PassOutput, outcome: &Outcome, now: Instant) {
        let mut elements = output.elements;
        if let Outcome::Failed(e) = outcome {
            tracing::warn!(session = %self.id, %scope, error = %e, "pass failed");
            let message = if self.app.config().client.show_error_details {
                e.to_string()
            } else {
                REDACTED_ERROR.to_owned()
            };
            elements.push(Element::Exception { message });
        }
        self.next_slot = output.next_slot;
        match scope {
            PassScope::App => {
                self.output = elements;
                self.registry = output.registry;
                self.fragments = output.fragments;
                if output.page_config.is_some() {
                    self.page_config = output.page_config;
                }
                self.pages = output.pages.unwrap_or_default();
                let forms = &self.registry.forms;
                self.form_buffers.retain(|id, _| forms.contains_key(id));
            }
            PassScope::Fragment(id) => {
                replace_fragment(&mut self.output, id, elements);
                let mut registry = self.registry.without_fragment(id);
                registry.absorb(output.registry);
                self.registry = registry;
                if let Some(fragment) = self.fragments.get_mut(id) {
                    fragment.last_run = now;
                }
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("passes", &self.passes)
            .field("selected_page", &self.selected_page)
            .finish_non_exhaustive()
    }
}

fn check(entry: &WidgetEntry, id: &WidgetId, value: &Value) -> Result<Value, EventError> {
    entry
        .spec
        .constraint
        .check(value)
        .map_err(|reason| EventError::InvalidValue {
            id: id.clone(),
            reason,
        })
}

fn scope_of(fragment: Option<FragmentId>) -> PassScope {
    match fragment {
        Some(id) => PassScope::Fragment(id),
        None => PassScope::App,
    }
}
