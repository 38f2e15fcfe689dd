use std::fmt;

use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::{NavEntry, NavigationError, Pass, PassResult, Script};


#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, FromStr, Serialize, Deserialize,
)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Centered,
    Wide,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, FromStr, Serialize, Deserialize,
)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SidebarState {
    #[default]
    Auto,
    Expanded,
    Collapsed,
}

/// Links shown in the app menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuItems {
    pub get_help: Option<String>,
    pub report_a_bug: Option<String>,
    pub about: Option<String>,
}

/// Page-level settings. Must be declared before any other output of a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub layout: Layout,
    pub initial_sidebar_state: SidebarState,
    pub menu_items: MenuItems,
}

impl PageConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }
    pub fn initial_sidebar_state(mut self, state: SidebarState) -> Self {
        self.initial_sidebar_state = state;
        self
    }
    pub fn menu_items(mut self, menu_items: MenuItems) -> Self {
        self.menu_items = menu_items;
        self
    }
}

/// A page of a multipage app: a title and the script body that renders it.
#[derive(Clone)]
pub struct Page {
    title: String,
    icon: Option<String>,
    default: bool,
    url_path: String,
    body: Script,
}

impl Page {
    pub fn new(
        title: impl Into<String>,
        body: impl Fn(&mut Pass) -> PassResult + Send + Sync + 'static,
    ) -> Self {
        let title = title.into();
        Self {
            url_path: slug(&title),
            title,
            icon: None,
            default: false,
            body: Script::new(body),
        }
    }
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
    pub fn default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }
    pub fn url_path(mut self, url_path: impl Into<String>) -> Self {
        self.url_path = url_path.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn path(&self) -> &str {
        &self.url_path
    }
    pub fn is_default(&self) -> bool {
        self.default
    }
}
impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("title", &self.title)
            .field("icon", &self.icon)
            .field("default", &self.default)
            .field("url_path", &self.url_path)
            .finish_non_exhaustive()
    }
}

fn slug(title: &str) -> String {
    let mut s = String::new();
    for c in title.chars() {
        if c.is_alphanumeric() {
            s.extend(c.to_lowercase());
        } else if !s.is_empty() && !s.ends_with('-') {
            s.push('-');
        }
    }
    while s.ends_with('-') {
        s.pop();
    }
    if s.is_empty() {
        s.push_str("page");
    }
    s
}

/// The page menu declared by a pass, with the page selected for this session.
#[derive(Debug, Clone)]
pub struct Navigation {
    pages: Vec<Page>,
    selected: usize,
}

impl Navigation {
    /// Validates `pages` and selects the page whose url path is `current`,
    /// falling back to the default page, then to the first page.
    pub(crate) fn new(pages: Vec<Page>, current: Option<&str>) -> Result<Self, NavigationError> {
        if pages.is_empty() {
            return Err(NavigationError::NoPages);
        }
        for (i, page) in pages.iter().enumerate() {
            if pages[..i].iter().any(|p| p.url_path == page.url_path) {
                return Err(NavigationError::DuplicatePage(page.url_path.clone()));
            }
        }
        if pages.iter().filter(|p| p.default).count() > 1 {
            return Err(NavigationError::MultipleDefaults);
        }
        let selected = current
            .and_then(|current| pages.iter().position(|p| p.url_path == current))
            .or_else(|| pages.iter().position(|p| p.default))
            .unwrap_or(0);
        Ok(Self { pages, selected })
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }
    pub fn selected(&self) -> &Page {
        &self.pages[self.selected]
    }

    pub(crate) fn entries(&self) -> Vec<NavEntry> {
        self.pages
            .iter()
            .enumerate()
            .map(|(i, p)| NavEntry {
                title: p.title.clone(),
                icon: p.icon.clone(),
                url_path: p.url_path.clone(),
                selected: i == self.selected,
            })
            .collect()
    }

    /// Runs the selected page's body in the current pass.
    pub fn run(&self, pass: &mut Pass) -> PassResult {
        let page = self.selected();
        tracing::debug!(page = %page.url_path, "run page");
        page.body.call(pass)
    }
}
