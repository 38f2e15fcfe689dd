use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::{FormId, FragmentId, Value, WidgetView};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr, Serialize, Deserialize)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr, Serialize, Deserialize)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    Running,
    Complete,
    Error,
}

/// One entry of a rendered navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub title: String,
    pub icon: Option<String>,
    pub url_path: String,
    pub selected: bool,
}

/// A single item of the output stream produced by a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Title { body: String },
    Header { body: String },
    Subheader { body: String },
    Text { body: String },
    Markdown { body: String },
    Caption { body: String },
    Code { code: String, language: Option<String> },
    Divider,
    Json { value: Value },
    Table { value: Value },
    Metric {
        label: String,
        value: String,
        delta: Option<String>,
    },
    Alert { level: AlertLevel, body: String },
    Toast { body: String, icon: Option<String> },
    Balloons,
    Snow,
    Exception { message: String },
    Widget(WidgetView),
    Navigation { entries: Vec<NavEntry> },
    /// Single-slot container whose content can be replaced later in the same pass.
    Slot { id: u64, children: Vec<Element> },
    Block(Block),
}

impl Element {
    pub fn children(&self) -> &[Element] {
        match self {
            Self::Block(block) => &block.children,
            Self::Slot { children, .. } => children,
            _ => &[],
        }
    }

    /// Visits this element and all of its descendants in document order.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub children: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Sidebar,
    Columns,
    Column,
    Tabs { labels: Vec<String> },
    Tab { label: String },
    Expander { label: String, expanded: bool },
    Container { border: bool },
    Form { id: FormId },
    ChatMessage { role: String },
    Status {
        label: String,
        state: StatusState,
        expanded: bool,
    },
    Fragment { id: FragmentId },
    Dialog { title: String },
}

/// Replaces the children of the fragment block `id` within `elements`.
///
/// Returns `false` if no such block exists.
pub(crate) fn replace_fragment(
    elements: &mut [Element],
    id: &FragmentId,
    children: Vec<Element>,
) -> bool {
    let mut children = Some(children);
    replace_fragment_in(elements, id, &mut children)
}
fn replace_fragment_in(
    elements: &mut [Element],
    id: &FragmentId,
    children: &mut Option<Vec<Element>>,
) -> bool {
    for e in elements {
        let found = match e {
            Element::Block(Block {
                kind: BlockKind::Fragment { id: block_id },
                children: old,
            }) if block_id == id => {
                if let Some(children) = children.take() {
                    *old = children;
                }
                return true;
            }
            Element::Block(Block { children: c, .. }) | Element::Slot { children: c, .. } => {
                replace_fragment_in(c, id, children)
            }
            _ => false,
        };
        if found {
            return true;
        }
    }
    false
}

fn find_slot<'a>(elements: &'a mut [Element], id: u64) -> Option<&'a mut Vec<Element>> {
    for e in elements {
        let hit = matches!(e, Element::Slot { id: slot_id, .. } if *slot_id == id);
        let children = match e {
            Element::Block(Block { children, .. }) | Element::Slot { children, .. } => children,
            _ => continue,
        };
        if hit {
            return Some(children);
        }
        if let Some(found) = find_slot(children, id) {
            return Some(found);
        }
    }
    None
}

enum Target {
    Root,
    Block(BlockKind),
    Slot(u64),
}

struct Frame {
    target: Target,
    children: Vec<Element>,
}

/// Builder of the element tree emitted by one pass.
pub(crate) struct Canvas {
    stack: Vec<Frame>,
    next_slot: u64,
    emitted: bool,
}

impl Canvas {
    pub fn new(next_slot: u64) -> Self {
        Self {
            stack: vec![Frame {
                target: Target::Root,
                children: Vec::new(),
            }],
            next_slot,
            emitted: false,
        }
    }

    /// Whether anything has been emitted in this pass.
    pub fn has_output(&self) -> bool {
        self.emitted
    }

    pub fn next_slot(&self) -> u64 {
        self.next_slot
    }

    fn top(&mut self) -> &mut Frame {
        let index = self.stack.len() - 1;
        &mut self.stack[index]
    }

    pub fn push(&mut self, element: Element) {
        self.emitted = true;
        self.top().children.push(element);
    }

    pub fn open(&mut self, kind: BlockKind) {
        self.emitted = true;
        self.stack.push(Frame {
            target: Target::Block(kind),
            children: Vec::new(),
        });
    }

    /// Emits an empty slot and returns its id.
    pub fn slot(&mut self) -> u64 {
        let id = self.next_slot;
        self.next_slot += 1;
        self.push(Element::Slot {
            id,
            children: Vec::new(),
        });
        id
    }

    /// Starts collecting elements that will replace the content of slot `id` on close.
    pub fn fill(&mut self, id: u64) -> bool {
        let exists = self
            .stack
            .iter_mut()
            .any(|frame| find_slot(&mut frame.children, id).is_some());
        if exists {
            self.stack.push(Frame {
                target: Target::Slot(id),
                children: Vec::new(),
            });
        }
        exists
    }

    pub fn close(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame.target {
            Target::Root => {}
            Target::Block(kind) => self.top().children.push(Element::Block(Block {
                kind,
                children: frame.children,
            })),
            Target::Slot(id) => {
                for f in self.stack.iter_mut().rev() {
                    if let Some(slot) = find_slot(&mut f.children, id) {
                        *slot = frame.children;
                        break;
                    }
                }
            }
        }
    }

    /// Applies `f` to the innermost open status block.
    pub fn update_status(
        &mut self,
        f: impl FnOnce(&mut String, &mut StatusState, &mut bool),
    ) -> bool {
        for frame in self.stack.iter_mut().rev() {
            if let Target::Block(BlockKind::Status {
                label,
                state,
                expanded,
            }) = &mut frame.target
            {
                f(label, state, expanded);
                return true;
            }
        }
        false
    }

    /// Closes every open block and returns the top-level elements.
    pub fn finish(mut self) -> Vec<Element> {
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack.pop().map(|f| f.children).unwrap_or_default()
    }
}
