//! A rerun-driven session state engine.
//!
//! A script is a closure over a [`Pass`]. A [`Session`] applies client [`Event`]s to its
//! [`SessionState`] and then runs the script again from the top (or only one fragment of it),
//! producing a tree of [`Element`]s for the client to render.
//!
//! Results of expensive functions are memoized by a [`CacheTable`] shared across sessions,
//! either as independent copies ([`CacheMode::Data`]) or as one shared instance ([`CacheMode::Resource`]).

mod cache;
mod config;
mod error;
mod output;
mod page;
mod pass;
mod runtime;
mod secrets;
mod session;
mod state;
mod value;
mod widget;

#[cfg(doctest)]
mod tests_readme;

pub use cache::*;
pub use config::*;
pub use error::*;
pub use output::*;
pub use page::*;
pub use pass::*;
pub use runtime::*;
pub use secrets::*;
pub use session::*;
pub use state::*;
pub use value::*;
pub use widget::*;
