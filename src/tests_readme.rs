// #![include_doc("../README.md", start)]
//! # rerun-session
//!
//! `rerun-session` is a session state engine for rerun-driven UI scripts, designed to be used as a foundation for script-style UI runtimes.
//!
//! A script is an ordinary Rust closure. Every time the user interacts with the page, the script runs again from the top. Widgets return their current value, state that must survive a rerun lives in a per-session store, and expensive work is memoized in a cache shared by all sessions.
//!
//! The crate does not render anything. It produces a tree of output elements for each pass and consumes the events a client sends back. Serving, rendering, and theming are left to the host.
//!
//! ## Features
//!
//! - Full passes and fragment passes
//! - Rerun and stop as control-flow values propagated with `?`
//! - Per-session state with two-way widget binding
//! - Memoization in data mode (independent copies) or resource mode (one shared instance)
//! - Forms, callbacks, multipage navigation, page configuration, and secrets
//!
//! ### Execution passes
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rerun_session::{App, Button, Callback, Event, Session};
//!
//! let app = Arc::new(App::new(|pass| {
//!     pass.title("Counter");
//!     pass.widget(Button::new("+1").on_click(Callback::new(|state| {
//!         state.increment("count", 1);
//!     })))?;
//!     let count = pass.state().get_as::<i64>("count")?.unwrap_or(0);
//!     pass.write(format!("count: {count}"));
//!     Ok(())
//! }));
//!
//! let mut session = Session::new(app);
//! session.start();
//! session.dispatch(Event::click("button:+1")).unwrap();
//! session.dispatch(Event::click("button:+1")).unwrap();
//! assert_eq!(session.state()["count"], 2);
//! ```
//!
//! Callbacks run after the event is applied and before the pass, so the pass sees their writes.
//!
//! A pass can be cut short with `pass.rerun()` (discard the output and run again) or `pass.stop()` (keep the output emitted so far). Any other error ends the pass and is shown to the user as an exception element; state written before the error is kept.
//!
//! ### Caching
//!
//! ```rust
//! use std::convert::Infallible;
//!
//! use rerun_session::{CacheTable, CachedData, CachedResource};
//!
//! let rows = CachedData::new("rows", |n: &usize| Ok::<_, Infallible>(vec![0; *n]));
//! let model = CachedResource::new("model", |name: &String| Ok::<_, Infallible>(name.clone()));
//! let cache = CacheTable::new();
//!
//! let mut a = rows.call(&cache, &3).unwrap();
//! a[0] = 1;
//! assert_eq!(rows.call(&cache, &3).unwrap(), vec![0, 0, 0]);
//!
//! let m1 = model.call(&cache, &"bert".to_owned()).unwrap();
//! let m2 = model.call(&cache, &"bert".to_owned()).unwrap();
//! assert!(std::sync::Arc::ptr_eq(&m1, &m2));
//! ```
//!
//! ### Configuration
//!
//! `AppConfig::discover(root)` reads `.rerun/config.toml` if it exists:
//!
//! ```toml
//! [runner]
//! max_reruns = 100
//!
//! [server]
//! session_ttl_secs = 3600
//!
//! [client]
//! show_error_details = true
//!
//! [secrets]
//! paths = [".rerun/secrets.toml"]
//! ```
//!
//! Secrets are read from the first existing file in `secrets.paths` the first time a pass asks for them.
//!
//! ## License
//!
//! This project is dual licensed under Apache-2.0/MIT.
// #![include_doc("../README.md", end)]
