use std::{
    fs,
    time::{Duration, Instant},
};

use assert_call::{call, CallRecorder};
use serde_json::json;
use tempfile::TempDir;

use crate::{App, AppConfig, Event, EventError, Runtime, ScriptError, Secrets, SecretsError};

fn counter_app() -> App {
    App::new(|pass| {
        if pass.button("+1")? {
            pass.state_mut().increment("count", 1);
        }
        let count = pass.state().get("count").cloned().unwrap_or(json!(0));
        pass.write(format!("count {count}"));
        Ok(())
    })
}

#[test]
fn sessions_are_independent() {
    let mut rt = Runtime::new(counter_app());
    let (a, report) = rt.connect();
    assert!(report.is_completed());
    let (b, _) = rt.connect();
    assert_ne!(a, b);
    assert_eq!(rt.len(), 2);

    rt.dispatch(a, Event::click("button:+1")).unwrap();
    rt.dispatch(a, Event::click("button:+1")).unwrap();
    assert_eq!(rt.session(a).unwrap().state()["count"], json!(2));
    assert!(rt.session(b).unwrap().state().get("count").is_none());
}

#[test]
fn disconnect() {
    let mut rt = Runtime::new(counter_app());
    let (id, _) = rt.connect();
    assert!(rt.disconnect(id));
    assert!(!rt.disconnect(id));
    assert!(rt.is_empty());
    assert_eq!(
        rt.dispatch(id, Event::Rerun).unwrap_err(),
        EventError::UnknownSession(id)
    );
}

#[test]
fn expire_idle_sessions() {
    let mut config = AppConfig::default();
    config.server.session_ttl_secs = 60;
    let mut rt = Runtime::new(counter_app().with_config(config));
    let (a, _) = rt.connect();
    let (b, _) = rt.connect();

    let now = Instant::now();
    assert!(rt.expire_idle(now + Duration::from_secs(30)).is_empty());
    assert_eq!(rt.len(), 2);

    let mut expired = rt.expire_idle(now + Duration::from_secs(120));
    expired.sort();
    assert_eq!(expired, vec![a, b]);
    assert!(rt.session(a).is_none());
    assert!(rt.is_empty());
}

#[test]
fn tick_reaches_every_session() {
    let mut cr = CallRecorder::new();
    let mut rt = Runtime::new(App::new(|pass| {
        pass.fragment_with(
            crate::Fragment::new("clock").run_every(Duration::from_secs(5)),
            |pass| {
                call!("clock {}", pass.scope());
                Ok(())
            },
        )
    }));
    rt.connect();
    rt.connect();
    cr.verify(["clock app", "clock app"]);

    let reports = rt.tick(Instant::now() + Duration::from_secs(10));
    assert_eq!(reports.len(), 2);
    cr.verify(["clock fragment clock", "clock fragment clock"]);
}

#[test]
fn secrets_loaded_lazily() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secrets.toml");
    let mut config = AppConfig::default();
    config.secrets.paths = vec![path.clone()];
    let mut rt = Runtime::new(
        App::new(|pass| {
            let secrets = pass.secrets()?;
            let key: String = secrets.get_as("api_key")?;
            pass.write(key);
            Ok(())
        })
        .with_config(config),
    );

    let (id, report) = rt.connect();
    assert!(matches!(
        report.error(),
        Some(ScriptError::Secrets(SecretsError::NotFound { .. }))
    ));

    fs::write(&path, "api_key = \"abc\"\n").unwrap();
    let report = rt.dispatch(id, Event::Rerun).unwrap().unwrap();
    assert!(report.is_completed());
    assert_eq!(rt.app().secrets().unwrap().source(), Some(path.as_path()));
}

#[test]
fn secrets_supplied_directly() {
    let secrets = Secrets::from_toml_str("[db]\nuser = \"admin\"\n").unwrap();
    let app = App::new(|_| Ok(())).with_secrets(secrets);
    let s = app.secrets().unwrap();
    assert_eq!(s.section("db").unwrap().get_as::<String>("user").unwrap(), "admin");
    assert_eq!(s.source(), None);
}
