use std::{convert::Infallible, sync::Arc};

use assert_call::{call, CallRecorder};
use rerun_session::*;

fn app() -> App {
    let rows = CachedData::new("rows", |n: &usize| {
        call!("rows {n}");
        Ok::<_, Infallible>(vec![1; *n])
    });
    let model = CachedResource::new("model", |name: &String| {
        call!("model {name}");
        Ok::<_, Infallible>(name.to_uppercase())
    });
    App::new(move |pass| {
        let n = pass.slider("Rows", 1usize, 10)?;
        let data = rows.call(pass.cache(), &n)?;
        let model = model.call(pass.cache(), &"bert".to_owned())?;
        pass.write(format!("{} {}", data.len(), model));
        Ok(())
    })
}

#[test]
fn cache_is_shared_across_sessions() {
    let mut cr = CallRecorder::new();
    let app = Arc::new(app());
    let mut a = Session::new(app.clone());
    let mut b = Session::new(app.clone());

    a.start();
    cr.verify(["rows 1", "model bert"]);
    b.start();
    cr.verify(());

    a.dispatch(Event::change("slider:Rows", 3)).unwrap();
    cr.verify("rows 3");
    b.dispatch(Event::change("slider:Rows", 3)).unwrap();
    cr.verify(());

    assert_eq!(app.cache().len(CacheMode::Data), 2);
    assert_eq!(app.cache().len(CacheMode::Resource), 1);
}

#[test]
fn clearing_forces_recompute() {
    let mut cr = CallRecorder::new();
    let app = Arc::new(app());
    let mut s = Session::new(app.clone());
    s.start();
    cr.verify(["rows 1", "model bert"]);

    app.cache().clear(&FunctionId::new("rows"));
    s.dispatch(Event::Rerun).unwrap();
    cr.verify("rows 1");

    app.cache().clear_all();
    s.dispatch(Event::Rerun).unwrap();
    cr.verify(["rows 1", "model bert"]);
}
