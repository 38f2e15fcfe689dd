use std::{
    convert::Infallible,
    fmt,
    sync::{Arc, Mutex},
};

use assert_call::{call, CallRecorder};
use rstest::rstest;

use crate::{CacheError, CacheMode, CacheTable, CachedData, CachedResource, FunctionId};

const LOAD: FunctionId = FunctionId::new("load_data");

fn load(n: &usize) -> Result<Vec<i32>, Infallible> {
    call!("load {n}");
    Ok(vec![0; *n])
}

#[test]
fn data_computes_once_per_key() {
    let mut cr = CallRecorder::new();
    let cache = CacheTable::new();

    assert_eq!(cache.data(&LOAD, &2, load).unwrap(), vec![0, 0]);
    cr.verify("load 2");

    assert_eq!(cache.data(&LOAD, &2, load).unwrap(), vec![0, 0]);
    cr.verify(());

    assert_eq!(cache.data(&LOAD, &3, load).unwrap().len(), 3);
    cr.verify("load 3");
}

#[test]
fn data_copies_are_independent() {
    let mut cr = CallRecorder::new();
    let cache = CacheTable::new();
    let mut a = cache.data(&LOAD, &2, load).unwrap();
    let b = cache.data(&LOAD, &2, load).unwrap();
    a[0] = 42;
    assert_eq!(b, vec![0, 0]);
    assert_eq!(cache.data(&LOAD, &2, load).unwrap(), vec![0, 0]);
    cr.verify("load 2");
}

struct Model {
    name: &'static str,
    calls: Mutex<usize>,
}

fn model(_: &()) -> Result<Model, Infallible> {
    call!("load model");
    Ok(Model {
        name: "sentiment",
        calls: Mutex::new(0),
    })
}

#[test]
fn resource_is_shared_instance() {
    let mut cr = CallRecorder::new();
    let cache = CacheTable::new();
    let f = FunctionId::new("get_model");

    let a = cache.resource(&f, &(), model).unwrap();
    let b = cache.resource(&f, &(), model).unwrap();
    cr.verify("load model");
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.name, "sentiment");

    *a.calls.lock().unwrap() += 1;
    assert_eq!(*b.calls.lock().unwrap(), 1);
}

#[rstest]
#[case(CacheMode::Data, false)]
#[case(CacheMode::Resource, true)]
fn get_or_compute_modes(#[case] mode: CacheMode, #[case] shared: bool) {
    let cache = CacheTable::new();
    let f = FunctionId::new("f");
    let compute = |n: &u32| Ok::<_, Infallible>(Arc::new(Mutex::new(*n)));

    let a = cache.get_or_compute(&f, &1, mode, compute).unwrap();
    let b = cache.get_or_compute(&f, &1, mode, compute).unwrap();
    assert_eq!(a.mode(), mode);
    match (&a, &b) {
        (crate::Cached::Shared(a), crate::Cached::Shared(b)) => assert!(Arc::ptr_eq(a, b)),
        (crate::Cached::Copied(_), crate::Cached::Copied(_)) => assert!(!shared),
        _ => panic!("mixed modes"),
    }
    assert_eq!(cache.len(mode), 1);
}

#[test]
fn clear_forces_recompute() {
    let mut cr = CallRecorder::new();
    let cache = CacheTable::new();

    cache.data(&LOAD, &2, load).unwrap();
    cr.verify("load 2");

    assert!(cache.clear(&LOAD));
    assert!(!cache.clear(&LOAD));
    cache.data(&LOAD, &2, load).unwrap();
    cr.verify("load 2");
}

#[test]
fn clear_entry_keeps_other_args() {
    let mut cr = CallRecorder::new();
    let cache = CacheTable::new();

    cache.data(&LOAD, &1, load).unwrap();
    cache.data(&LOAD, &2, load).unwrap();
    cr.verify(["load 1", "load 2"]);

    assert!(cache.clear_entry(&LOAD, &1usize).unwrap());
    assert!(!cache.clear_entry(&LOAD, &1usize).unwrap());
    cache.data(&LOAD, &1, load).unwrap();
    cache.data(&LOAD, &2, load).unwrap();
    cr.verify("load 1");
}

#[test]
fn clear_entry_with_other_arg_type() {
    let mut cr = CallRecorder::new();
    let cache = CacheTable::new();
    cache.data(&LOAD, &3, load).unwrap();
    cr.verify("load 3");

    assert!(matches!(
        cache.clear_entry(&LOAD, &3i32),
        Err(CacheError::TypeMismatch { function }) if function == LOAD
    ));
    assert!(!cache.clear_entry(&FunctionId::new("unused"), &3i32).unwrap());
    cache.data(&LOAD, &3, load).unwrap();
    cr.verify(());
}

#[derive(Debug)]
struct Unavailable;
impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unavailable")
    }
}
impl std::error::Error for Unavailable {}

#[test]
fn failure_is_not_stored() {
    let mut cr = CallRecorder::new();
    let cache = CacheTable::new();
    let f = FunctionId::new("flaky");

    let e = cache
        .data(&f, &(), |_| {
            call!("fail");
            Err::<i32, _>(Unavailable)
        })
        .unwrap_err();
    assert!(matches!(e, CacheError::Compute(Unavailable)));
    cr.verify("fail");
    assert!(cache.is_empty());

    let value = cache
        .data(&f, &(), |_| {
            call!("ok");
            Ok::<_, Unavailable>(7)
        })
        .unwrap();
    assert_eq!(value, 7);
    cr.verify("ok");
}

#[test]
fn type_mismatch() {
    let mut cr = CallRecorder::new();
    let cache = CacheTable::new();
    cache.data(&LOAD, &2, load).unwrap();
    cr.verify("load 2");
    let e = cache
        .data(&LOAD, &"2", |_| Ok::<_, Infallible>(0))
        .unwrap_err();
    assert!(matches!(e, CacheError::TypeMismatch { function } if function == LOAD));
}

#[test]
fn modes_are_separate_tables() {
    let mut cr = CallRecorder::new();
    let cache = CacheTable::new();
    cache.data(&LOAD, &2, load).unwrap();
    cr.verify("load 2");
    assert_eq!(cache.len(CacheMode::Data), 1);
    assert_eq!(cache.len(CacheMode::Resource), 0);

    cache.clear_mode(CacheMode::Data);
    assert!(cache.is_empty());
}

#[test]
fn cached_fn_wrappers() {
    let mut cr = CallRecorder::new();
    let cache = CacheTable::new();
    let rows = CachedData::new("rows", load);
    let model = CachedResource::new("model", model);

    assert_eq!(rows.call(&cache, &1).unwrap(), vec![0]);
    let m0 = model.call(&cache, &()).unwrap();
    let m1 = model.clone().call(&cache, &()).unwrap();
    cr.verify(["load 1", "load model"]);
    assert!(Arc::ptr_eq(&m0, &m1));

    assert!(rows.clear(&cache));
    rows.call(&cache, &1).unwrap();
    cr.verify("load 1");

    assert!(model.clear_entry(&cache, &()).unwrap());
    model.call(&cache, &()).unwrap();
    cr.verify("load model");
}

#[test]
fn shared_across_threads() {
    let cache = Arc::new(CacheTable::new());
    let f = FunctionId::new("shared");
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            let f = f.clone();
            std::thread::spawn(move || {
                cache
                    .resource(&f, &(), |_| Ok::<_, Infallible>(Mutex::new(0)))
                    .unwrap()
            })
        })
        .collect();
    let values: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for v in &values[1..] {
        assert!(Arc::ptr_eq(&values[0], v));
    }
    assert_eq!(cache.len(CacheMode::Resource), 1);
}
