use rstest::rstest;
use serde_json::json;

use super::*;

fn number(min: Option<f64>, max: Option<f64>, step: Option<f64>, integer: bool) -> Constraint {
    Constraint::Number {
        min,
        max,
        step,
        integer,
        limits: None,
    }
}

#[rstest]
#[case(json!(5), Ok(json!(5)))]
#[case(json!(5.0), Ok(json!(5)))]
#[case(json!(0), Ok(json!(0)))]
#[case(json!(11), Err(()))]
#[case(json!(-1), Err(()))]
#[case(json!(2.5), Err(()))]
#[case(json!("5"), Err(()))]
fn integer_range(#[case] value: Value, #[case] expected: Result<Value, ()>) {
    let c = number(Some(0.0), Some(10.0), Some(1.0), true);
    assert_eq!(c.check(&value).map_err(|_| ()), expected);
}

#[test]
fn integer_step_from_min() {
    let c = number(Some(1.0), Some(100.0), Some(5.0), true);
    assert!(c.check(&json!(6)).is_ok());
    assert!(c.check(&json!(7)).is_err());
}

#[rstest]
#[case(json!(-5), false)]
#[case(json!(0), true)]
#[case(json!(4_294_967_295u64), true)]
#[case(json!(4_294_967_296u64), false)]
fn unbounded_u32_stays_in_type_range(#[case] value: Value, #[case] ok: bool) {
    let c = NumberInput::<u32>::new("Qty").into_spec().constraint;
    assert_eq!(c.check(&value).is_ok(), ok);
}

#[rstest]
#[case(json!(3_000_000_000u64), false)]
#[case(json!(-3_000_000_000i64), false)]
#[case(json!(3.0e9), false)]
#[case(json!(2_147_483_647), true)]
#[case(json!(-2_147_483_648i64), true)]
fn unbounded_i32_stays_in_type_range(#[case] value: Value, #[case] ok: bool) {
    let c = NumberInput::<i32>::new("Qty").into_spec().constraint;
    assert_eq!(c.check(&value).is_ok(), ok);
}

#[test]
fn u64_above_i64_range() {
    let c = NumberInput::<u64>::new("Big").into_spec().constraint;
    assert_eq!(c.check(&json!(u64::MAX)).unwrap(), json!(u64::MAX));
    let c = NumberInput::<i64>::new("Big").into_spec().constraint;
    assert!(c.check(&json!(u64::MAX)).is_err());
}

#[test]
fn float_normalized() {
    let c = number(Some(0.0), Some(1.0), Some(0.01), false);
    assert_eq!(c.check(&json!(1)).unwrap(), json!(1.0));
    assert!(c.check(&json!(1.5)).is_err());
}

#[rstest]
#[case(json!("Red"), true)]
#[case(json!("Purple"), false)]
#[case(json!(1), false)]
fn choice(#[case] value: Value, #[case] ok: bool) {
    let c = Constraint::Choice {
        options: vec!["Red".into(), "Green".into()],
    };
    assert_eq!(c.check(&value).is_ok(), ok);
}

#[rstest]
#[case(json!([]), true)]
#[case(json!(["Python", "Rust"]), true)]
#[case(json!(["Python", "Rust", "Go"]), false)]
#[case(json!(["Python", "Python"]), false)]
#[case(json!(["Cobol"]), false)]
#[case(json!("Python"), false)]
fn multi_choice(#[case] value: Value, #[case] ok: bool) {
    let c = Constraint::MultiChoice {
        options: vec!["Python".into(), "Rust".into(), "Go".into()],
        max_selections: Some(2),
    };
    assert_eq!(c.check(&value).is_ok(), ok);
}

#[test]
fn text_max_chars() {
    let c = Constraint::Text { max_chars: Some(3) };
    assert!(c.check(&json!("abc")).is_ok());
    assert!(c.check(&json!("日本語")).is_ok());
    assert!(c.check(&json!("abcd")).is_err());
    assert!(c.check(&json!(null)).is_err());
}

#[test]
fn chat_accepts_null() {
    let c = Constraint::Chat { max_chars: None };
    assert_eq!(c.check(&Value::Null).unwrap(), Value::Null);
    assert!(c.check(&json!("hi")).is_ok());
    assert!(c.check(&json!(true)).is_err());
}

#[test]
fn file_types() {
    let c = Constraint::File {
        types: vec!["csv".into(), "txt".into()],
    };
    let csv = to_value(&UploadedFile::new("data.CSV", "text/csv", b"a,b".to_vec())).unwrap();
    let png = to_value(&UploadedFile::new("image.png", "image/png", vec![])).unwrap();
    assert!(c.check(&csv).is_ok());
    assert!(c.check(&png).is_err());
    assert!(c.check(&Value::Null).is_ok());
    assert!(c.check(&json!("data.csv")).is_err());
}

#[rstest]
#[case("data.csv", Some("csv"))]
#[case("archive.tar.GZ", Some("gz"))]
#[case(".env", None)]
#[case("README", None)]
fn file_extension(#[case] name: &str, #[case] ext: Option<&str>) {
    let f = UploadedFile::new(name, "", vec![]);
    assert_eq!(f.extension().as_deref(), ext);
}

#[test]
fn config_errors() {
    let empty = Constraint::Choice { options: vec![] };
    assert!(empty.check_config().is_err());
    let dup = Constraint::Choice {
        options: vec!["a".into(), "a".into()],
    };
    assert!(dup.check_config().is_err());
    assert!(number(Some(10.0), Some(0.0), None, true).check_config().is_err());
    assert!(number(None, None, Some(0.0), false).check_config().is_err());
    assert!(number(Some(0.0), Some(10.0), Some(1.0), true).check_config().is_ok());
    assert!(Constraint::MultiChoice {
        options: vec!["a".into()],
        max_selections: Some(0)
    }
    .check_config()
    .is_err());
}

#[test]
fn widget_ids() {
    let keyed = TextInput::new("Name").key("name").into_spec();
    assert_eq!(keyed.id(None), WidgetId::for_key("name"));
    assert_eq!(keyed.id(Some(&FormId::new("f"))).as_str(), "key:name");

    let keyless = Button::new("Go").into_spec();
    assert_eq!(keyless.id(None).as_str(), "button:Go");
    assert_eq!(keyless.id(Some(&FormId::new("f"))).as_str(), "button:Go@f");
}

#[test]
fn builder_defaults() {
    let s = Selectbox::new("Color", ["Red", "Green", "Blue"]).index(2).into_spec();
    assert_eq!(s.default_value(), &json!("Blue"));

    let s = Slider::new("Age", 0, 100).value(25).into_spec();
    assert_eq!(s.default_value(), &json!(25));
    assert_eq!(s.constraint(), &number(Some(0.0), Some(100.0), Some(1.0), true));

    let s = Slider::new("Ratio", 0.0, 1.0).into_spec();
    assert_eq!(s.default_value(), &json!(0.0));

    let s = NumberInput::<i64>::new("Qty").min(1).max(10).into_spec();
    assert_eq!(s.default_value(), &json!(1));

    let s = NumberInput::<f64>::new("Price").into_spec();
    assert_eq!(s.default_value(), &json!(0.0));

    let s = Multiselect::new("Langs", ["Python", "Rust"]).value(["Rust"]).into_spec();
    assert_eq!(s.default_value(), &json!(["Rust"]));

    let s = FileUploader::new("Upload").accept([".CSV", "txt"]).into_spec();
    assert_eq!(
        s.constraint(),
        &Constraint::File {
            types: vec!["csv".into(), "txt".into()]
        }
    );

    let s = ChatInput::new("Say something").into_spec();
    assert_eq!(s.default_value(), &Value::Null);
    assert_eq!(s.kind(), WidgetKind::ChatInput);
}

#[test]
fn callback_with_args() {
    let cb = Callback::with_args(|state, color: &String| state.push("log", color.as_str()), "Green".to_owned());
    let mut state = SessionState::new();
    cb.call(&mut state);
    cb.clone().call(&mut state);
    assert_eq!(state["log"], json!(["Green", "Green"]));
}

#[test]
fn registry_without_fragment() {
    let frag = FragmentId::new("f");
    let entry = |fragment: Option<FragmentId>| WidgetEntry {
        spec: Button::new("b").into_spec(),
        form: None,
        fragment,
        value: json!(false),
    };
    let mut r = WidgetRegistry::default();
    r.widgets.insert(WidgetId::new("a"), entry(None));
    r.widgets.insert(WidgetId::new("b"), entry(Some(frag.clone())));

    let mut kept = r.without_fragment(&frag);
    assert!(kept.widgets.contains_key(&WidgetId::new("a")));
    assert!(!kept.widgets.contains_key(&WidgetId::new("b")));

    let mut new = WidgetRegistry::default();
    new.widgets.insert(WidgetId::new("c"), entry(Some(frag)));
    kept.absorb(new);
    assert_eq!(kept.widgets.len(), 2);
}

#[test]
fn kind_names() {
    assert_eq!(WidgetKind::FormSubmitButton.to_string(), "form_submit_button");
    assert_eq!("chat_input".parse::<WidgetKind>().unwrap(), WidgetKind::ChatInput);
    assert!(WidgetKind::Button.is_trigger());
    assert!(!WidgetKind::Checkbox.is_trigger());
}
