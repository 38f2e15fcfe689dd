use super::*;

fn text(s: &str) -> Element {
    Element::Text { body: s.into() }
}

#[test]
fn nested_blocks() {
    let mut c = Canvas::new(0);
    assert!(!c.has_output());
    c.open(BlockKind::Sidebar);
    c.push(text("a"));
    c.close();
    c.push(text("b"));
    assert!(c.has_output());

    let out = c.finish();
    assert_eq!(
        out,
        vec![
            Element::Block(Block {
                kind: BlockKind::Sidebar,
                children: vec![text("a")],
            }),
            text("b"),
        ]
    );
}

#[test]
fn finish_closes_open_blocks() {
    let mut c = Canvas::new(0);
    c.open(BlockKind::Columns);
    c.open(BlockKind::Column);
    c.push(text("partial"));
    let out = c.finish();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].children()[0].children(), &[text("partial")]);
}

#[test]
fn fill_replaces_slot_content() {
    let mut c = Canvas::new(7);
    let id = c.slot();
    assert_eq!(id, 7);
    c.push(text("after"));

    assert!(c.fill(id));
    c.push(text("first"));
    c.close();
    assert!(c.fill(id));
    c.push(text("second"));
    c.close();
    assert!(!c.fill(99));
    assert_eq!(c.next_slot(), 8);

    let out = c.finish();
    assert_eq!(
        out,
        vec![
            Element::Slot {
                id: 7,
                children: vec![text("second")],
            },
            text("after"),
        ]
    );
}

#[test]
fn update_status_targets_innermost() {
    let mut c = Canvas::new(0);
    c.open(BlockKind::Status {
        label: "Running".into(),
        state: StatusState::Running,
        expanded: true,
    });
    c.open(BlockKind::Container { border: false });
    assert!(c.update_status(|label, state, expanded| {
        *label = "Done".into();
        *state = StatusState::Complete;
        *expanded = false;
    }));
    let out = c.finish();
    let Element::Block(block) = &out[0] else {
        panic!("expected a block");
    };
    assert_eq!(
        block.kind,
        BlockKind::Status {
            label: "Done".into(),
            state: StatusState::Complete,
            expanded: false,
        }
    );

    let mut c = Canvas::new(0);
    assert!(!c.update_status(|_, _, _| {}));
}

#[test]
fn replace_fragment_keeps_siblings() {
    let id = FragmentId::new("clock");
    let mut out = vec![
        text("outside"),
        Element::Block(Block {
            kind: BlockKind::Container { border: true },
            children: vec![Element::Block(Block {
                kind: BlockKind::Fragment { id: id.clone() },
                children: vec![text("old")],
            })],
        }),
    ];
    assert!(replace_fragment(&mut out, &id, vec![text("new")]));
    assert_eq!(out[0], text("outside"));
    assert_eq!(out[1].children()[0].children(), &[text("new")]);
    assert!(!replace_fragment(&mut out, &FragmentId::new("other"), vec![]));
}

#[test]
fn visit_in_document_order() {
    let out = Element::Block(Block {
        kind: BlockKind::Tabs {
            labels: vec!["a".into()],
        },
        children: vec![Element::Block(Block {
            kind: BlockKind::Tab { label: "a".into() },
            children: vec![text("x"), Element::Divider],
        })],
    });
    let mut n = 0;
    out.visit(&mut |_| n += 1);
    assert_eq!(n, 4);
}

#[test]
fn serialize_tagged() {
    let e = Element::Alert {
        level: AlertLevel::Warning,
        body: "careful".into(),
    };
    assert_eq!(
        serde_json::to_value(&e).unwrap(),
        serde_json::json!({ "type": "alert", "level": "warning", "body": "careful" })
    );
    assert_eq!("complete".parse::<StatusState>().unwrap(), StatusState::Complete);
}

#[test]
fn fill_slot_inside_block() {
    let mut c = Canvas::new(0);
    c.open(BlockKind::Container { border: false });
    let outer = c.slot();
    c.close();
    c.open(BlockKind::Sidebar);
    let inner = c.slot();
    assert!(c.fill(outer));
    c.push(text("outer"));
    c.close();
    assert!(c.fill(inner));
    c.push(text("inner"));
    c.close();
    c.close();

    let out = c.finish();
    assert_eq!(
        out[0].children(),
        &[Element::Slot {
            id: outer,
            children: vec![text("outer")],
        }]
    );
    assert_eq!(
        out[1].children(),
        &[Element::Slot {
            id: inner,
            children: vec![text("inner")],
        }]
    );
}
