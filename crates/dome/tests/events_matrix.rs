use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dome::{Access, Dome, DomeError, EventMode, Function, HostError, IndexMap, Value};
use dome_tree::{Document, Node};

fn fixture() -> (Dome<Document>, Vec<Node>) {
    let dome = Dome::new(Document::new());
    let mut buttons = Vec::new();
    for label in ["ok", "cancel"] {
        let value = dome.construct("button.action", &[Value::from(label)]).unwrap();
        let node = Node::from_value(&value).unwrap();
        dome.document().append_child(&node).unwrap();
        buttons.push(node);
    }
    (dome, buttons)
}

fn counter() -> (Function, Rc<Cell<usize>>) {
    let hits = Rc::new(Cell::new(0));
    let seen = Rc::clone(&hits);
    let f = Function::from_fn(move |_| {
        seen.set(seen.get() + 1);
        Value::Undefined
    });
    (f, hits)
}

fn fire(buttons: &[Node], event: &str) {
    for b in buttons {
        b.dispatch_event(event, &[]).unwrap();
    }
}

fn mapping(pairs: &[(&str, &Function)]) -> Value {
    let mut map = IndexMap::new();
    for (event, handler) in pairs {
        map.insert(event.to_string(), Value::from((*handler).clone()));
    }
    Value::Map(map)
}

#[test]
fn on_then_off_detaches_handler() {
    let (dome, buttons) = fixture();
    let (f, hits) = counter();
    let handle = dome.query("button").unwrap();

    handle.on().bind("click", &f).unwrap();
    fire(&buttons, "click");
    assert_eq!(hits.get(), 2);

    handle.off().bind("click", &f).unwrap();
    fire(&buttons, "click");
    assert_eq!(hits.get(), 2);
    assert!(buttons.iter().all(|b| b.listener_count("click") == 0));
}

#[test]
fn dynamic_two_argument_form_binds() {
    let (dome, buttons) = fixture();
    let (f, hits) = counter();
    dome.query("button")
        .unwrap()
        .on()
        .call(&[Value::from("click"), Value::from(f.clone())])
        .unwrap();
    fire(&buttons, "click");
    assert_eq!(hits.get(), 2);

    let err = dome
        .query("button")
        .unwrap()
        .on()
        .call(&[Value::from(1i64), Value::from(f)])
        .unwrap_err();
    assert!(matches!(err, DomeError::InvalidEventArguments(_)));
}

#[test]
fn named_event_form_records_for_replay() {
    let (dome, _) = fixture();
    let calls: Rc<RefCell<Vec<(String, Vec<Value>)>>> = Rc::default();
    let log = Rc::clone(&calls);
    let f = Function::new(move |this, args| {
        let text = this.get(&"textContent".into()).unwrap_or_default();
        log.borrow_mut().push((text.to_string(), args.to_vec()));
        Ok(Value::Undefined)
    });

    let on = dome.query("button").unwrap().on();
    on.event("click").bind(&f).unwrap();
    assert_eq!(on.stored_handlers(), vec![f.clone()]);

    on.call(&[Value::from("payload")]).unwrap();
    assert_eq!(
        *calls.borrow(),
        vec![
            ("ok".to_owned(), vec![Value::from("payload")]),
            ("cancel".to_owned(), vec![Value::from("payload")]),
        ]
    );

    // replay with no arguments works too
    on.call(&[]).unwrap();
    assert_eq!(calls.borrow().len(), 4);

    assert!(matches!(
        on.event("focus").call(&[Value::from("not a handler")]),
        Err(DomeError::InvalidEventArguments(_))
    ));
    on.event("focus").call(&[Value::from(f.clone())]).unwrap();
    assert_eq!(on.stored_handlers(), vec![f.clone(), f]);
}

#[test]
fn replay_runs_every_stored_handler_per_object() {
    let (dome, _) = fixture();
    let (f, f_hits) = counter();
    let (g, g_hits) = counter();
    let on = dome.query("button").unwrap().on();
    on.bind("click", &f).unwrap().bind("focus", &g).unwrap();
    on.call(&[]).unwrap();
    assert_eq!((f_hits.get(), g_hits.get()), (2, 2));
}

#[test]
fn fresh_protocol_does_not_remember_handlers() {
    let (dome, _) = fixture();
    let (f, hits) = counter();
    let handle = dome.query("button").unwrap();
    handle.on().bind("click", &f).unwrap();

    let err = handle.on().call(&[Value::from("x")]).unwrap_err();
    assert!(matches!(err, DomeError::InvalidEventArguments(_)));
    assert_eq!(hits.get(), 0);
}

#[test]
fn assignment_form_binds_without_recording() {
    let (dome, buttons) = fixture();
    let (f, hits) = counter();
    let on = dome.query("button").unwrap().on();
    on.event("click").assign(&f).unwrap();
    fire(&buttons, "click");
    assert_eq!(hits.get(), 2);
    assert!(on.stored_handlers().is_empty());
    assert!(matches!(
        on.call(&[]),
        Err(DomeError::InvalidEventArguments(_))
    ));
}

#[test]
fn mapping_forms_subscribe_and_unsubscribe() {
    let (dome, buttons) = fixture();
    let (f, f_hits) = counter();
    let (g, g_hits) = counter();
    let handle = dome.query("button").unwrap();

    handle
        .write_key("on", mapping(&[("click", &f), ("focus", &g)]))
        .unwrap();
    fire(&buttons, "click");
    fire(&buttons, "focus");
    assert_eq!((f_hits.get(), g_hits.get()), (2, 2));

    handle.write_key("off", mapping(&[("click", &f)])).unwrap();
    fire(&buttons, "click");
    fire(&buttons, "focus");
    assert_eq!((f_hits.get(), g_hits.get()), (2, 4));

    handle.off().call(&[mapping(&[("focus", &g)])]).unwrap();
    handle.on().call(&[mapping(&[("click", &f)])]).unwrap();
    fire(&buttons, "click");
    fire(&buttons, "focus");
    assert_eq!((f_hits.get(), g_hits.get()), (4, 4));
}

#[test]
fn off_never_replays() {
    let (dome, buttons) = fixture();
    let (f, hits) = counter();
    let handle = dome.query("button").unwrap();
    handle.on().bind("click", &f).unwrap();

    let off = handle.off();
    off.bind("click", &f).unwrap();
    assert!(matches!(
        off.call(&[Value::from("payload")]),
        Err(DomeError::InvalidEventArguments(_))
    ));
    assert_eq!(hits.get(), 0);
    fire(&buttons, "click");
    assert_eq!(hits.get(), 0);
}

#[test]
fn duplicate_subscription_fires_once() {
    let (dome, buttons) = fixture();
    let (f, hits) = counter();
    let on = dome.query("button").unwrap().on();
    on.bind("click", &f).unwrap();
    on.bind("click", &f).unwrap();
    fire(&buttons[..1], "click");
    assert_eq!(hits.get(), 1);
}

#[test]
fn handler_errors_propagate_from_replay() {
    let (dome, _) = fixture();
    let failing = Function::new(|_, _| Err(HostError::Thrown("handler failed".into())));
    let on = dome.query("button").unwrap().on();
    on.bind("click", &failing).unwrap();
    assert_eq!(
        on.call(&[]).unwrap_err(),
        DomeError::Host(HostError::Thrown("handler failed".into()))
    );
}

#[test]
fn on_and_off_are_read_key_accessors() {
    let (dome, _) = fixture();
    let handle = dome.query("button").unwrap();
    let modes: Vec<EventMode> = ["on", "off"]
        .into_iter()
        .map(|k| match handle.read_key(k).unwrap() {
            Access::Events(p) => p.mode(),
            other => panic!("unexpected access {other:?}"),
        })
        .collect();
    assert_eq!(modes, vec![EventMode::Subscribe, EventMode::Unsubscribe]);
}

#[test]
fn events_follow_the_handle_path() {
    let (dome, buttons) = fixture();
    let (f, hits) = counter();
    let labels = dome.query("button").unwrap().prop("firstChild").unwrap();
    labels.on().bind("tap", &f).unwrap();
    assert_eq!(buttons[0].listener_count("tap"), 0);
    for b in &buttons {
        b.child_nodes()[0].dispatch_event("tap", &[]).unwrap();
    }
    assert_eq!(hits.get(), 2);
}
