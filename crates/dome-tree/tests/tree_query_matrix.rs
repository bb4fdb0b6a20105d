use dome_host::{HostDocument, HostError, PathStep, Value};
use dome_tree::{Document, Node};

/// ```text
/// <div id="app">
///   <ul class="list"><li class="item a">one</li><li class="item">two<b>!</b></li></ul>
///   <p title="x y">p</p>
/// </div>
/// ```
fn fixture() -> (Document, Node) {
    let doc = Document::new();
    let app = doc.create_element("div").unwrap();
    app.set_id("app");
    let ul = doc.create_element("ul").unwrap();
    ul.class_list().add("list").unwrap();
    for (label, extra) in [("one", Some("a")), ("two", None)] {
        let li = doc.create_element("li").unwrap();
        li.class_list().add("item").unwrap();
        if let Some(extra) = extra {
            li.class_list().add(extra).unwrap();
        }
        li.append_child(&doc.create_text_node(label)).unwrap();
        ul.append_child(&li).unwrap();
    }
    let b = doc.create_element("b").unwrap();
    b.set_text_content("!");
    ul.children()[1].append_child(&b).unwrap();
    app.append_child(&ul).unwrap();
    let p = doc.create_element("p").unwrap();
    p.set_attribute("title", "x y");
    p.set_text_content("p");
    app.append_child(&p).unwrap();
    doc.append_child(&app).unwrap();
    (doc, app)
}

fn tags(nodes: &[Node]) -> Vec<String> {
    nodes.iter().filter_map(Node::tag).collect()
}

#[test]
fn selector_matrix() {
    let (doc, _) = fixture();
    let cases: &[(&str, &[&str])] = &[
        ("li", &["li", "li"]),
        ("*", &["div", "ul", "li", "li", "b", "p"]),
        ("#app > ul", &["ul"]),
        ("#app > li", &[]),
        ("#app li", &["li", "li"]),
        (".item.a", &["li"]),
        ("ul .item b", &["b"]),
        ("[title]", &["p"]),
        ("[title=\"x y\"]", &["p"]),
        ("[title=x]", &[]),
        ("p, b", &["b", "p"]),
        ("LI", &["li", "li"]),
    ];
    for (selector, expected) in cases {
        let found = doc.query_selector_all(selector).unwrap();
        assert_eq!(tags(&found), *expected, "selector {selector}");
    }
}

#[test]
fn closest_and_matches() {
    let (doc, app) = fixture();
    let b = doc.query_selector("b").unwrap().unwrap();
    assert_eq!(b.closest("#app").unwrap(), Some(app.clone()));
    assert_eq!(b.closest("b").unwrap(), Some(b.clone()));
    assert_eq!(b.closest("table").unwrap(), None);
    assert!(b.matches("li > b").unwrap());
    assert!(!b.matches("ul > b").unwrap());
}

#[test]
fn invalid_selectors_surface_as_host_errors() {
    let (doc, _) = fixture();
    let err = doc.query_all("ul >").unwrap_err();
    assert!(matches!(err, HostError::InvalidSelector { ref selector, .. } if selector == "ul >"));
}

#[test]
fn host_document_surface_matches_tree_api() {
    let (doc, _) = fixture();
    let values = doc.query_all(".item").unwrap();
    assert_eq!(values.len(), 2);
    let first = Node::from_value(&values[0]).unwrap();
    assert!(first.has_class("a"));

    let created = HostDocument::create_element(&doc, "section").unwrap();
    assert_eq!(
        created.get(&PathStep::Key("tagName".into())),
        Some(Value::from("SECTION"))
    );
    let text = HostDocument::create_text_node(&doc, "hi").unwrap();
    assert_eq!(text.get(&PathStep::Key("data".into())), Some(Value::from("hi")));
}

#[test]
fn node_methods_through_values() {
    let (doc, app) = fixture();
    let app_value = app.to_value();
    let list = app_value
        .invoke(&"querySelectorAll".into(), &[Value::from("li")])
        .unwrap();
    assert_eq!(list.items().map(|items| items.len()), Some(2));

    let li = list.get(&PathStep::Index(0)).unwrap();
    let closest = li.invoke(&"closest".into(), &[Value::from("div")]).unwrap();
    assert_eq!(closest, app_value);

    li.invoke(&"remove".into(), &[]).unwrap();
    assert_eq!(doc.query_selector_all("li").unwrap().len(), 1);

    let html = app_value.get(&"outerHTML".into()).unwrap();
    assert_eq!(
        html,
        Value::from(concat!(
            "<div id=\"app\"><ul class=\"list\"><li class=\"item\">two<b>!</b></li></ul>",
            "<p title=\"x y\">p</p></div>"
        ))
    );
}
