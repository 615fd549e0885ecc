//! End-to-end update cycles through a `MemoryDocument`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_vdom::{
    create_root, create_root_with_config, h, Change, Component, DiffKind, Element, Error, Event,
    MemoryDocument, NodeId, PatchError, Primitive, PropValue, Props, RenderPointer, Root,
    RootConfig, Scope, Setter, SharedValue, Style,
};

// =============================================================================
// Helpers
// =============================================================================

fn memory_root() -> Root<MemoryDocument> {
    let mut doc = MemoryDocument::new();
    let container = doc.create_container();
    create_root(doc, container)
}

fn html(root: &Root<MemoryDocument>) -> String {
    let container = root.container();
    root.with_medium(|doc| doc.to_html(container))
}

/// HTML of `element` rendered into a brand new root.
fn fresh_html(element: impl Into<Element>) -> String {
    let root = memory_root();
    root.render(element).unwrap();
    html(&root)
}

fn kinds(root: &Root<MemoryDocument>) -> Vec<(RenderPointer, DiffKind)> {
    root.last_diff()
        .iter()
        .map(|entry| (entry.pointer.clone(), entry.kind()))
        .collect()
}

fn find(root: &Root<MemoryDocument>, tag: &str) -> NodeId {
    let container = root.container();
    root.with_medium(|doc| doc.find_by_tag(container, tag))
        .unwrap_or_else(|| panic!("no <{tag}> rendered"))
}

fn find_all(root: &Root<MemoryDocument>, tag: &str) -> Vec<NodeId> {
    let container = root.container();
    root.with_medium(|doc| doc.find_all_by_tag(container, tag))
}

fn span_tree(text: &str) -> Element {
    h("div").child(h("span").child(text)).into()
}

// =============================================================================
// Diff scenarios
// =============================================================================

#[test]
fn test_scenarios_mount_update_replace_remove() {
    let root = memory_root();

    // A: first mount is a single addition at the root
    root.render(span_tree("A")).unwrap();
    assert_eq!(kinds(&root), vec![(RenderPointer::root(), DiffKind::Added)]);
    assert_eq!(html(&root), "<div><span>A</span></div>");

    // B: unchanged re-render
    root.render(span_tree("A")).unwrap();
    assert!(root.last_diff().is_empty());

    // C: text change
    root.render(span_tree("B")).unwrap();
    assert_eq!(
        kinds(&root),
        vec![(RenderPointer::from([0, 0]), DiffKind::PrimitiveUpdated)]
    );
    assert!(matches!(
        &root.last_diff()[0].change,
        Change::PrimitiveUpdated { value: Primitive::Text(text) } if text == "B"
    ));
    assert_eq!(html(&root), "<div><span>B</span></div>");

    // D: different tag at the same position
    root.render(h("div").child(h("p").child("B"))).unwrap();
    assert_eq!(kinds(&root), vec![(RenderPointer::from([0]), DiffKind::Replaced)]);
    assert_eq!(html(&root), "<div><p>B</p></div>");

    // E: child dropped
    root.render(h("div")).unwrap();
    assert_eq!(kinds(&root), vec![(RenderPointer::from([0]), DiffKind::Removed)]);
    assert_eq!(html(&root), "<div></div>");
}

fn counter_and_flag(cx: &mut Scope<'_>, _props: &Props) -> Element {
    let (count, set_count) = cx.declare_state(0usize);
    let (flag, set_flag) = cx.declare_state(false);

    h("div")
        .child(
            h("button")
                .prop("id", "inc")
                .on("onClick", move |_| set_count.update(|c| c + 1))
                .child(count),
        )
        .child(
            h("button")
                .prop("id", "flag")
                .on("onClick", move |_| set_flag.set(true))
                .child(if flag { "on" } else { "off" }),
        )
        .into()
}

#[test]
fn test_independent_state_cells_keep_their_slots() {
    let root = memory_root();
    root.render(Component::new(counter_and_flag)).unwrap();

    let buttons = find_all(&root, "button");
    let (inc, flag) = (buttons[0], buttons[1]);

    root.dispatch_event(&flag, &Event::new("click"));
    root.dispatch_event(&inc, &Event::new("click"));
    root.dispatch_event(&inc, &Event::new("click"));

    assert_eq!(
        html(&root),
        "<div><button id=\"inc\">2</button><button id=\"flag\">on</button></div>"
    );
    assert_eq!(find_all(&root, "button"), vec![inc, flag]);
}

fn preferences(cx: &mut Scope<'_>, _props: &Props) -> Element {
    let (subscribed, set_subscribed) = cx.declare_state(false);
    let (query, set_query) = cx.declare_state(String::from("draft"));

    h("form")
        .child(
            h("input")
                .prop("type", "checkbox")
                .prop("checked", subscribed)
                .on("onChange", move |event: &Event| {
                    set_subscribed.set(event.checked.unwrap_or(false))
                }),
        )
        .child(
            h("input")
                .prop("value", query)
                .on("onKeyDown", move |event: &Event| {
                    if event.key.as_deref() == Some("Escape") {
                        set_query.set(String::new());
                    }
                }),
        )
        .into()
}

#[test]
fn test_checked_and_key_events() {
    let root = memory_root();
    root.render(Component::new(preferences)).unwrap();
    let inputs = find_all(&root, "input");
    let (checkbox, search) = (inputs[0], inputs[1]);
    let field = |node: NodeId, name: &str| root.with_medium(|doc| doc.field(node, name).cloned());

    root.dispatch_event(&checkbox, &Event::new("change").with_checked(true));
    assert_eq!(field(checkbox, "checked"), Some(PropValue::Bool(true)));
    assert!(html(&root).contains("checked"));

    let cycles = root.cycle_count();
    root.dispatch_event(&search, &Event::new("keydown").with_key("a"));
    assert_eq!(root.cycle_count(), cycles);
    assert_eq!(field(search, "value"), Some("draft".into()));

    root.dispatch_event(&search, &Event::new("keydown").with_key("Escape"));
    assert_eq!(field(search, "value"), Some("".into()));
    assert_eq!(find_all(&root, "input"), vec![checkbox, search]);
}

// =============================================================================
// Laws
// =============================================================================

#[test]
fn test_idempotent_rerender() {
    let handler = spark_vdom::EventHandler::new(|_| {});
    let tree = || -> Element {
        h("ul")
            .prop("className", "list")
            .prop("onClick", handler.clone())
            .child(h("li").child("one"))
            .child(false)
            .child(badge_with(Some("stable")))
            .into()
    };

    let root = memory_root();
    root.render(tree()).unwrap();
    let before = root.with_medium(|doc| doc.mutation_count());

    root.render(tree()).unwrap();
    assert!(root.last_diff().is_empty());
    assert_eq!(root.with_medium(|doc| doc.mutation_count()), before);
}

#[test]
fn test_equal_value_setter_schedules_nothing() {
    let captured: Rc<RefCell<Option<Setter<Vec<u8>>>>> = Rc::new(RefCell::new(None));
    let slot = captured.clone();
    let holder = Component::new(move |cx: &mut Scope<'_>, _props: &Props| {
        let (bytes, set_bytes) = cx.declare_state(vec![1u8, 2]);
        *slot.borrow_mut() = Some(set_bytes);
        Element::from(bytes.len())
    });

    let root = memory_root();
    root.render(holder).unwrap();
    let setter = captured.borrow().clone().unwrap();
    let cycles = root.cycle_count();

    setter.set(vec![1, 2]);
    setter.update(|prev| prev.clone());
    assert_eq!(root.cycle_count(), cycles);

    setter.set(vec![1, 2, 3]);
    assert_eq!(root.cycle_count(), cycles + 1);
    assert_eq!(html(&root), "3");
}

#[test]
fn test_effect_runs_only_when_deps_change() {
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = log.clone();
    let watcher = Component::new(move |cx: &mut Scope<'_>, props: &Props| {
        let deps: Vec<i64> = props
            .get_shared::<Vec<i64>>("deps")
            .cloned()
            .unwrap_or_default();
        let sink = sink.clone();
        let label = format!("{deps:?}");
        cx.declare_effect(
            move || {
                sink.borrow_mut().push(format!("run {label}"));
                move || sink.borrow_mut().push(format!("cleanup {label}"))
            },
            deps,
        );
        h("i").into()
    });
    let with_deps = |deps: Vec<i64>| {
        watcher
            .clone()
            .with_props(Props::new().with("deps", SharedValue::new(deps)))
    };

    let root = memory_root();
    root.render(with_deps(vec![1, 2])).unwrap();
    root.render(with_deps(vec![1, 2])).unwrap();
    root.render(with_deps(vec![1, 3])).unwrap();
    root.render(with_deps(vec![1, 3, 4])).unwrap();
    root.unmount().unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "run [1, 2]",
            "cleanup [1, 2]",
            "run [1, 3]",
            "cleanup [1, 3]",
            "run [1, 3, 4]",
            "cleanup [1, 3, 4]",
        ]
    );
}

#[test]
fn test_effects_run_after_patch_in_declaration_order() {
    let log = Rc::new(RefCell::new(Vec::<String>::new()));

    let make = |name: &'static str, log: Rc<RefCell<Vec<String>>>| {
        Component::new(move |cx: &mut Scope<'_>, _props: &Props| {
            let log = log.clone();
            cx.declare_effect(move || log.borrow_mut().push(name.to_string()), ());
            h("b").child(name).into()
        })
    };
    fn first(_cx: &mut Scope<'_>, props: &Props) -> Element {
        props.children()[0].clone()
    }

    let root = memory_root();
    let outer = make("outer", log.clone());
    let inner = make("inner", log.clone());
    root.render(
        h("div")
            .child(Component::new(first).with_props(Props::new().with_child(outer)))
            .child(inner),
    )
    .unwrap();

    assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    assert_eq!(html(&root), "<div><b>outer</b><b>inner</b></div>");
}

#[test]
fn test_identity_change_runs_cleanup_and_resets_state() {
    let cleaned = Rc::new(Cell::new(0));

    fn plain(_cx: &mut Scope<'_>, _props: &Props) -> Element {
        Element::text("plain")
    }

    let flag = cleaned.clone();
    let effectful = Component::new(move |cx: &mut Scope<'_>, _props: &Props| {
        let flag = flag.clone();
        cx.declare_effect(move || move || flag.set(flag.get() + 1), ());
        Element::text("effectful")
    });

    let root = memory_root();
    root.render(h("div").child(effectful.clone())).unwrap();
    root.render(h("div").child(Component::new(plain))).unwrap();

    assert_eq!(cleaned.get(), 1);
    assert_eq!(html(&root), "<div>plain</div>");
    assert_eq!(kinds(&root), vec![(RenderPointer::from([0]), DiffKind::Replaced)]);
}

// =============================================================================
// Patch correctness
// =============================================================================

fn badge(_cx: &mut Scope<'_>, props: &Props) -> Element {
    match props.get_str("label") {
        Some(label) => h("em").prop("title", label).child(label.to_string()).into(),
        None => Element::null(),
    }
}

fn badge_with(label: Option<&str>) -> Element {
    let mut props = Props::new();
    if let Some(label) = label {
        props.set("label", label);
    }
    Component::new(badge).with_props(props).into()
}

#[test]
fn test_patched_medium_matches_fresh_render() {
    let steps: Vec<Element> = vec![
        h("main")
            .child(h("h1").child("Todos"))
            .child(badge_with(None))
            .child(h("p").child("empty"))
            .into(),
        h("main")
            .child(h("h1").child("Todos"))
            .child(badge_with(Some("new")))
            .child(h("p").child("empty"))
            .into(),
        h("main")
            .prop("className", "busy")
            .child(false)
            .child(badge_with(Some("new")))
            .child(h("ul").child(h("li").child(1)).child(h("li").child(2)))
            .child("footer")
            .into(),
        h("main")
            .child(h("h1").child("Todos"))
            .child(badge_with(None))
            .child(h("ul").child(h("li").child(1)))
            .into(),
        h("main")
            .child(Element::null())
            .child(h("input").prop("disabled", true).prop("value", "x"))
            .child(badge_with(Some("last")))
            .into(),
        h("aside").child("gone").into(),
    ];

    let root = memory_root();
    for step in steps {
        root.render(step.clone()).unwrap();
        assert_eq!(html(&root), fresh_html(step));
    }
}

#[test]
fn test_invalid_style_aborts_cycle() {
    let root = memory_root();
    root.render(h("div").prop("style", Style::new().with("color", "red")))
        .unwrap();
    assert_eq!(html(&root), "<div style=\"color: red\"></div>");

    let err = root
        .render(h("div").prop("style", Style::new().with("color", "red; position: fixed")))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Patch(PatchError::InvalidStyle { ref name, .. }) if name == "color"
    ));
    assert_eq!(html(&root), "<div style=\"color: red\"></div>");
}

#[test]
fn test_rejected_subtree_leaves_medium_untouched() {
    let root = memory_root();
    root.render(span_tree("A")).unwrap();
    let before = root.with_medium(|doc| doc.mutation_count());

    let err = root
        .render(
            h("div").child(
                h("p")
                    .prop("style", Style::new().with("color", "red;"))
                    .child("A"),
            ),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Patch(PatchError::InvalidStyle { .. })));
    assert_eq!(html(&root), "<div><span>A</span></div>");
    assert_eq!(root.with_medium(|doc| doc.mutation_count()), before);

    root.render(span_tree("A")).unwrap();
    assert!(root.last_diff().is_empty());
    assert_eq!(html(&root), fresh_html(span_tree("A")));

    root.render(span_tree("B")).unwrap();
    assert_eq!(html(&root), fresh_html(span_tree("B")));
}

#[test]
fn test_aborted_cycle_does_not_swallow_effect_run() {
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = log.clone();
    let watcher = Component::new(move |cx: &mut Scope<'_>, props: &Props| {
        let dep = props.get_number("dep").unwrap_or_default();
        let sink = sink.clone();
        cx.declare_effect(move || sink.borrow_mut().push(format!("run {dep}")), dep);
        h("i").into()
    });
    let tree = |dep: f64, sibling: Option<Element>| -> Element {
        h("div")
            .child(watcher.clone().with_props(Props::new().with("dep", dep)))
            .child(sibling)
            .into()
    };
    let bad_style = h("b").prop("style", Style::new().with("color", "")).into();

    let root = memory_root();
    root.render(tree(1.0, None)).unwrap();

    let err = root.render(tree(2.0, Some(h("").into()))).unwrap_err();
    assert!(matches!(err, Error::Render(_)));
    root.render(tree(2.0, None)).unwrap();

    let err = root.render(tree(3.0, Some(bad_style))).unwrap_err();
    assert!(matches!(err, Error::Patch(PatchError::InvalidStyle { .. })));
    root.render(tree(3.0, None)).unwrap();
    root.render(tree(3.0, None)).unwrap();

    assert_eq!(*log.borrow(), vec!["run 1", "run 2", "run 3"]);
}

#[test]
fn test_trace_config_does_not_change_output() {
    let mut doc = MemoryDocument::new();
    let container = doc.create_container();
    let root = create_root_with_config(doc, container, RootConfig::new().trace_patches(true));

    root.render(span_tree("A")).unwrap();
    root.render(span_tree("B")).unwrap();
    assert_eq!(html(&root), "<div><span>B</span></div>");
    assert!(root.config().trace_patches);
}

// =============================================================================
// Todo flow
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
struct Todo {
    text: String,
}

type Log = Rc<RefCell<Vec<String>>>;

fn todo_item(_cx: &mut Scope<'_>, props: &Props) -> Element {
    h("li").child(props.get_str("text").unwrap_or_default().to_string()).into()
}

fn todo_app(cx: &mut Scope<'_>, props: &Props) -> Element {
    let (todos, set_todos) = cx.declare_state(Vec::<Todo>::new());
    let (draft, set_draft) = cx.declare_state(String::new());
    let count = todos.len();

    if let Some(log) = props.get_shared::<Log>("log").cloned() {
        cx.declare_effect(
            move || {
                log.borrow_mut().push(format!("effect {count}"));
                move || log.borrow_mut().push(format!("cleanup {count}"))
            },
            count,
        );
    }

    let on_change = {
        let set_draft = set_draft.clone();
        move |event: &Event| set_draft.set(event.value.clone().unwrap_or_default())
    };
    let on_submit = {
        let draft = draft.clone();
        move |_: &Event| {
            if draft.trim().is_empty() {
                return;
            }
            let text = draft.trim().to_string();
            set_todos.update(|prev| {
                let mut next = prev.clone();
                next.push(Todo { text });
                next
            });
            set_draft.set(String::new());
        }
    };

    h("div")
        .prop("className", "todo-app")
        .child(
            h("form")
                .on("onSubmit", on_submit)
                .child(h("label").prop("htmlFor", "new-todo").child("What needs doing?"))
                .child(
                    h("input")
                        .prop("id", "new-todo")
                        .prop("value", draft.clone())
                        .on("onChange", on_change),
                )
                .child(h("button").prop("disabled", draft.is_empty()).child("Add")),
        )
        .child(h("ul").children(todos.iter().map(|todo| {
            Component::new(todo_item).with_props(Props::new().with("text", todo.text.clone()))
        })))
        .child((count > 0 && count % 2 == 0).then(|| h("p").child("Even number of todos")))
        .into()
}

#[test]
fn test_todo_flow() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let root = memory_root();
    let props = Props::new().with("log", SharedValue::new(log.clone()));
    root.render(Component::new(todo_app).with_props(props)).unwrap();

    let form = find(&root, "form");
    let input = find(&root, "input");
    let button = find(&root, "button");
    let label = find(&root, "label");
    let attribute = |node: NodeId, name: &str| {
        root.with_medium(|doc| doc.attribute(node, name).map(str::to_string))
    };
    assert_eq!(attribute(label, "for"), Some("new-todo".into()));
    assert_eq!(attribute(button, "disabled"), Some(String::new()));

    // blank submit does nothing
    let cycles = root.cycle_count();
    root.dispatch_event(&form, &Event::new("submit"));
    assert_eq!(root.cycle_count(), cycles);

    for text in ["milk", "eggs"] {
        root.dispatch_event(&input, &Event::new("change").with_value(text));
        assert!(attribute(button, "disabled").is_none());
        assert_eq!(
            root.with_medium(|doc| doc.field(input, "value").cloned()),
            Some(text.into())
        );
        root.dispatch_event(&form, &Event::new("submit"));
    }

    // nodes were patched in place and listeners swapped, not stacked
    assert_eq!(find(&root, "input"), input);
    assert_eq!(root.with_medium(|doc| doc.listener_count(input, "change")), 1);
    assert_eq!(root.with_medium(|doc| doc.listener_count(form, "submit")), 1);

    let container = root.container();
    let list = root.with_medium(|doc| doc.find_by_tag(container, "ul")).unwrap();
    assert_eq!(root.with_medium(|doc| doc.text_content(list)), "milkeggs");
    assert_eq!(find_all(&root, "li").len(), 2);
    let note = find(&root, "p");
    assert_eq!(root.with_medium(|doc| doc.text_content(note)), "Even number of todos");
    assert_eq!(root.with_medium(|doc| doc.field(input, "value").cloned()), Some("".into()));

    assert_eq!(
        *log.borrow(),
        vec!["effect 0", "cleanup 0", "effect 1", "cleanup 1", "effect 2"]
    );

    root.unmount().unwrap();
    assert_eq!(html(&root), "");
    assert_eq!(log.borrow().last().map(String::as_str), Some("cleanup 2"));
}
