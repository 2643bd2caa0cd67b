//! Card List Application Test
//!
//! A small accordion app: one card per user, clicking a card title expands it
//! and collapses any other. Exercises components passing children and
//! handlers down, conditional children, and state updates from host events.

use arbor_core::{
    component, create_element, use_state, Child, EventHandler, HostNodeId, MemoryHost, Mutation,
    PropValue, Props, RenderError, RenderResult, Root,
};

#[derive(Debug, Clone, Copy)]
struct User {
    first_name: &'static str,
    last_name: &'static str,
}

static USERS: [User; 5] = [
    User { first_name: "John", last_name: "Doe" },
    User { first_name: "Peter", last_name: "Gabriel" },
    User { first_name: "Marky", last_name: "Mark" },
    User { first_name: "Joe", last_name: "Pesci" },
    User { first_name: "Frank", last_name: "Sinatra" },
];

fn user_card(props: &Props) -> RenderResult {
    let user = props
        .get("user")
        .and_then(|v| v.downcast_ref::<User>())
        .ok_or_else(|| RenderError::component("user_card needs a `user` prop"))?;

    let style: indexmap::IndexMap<String, PropValue> =
        [("backgroundColor".to_string(), PropValue::from("hotpink"))].into_iter().collect();
    let heading = create_element(
        "h4",
        Props::new().with("style", style).on("onMouseMove", |_| {}),
        [user.last_name, "; ", user.first_name],
    );
    let avatar = create_element(
        "img",
        Props::new()
            .with("src", "avatar.jpg")
            .with("alt", "")
            .with("width", "150")
            .with("className", "profile"),
        [Child::Null],
    );
    let input = create_element(
        "input",
        Props::new().with("disabled", false).with("value", "Hello there"),
        [Child::Null],
    );
    Ok(create_element("div", Props::new(), [heading, avatar, input]).into())
}

fn card(props: &Props) -> RenderResult {
    let expanded = props.get("isExpanded").and_then(PropValue::as_bool).unwrap_or(false);
    let title = props.get("title").and_then(PropValue::as_str).unwrap_or_default().to_string();

    let mut heading = Props::new().with("className", "card-title");
    if let Some(on_click) = props.get("onClick") {
        heading.insert("onClick", on_click.clone());
    }
    let body = expanded.then(|| {
        create_element("div", Props::new().with("className", "card-body"), props.children().to_vec())
    });

    let class = format!("card {}", if expanded { "card--expanded" } else { "" });
    Ok(create_element(
        "div",
        Props::new().with("className", class),
        [Child::from(create_element("h3", heading, [title])), Child::from(body)],
    )
    .into())
}

fn app(_: &Props) -> RenderResult {
    let (expanded, set_expanded) = use_state::<Option<usize>>(None)?;

    let cards = USERS.iter().enumerate().map(|(index, user)| {
        let set_expanded = set_expanded.clone();
        let on_click = EventHandler::new(move |_| {
            set_expanded.set(if expanded == Some(index) { None } else { Some(index) });
        });
        let props = Props::new()
            .with("isExpanded", expanded == Some(index))
            .with("title", format!("{} {}", user.first_name, user.last_name))
            .with("onClick", on_click);
        let details = create_element(
            component(user_card),
            Props::new().with("user", PropValue::opaque(*user)),
            [Child::Null],
        );
        Child::from(create_element(component(card), props, [details]))
    });

    Ok(create_element("main", Props::new().with("className", "cards"), cards).into())
}

struct Harness {
    root: Root<MemoryHost>,
    container: HostNodeId,
}

impl Harness {
    fn mount() -> Self {
        let mut host = MemoryHost::new();
        let container = host.create_container("root");
        let mut root = Root::new(host);
        root.render(create_element(component(app), Props::new(), [Child::Null]), Some(container));
        root.flush().unwrap();
        Self { root, container }
    }

    fn cards(&self) -> Vec<HostNodeId> {
        let main = self.root.host().children(self.container)[0];
        self.root.host().children(main).to_vec()
    }

    fn click_title(&mut self, index: usize) {
        let title = self.root.host().children(self.cards()[index])[0];
        assert_eq!(self.root.host().dispatch(title, "click"), 1);
        self.root.flush().unwrap();
    }

    fn expanded(&self) -> Vec<usize> {
        self.cards()
            .iter()
            .enumerate()
            .filter(|(_, card)| self.root.host().children(**card).len() == 2)
            .map(|(i, _)| i)
            .collect()
    }

    fn class(&self, node: HostNodeId) -> Option<&str> {
        self.root.host().node(node)?.property("class")
    }
}

#[test]
fn renders_collapsed_cards() {
    let harness = Harness::mount();
    let cards = harness.cards();

    assert_eq!(cards.len(), 5);
    assert!(harness.expanded().is_empty());
    assert_eq!(harness.class(cards[0]), Some("card "));
    assert_eq!(
        harness.root.host().text_content(harness.container),
        "John DoePeter GabrielMarky MarkJoe PesciFrank Sinatra"
    );
}

#[test]
fn clicking_a_title_expands_its_card() {
    let mut harness = Harness::mount();
    let before = harness.cards();
    harness.root.host_mut().take_mutations();

    harness.click_title(1);

    assert_eq!(harness.cards(), before);
    assert_eq!(harness.expanded(), [1]);
    assert_eq!(harness.class(before[1]), Some("card card--expanded"));
    assert_eq!(harness.class(before[0]), Some("card "));

    let host = harness.root.host();
    let body = host.children(before[1])[1];
    assert_eq!(harness.class(body), Some("card-body"));
    let details = host.children(body)[0];
    let [heading, avatar, input] = host.children(details) else {
        panic!("user card should have three children");
    };

    assert_eq!(host.text_content(*heading), "Gabriel; Peter");
    let heading = host.node(*heading).unwrap();
    assert_eq!(heading.property("style"), Some("background-color: hotpink;"));
    assert_eq!(heading.listeners().collect::<Vec<_>>(), [("mousemove", false)]);

    let avatar = host.node(*avatar).unwrap();
    assert_eq!(avatar.property("class"), Some("profile"));
    assert_eq!(avatar.property("alt"), Some(""));
    assert_eq!(avatar.property("width"), Some("150"));

    let input = host.node(*input).unwrap();
    assert_eq!(input.property("disabled"), None);
    assert_eq!(input.property("value"), Some("Hello there"));

    // Only the expanded card's subtree changed shape.
    for mutation in host.mutations() {
        match mutation {
            Mutation::Insert { parent, .. } => assert!(host.contains(before[1], *parent)),
            Mutation::Remove { .. } => panic!("nothing should be removed"),
            _ => {}
        }
    }
}

#[test]
fn clicking_again_collapses() {
    let mut harness = Harness::mount();
    harness.click_title(3);
    let body = harness.root.host().children(harness.cards()[3])[1];

    harness.click_title(3);

    assert!(harness.expanded().is_empty());
    assert!(!harness.root.host().contains(harness.container, body));
    assert_eq!(harness.root.last_commit().unwrap().deletions(), 1);
}

#[test]
fn expanding_another_card_collapses_the_first() {
    let mut harness = Harness::mount();
    harness.click_title(0);
    harness.click_title(4);

    assert_eq!(harness.expanded(), [4]);
    assert_eq!(
        harness.root.host().text_content(harness.cards()[4]),
        "Frank SinatraSinatra; Frank"
    );
}
