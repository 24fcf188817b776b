// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted host loop: entity tree + input router + painter.
//!
//! This example shows how a host drives the crates once per frame:
//! - `understory_entity_tree` owns the entities and resolves layout,
//! - `understory_input` turns sampled device state into events,
//! - a `Painter` receives the visible nodes back to front.
//!
//! Run:
//! - `cargo run -p understory_demos --example host_loop`

use kurbo::{Rect, Vec2};
use understory_entity_tree::{
    Anchor, Context, DrawItem, Entity, EntityFlags, EntityKind, NodeId, Painter, SizeSpec, Tree,
};
use understory_input::{Buttons, Event, EventKind, FrameInput, Router, RouterConfig};
use understory_style::{Color, InteractionState, StyleMap, props};

/// Widget kinds known to this host.
#[derive(Clone, Debug, PartialEq)]
enum Widget {
    Window,
    Button(&'static str),
    Checkbox { checked: bool },
}

impl EntityKind for Widget {
    fn default_size(&self) -> SizeSpec {
        match self {
            Self::Window => SizeSpec::px(240.0, 160.0),
            Self::Button(_) => SizeSpec::new(0.0, 24.0),
            Self::Checkbox { .. } => SizeSpec::px(16.0, 16.0),
        }
    }

    fn naturally_interactive(&self) -> bool {
        !matches!(self, Self::Window)
    }

    fn default_style(&self) -> StyleMap {
        match self {
            Self::Window => StyleMap::new()
                .with(InteractionState::Default, props::PADDING, 8.0)
                .with(InteractionState::Default, props::FILL_COLOR, Color::rgb8(40, 40, 48)),
            Self::Button(_) | Self::Checkbox { .. } => StyleMap::new()
                .with(InteractionState::Default, props::SPACE_AFTER, Vec2::new(4.0, 4.0))
                .with(InteractionState::Default, props::FILL_COLOR, Color::rgb8(90, 90, 100))
                .with(InteractionState::Hover, props::FILL_COLOR, Color::rgb8(120, 120, 130))
                .with(InteractionState::Pressed, props::FILL_COLOR, Color::rgb8(60, 60, 70)),
        }
    }
}

/// Prints what a real renderer would draw.
struct PrintPainter;

impl Painter<Widget> for PrintPainter {
    fn paint(&mut self, item: &DrawItem<'_, Widget>) {
        println!(
            "  paint {:<24} {:?} state={:?} fill={:?}",
            format!("{:?}", item.kind),
            item.outer,
            item.state,
            item.fill
        );
    }
}

fn main() {
    let cx = Context::new(Rect::new(0.0, 0.0, 640.0, 480.0));
    let mut tree: Tree<Widget> = Tree::new();

    let root = tree.insert(
        Entity::new(Widget::Window)
            .with_size(SizeSpec::FILL)
            .with_flags(EntityFlags::default() | EntityFlags::CLICK_THROUGH),
    );
    let window = tree
        .insert_child(
            root,
            Entity::new(Widget::Window)
                .with_anchor(Anchor::TopLeft)
                .with_offset(Vec2::new(40.0, 40.0))
                .with_flags(EntityFlags::default() | EntityFlags::DRAGGABLE),
        )
        .expect("root is alive");
    let selectable = EntityFlags::default() | EntityFlags::SELECTABLE;
    let ok = tree
        .insert_child(
            window,
            Entity::new(Widget::Button("Ok"))
                .with_key("ok")
                .with_flags(selectable | EntityFlags::FIRST_SELECTABLE),
        )
        .expect("window is alive");
    let cancel = tree
        .insert_child(
            window,
            Entity::new(Widget::Button("Cancel")).with_flags(selectable),
        )
        .expect("window is alive");
    let check = tree
        .insert_child(
            window,
            Entity::new(Widget::Checkbox { checked: false })
                .with_anchor(Anchor::AutoInline)
                .with_flags(selectable),
        )
        .expect("window is alive");
    println!("ok={ok} cancel={cancel} check={check}");

    let mut router = Router::with_config(RouterConfig {
        drag_threshold: 2.0,
        ..RouterConfig::default()
    });

    // Toggle the checkbox on click and log everything but the update brackets.
    let mut handler = |tree: &mut Tree<Widget>, e: &Event| {
        if matches!(e.kind, EventKind::BeforeUpdate | EventKind::AfterUpdate) {
            return;
        }
        println!("  event {:?} on {}", e.kind, e.node);
        if e.kind == EventKind::Click
            && let Some(Widget::Checkbox { checked }) = tree.kind_mut(e.node)
        {
            *checked = !*checked;
        }
    };

    let script = [
        ("hover Ok", FrameInput::at((60.0, 60.0))),
        (
            "press Ok",
            FrameInput::at((60.0, 60.0)).with_buttons(Buttons::LEFT),
        ),
        ("release Ok", FrameInput::at((60.0, 60.0))),
        (
            "grab the window padding",
            FrameInput::at((44.0, 180.0)).with_buttons(Buttons::LEFT),
        ),
        (
            "drag it",
            FrameInput::at((104.0, 200.0)).with_buttons(Buttons::LEFT),
        ),
        ("drop it", FrameInput::at((104.0, 200.0))),
        (
            "gamepad right",
            FrameInput::at((0.0, 0.0)).with_gamepad(Vec2::new(1.0, 0.0)),
        ),
        ("gamepad confirm", FrameInput::at((0.0, 0.0)).with_confirm(true)),
        ("gamepad release", FrameInput::at((0.0, 0.0))),
    ];

    for (label, input) in script {
        println!("== {label} ==");
        match router.update_frame(&mut tree, root, &cx, &input, &mut handler) {
            Ok(result) => println!("  target={:?} drag_target={:?}", result.target, result.drag_target),
            Err(err) => println!("  routing failed: {err}"),
        }
        tree.draw(root, &cx, &mut PrintPainter);
        let damage = tree.take_damage();
        if !damage.is_empty() {
            println!("  damage: {:?}", damage.union_rect());
        }
    }

    let found: Option<NodeId> = tree.find_by_key(root, "ok");
    println!(
        "focus={:?} checkbox={:?} key \"ok\" -> {:?}",
        router.focus(),
        tree.kind(check),
        found
    );
}
