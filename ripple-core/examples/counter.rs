//! Counter demo.
//!
//! Mounts a counter component into an in-memory document, clicks its
//! buttons, and prints the document after every click.
//!
//! ```sh
//! RUST_LOG=ripple_core=debug cargo run --example counter
//! ```

use ripple_core::app::{create_app, Component};
use ripple_core::error::RenderError;
use ripple_core::reactive::{reactive, Reactive};
use ripple_core::render::{h, Listener, MemoryTarget, VNode};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Counter {
    data: Reactive,
}

impl Component for Counter {
    fn render(&self) -> VNode {
        let data = self.data.downgrade();
        let increment = Listener::keyed("increment", move || {
            if let Some(data) = data.upgrade() {
                data.update("counter", |n| json!(n.as_i64().unwrap_or(0) + 1));
            }
        });

        let data = self.data.downgrade();
        let change_class = Listener::keyed("change-class", move || {
            if let Some(data) = data.upgrade() {
                data.set("divclass", "box");
                info!(divclass = %data.get_untracked("divclass"), "class changed");
            }
        });

        let class = self.data.get_as::<String>("divclass").unwrap_or_default();
        h(
            "div",
            [("class", class)],
            vec![
                h("h2", (), format!("Count: {}", self.data.get("counter"))),
                h("button", [("onClick", increment)], "+1"),
                h("button", [("onClick", change_class)], "changeProps"),
            ],
        )
    }
}

fn main() -> Result<(), RenderError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let doc = MemoryTarget::new();
    doc.create_root("div", "app")?;

    let app = create_app(Counter {
        data: reactive(json!({ "counter": 0, "divclass": "container" })),
    })
    .mount(doc.clone(), "#app")?;

    let body = doc.body();
    println!("{}", doc.to_html(body));

    let Some(root) = app.root_el() else {
        return Ok(());
    };
    let buttons = doc.children(root);
    for &button in &buttons[1..] {
        doc.dispatch(button, "click")?;
        doc.dispatch(button, "click")?;
        println!("{}", doc.to_html(body));
    }

    if let Some(err) = app.take_error() {
        return Err(err);
    }
    Ok(())
}
