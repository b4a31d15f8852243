//! Application driver.
//!
//! Ties a [`Component`] to a [`Renderer`] through a single effect. The first
//! run of the effect renders the component and mounts the tree into the
//! container. Every later run, triggered by a write to any state the
//! previous render read, renders the whole component again, patches the new
//! tree against the retained one, and retains the new tree.
//!
//! A patch that fails part way leaves the target matching neither tree. The
//! driver then drops its baseline, and the next render clears the container
//! and mounts from scratch.
//!
//! ```rust
//! use ripple_core::app::create_app;
//! use ripple_core::reactive::reactive;
//! use ripple_core::render::{h, MemoryTarget, VNode};
//! use serde_json::json;
//!
//! let doc = MemoryTarget::new();
//! doc.create_root("div", "app")?;
//!
//! let state = reactive(json!({ "counter": 0 }));
//! let data = state.clone();
//! let app = create_app(move || -> VNode { h("p", (), data.get("counter").to_string()) })
//!     .mount(doc.clone(), "#app")?;
//!
//! state.set("counter", 1);
//! let root = app.root_el().unwrap();
//! assert_eq!(doc.text(root), "1");
//! # Ok::<(), ripple_core::error::RenderError>(())
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, error, info};

use crate::config::RenderConfig;
use crate::error::{RenderError, Result};
use crate::reactive::{watch_effect, Effect, EffectId};
use crate::render::{Container, NodeHandle, RenderTarget, Renderer, VNode};

/// Something that renders a tree from its state.
///
/// `render` should be a pure function of reactive state: every property it
/// reads becomes a trigger for the next render.
pub trait Component {
    fn render(&self) -> VNode;
}

impl<F> Component for F
where
    F: Fn() -> VNode,
{
    fn render(&self) -> VNode {
        self()
    }
}

/// Wrap a component into an application that can be mounted.
pub fn create_app<C: Component + 'static>(component: C) -> App<C> {
    App {
        component: Rc::new(component),
        config: RenderConfig::default(),
    }
}

/// An application that has not been mounted yet.
pub struct App<C> {
    component: Rc<C>,
    config: RenderConfig,
}

impl<C: Component + 'static> App<C> {
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Render the component into `container` and keep it up to date.
    ///
    /// # Errors
    ///
    /// Fails when the container cannot be resolved, when the first render
    /// cannot be mounted, or when called from inside another tracked
    /// evaluation. Failures of later re-renders are not returned here, see
    /// [`MountedApp::take_error`].
    pub fn mount<T>(self, target: T, container: impl Into<Container>) -> Result<MountedApp<T>>
    where
        T: RenderTarget + 'static,
    {
        let container = container.into();
        let renderer = Renderer::with_config(target, self.config);
        let root = renderer.resolve_container(&container)?;
        info!(container = %container, "mounting app");

        let driver = Rc::new(RefCell::new(Driver {
            renderer,
            container: root,
            tree: None,
            renders: 0,
            stale: false,
        }));
        let last_error: Rc<RefCell<Option<RenderError>>> = Rc::new(RefCell::new(None));

        let effect = watch_effect({
            let driver = Rc::downgrade(&driver);
            let last_error = Rc::clone(&last_error);
            let component = Rc::clone(&self.component);
            move || run(&driver, &last_error, &*component)
        })?;

        // The first run mounts synchronously, so its failure is already here.
        if let Some(err) = last_error.borrow_mut().take() {
            return Err(err);
        }

        Ok(MountedApp {
            driver,
            last_error,
            effect,
        })
    }
}

struct Driver<T> {
    renderer: Renderer<T>,
    container: NodeHandle,
    tree: Option<VNode>,
    renders: usize,
    /// Set when a patch failed and the container holds a partial update.
    stale: bool,
}

impl<T: RenderTarget> Driver<T> {
    fn commit(&mut self, mut next: VNode) -> Result<()> {
        match self.tree.take() {
            None => {
                if self.stale {
                    debug!("rebuilding after failed patch");
                    self.renderer.clear(self.container)?;
                }
                self.renderer.mount(&mut next, self.container)?;
                self.stale = false;
            }
            Some(prev) => {
                if let Err(err) = self.renderer.patch(&prev, &mut next) {
                    self.stale = true;
                    return Err(err);
                }
            }
        }
        self.tree = Some(next);
        self.renders += 1;
        Ok(())
    }
}

fn run<T, C>(
    driver: &Weak<RefCell<Driver<T>>>,
    last_error: &RefCell<Option<RenderError>>,
    component: &C,
) where
    T: RenderTarget,
    C: Component + ?Sized,
{
    let Some(driver) = driver.upgrade() else {
        debug!("app dropped, skipping render");
        return;
    };

    let next = component.render();
    let result = match driver.try_borrow_mut() {
        Ok(mut driver) => driver.commit(next),
        Err(_) => Err(RenderError::Reentrant),
    };

    if let Err(err) = result {
        error!(error = %err, "render failed");
        *last_error.borrow_mut() = Some(err);
    }
}

/// A mounted application.
///
/// Dropping the handle stops further renders. The mounted nodes stay in the
/// target as they are.
pub struct MountedApp<T> {
    driver: Rc<RefCell<Driver<T>>>,
    last_error: Rc<RefCell<Option<RenderError>>>,
    effect: Effect,
}

impl<T: RenderTarget> MountedApp<T> {
    /// Get the target node of the current tree's root.
    ///
    /// `None` after a failed re-render, until the next render rebuilds.
    pub fn root_el(&self) -> Option<NodeHandle> {
        self.driver.borrow().tree.as_ref().and_then(VNode::el)
    }

    /// Get the node the app was mounted into.
    pub fn container(&self) -> NodeHandle {
        self.driver.borrow().container
    }

    /// Number of renders applied to the target, the initial mount included.
    pub fn render_count(&self) -> usize {
        self.driver.borrow().renders
    }

    pub fn effect_id(&self) -> EffectId {
        self.effect.id()
    }

    /// Take the error of the most recent failed re-render, if any.
    pub fn take_error(&self) -> Option<RenderError> {
        self.last_error.borrow_mut().take()
    }

    /// Run `f` against the current tree.
    pub fn with_tree<R>(&self, f: impl FnOnce(Option<&VNode>) -> R) -> R {
        f(self.driver.borrow().tree.as_ref())
    }
}
