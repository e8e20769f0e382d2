//! Browser bindings: attach a forest to a DOM container and drive it from the
//! page's forms and `data-action` buttons.

use std::{cell::Cell, cell::RefCell, rc::Rc};

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement};

use crate::{
    control::{Action, Plantation},
    rendering::{self, RenderSurface},
    sim::{Forest, ForestParameters, SimulationFrame, SpreadRule, params},
};

const DEFAULT_SELECTOR: &str = "#forest";

/// Renders frames as markup inside a container element.
pub struct DomSurface {
    container: Element,
}

impl DomSurface {
    fn attach(selector: &str, sites_per_side: usize) -> Result<DomSurface, JsValue> {
        let container = web_sys::window()
            .ok_or("No window")?
            .document()
            .ok_or("No document")?
            .query_selector(selector)?
            .ok_or_else(|| {
                JsValue::from_str(&format!(
                    "nowhere to place the forest: `{selector}` matched nothing"
                ))
            })?;
        container.class_list().add_1("forest")?;
        if let Some(element) = container.dyn_ref::<HtmlElement>() {
            element
                .style()
                .set_property("--sites-per-side", &sites_per_side.to_string())?;
        }
        Ok(DomSurface { container })
    }
}

impl RenderSurface for DomSurface {
    fn present_frame(&mut self, frame: &SimulationFrame) {
        self.container
            .set_inner_html(&rendering::forest_markup(frame));
    }
}

/// A forest shown in the page. Holds the only handle to its session; the page
/// keeps one of these per forest and passes it to every control.
#[wasm_bindgen]
pub struct ForestDemo {
    plantation: Rc<RefCell<Plantation<DomSurface>>>,
    /// Bumped to cancel any running auto-run loop.
    generation: Rc<Cell<u32>>,
}

#[wasm_bindgen]
impl ForestDemo {
    /// Create an empty forest inside the element matching `selector`
    /// (`#forest` when omitted). `sites` is the raw value of the size field.
    #[wasm_bindgen(constructor)]
    pub fn new(selector: Option<String>, sites: Option<String>) -> Result<ForestDemo, JsValue> {
        let mut parameters = ForestParameters::from_form(sites.as_deref(), None)
            .map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
        parameters.seed = Some((js_sys::Math::random() * u64::MAX as f64) as u64);

        let selector = selector.as_deref().unwrap_or(DEFAULT_SELECTOR);
        let surface = DomSurface::attach(selector, parameters.sites_per_side)?;
        let forest =
            Forest::with_parameters(&parameters).map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
        log::info!(
            "forest of {0}x{0} sites attached to `{selector}`",
            parameters.sites_per_side
        );
        Ok(Self {
            plantation: Rc::new(RefCell::new(Plantation::new(forest, surface))),
            generation: Rc::new(Cell::new(0)),
        })
    }

    /// Replant with tree probability `p`.
    #[wasm_bindgen]
    pub fn plant_trees(&self, p: f32) {
        self.apply(Action::PlantTrees(p));
    }

    /// Replant from the raw value of the probability field.
    #[wasm_bindgen]
    pub fn plant_trees_from_form(&self, probability: &str) -> Result<(), JsValue> {
        let p = params::parse_probability(probability)
            .map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
        self.plant_trees(p);
        Ok(())
    }

    /// Run the action named by a button's `data-action` attribute.
    #[wasm_bindgen]
    pub fn dispatch(&self, name: &str) -> Result<(), JsValue> {
        let action: Action = name
            .parse()
            .map_err(|e: anyhow::Error| JsValue::from_str(&e.to_string()))?;
        self.apply(action);
        Ok(())
    }

    /// Ignite the first row. Returns how many trees caught fire.
    #[wasm_bindgen]
    pub fn init_fire(&self) -> usize {
        self.plantation.borrow_mut().init_fire()
    }

    #[wasm_bindgen]
    pub fn time_step(&self) {
        self.plantation.borrow_mut().time_step();
    }

    /// Burn to completion without yielding. Returns the steps taken.
    #[wasm_bindgen]
    pub fn let_it_burn(&self) -> u32 {
        self.stop();
        self.plantation.borrow_mut().let_it_burn()
    }

    #[wasm_bindgen]
    pub fn is_burning(&self) -> bool {
        self.plantation.borrow().forest().is_burning()
    }

    #[wasm_bindgen]
    pub fn steps(&self) -> u32 {
        self.plantation.borrow().forest().steps()
    }

    /// Use the single forward-pass spread rule instead of the default.
    #[wasm_bindgen]
    pub fn set_sweep_spread(&self, sweep: bool) {
        let rule = if sweep {
            SpreadRule::Sweep
        } else {
            SpreadRule::Synchronous
        };
        self.plantation.borrow_mut().set_spread_rule(rule);
    }

    /// Site states in row-major order: 0 empty, 1 tree, 2 burning, 3 burned.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Vec<u8> {
        self.plantation.borrow().forest().frame().tags()
    }

    /// Step every `interval_ms` milliseconds until the fire is out or
    /// [`ForestDemo::stop`] is called, yielding to the page between steps.
    #[wasm_bindgen]
    pub fn auto_run(&self, interval_ms: u32) {
        let run = self.generation.get().wrapping_add(1);
        self.generation.set(run);
        let plantation = Rc::clone(&self.plantation);
        let generation = Rc::clone(&self.generation);
        wasm_bindgen_futures::spawn_local(async move {
            while generation.get() == run {
                {
                    let mut plantation = plantation.borrow_mut();
                    if !plantation.forest().is_burning() {
                        let steps = plantation.forest().steps();
                        log::info!("auto-run finished after {steps} steps");
                        break;
                    }
                    plantation.time_step();
                }
                TimeoutFuture::new(interval_ms).await;
            }
        });
    }

    /// Cancel a running auto-run after its current step.
    #[wasm_bindgen]
    pub fn stop(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
    }
}

impl ForestDemo {
    fn apply(&self, action: Action) {
        if action.cancels_auto_run() {
            self.stop();
        }
        self.plantation.borrow_mut().apply(action);
    }
}
