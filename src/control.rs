//! User actions and the session that applies them.

use std::str::FromStr;

use crate::{
    rendering::RenderSurface,
    sim::{Forest, SpreadRule},
};

/// Everything a user can ask the forest to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    PlantTrees(f32),
    InitFire,
    TimeStep,
    LetItBurn,
}

impl Action {
    /// Whether a timer-driven run should stop before this action applies.
    /// Replanting and burning to completion both take over the forest.
    pub fn cancels_auto_run(&self) -> bool {
        matches!(self, Action::PlantTrees(_) | Action::LetItBurn)
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    /// Parse the `data-action` name carried by a page button.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "initFire" => Ok(Action::InitFire),
            "timeStep" => Ok(Action::TimeStep),
            "letItBurn" => Ok(Action::LetItBurn),
            "plantTrees" => Err(anyhow::anyhow!(
                "`plantTrees` needs a probability, submit it through the planting form"
            )),
            other => Err(anyhow::anyhow!("unknown action `{other}`")),
        }
    }
}

/// A forest bound to the surface that displays it.
///
/// The surface sees the initial frame on construction and a fresh frame after
/// every mutation, including each step of [`Plantation::let_it_burn`].
pub struct Plantation<S: RenderSurface> {
    forest: Forest,
    surface: S,
}

impl<S: RenderSurface> Plantation<S> {
    pub fn new(forest: Forest, surface: S) -> Self {
        let mut plantation = Self { forest, surface };
        plantation.render();
        plantation
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn set_spread_rule(&mut self, spread_rule: SpreadRule) {
        self.forest.set_spread_rule(spread_rule);
    }

    pub fn apply(&mut self, action: Action) {
        log::debug!("applying {action:?}");
        match action {
            Action::PlantTrees(p) => self.plant_trees(p),
            Action::InitFire => {
                self.init_fire();
            }
            Action::TimeStep => self.time_step(),
            Action::LetItBurn => {
                self.let_it_burn();
            }
        }
    }

    pub fn plant_trees(&mut self, p: f32) {
        self.forest.plant_trees(p);
        self.render();
    }

    /// Returns how many trees caught fire.
    pub fn init_fire(&mut self) -> usize {
        let lit = self.forest.ignite_first_row();
        self.render();
        lit
    }

    pub fn time_step(&mut self) {
        self.forest.step();
        self.render();
    }

    /// Step until the fire is out, rendering every step. Returns the number of
    /// steps taken.
    pub fn let_it_burn(&mut self) -> u32 {
        let mut taken = 0;
        let mut burn = self.forest.burn();
        while burn.next().is_some() {
            taken += 1;
            self.surface.present_frame(&burn.forest().frame());
        }
        self.forest.log_burnout(taken);
        taken
    }

    fn render(&mut self) {
        self.surface.present_frame(&self.forest.frame());
    }
}
