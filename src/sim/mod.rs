use rayon::iter::{IntoParallelIterator, ParallelIterator};

pub mod params;

pub use params::{ForestParameters, SpreadRule};

#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    #[default]
    Empty = 0,
    Tree = 1,
    Burning = 2,
    Burned = 3,
}

impl CellState {
    pub fn burning(&self) -> bool {
        matches!(self, CellState::Burning)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub state: CellState,
    /// Consecutive steps this cell has spent burning. Zero unless burning.
    pub burning_duration: u32,
}

impl Cell {
    fn ignite(&mut self) -> bool {
        if self.state != CellState::Tree {
            return false;
        }
        self.state = CellState::Burning;
        self.burning_duration = 0;
        true
    }

    fn burn_out(&mut self) {
        self.state = CellState::Burned;
        self.burning_duration = 0;
    }
}

/// A renderable snapshot of the forest: one state per site, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationFrame {
    pub size: usize,
    pub grid: Vec<CellState>,
}

impl SimulationFrame {
    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.grid.chunks(self.size)
    }

    /// Numeric tags (0 empty, 1 tree, 2 burning, 3 burned) for handing across
    /// the wasm boundary.
    pub fn tags(&self) -> Vec<u8> {
        self.grid.iter().map(|state| *state as u8).collect()
    }
}

/// Number of sites in each state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Census {
    pub empty: usize,
    pub trees: usize,
    pub burning: usize,
    pub burned: usize,
}

impl Census {
    fn of(cells: &[Cell]) -> Census {
        cells.iter().fold(Census::default(), |mut census, cell| {
            match cell.state {
                CellState::Empty => census.empty += 1,
                CellState::Tree => census.trees += 1,
                CellState::Burning => census.burning += 1,
                CellState::Burned => census.burned += 1,
            }
            census
        })
    }

    pub fn total(&self) -> usize {
        self.empty + self.trees + self.burning + self.burned
    }
}

/// A square forest of `size * size` sites and the rules that burn it.
pub struct Forest {
    size: usize,
    cells: Vec<Cell>,
    spread_rule: SpreadRule,
    rng: fastrand::Rng,
    steps: u32,
}

impl Forest {
    /// An empty forest with `size` sites per side and default parameters.
    pub fn new(size: usize) -> Result<Forest, anyhow::Error> {
        Self::with_parameters(&ForestParameters {
            sites_per_side: size,
            ..ForestParameters::default()
        })
    }

    pub fn with_parameters(parameters: &ForestParameters) -> Result<Forest, anyhow::Error> {
        let cell_count = parameters.cell_count()?;
        let rng = match parameters.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        log::debug!(
            "created a {0}x{0} forest ({1:?} spread)",
            parameters.sites_per_side,
            parameters.spread_rule
        );
        Ok(Self {
            size: parameters.sites_per_side,
            cells: vec![Cell::default(); cell_count],
            spread_rule: parameters.spread_rule,
            rng,
            steps: 0,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, idx: usize) -> Option<&Cell> {
        self.cells.get(idx)
    }

    /// Steps taken since the trees were last planted. Steps on a forest with
    /// no fire still count.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn spread_rule(&self) -> SpreadRule {
        self.spread_rule
    }

    pub fn set_spread_rule(&mut self, spread_rule: SpreadRule) {
        self.spread_rule = spread_rule;
    }

    /// Clear the forest, then put a tree on each site with probability `p`.
    ///
    /// `p <= 0` leaves the forest empty and `p >= 1` fills it.
    pub fn plant_trees(&mut self, p: f32) {
        for cell in self.cells.iter_mut() {
            *cell = Cell::default();
            if self.rng.f32() < p {
                cell.state = CellState::Tree;
            }
        }
        self.steps = 0;
        log::debug!("planted {} trees (p = {p})", self.census().trees);
    }

    /// Set every tree in the first row alight. Returns how many caught.
    pub fn ignite_first_row(&mut self) -> usize {
        let lit = self.cells[..self.size]
            .iter_mut()
            .map(Cell::ignite)
            .filter(|lit| *lit)
            .count();
        if lit == 0 {
            log::debug!("no trees in the first row, nothing to ignite");
        } else {
            log::debug!("ignited {lit} trees in the first row");
        }
        lit
    }

    /// Set a single site alight. Returns whether it held a tree.
    pub fn ignite_cell(&mut self, idx: usize) -> Result<bool, anyhow::Error> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(idx)
            .ok_or_else(|| anyhow::anyhow!("site {idx} is outside a forest of {len} sites"))?;
        Ok(cell.ignite())
    }

    pub fn is_burning(&self) -> bool {
        self.cells.iter().any(|cell| cell.state.burning())
    }

    /// Advance the fire by one tick.
    ///
    /// Burning cells age by one tick, light every neighboring tree, and then
    /// burn out. A freshly lit tree starts aging on the following tick.
    pub fn step(&mut self) {
        match self.spread_rule {
            SpreadRule::Synchronous => self.step_synchronous(),
            SpreadRule::Sweep => self.step_sweep(),
        }
        self.steps += 1;
        if log::log_enabled!(log::Level::Trace) {
            let census = self.census();
            log::trace!(
                "step {}: {} burning, {} burned, {} trees left",
                self.steps,
                census.burning,
                census.burned,
                census.trees
            );
        }
    }

    fn step_synchronous(&mut self) {
        let size = self.size;
        let cells = &self.cells;
        let len = cells.len();
        let catches_fire: Vec<bool> = (0..len)
            .into_par_iter()
            .map(|i| {
                cells[i].state == CellState::Tree
                    && neighbors(i, size, len).any(|n| cells[n].state.burning())
            })
            .collect();

        for (cell, catches_fire) in self.cells.iter_mut().zip(catches_fire) {
            if cell.state.burning() {
                cell.burning_duration += 1;
                if cell.burning_duration > 0 {
                    cell.burn_out();
                }
            } else if catches_fire {
                cell.ignite();
            }
        }
    }

    fn step_sweep(&mut self) {
        let size = self.size;
        let len = self.cells.len();
        for cell in self.cells.iter_mut().filter(|cell| cell.state.burning()) {
            cell.burning_duration += 1;
        }
        for i in 0..len {
            if !self.cells[i].state.burning() {
                continue;
            }
            for n in neighbors(i, size, len) {
                self.cells[n].ignite();
            }
            if self.cells[i].burning_duration > 0 {
                self.cells[i].burn_out();
            }
        }
    }

    /// Step one tick at a time until the fire is out.
    ///
    /// Each call to `next` runs one step and yields the step count, so the
    /// caller can render between steps or stop early.
    pub fn burn(&mut self) -> Burn<'_> {
        Burn { forest: self }
    }

    /// Step until nothing is burning. Returns the number of steps taken.
    pub fn run_to_completion(&mut self) -> u32 {
        let taken = u32::try_from(self.burn().count()).unwrap_or(u32::MAX);
        self.log_burnout(taken);
        taken
    }

    pub(crate) fn log_burnout(&self, taken: u32) {
        let census = self.census();
        log::info!(
            "fire burned out after {taken} steps: {} of {} trees burned",
            census.burned,
            census.burned + census.trees
        );
    }

    pub fn census(&self) -> Census {
        Census::of(&self.cells)
    }

    pub fn frame(&self) -> SimulationFrame {
        SimulationFrame {
            size: self.size,
            grid: self.cells.iter().map(|cell| cell.state).collect(),
        }
    }
}

pub struct Burn<'a> {
    forest: &'a mut Forest,
}

impl Burn<'_> {
    pub fn forest(&self) -> &Forest {
        self.forest
    }
}

impl Iterator for Burn<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if !self.forest.is_burning() {
            return None;
        }
        self.forest.step();
        Some(self.forest.steps)
    }
}

/// The von Neumann neighbors of `idx` on a square grid, without wrapping
/// across rows or off the edges.
#[inline(always)]
fn neighbors(idx: usize, size: usize, len: usize) -> impl Iterator<Item = usize> {
    let col = idx % size;
    let left = (col > 0).then(|| idx - 1);
    let right = (col + 1 < size).then(|| idx + 1);
    let up = idx.checked_sub(size);
    let down = idx.checked_add(size).filter(|&n| n < len);
    [left, right, up, down].into_iter().flatten()
}
