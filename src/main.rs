use std::io::IsTerminal;

use forestfire::{
    control::Plantation,
    rendering::TextSurface,
    sim::{Forest, ForestParameters},
};

/// Usage: `forestfire [sites-per-side] [tree-probability]`
fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let sites = args.next();
    let probability = args.next();
    let parameters = ForestParameters::from_form(sites.as_deref(), probability.as_deref())?;

    let forest = Forest::with_parameters(&parameters)?;
    let stdout = std::io::stdout();
    let colored = stdout.is_terminal();
    let mut plantation = Plantation::new(forest, TextSurface::new(stdout, colored));

    plantation.plant_trees(parameters.tree_density);
    if plantation.init_fire() == 0 {
        println!("no trees in the first row, nothing to burn");
        return Ok(());
    }
    let steps = plantation.let_it_burn();

    let census = plantation.forest().census();
    let planted = census.burned + census.trees;
    println!("fire burned out after {steps} steps");
    println!(
        "{} of {} trees burned, {} of {} sites were bare",
        census.burned,
        planted,
        census.empty,
        census.total()
    );
    Ok(())
}
