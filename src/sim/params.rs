use anyhow::Context;

/// Side length used when the form leaves the size blank or unparsable.
pub const DEFAULT_SITES_PER_SIDE: usize = 10;
/// Tree density used when no probability is supplied.
pub const DEFAULT_TREE_DENSITY: f32 = 0.5;

/// How a step decides which trees catch fire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpreadRule {
    /// Every spread decision is made against the set of cells that were
    /// burning when the step began, so the scan order never matters.
    #[default]
    Synchronous,
    /// A single forward pass that mutates the grid as it goes. A tree lit
    /// earlier in the pass is scanned again later in the same pass and can
    /// keep spreading, so fire races right and down within one step.
    Sweep,
}

/// The parameters controlling a forest
#[derive(Clone, Debug, PartialEq)]
pub struct ForestParameters {
    /// Number of sites along each side of the square grid
    pub sites_per_side: usize,
    /// The chance (0 - 1) that any given site holds a tree after planting
    pub tree_density: f32,
    pub spread_rule: SpreadRule,
    /// Seed for the planting RNG. `None` seeds from the platform.
    pub seed: Option<u64>,
}

impl Default for ForestParameters {
    fn default() -> Self {
        Self {
            sites_per_side: DEFAULT_SITES_PER_SIDE,
            tree_density: DEFAULT_TREE_DENSITY,
            spread_rule: SpreadRule::default(),
            seed: None,
        }
    }
}

impl ForestParameters {
    /// Build parameters from the raw strings a form hands over.
    ///
    /// The size is read from its sign and leading digits, so `"12px"` gives
    /// 12. Missing, blank or digitless text falls back to
    /// [`DEFAULT_SITES_PER_SIDE`]; a size of zero or less is rejected. A
    /// missing probability falls back to [`DEFAULT_TREE_DENSITY`], an
    /// unparsable one is rejected.
    pub fn from_form(
        sites: Option<&str>,
        probability: Option<&str>,
    ) -> Result<ForestParameters, anyhow::Error> {
        let sites_per_side = parse_sites(sites)?;
        let tree_density = match probability.map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => parse_probability(raw)?,
            None => DEFAULT_TREE_DENSITY,
        };
        Ok(Self {
            sites_per_side,
            tree_density,
            ..Self::default()
        })
    }

    pub fn cell_count(&self) -> Result<usize, anyhow::Error> {
        anyhow::ensure!(
            self.sites_per_side > 0,
            "a forest needs at least one site per side"
        );
        self.sites_per_side
            .checked_mul(self.sites_per_side)
            .with_context(|| format!("{} sites per side is too many", self.sites_per_side))
    }
}

pub fn parse_probability(raw: &str) -> Result<f32, anyhow::Error> {
    let p: f32 = raw
        .trim()
        .parse()
        .with_context(|| format!("tree probability `{raw}` is not a number"))?;
    anyhow::ensure!(p.is_finite(), "tree probability `{raw}` is not finite");
    Ok(p)
}

fn parse_sites(raw: Option<&str>) -> Result<usize, anyhow::Error> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_SITES_PER_SIDE);
    };
    let Some(sites) = leading_integer(raw) else {
        log::warn!("`{raw}` is not a number, using {DEFAULT_SITES_PER_SIDE} sites per side");
        return Ok(DEFAULT_SITES_PER_SIDE);
    };
    let sites: i64 = sites
        .parse()
        .with_context(|| format!("`{raw}` sites per side is too many"))?;
    anyhow::ensure!(
        sites > 0,
        "a forest needs at least one site per side, got {sites}"
    );
    usize::try_from(sites).with_context(|| format!("{sites} sites per side is too many"))
}

/// The optional sign and leading digits of `raw`, so `"12.5"` and `"12px"`
/// both read as 12. `None` when no digits lead.
fn leading_integer(raw: &str) -> Option<&str> {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    let sign_len = raw.len() - unsigned.len();
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    (digits > 0).then(|| &raw[..sign_len + digits])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_form_uses_defaults() {
        let params = ForestParameters::from_form(None, None).unwrap();
        assert_eq!(params, ForestParameters::default());

        let params = ForestParameters::from_form(Some("  "), Some("")).unwrap();
        assert_eq!(params.sites_per_side, DEFAULT_SITES_PER_SIDE);
        assert_eq!(params.tree_density, DEFAULT_TREE_DENSITY);
    }

    #[test]
    fn non_numeric_size_falls_back() {
        let params = ForestParameters::from_form(Some("lots"), None).unwrap();
        assert_eq!(params.sites_per_side, DEFAULT_SITES_PER_SIDE);
        let params = ForestParameters::from_form(Some(".5"), None).unwrap();
        assert_eq!(params.sites_per_side, DEFAULT_SITES_PER_SIDE);
    }

    #[test]
    fn size_reads_leading_digits() {
        for raw in ["12.5", "12px", "+12", " 12 trees"] {
            let params = ForestParameters::from_form(Some(raw), None).unwrap();
            assert_eq!(params.sites_per_side, 12, "parsing `{raw}`");
        }
        assert!(ForestParameters::from_form(Some("-3.7"), None).is_err());
        assert!(ForestParameters::from_form(Some("0px"), None).is_err());
    }

    #[test]
    fn parses_size_and_probability() {
        let params = ForestParameters::from_form(Some(" 25 "), Some("0.65")).unwrap();
        assert_eq!(params.sites_per_side, 25);
        assert_eq!(params.tree_density, 0.65);
    }

    #[test]
    fn rejects_non_positive_size() {
        assert!(ForestParameters::from_form(Some("0"), None).is_err());
        let err = ForestParameters::from_form(Some("-4"), None).unwrap_err();
        assert!(err.to_string().contains("-4"));
    }

    #[test]
    fn rejects_bad_probability() {
        assert!(ForestParameters::from_form(None, Some("dense")).is_err());
        assert!(ForestParameters::from_form(None, Some("NaN")).is_err());
        assert!(parse_probability("inf").is_err());
    }

    #[test]
    fn cell_count_checks_size() {
        let mut params = ForestParameters::default();
        assert_eq!(params.cell_count().unwrap(), 100);
        params.sites_per_side = 0;
        assert!(params.cell_count().is_err());
        params.sites_per_side = usize::MAX;
        assert!(params.cell_count().is_err());
    }
}
