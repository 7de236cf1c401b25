use std::path::{Path, PathBuf};

/// What a resolution found besides the descriptor itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extra {
    /// Display name, from a `name=` term or the catalog name the event was found by.
    pub name: Option<String>,
    /// The `pmu/terms/modifiers` form the event was finally resolved from.
    pub decoded: String,
    /// The descriptor must be opened once per entry of [`pmus`][Self::pmus],
    /// stepping with [`Resolver::next_pmu`][super::Resolver::next_pmu].
    pub multi_pmu: bool,
    /// PMU directories the event can be counted on.
    pub pmus: Vec<PathBuf>,
    /// Index into `pmus` of the next PMU to step to.
    pub next_pmu: usize,
    /// The PMU counts per socket rather than per CPU.
    pub uncore: bool,
}

impl Extra {
    /// Directory of the PMU the descriptor currently targets.
    pub fn current_pmu(&self) -> Option<&Path> {
        self.pmus
            .get(self.next_pmu.saturating_sub(1))
            .map(PathBuf::as_path)
    }

    pub fn pmu_names(&self) -> impl Iterator<Item = &str> {
        self.pmus
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
    }
}
