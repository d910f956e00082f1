use rand::Rng;

use crate::catalog::Catalog;

/// Outcome of one spin of the wheel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinResult {
    pub subject: String,
    pub minutes: u32,
}

/// Picks a subject uniformly from the catalog, then a duration uniformly from
/// that subject's set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selector {
    catalog: Catalog,
}

impl Selector {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog
    }

    pub fn spin<R: Rng + ?Sized>(&self, rng: &mut R) -> SpinResult {
        let subjects = self.catalog.subjects();
        let subject = &subjects[rng.gen_range(0..subjects.len())];
        let minutes = subject.durations[rng.gen_range(0..subject.durations.len())];

        SpinResult {
            subject: subject.name.to_string(),
            minutes,
        }
    }
}
