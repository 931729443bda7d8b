use std::collections::HashMap;
use std::sync::Arc;

/// Per-individual trait values for one population in one generation.
///
/// Vectors are keyed by trait id and aligned by organism index. The kernel
/// only reads them to look up fitness vectors; computing them is the job of
/// the trait layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationContext {
    population_size: usize,
    trait_values: HashMap<String, Arc<[f64]>>,
}

impl PopulationContext {
    /// Context with no trait values for a population of `population_size`.
    pub fn new(population_size: usize) -> Self {
        Self {
            population_size,
            trait_values: HashMap::new(),
        }
    }

    /// Builder-style variant of [`insert_trait`](Self::insert_trait).
    pub fn with_trait(mut self, trait_id: impl Into<String>, values: impl Into<Arc<[f64]>>) -> Self {
        self.insert_trait(trait_id, values);
        self
    }

    /// Register (or replace) the values for a trait.
    pub fn insert_trait(&mut self, trait_id: impl Into<String>, values: impl Into<Arc<[f64]>>) {
        self.trait_values.insert(trait_id.into(), values.into());
    }

    /// Size of the population these values describe.
    #[inline]
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Values for a trait, if present.
    pub fn trait_values(&self, trait_id: &str) -> Option<&Arc<[f64]>> {
        self.trait_values.get(trait_id)
    }

    /// Ids of every trait present.
    pub fn trait_ids(&self) -> impl Iterator<Item = &str> {
        self.trait_values.keys().map(String::as_str)
    }

    /// Whether every value of the trait is zero. `None` if the trait is missing.
    pub fn is_all_zero(&self, trait_id: &str) -> Option<bool> {
        self.trait_values(trait_id)
            .map(|values| values.iter().all(|&v| v == 0.0))
    }
}
