//! Pedigree simulation: the population registry and its extension step.

mod population;

pub use population::Population;
