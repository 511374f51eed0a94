//! # Fuzzing
//!
//! Regex-driven string mutation plus a few generators for building
//! payload lists.
//!
//! * [`Fuzzer`] replaces one match at a time.
//! * [`Mutator`] replaces every combination of matches.
//! * [`Template`] and [`Repeater`] build strings from parts.
//! * [`sets`] holds canned payload lists.

pub mod mutator;
pub mod repeater;
pub mod sets;
pub mod template;

pub use mutator::{Fuzzer, FuzzError, Mutation, Mutator, Rule};
pub use repeater::Repeater;
pub use template::{Part, Template};

/// Fuzzing shortcuts on string slices.
pub trait StringFuzz {
    /// Every single-substitution variant, see [`Fuzzer::each`].
    fn fuzz(&self, rules: &[Rule]) -> Vec<String>;

    /// Every combination of substitutions, see [`Mutator::each`].
    fn mutate(&self, rules: &[Rule]) -> Vec<String>;
}

impl StringFuzz for str {
    fn fuzz(&self, rules: &[Rule]) -> Vec<String> {
        Fuzzer::new(rules.to_vec()).each(self).collect()
    }

    fn mutate(&self, rules: &[Rule]) -> Vec<String> {
        Mutator::new(rules.to_vec()).each(self).collect()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
