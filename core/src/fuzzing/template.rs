use ronin_common::utils::product::Product;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Literal(String),
    Set(Vec<String>),
}

impl Part {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    pub fn set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Set(values.into_iter().map(Into::into).collect())
    }

    fn choices(&self) -> Vec<String> {
        match self {
            Self::Literal(text) => vec![text.clone()],
            Self::Set(values) => values.clone(),
        }
    }
}

impl From<&str> for Part {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

/// Builds every string formed by concatenating one choice per part, the
/// last part varying fastest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    pub fn new(parts: Vec<Part>) -> Self {
        Self { parts }
    }

    pub fn push(mut self, part: impl Into<Part>) -> Self {
        self.parts.push(part.into());
        self
    }

    /// Number of strings [`Template::each`] yields.
    pub fn len(&self) -> u128 {
        self.product().len_hint()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn product(&self) -> Product<String> {
        Product::new(self.parts.iter().map(Part::choices).collect())
    }

    pub fn each(&self) -> impl Iterator<Item = String> + use<> {
        self.product().map(|choices| choices.concat())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_sets_in_order() {
        let template = Template::default()
            .push("id=")
            .push(Part::set(["1", "2"]))
            .push(Part::set(["a", "b"]));
        assert_eq!(template.len(), 4);
        assert_eq!(
            template.each().collect::<Vec<_>>(),
            vec!["id=1a", "id=1b", "id=2a", "id=2b"]
        );
    }

    #[test]
    fn empty_set_yields_nothing() {
        let template = Template::new(vec![Part::literal("x"), Part::Set(vec![])]);
        assert!(template.is_empty());
        assert_eq!(template.each().count(), 0);
    }

    #[test]
    fn literals_only() {
        let template = Template::new(vec!["a".into(), "b".into()]);
        assert_eq!(template.each().collect::<Vec<_>>(), vec!["ab"]);
    }
}
