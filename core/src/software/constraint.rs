use std::fmt;
use std::str::FromStr;

use super::version::{Version, VersionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// `~>`, "compatible with".
    Pessimistic,
}

impl Op {
    // Longest operators first so `<=` is not read as `<`.
    const TOKENS: [(&'static str, Op); 8] = [
        ("~>", Op::Pessimistic),
        (">=", Op::Ge),
        ("<=", Op::Le),
        ("!=", Op::Ne),
        ("==", Op::Eq),
        ("=", Op::Eq),
        (">", Op::Gt),
        ("<", Op::Lt),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Pessimistic => "~>",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    pub op: Op,
    pub version: Version,
}

impl VersionConstraint {
    pub fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    pub fn matches(&self, version: &Version) -> bool {
        match self.op {
            Op::Eq => *version == self.version,
            Op::Ne => *version != self.version,
            Op::Lt => *version < self.version,
            Op::Le => *version <= self.version,
            Op::Gt => *version > self.version,
            Op::Ge => *version >= self.version,
            Op::Pessimistic => *version >= self.version && *version < self.version.bump(),
        }
    }
}

/// `>= 1.2`, `~>1.2.3`, `!= 2.0`; a bare version means `=`.
impl FromStr for VersionConstraint {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionError::InvalidConstraint(s.to_string()));
        }

        let (op, rest) = Op::TOKENS
            .iter()
            .find_map(|(token, op)| s.strip_prefix(*token).map(|rest| (*op, rest)))
            .unwrap_or((Op::Eq, s));

        Ok(Self::new(op, rest.trim().parse()?))
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.version)
    }
}

/// Comma-separated constraints that must all hold, e.g. `>= 1.2, < 2.0`.
/// An empty range includes every version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionRange {
    constraints: Vec<VersionConstraint>,
}

impl VersionRange {
    pub fn new(constraints: Vec<VersionConstraint>) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &[VersionConstraint] {
        &self.constraints
    }

    pub fn includes(&self, version: &Version) -> bool {
        self.constraints.iter().all(|constraint| constraint.matches(version))
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let constraints = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<VersionConstraint>)
            .collect::<Result<_, _>>()?;
        Ok(Self::new(constraints))
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, constraint) in self.constraints.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{constraint}")?;
        }
        Ok(())
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
