use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("empty version")]
    Empty,
    #[error("invalid version component '{0}'")]
    InvalidComponent(String),
    #[error("invalid pre-release tag '{0}'")]
    InvalidPreRelease(String),
    #[error("invalid constraint '{0}'")]
    InvalidConstraint(String),
}

/// Pre-release tag such as `rc1`, `beta.2` or `alpha`, ordered by label
/// then number, a missing number sorting first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    pub label: String,
    pub number: Option<u64>,
}

impl FromStr for PreRelease {
    type Err = VersionError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::InvalidPreRelease(tag.to_string());

        let tag = tag.trim_start_matches(['.', '-', '_']);
        let split = tag
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(tag.len());
        let (label, rest) = tag.split_at(split);
        let rest = rest.trim_start_matches(['.', '-', '_']);

        let number = match rest {
            "" => None,
            digits => Some(digits.parse().map_err(|_| invalid())?),
        };
        if label.is_empty() && number.is_none() {
            return Err(invalid());
        }

        Ok(Self {
            label: label.to_ascii_lowercase(),
            number,
        })
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)?;
        if let Some(number) = self.number {
            write!(f, "{number}")?;
        }
        Ok(())
    }
}

/// A dotted version number with an optional pre-release tag.
///
/// Accepts `1`, `1.2`, `1.2.3`, `v1.2.3`, `1.2.3-rc1`, `1.2.3.beta2` and
/// `1.2.3rc1`. Missing trailing components compare as zero, so `1.2` and
/// `1.2.0` are equal, and a pre-release sorts before its release.
#[derive(Debug, Clone)]
pub struct Version {
    numbers: Vec<u64>,
    pre: Option<PreRelease>,
}

impl Version {
    pub fn new(numbers: Vec<u64>) -> Self {
        Self { numbers, pre: None }
    }

    pub fn with_pre(mut self, pre: PreRelease) -> Self {
        self.pre = Some(pre);
        self
    }

    pub fn numbers(&self) -> &[u64] {
        &self.numbers
    }

    pub fn pre(&self) -> Option<&PreRelease> {
        self.pre.as_ref()
    }

    pub fn major(&self) -> u64 {
        self.component(0)
    }

    pub fn minor(&self) -> u64 {
        self.component(1)
    }

    pub fn patch(&self) -> u64 {
        self.component(2)
    }

    fn component(&self, index: usize) -> u64 {
        self.numbers.get(index).copied().unwrap_or(0)
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }

    /// Upper bound of `~>`: drop the last component and increment the new
    /// last one (`1.2.3` → `1.3`, `1.2` → `2`). A single component is
    /// incremented in place.
    pub fn bump(&self) -> Self {
        let mut numbers = self.numbers.clone();
        if numbers.len() > 1 {
            numbers.pop();
        }
        if let Some(last) = numbers.last_mut() {
            *last = last.saturating_add(1);
        }
        Self::new(numbers)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix(['v', 'V']).unwrap_or(s);
        if s.is_empty() {
            return Err(VersionError::Empty);
        }

        let (release, mut tag) = match s.split_once('-') {
            Some((release, tag)) => (release, Some(tag.to_string())),
            None => (s, None),
        };

        let parts: Vec<&str> = release.split('.').collect();
        let mut numbers = Vec::with_capacity(parts.len());

        for (index, part) in parts.iter().enumerate() {
            let digits = part.find(|c: char| !c.is_ascii_digit()).unwrap_or(part.len());
            let invalid = || VersionError::InvalidComponent(part.to_string());

            if part.is_empty() {
                return Err(invalid());
            }
            if digits == 0 {
                // `1.2.3.beta2`: the rest of the release is the tag.
                if numbers.is_empty() || tag.is_some() {
                    return Err(invalid());
                }
                tag = Some(parts[index..].join("."));
                break;
            }

            numbers.push(part[..digits].parse().map_err(|_| invalid())?);

            if digits < part.len() {
                // `1.2.3rc1`
                if tag.is_some() {
                    return Err(invalid());
                }
                let mut rest = vec![&part[digits..]];
                rest.extend(&parts[index + 1..]);
                tag = Some(rest.join("."));
                break;
            }
        }

        let pre = tag.map(|tag| tag.parse::<PreRelease>()).transpose()?;
        Ok(Self { numbers, pre })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.numbers.len().max(other.numbers.len());
        for index in 0..len {
            match self.component(index).cmp(&other.component(index)) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }

        match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, number) in self.numbers.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            write!(f, "{number}")?;
        }
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn parses_forms() {
        assert_eq!(v("1").numbers(), &[1]);
        assert_eq!(v("1.2.3").numbers(), &[1, 2, 3]);
        assert_eq!(v("v2.0").numbers(), &[2, 0]);

        let rc = v("1.2.3-rc1");
        assert_eq!(rc.numbers(), &[1, 2, 3]);
        assert_eq!(rc.pre(), Some(&PreRelease { label: "rc".into(), number: Some(1) }));

        assert_eq!(v("1.2.3.beta2").pre().unwrap().label, "beta");
        assert_eq!(v("1.2.3rc1").pre().unwrap().number, Some(1));
        assert_eq!(v("1.0-alpha").pre().unwrap().number, None);
    }

    #[test]
    fn accessors() {
        let version = v("4.5");
        assert_eq!((version.major(), version.minor(), version.patch()), (4, 5, 0));
        assert!(!version.is_prerelease());
        assert!(v("4.5-pre").is_prerelease());
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!("".parse::<Version>(), Err(VersionError::Empty));
        assert_eq!("v".parse::<Version>(), Err(VersionError::Empty));
        assert!("beta".parse::<Version>().is_err());
        assert!("1..2".parse::<Version>().is_err());
        assert!("1.2-rc!".parse::<Version>().is_err());
    }

    #[test]
    fn missing_components_are_zero() {
        assert_eq!(v("1.2"), v("1.2.0"));
        assert_eq!(v("1"), v("1.0.0.0"));
        assert!(v("1.2.1") > v("1.2"));
    }

    #[test]
    fn numeric_ordering() {
        assert!(v("1.10") > v("1.9"));
        assert!(v("2.0") > v("1.99.99"));
        assert!(v("0.0.1") < v("0.1"));
    }

    #[test]
    fn prerelease_ordering() {
        assert!(v("1.0-rc1") < v("1.0"));
        assert!(v("1.0-alpha") < v("1.0-beta"));
        assert!(v("1.0-beta") < v("1.0-beta1"));
        assert!(v("1.0-beta2") < v("1.0-beta10"));
        assert!(v("1.0-rc1") > v("0.9"));
        assert_eq!(v("1.0.RC.1"), v("1.0-rc1"));
    }

    #[test]
    fn sorting() {
        let mut versions: Vec<Version> = ["1.10", "1.2", "1.2-rc1", "v0.9", "1.2.1"]
            .iter()
            .map(|s| v(s))
            .collect();
        versions.sort();
        let sorted: Vec<String> = versions.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, vec!["0.9", "1.2-rc1", "1.2", "1.2.1", "1.10"]);
    }

    #[test]
    fn bump() {
        assert_eq!(v("1.2.3").bump().to_string(), "1.3");
        assert_eq!(v("1.2").bump().to_string(), "2");
        assert_eq!(v("1").bump().to_string(), "2");
    }
}
