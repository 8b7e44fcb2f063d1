// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Input that does not match `v<major>.<minor>` with two non-negative
/// decimal integers. Carries the offending text verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedVersionTag(pub String);

impl Display for MalformedVersionTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "malformed version tag {:?}: expected v<major>.<minor> with non-negative integers",
            self.0
        )
    }
}

impl std::error::Error for MalformedVersionTag {}

/// Minor component is already at its maximum; no further tag can be issued
/// on this major line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagOverflow(pub Tag);

impl Display for TagOverflow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "version tag {} has exhausted its minor component", self.0)
    }
}

impl std::error::Error for TagOverflow {}

/// Artifact version of the form `v<major>.<minor>`.
///
/// Ordering is (major, minor), so `v2.10 > v2.9 > v2.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    pub major: u64,
    pub minor: u64,
}

impl Tag {
    #[must_use]
    pub const fn new(major: u64, minor: u64) -> Self {
        Self { major, minor }
    }

    pub fn parse(input: &str) -> Result<Self, MalformedVersionTag> {
        let malformed = || MalformedVersionTag(input.to_string());
        let rest = input.strip_prefix('v').ok_or_else(malformed)?;
        let (major, minor) = rest.split_once('.').ok_or_else(malformed)?;
        if minor.contains('.') {
            return Err(malformed());
        }
        Ok(Self {
            major: parse_component(major).ok_or_else(malformed)?,
            minor: parse_component(minor).ok_or_else(malformed)?,
        })
    }

    /// The bump rule: minor + 1, major untouched. Never rolls minor over
    /// into a major increment; minor grows until `u64::MAX`, past which
    /// the bump is refused instead of wrapping.
    pub const fn next(self) -> Result<Self, TagOverflow> {
        match self.minor.checked_add(1) {
            Some(minor) => Ok(Self {
                major: self.major,
                minor,
            }),
            None => Err(TagOverflow(self)),
        }
    }
}

/// Strict decimal parse: rejects empty strings, signs, whitespace, and
/// anything else `u64::from_str` would otherwise tolerate around digits.
fn parse_component(s: &str) -> Option<u64> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse::<u64>().ok()
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

impl FromStr for Tag {
    type Err = MalformedVersionTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Highest tag in a candidate list, e.g. from a registry tag listing.
/// Returns `None` when the list is empty.
#[must_use]
pub fn highest_tag(tags: &[Tag]) -> Option<Tag> {
    tags.iter().copied().max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_examples_from_the_contract() {
        for (input, expected) in [("v1.0", "v1.1"), ("v2.9", "v2.10"), ("v0.0", "v0.1")] {
            let next = Tag::parse(input).expect("tag").next().expect("bump");
            assert_eq!(next.to_string(), expected);
        }
    }

    #[test]
    fn minor_never_carries_into_major() {
        let t = Tag::new(3, u32::MAX as u64).next().expect("bump");
        assert_eq!(t.major, 3);
        assert_eq!(t.minor, u32::MAX as u64 + 1);
    }

    #[test]
    fn exhausted_minor_is_refused_not_wrapped() {
        let ceiling = Tag::new(0, u64::MAX);
        assert_eq!(ceiling.next(), Err(TagOverflow(ceiling)));
        // A parseable tag at the ceiling hits the same refusal.
        let parsed = Tag::parse("v0.18446744073709551615").expect("tag");
        assert!(parsed.next().is_err());
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        for bad in [
            "", "v", "v1", "1.0", "v1.", "v.1", "v1.0.0", "va.b", "v-1.0", "v1.-2", "v 1.0",
            "v1. 0", "v1,0", "V1.0", "v1.0 ",
        ] {
            let err = Tag::parse(bad).expect_err(bad);
            assert_eq!(err, MalformedVersionTag(bad.to_string()));
        }
    }

    #[test]
    fn ordering_is_numeric_not_lexicographic() {
        let v2_9 = Tag::parse("v2.9").expect("tag");
        let v2_10 = Tag::parse("v2.10").expect("tag");
        assert!(v2_10 > v2_9);
        assert_eq!(highest_tag(&[v2_9, v2_10, Tag::new(1, 99)]), Some(v2_10));
        assert_eq!(highest_tag(&[]), None);
    }
}
