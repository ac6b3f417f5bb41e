//! Positions of discriminators, and which kinds and branches carry them.

use core::ops::RangeInclusive;

/// Bytes holding the record kind (Satzart).
pub const KIND: RangeInclusive<u16> = 1..=4;

/// Bytes holding the branch (Sparte).
pub const BRANCH: RangeInclusive<u16> = 11..=13;

/// Byte holding the line sequence number (Satznummer).
pub const SEQUENCE: u16 = 256;

/// Kinds without a branch: the header (Vorsatz) and trailer (Nachsatz).
pub const UNBRANCHED: [u16; 2] = [1, 9999];

/// Whether lines of a kind carry a branch.
pub fn has_branch(kind: u16) -> bool {
    !UNBRANCHED.contains(&kind)
}

/// A deeper discriminator for some kinds of one branch.
#[derive(Debug, PartialEq, Eq)]
pub struct Rule {
    pub kinds: RangeInclusive<u16>,
    pub branch: u16,
    /// Address of the single sub-branch byte.
    pub address: u16,
    /// Whether the line sequence number follows the sub-branch.
    pub sequenced: bool,
    /// Bytes mapping to a shared sub-branch value. Other digits map to
    /// themselves.
    pub aliases: &'static [(u8, u16)],
}

/// All known rules. Combinations not listed carry no deeper discriminator.
pub static RULES: &[Rule] = &[
    // Life: Wagnisart, then Satznummer.
    Rule {
        kinds: 220..=221,
        branch: 10,
        address: 60,
        sequenced: true,
        aliases: &[(b'1', 13), (b'3', 13), (b'4', 48), (b'8', 48)],
    },
    // Health: Krankenfolgenummer.
    Rule {
        kinds: 220..=220,
        branch: 20,
        address: 48,
        sequenced: false,
        aliases: &[],
    },
    // Building savings: Bausparart.
    Rule {
        kinds: 220..=220,
        branch: 580,
        address: 44,
        sequenced: false,
        aliases: &[],
    },
];

/// Find the rule for a kind and branch.
pub fn find(kind: u16, branch: u16) -> Option<&'static Rule> {
    RULES
        .iter()
        .find(|r| r.branch == branch && r.kinds.contains(&kind))
}

impl Rule {
    /// Map a sub-branch byte to its value. Blanks and non-digits have none.
    pub fn sub_branch(&self, b: u8) -> Option<u16> {
        if let Some((_, value)) = self.aliases.iter().find(|(a, _)| *a == b) {
            return Some(*value);
        }

        b.is_ascii_digit().then(|| (b - b'0') as u16)
    }

    /// The byte written for a sub-branch value.
    pub fn byte(&self, sub_branch: u16) -> Option<u8> {
        if let Some((b, _)) = self.aliases.iter().find(|(_, v)| *v == sub_branch) {
            return Some(*b);
        }

        (sub_branch < 10).then(|| b'0' + sub_branch as u8)
    }
}
