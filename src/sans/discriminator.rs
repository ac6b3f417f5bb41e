//! States reading the discriminators of a line.

use either::Either::{self, Left, Right};
use log::trace;
use zerocopy::FromBytes;

use crate::key::TypeKey;

use super::rules::{self, Rule};

/// State token to decode the record kind.
#[derive(Debug)]
pub struct Kind;

impl Kind {
    /// Address of the bytes expected by [`Kind::advance`].
    pub const ADDRESS: u16 = *rules::KIND.start();

    /// Transition to another state by decoding the record kind.
    ///
    /// Kinds without a branch finish the key. Content which is not a kind
    /// finishes with [`TypeKey::UNKNOWN`].
    pub fn advance(r: [u8; 4]) -> Either<Branch, TypeKey> {
        let Some(kind) = digits(&r) else {
            trace!("No record kind in {r:?}.");
            return Right(TypeKey::UNKNOWN);
        };

        let key = TypeKey::new(kind);
        trace!("Read kind {key}.");

        if rules::has_branch(kind) {
            Left(Branch(key))
        } else {
            Right(key)
        }
    }
}

/// State token to decode the branch.
#[derive(Debug)]
pub struct Branch(TypeKey);

#[repr(C, packed)]
#[derive(FromBytes)]
struct Header {
    _insurer: [u8; 5],
    _bundling: u8,
    branch: [u8; 3],
}

impl Branch {
    /// Address of the bytes expected by [`Branch::advance`]: the insurer
    /// number and bundling flag preceding the branch.
    pub const ADDRESS: u16 = 5;

    /// Transition to another state by decoding the branch.
    ///
    /// A blank or zero branch finishes the key with the kind only.
    pub fn advance(self, r: [u8; 9]) -> Either<SubBranch, TypeKey> {
        let Header { branch, .. } = zerocopy::transmute!(r);

        let Some(branch) = digits(&branch).filter(|b| *b != 0) else {
            return Right(self.0);
        };

        let key = self.0.with_branch(branch);
        trace!("Read branch {key}.");

        match rules::find(key.kind(), branch) {
            Some(rule) => Left(SubBranch { key, rule }),
            None => Right(key),
        }
    }
}

/// State token to decode a sub-branch.
#[derive(Debug)]
pub struct SubBranch {
    key: TypeKey,
    rule: &'static Rule,
}

impl SubBranch {
    /// Address of the byte expected by [`SubBranch::advance`].
    pub fn address(&self) -> u16 {
        self.rule.address
    }

    /// Transition to another state by decoding the sub-branch.
    ///
    /// A blank sub-branch finishes the key without one.
    pub fn advance(self, r: [u8; 1]) -> Either<Sequence, TypeKey> {
        let Some(sub_branch) = self.rule.sub_branch(r[0]) else {
            return Right(self.key);
        };

        let key = self.key.with_sub_branch(sub_branch);
        trace!("Read sub-branch {key}.");

        if self.rule.sequenced {
            Left(Sequence(key))
        } else {
            Right(key)
        }
    }
}

/// State token to decode the line sequence number.
#[derive(Debug)]
pub struct Sequence(TypeKey);

impl Sequence {
    /// Address of the byte expected by [`Sequence::advance`].
    pub const ADDRESS: u16 = rules::SEQUENCE;

    /// Finish the key with the line sequence number, if present.
    pub fn advance(self, r: [u8; 1]) -> TypeKey {
        match sequence(r[0]) {
            Some(seq) => self.0.with_sequence(seq),
            None => self.0,
        }
    }
}

/// Parse a line sequence number byte. Blanks and non-digits have none.
pub fn sequence(b: u8) -> Option<u8> {
    b.is_ascii_digit().then(|| b - b'0')
}

fn digits(r: &[u8]) -> Option<u16> {
    if r.is_empty() || !r.iter().all(u8::is_ascii_digit) {
        return None;
    }

    Some(r.iter().fold(0, |n, b| n * 10 + (b - b'0') as u16))
}
