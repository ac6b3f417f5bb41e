//! Line-oriented importer.

use std::io::{self, BufRead};

use either::Either::{Left, Right};
use log::{debug, trace, warn};
use thiserror::Error;

use crate::{
    config::Config,
    key::TypeKey,
    line::RecordLine,
    record::Record,
    registry::{Registry, Resolution, Template},
    sans::{
        Decoder,
        cursor::LineCursor,
        discriminator::{self, Branch, Kind, Sequence},
        rules,
    },
    violation::Violation,
};

/// Errors ending an import.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A line which could not start a record. The importer skips it and
/// resumes with the next line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The line ends before a discriminator.
    #[error("Line {line} ends after {length} bytes, before address {required}.")]
    Truncated {
        line: usize,
        length: usize,
        required: u16,
    },
}

/// Details on a completed record.
#[derive(Debug, Clone)]
pub struct Report {
    /// Position of the record in the input, counting from 1.
    pub number: usize,
    /// Number of the record's first physical line, counting from 1.
    pub first_line: usize,
    /// Whether no template was registered for the record's key.
    pub generic: bool,
    /// Violations found under the importer's validation mode.
    pub violations: Vec<Violation>,
}

/// Receive completed records.
pub trait Observer {
    /// Called once per record, in input order.
    fn notice(&mut self, record: &Record, report: &Report);

    /// Called for each line that could not start a record.
    fn notice_failure(&mut self, _: &StreamError) {}
}

impl<F: FnMut(&Record, &Report)> Observer for F {
    fn notice(&mut self, record: &Record, report: &Report) {
        self(record, report)
    }
}

/// Determine the type key of a line, or `None` if the line is too short to
/// hold its kind and branch.
pub fn type_key(r: &[u8]) -> Option<TypeKey> {
    discriminate(r).ok()
}

fn discriminate(r: &[u8]) -> Result<TypeKey, u16> {
    let c = LineCursor::new(r);

    let kind_end = *rules::KIND.end();
    if !c.reaches(kind_end) {
        Err(kind_end)?;
    }

    let branch = match Decoder::advance(c.peek(Kind::ADDRESS)) {
        Left(state) => state,
        Right(key) => return Ok(key),
    };

    let branch_end = *rules::BRANCH.end();
    if !c.reaches(branch_end) {
        Err(branch_end)?;
    }

    let sub_branch = match branch.advance(c.peek(Branch::ADDRESS)) {
        Left(state) => state,
        Right(key) => return Ok(key),
    };

    let address = sub_branch.address();
    Ok(match sub_branch.advance(c.peek(address)) {
        Left(sequence) => sequence.advance(c.peek(Sequence::ADDRESS)),
        Right(key) => key,
    })
}

/// The line sequence number held by a line.
fn sequence_of(r: &[u8]) -> Option<u8> {
    let [b] = LineCursor::new(r).peek(Sequence::ADDRESS);
    discriminator::sequence(b)
}

struct Line {
    number: usize,
    bytes: Vec<u8>,
}

/// Import records from a reader of lines.
///
/// Each call to [`Importer::next_record`] (or [`Iterator::next`]) reads the
/// lines of one record: the first line's type key selects a template, and
/// following lines are added while they continue the record. Lines too
/// short to start a record are reported to the observer and skipped.
/// Stopping between records is always safe.
pub struct Importer<'a, R> {
    r: R,
    registry: &'a Registry,
    config: Config,
    observer: Option<&'a mut dyn Observer>,
    pending: Option<Line>,
    lines: usize,
    records: usize,
    failed: bool,
}

impl<'a, R: BufRead> Importer<'a, R> {
    pub fn new(r: R, registry: &'a Registry) -> Self {
        Self {
            r,
            registry,
            config: Config::default(),
            observer: None,
            pending: None,
            lines: 0,
            records: 0,
            failed: false,
        }
    }

    /// Apply a configuration to every imported field.
    pub fn with_config(self, config: Config) -> Self {
        Self { config, ..self }
    }

    /// Notify an observer of every record and skipped line.
    pub fn with_observer(self, observer: &'a mut dyn Observer) -> Self {
        Self {
            observer: Some(observer),
            ..self
        }
    }

    /// Number of records imported so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Import the next record, or `None` at the end of input.
    pub fn next_record(&mut self) -> Result<Option<Record>, Error> {
        loop {
            let Some(first) = self.fetch()? else {
                return Ok(None);
            };

            match discriminate(&first.bytes) {
                Ok(key) => return self.assemble(first, key).map(Some),
                Err(required) => {
                    let err = StreamError::Truncated {
                        line: first.number,
                        length: first.bytes.len(),
                        required,
                    };

                    warn!("{err}");

                    if let Some(o) = self.observer.as_deref_mut() {
                        o.notice_failure(&err);
                    }
                }
            }
        }
    }

    fn assemble(&mut self, first: Line, key: TypeKey) -> Result<Record, Error> {
        let Resolution {
            mut record,
            matched,
            template,
        } = self.registry.lookup(key, self.config);

        // The line sequence only names the record when its template does.
        let key = match matched {
            Some(matched) if matched.sequence().is_none() => key.without_sequence(),
            _ => key,
        };
        record.set_key(key);

        let generic = matched.is_none();
        let first_line = first.number;

        let mut pool = std::mem::take(record.lines_mut());
        let mut current = first;

        loop {
            let seq = sequence_of(&current.bytes);
            let mut line = self.select(&mut pool, seq, generic, record.lines().len());
            line.set_key(key);
            line.import(&current.bytes);

            trace!("Line {} is line {} of {key}.", current.number, line.seq());

            let last = line.seq();
            record.lines_mut().push(line);

            let complete = !generic
                && (record.lines().len() >= template.lines().len()
                    || Some(last) == template.last_seq());

            if complete {
                break;
            }

            match self.fetch()? {
                Some(next) if continues(&next, key, last, &template, generic) => current = next,
                Some(next) => {
                    self.pending = Some(next);
                    break;
                }
                None => break,
            }
        }

        self.records += 1;

        let report = Report {
            number: self.records,
            first_line,
            generic,
            violations: record.validate(self.config.validation_mode),
        };

        if generic {
            warn!("Line {first_line}: no template for {key}, generic layout used.");
        }
        debug!(
            "Record {} ({key}) from line {first_line}, {} lines, {} violations.",
            report.number,
            record.lines().len(),
            report.violations.len()
        );

        if let Some(o) = self.observer.as_deref_mut() {
            o.notice(&record, &report);
        }

        Ok(record)
    }

    /// Pick the layout for a line with a sequence number.
    fn select(
        &self,
        pool: &mut Vec<RecordLine>,
        seq: Option<u8>,
        generic: bool,
        read: usize,
    ) -> RecordLine {
        let position = match seq {
            _ if generic => None,
            Some(seq) => pool.iter().position(|l| l.seq() == seq),
            None => (!pool.is_empty()).then_some(0),
        };

        match position {
            Some(i) => pool.remove(i),
            None => {
                let seq = seq.unwrap_or((read + 1).min(u8::MAX as usize) as u8);
                Template::generic_line(seq).with_config(self.config)
            }
        }
    }

    /// Take the next non-blank line.
    fn fetch(&mut self) -> Result<Option<Line>, Error> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }

        loop {
            let mut bytes = vec![];
            if self.r.read_until(b'\n', &mut bytes)? == 0 {
                return Ok(None);
            }
            self.lines += 1;

            while let Some(b'\n' | b'\r') = bytes.last() {
                bytes.pop();
            }

            if bytes.iter().all(|b| matches!(b, b' ' | b'\t' | 0x1a)) {
                trace!("Skipping blank line {}.", self.lines);
                continue;
            }

            return Ok(Some(Line {
                number: self.lines,
                bytes,
            }));
        }
    }
}

/// Whether a line belongs to the record before it.
fn continues(next: &Line, key: TypeKey, last: u8, template: &Template, generic: bool) -> bool {
    if key == TypeKey::UNKNOWN {
        return false;
    }

    let Ok(next_key) = discriminate(&next.bytes) else {
        return false;
    };

    if !next_key.same_record(&key) {
        return false;
    }

    match sequence_of(&next.bytes) {
        Some(seq) if seq > last => generic || template.line(seq).is_some(),
        _ => false,
    }
}

impl<R: BufRead> Iterator for Importer<'_, R> {
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let next = self.next_record().transpose();
        if let Some(Err(_)) = next {
            self.failed = true;
        }
        next
    }
}
