//! Single-pass execution traces and the sectioned trace-set file.
//!
//! ```text
//! [TestCaseCount : 2]
//! [SuccessCount : 1]
//! [FailCount : 1]
//! [InstrumentLevel : statement]
//! [TestCase : success]
//! 0, 1, 2, 1, 2, 3
//! [TestCase : fail]
//! 0, 1, 4
//! ```
//!
//! The header is exactly four bracketed lines; each record is a bracketed
//! verdict line followed by one line of node ids (separated by `,` and/or
//! whitespace).

use crate::sections::parse_bracketed;
use crate::{NodeId, TraceError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

pub const TEST_CASE_COUNT: &str = "TestCaseCount";
pub const SUCCESS_COUNT: &str = "SuccessCount";
pub const FAIL_COUNT: &str = "FailCount";
pub const INSTRUMENT_LEVEL: &str = "InstrumentLevel";
pub const TEST_CASE: &str = "TestCase";
pub const VERDICT_SUCCESS: &str = "success";
pub const VERDICT_FAIL: &str = "fail";

const HEADER_LINES: usize = 4;

// ============================================================================
// Trace
// ============================================================================

/// One execution trace: a verdict plus a forward-only node sequence.
///
/// The node line is parsed lazily by `nodes()`, which can be called once;
/// later calls yield an empty sequence.
#[derive(Debug)]
pub struct Trace {
    is_successful: bool,
    pending: Option<String>,
}

impl Trace {
    pub fn new(is_successful: bool, node_line: impl Into<String>) -> Self {
        Self {
            is_successful,
            pending: Some(node_line.into()),
        }
    }

    pub fn from_nodes(is_successful: bool, nodes: &[NodeId]) -> Self {
        Self::new(is_successful, join_nodes(nodes))
    }

    pub fn is_successful(&self) -> bool {
        self.is_successful
    }

    /// Whether `nodes()` has already handed out the sequence.
    pub fn is_consumed(&self) -> bool {
        self.pending.is_none()
    }

    pub fn nodes(&mut self) -> TraceNodes {
        TraceNodes {
            line: self.pending.take().unwrap_or_default(),
            pos: 0,
        }
    }
}

/// Iterator over the node ids of one trace.
#[derive(Debug)]
pub struct TraceNodes {
    line: String,
    pos: usize,
}

fn is_separator(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

impl Iterator for TraceNodes {
    type Item = Result<NodeId, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.line[self.pos..];
        let start = rest.find(|c: char| !is_separator(c))?;
        let token = &rest[start..];
        let len = token.find(is_separator).unwrap_or(token.len());
        let token = &token[..len];
        self.pos += start + len;
        Some(
            token
                .parse::<NodeId>()
                .map_err(|_| TraceError::InvalidNode {
                    token: token.to_string(),
                }),
        )
    }
}

fn join_nodes(nodes: &[NodeId]) -> String {
    nodes
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// TraceSet
// ============================================================================

/// Header counters of a trace-set file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSetHeader {
    pub count: usize,
    pub success_count: usize,
    pub fail_count: usize,
    pub instrument_level: String,
}

/// Ordered, single-pass sequence of traces read from a trace-set file.
///
/// Yields exactly `header().count` traces and then releases the reader.
/// The first error also ends the iteration.
pub struct TraceSet<R> {
    header: TraceSetHeader,
    reader: Option<R>,
    remaining: usize,
    line_no: usize,
}

impl TraceSet<BufReader<File>> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: BufRead> TraceSet<R> {
    pub fn from_reader(reader: R) -> Result<Self, TraceError> {
        let mut set = Self {
            header: TraceSetHeader::default(),
            reader: Some(reader),
            remaining: 0,
            line_no: 0,
        };

        for _ in 0..HEADER_LINES {
            let Some(line) = set.read_line()? else {
                return Err(TraceError::Header {
                    line: set.line_no + 1,
                    message: "unexpected end of input".to_string(),
                });
            };
            let Some((key, value)) = parse_bracketed(&line) else {
                return Err(TraceError::Header {
                    line: set.line_no,
                    message: format!("expected `[Key : Value]`, got `{}`", line.trim()),
                });
            };
            match key {
                TEST_CASE_COUNT => set.header.count = parse_count(key, value)?,
                SUCCESS_COUNT => set.header.success_count = parse_count(key, value)?,
                FAIL_COUNT => set.header.fail_count = parse_count(key, value)?,
                INSTRUMENT_LEVEL => set.header.instrument_level = value.to_string(),
                _ => {}
            }
        }

        set.remaining = set.header.count;
        Ok(set)
    }

    pub fn header(&self) -> &TraceSetHeader {
        &self.header
    }

    /// Declared number of test cases.
    pub fn test_case_count(&self) -> usize {
        self.header.count
    }

    pub fn success_count(&self) -> usize {
        self.header.success_count
    }

    pub fn fail_count(&self) -> usize {
        self.header.fail_count
    }

    pub fn instrument_level(&self) -> &str {
        &self.header.instrument_level
    }

    fn read_line(&mut self) -> Result<Option<String>, TraceError> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        let mut buf = String::new();
        if reader.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let trimmed = buf.trim_end_matches(['\n', '\r']).len();
        buf.truncate(trimmed);
        Ok(Some(buf))
    }

    fn read_record(&mut self) -> Result<Trace, TraceError> {
        let verdict_line = loop {
            match self.read_line()? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line,
                None => {
                    return Err(TraceError::Record {
                        line: self.line_no + 1,
                        message: format!("expected {} more test case(s)", self.remaining),
                    })
                }
            }
        };

        let Some((key, value)) = parse_bracketed(&verdict_line) else {
            return Err(TraceError::Record {
                line: self.line_no,
                message: format!("expected `[{TEST_CASE} : ...]`, got `{}`", verdict_line.trim()),
            });
        };
        if key != TEST_CASE {
            return Err(TraceError::Record {
                line: self.line_no,
                message: format!("expected section `{TEST_CASE}`, got `{key}`"),
            });
        }
        let is_successful = match value {
            VERDICT_SUCCESS => true,
            VERDICT_FAIL => false,
            other => return Err(TraceError::InvalidVerdict(other.to_string())),
        };

        let Some(node_line) = self.read_line()? else {
            return Err(TraceError::Record {
                line: self.line_no + 1,
                message: "test case is missing its node line".to_string(),
            });
        };
        Ok(Trace::new(is_successful, node_line))
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize, TraceError> {
    value.parse().map_err(|_| TraceError::InvalidCount {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl<R: BufRead> Iterator for TraceSet<R> {
    type Item = Result<Trace, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            self.reader = None;
            return None;
        }
        self.reader.as_ref()?;
        match self.read_record() {
            Ok(trace) => {
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.reader = None;
                }
                Some(Ok(trace))
            }
            Err(err) => {
                self.remaining = 0;
                self.reader = None;
                Some(Err(err))
            }
        }
    }
}

// ============================================================================
// Writer
// ============================================================================

/// A fully materialized trace, used when producing trace-set files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedTrace {
    pub is_successful: bool,
    pub nodes: Vec<NodeId>,
}

impl RecordedTrace {
    pub fn new(is_successful: bool, nodes: Vec<NodeId>) -> Self {
        Self {
            is_successful,
            nodes,
        }
    }
}

/// Writes the trace-set format read by `TraceSet`.
pub struct TraceSetWriter<W> {
    out: W,
}

impl<W: Write> TraceSetWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write the header (derived from the verdicts) and every record.
    pub fn write_all(mut self, instrument_level: &str, traces: &[RecordedTrace]) -> Result<W, TraceError> {
        let successes = traces.iter().filter(|t| t.is_successful).count();
        writeln!(self.out, "[{TEST_CASE_COUNT} : {}]", traces.len())?;
        writeln!(self.out, "[{SUCCESS_COUNT} : {successes}]")?;
        writeln!(self.out, "[{FAIL_COUNT} : {}]", traces.len() - successes)?;
        writeln!(self.out, "[{INSTRUMENT_LEVEL} : {instrument_level}]")?;
        for trace in traces {
            let verdict = if trace.is_successful {
                VERDICT_SUCCESS
            } else {
                VERDICT_FAIL
            };
            writeln!(self.out, "[{TEST_CASE} : {verdict}]")?;
            writeln!(self.out, "{}", join_nodes(&trace.nodes))?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[TestCaseCount : 3]
[SuccessCount : 2]
[FailCount : 1]
[InstrumentLevel : statement]
[TestCase : success]
0, 1, 2, 1, 2, 3
[TestCase : fail]
0 1 4
[TestCase : success]

";

    fn collect(trace: &mut Trace) -> Vec<NodeId> {
        trace.nodes().collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn header_sections_are_parsed() {
        let set = TraceSet::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(set.test_case_count(), 3);
        assert_eq!(set.success_count(), 2);
        assert_eq!(set.fail_count(), 1);
        assert_eq!(set.instrument_level(), "statement");
    }

    #[test]
    fn traces_are_yielded_in_file_order() {
        let set = TraceSet::from_reader(SAMPLE.as_bytes()).unwrap();
        let mut traces: Vec<Trace> = set.collect::<Result<_, _>>().unwrap();
        assert_eq!(traces.len(), 3);
        assert!(traces[0].is_successful());
        assert!(!traces[1].is_successful());
        assert_eq!(collect(&mut traces[0]), vec![0, 1, 2, 1, 2, 3]);
        assert_eq!(collect(&mut traces[1]), vec![0, 1, 4]);
        assert!(collect(&mut traces[2]).is_empty());
    }

    #[test]
    fn trace_set_is_single_pass() {
        let mut set = TraceSet::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(set.by_ref().count(), 3);
        assert!(set.next().is_none());
    }

    #[test]
    fn trace_nodes_are_single_pass() {
        let mut trace = Trace::from_nodes(true, &[4, 5, 6]);
        assert!(!trace.is_consumed());
        assert_eq!(collect(&mut trace), vec![4, 5, 6]);
        assert!(trace.is_consumed());
        assert!(collect(&mut trace).is_empty());
    }

    #[test]
    fn invalid_node_token_is_an_error() {
        let mut trace = Trace::new(false, "1, 2, x3");
        let nodes: Result<Vec<_>, _> = trace.nodes().collect();
        assert!(matches!(nodes, Err(TraceError::InvalidNode { token }) if token == "x3"));
    }

    #[test]
    fn truncated_file_is_an_error() {
        let text = "[TestCaseCount : 2]\n[SuccessCount : 1]\n[FailCount : 1]\n[InstrumentLevel : s]\n[TestCase : fail]\n1, 2\n";
        let results: Vec<_> = TraceSet::from_reader(text.as_bytes()).unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(TraceError::Record { .. })));
    }

    #[test]
    fn bad_header_and_verdict_are_errors() {
        let missing = "[TestCaseCount : 1]\n[SuccessCount : 1]\n";
        assert!(matches!(
            TraceSet::from_reader(missing.as_bytes()),
            Err(TraceError::Header { .. })
        ));

        let bad_count = "[TestCaseCount : many]\n[SuccessCount : 1]\n[FailCount : 0]\n[InstrumentLevel : s]\n";
        assert!(matches!(
            TraceSet::from_reader(bad_count.as_bytes()),
            Err(TraceError::InvalidCount { .. })
        ));

        let verdict = "[TestCaseCount : 1]\n[SuccessCount : 1]\n[FailCount : 0]\n[InstrumentLevel : s]\n[TestCase : maybe]\n1\n";
        let mut set = TraceSet::from_reader(verdict.as_bytes()).unwrap();
        assert!(matches!(set.next(), Some(Err(TraceError::InvalidVerdict(v))) if v == "maybe"));
        assert!(set.next().is_none());
    }

    #[test]
    fn writer_output_reads_back() {
        let traces = vec![
            RecordedTrace::new(true, vec![0, 1, 2]),
            RecordedTrace::new(false, vec![0, 3]),
            RecordedTrace::new(false, vec![]),
        ];
        let bytes = TraceSetWriter::new(Vec::new())
            .write_all("statement", &traces)
            .unwrap();

        let set = TraceSet::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(set.success_count(), 1);
        assert_eq!(set.fail_count(), 2);
        let read: Vec<RecordedTrace> = set
            .map(|t| {
                let mut t = t.unwrap();
                RecordedTrace::new(t.is_successful(), collect(&mut t))
            })
            .collect();
        assert_eq!(read, traces);
    }
}
