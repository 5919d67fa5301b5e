//! Trace file frontend: parses Format A / Format B trace lines and drives
//! a one-attempt-per-tick loop against an [`Engine`](crate::engine::Engine).

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::ConfigError;
use crate::request::{Op, Request};

/// One parsed trace record, not yet translated.
#[derive(Debug, Clone)]
struct TraceEntry {
    op: Op,
    addr: u64,
    source_id: usize,
    cycle: Option<u64>,
}

/// Eagerly loaded trace, replayed one record per [`Trace::step`] call.
pub struct Trace {
    entries: Vec<TraceEntry>,
    cursor: usize,
}

impl Trace {
    /// Loads and parses every line of `path`. Detects Format A (3 tokens)
    /// vs Format B (4 tokens) per line; a file may not mix formats across
    /// lines with a differing token count without raising an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingTraceFile(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::UnreadableTraceFile(path.to_path_buf(), e))?;

        let mut entries = Vec::new();
        for (idx, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let entry = parse_line(line, idx + 1, path)?;
            entries.push(entry);
        }

        Ok(Trace { entries, cursor: 0 })
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds the `Request` for the current trace record without
    /// advancing the cursor. The caller advances via [`Trace::advance`]
    /// only once the attempt has succeeded.
    pub fn current(&self) -> Option<Request> {
        self.entries.get(self.cursor).map(|e| match e.cycle {
            Some(cycle) => Request::with_cycle(e.addr, e.op, e.source_id, cycle),
            None => Request::new(e.addr, e.op, e.source_id),
        })
    }

    pub fn advance(&mut self) {
        debug!("trace cursor advancing past {}", self.cursor);
        self.cursor += 1;
    }
}

fn parse_line(line: &str, line_no: usize, path: &Path) -> Result<TraceEntry, ConfigError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let malformed = || ConfigError::MalformedTraceLine {
        path: path_buf(path),
        line: line_no,
        raw: line.to_string(),
    };

    match tokens.as_slice() {
        [op, addr, source_id] => {
            let op = parse_op(op).ok_or_else(malformed)?;
            let addr = parse_addr(addr).ok_or_else(malformed)?;
            let source_id = source_id.parse::<usize>().map_err(|_| malformed())?;
            Ok(TraceEntry { op, addr, source_id, cycle: None })
        }
        [cycle, op, addr, source_id] => {
            let cycle = cycle.parse::<u64>().map_err(|_| malformed())?;
            let op = parse_op(op).ok_or_else(malformed)?;
            let addr = parse_addr(addr).ok_or_else(malformed)?;
            let source_id = source_id.parse::<usize>().map_err(|_| malformed())?;
            Ok(TraceEntry { op, addr, source_id, cycle: Some(cycle) })
        }
        _ => Err(malformed()),
    }
}

fn parse_op(tok: &str) -> Option<Op> {
    match tok {
        "R" => Some(Op::Read),
        "W" => Some(Op::Write),
        _ => None,
    }
}

fn parse_addr(tok: &str) -> Option<u64> {
    tok.parse::<i64>().ok().map(|signed| signed as u64)
}

fn path_buf(path: &Path) -> PathBuf {
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct TempTraceFile(PathBuf);

    impl TempTraceFile {
        fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for TempTraceFile {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    fn write_trace(contents: &str) -> TempTraceFile {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "dram_migration_core_trace_test_{}_{}.txt",
            std::process::id(),
            n
        ));
        fs::write(&path, contents).unwrap();
        TempTraceFile(path)
    }

    #[test]
    fn parses_format_a() {
        let f = write_trace("R 4096 0\nW 8192 1\n");
        let trace = Trace::load(f.path()).unwrap();
        assert_eq!(trace.len(), 2);
        let first = trace.current().unwrap();
        assert_eq!(first.addr, 4096);
        assert_eq!(first.op, Op::Read);
        assert_eq!(first.cycle, None);
    }

    #[test]
    fn parses_format_b() {
        let f = write_trace("10 R 4096 0\n20 W 8192 1\n");
        let trace = Trace::load(f.path()).unwrap();
        let first = trace.current().unwrap();
        assert_eq!(first.cycle, Some(10));
        assert_eq!(first.addr, 4096);
    }

    #[test]
    fn malformed_line_names_its_number() {
        let f = write_trace("R 4096 0\nbogus line here\n");
        let err = Trace::load(f.path()).unwrap_err();
        match err {
            ConfigError::MalformedTraceLine { line, .. } => assert_eq!(line, 2),
            other => panic!("expected MalformedTraceLine, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_reported() {
        let err = Trace::load(Path::new("/nonexistent/trace/path.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingTraceFile(_)));
    }

    #[test]
    fn negative_decimal_address_reinterpreted_unsigned() {
        let f = write_trace("R -1 0\n");
        let trace = Trace::load(f.path()).unwrap();
        let req = trace.current().unwrap();
        assert_eq!(req.addr, u64::MAX);
    }

    #[test]
    fn advance_moves_cursor_and_is_finished() {
        let f = write_trace("R 4096 0\n");
        let mut trace = Trace::load(f.path()).unwrap();
        assert!(!trace.is_finished());
        trace.advance();
        assert!(trace.is_finished());
    }
}
