//! The per-request value threaded through translate → decode → dispatch.

/// Kind of memory operation carried by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read,
    Write,
    Other,
}

/// A single memory request as it flows through the engine.
#[derive(Debug, Clone)]
pub struct Request {
    /// Virtual address as supplied by the trace, preserved across translation.
    pub v_addr: u64,
    /// Mutable address field: virtual before translation, physical after.
    pub addr: u64,
    pub op: Op,
    pub source_id: usize,
    /// Virtual page number, populated by the translator.
    pub vpage: u64,
    /// Hierarchy coordinate, one entry per DRAM level, populated by the
    /// decoder. Entries default to -1 until decoded.
    pub addr_vec: Vec<i64>,
    /// Clock cycle the request was issued at, present only for Format B
    /// traces. Inert with respect to translation/migration semantics.
    pub cycle: Option<u64>,
}

impl Request {
    pub fn new(addr: u64, op: Op, source_id: usize) -> Self {
        Request {
            v_addr: addr,
            addr,
            op,
            source_id,
            vpage: 0,
            addr_vec: Vec::new(),
            cycle: None,
        }
    }

    pub fn with_cycle(addr: u64, op: Op, source_id: usize, cycle: u64) -> Self {
        let mut req = Self::new(addr, op, source_id);
        req.cycle = Some(cycle);
        req
    }
}
