//! Ordered intermediate representation the emitter renders into script text.

use serde::{Deserialize, Serialize};

/// Where a `Parse` block reads its input from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseSource {
    Body,
    Header,
    Cookie,
}

/// How a `Parse` block extracts its output from the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMethod {
    CssAttr { selector: String, attribute: String },
    Regex { pattern: String },
    JsonPath { path: String },
}

/// Terminal status a `Mark` block records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkStatus {
    Success,
    Failure,
    Ban,
    Error,
}

/// One retry/catch branch of a `Try` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchBranch {
    /// Human-readable condition the emitter renders as `CATCH IF cond`.
    pub cond: String,
    pub ir: Vec<BlockIR>,
}

/// A single header to attach to a `Request` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderSpec {
    pub name: String,
    pub value: String,
}

/// A single cookie to attach to a `Request` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieSpec {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
}

/// The ordered, typed block sequence the builder produces and the emitter consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BlockIR {
    Request {
        method: String,
        url: String,
        headers: Vec<HeaderSpec>,
        cookies: Vec<CookieSpec>,
        content_type: Option<String>,
        body_template: Option<String>,
    },
    Parse {
        source: ParseSource,
        method: ParseMethod,
        output_var: String,
    },
    SetVariable {
        name: String,
        value: String,
    },
    If {
        cond: String,
        then_ir: Vec<BlockIR>,
        else_ir: Vec<BlockIR>,
    },
    While {
        cond: String,
        body_ir: Vec<BlockIR>,
    },
    Try {
        try_ir: Vec<BlockIR>,
        catches: Vec<CatchBranch>,
        finally_ir: Vec<BlockIR>,
    },
    Delay {
        ms: u64,
    },
    Log {
        msg: String,
    },
    Mark {
        status: MarkStatus,
        msg: Option<String>,
    },
}
