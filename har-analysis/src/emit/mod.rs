//! Script Emitter (C10): renders `BlockIR` into the target textual dialect
//! (§4.8, §6 lexical rules). Deterministic: identical IR yields identical bytes.

use har_core::types::{BlockIR, CatchBranch, CookieSpec, HeaderSpec, MarkStatus, ParseMethod, ParseSource};

/// Render a full block sequence, one top-level `BLOCK:Request`-style
/// program with LF-terminated lines.
pub fn emit(ir: &[BlockIR]) -> String {
    let mut out = String::new();
    for block in ir {
        emit_block(block, 0, &mut out);
    }
    out
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn emit_block(block: &BlockIR, depth: usize, out: &mut String) {
    let pad = indent(depth);
    match block {
        BlockIR::Request { method, url, headers, cookies, content_type, body_template } => {
            out.push_str(&format!("{pad}BLOCK:Request\n"));
            out.push_str(&format!("{pad}  REQUEST {method} \"{}\"\n", escape(url)));
            for HeaderSpec { name, value } in headers {
                out.push_str(&format!("{pad}  HEADER \"{}\" \"{}\"\n", escape(name), escape(value)));
            }
            for CookieSpec { name, value, domain, path } in cookies {
                out.push_str(&format!(
                    "{pad}  COOKIE \"{}\" \"{}\" DOMAIN=\"{}\" PATH=\"{}\"\n",
                    escape(name),
                    escape(value),
                    escape(domain),
                    escape(path)
                ));
            }
            if let Some(ct) = content_type {
                out.push_str(&format!("{pad}  CONTENT_TYPE \"{}\"\n", escape(ct)));
            }
            if let Some(body) = body_template {
                out.push_str(&format!("{pad}  BODY \"{}\"\n", escape(body)));
            }
            out.push_str(&format!("{pad}ENDBLOCK\n"));
        }
        BlockIR::Parse { source, method, output_var } => {
            let source_str = match source {
                ParseSource::Body => "BODY",
                ParseSource::Header => "HEADER",
                ParseSource::Cookie => "COOKIE",
            };
            match method {
                ParseMethod::CssAttr { selector, attribute } => {
                    out.push_str(&format!(
                        "{pad}PARSE \"{}\" {source_str} CSS \"{}\" ATTRIBUTE \"{}\"\n",
                        escape(output_var),
                        escape(selector),
                        escape(attribute)
                    ));
                }
                ParseMethod::Regex { pattern } => {
                    out.push_str(&format!("{pad}PARSE \"{}\" {source_str} REGEX \"{}\"\n", escape(output_var), escape(pattern)));
                }
                ParseMethod::JsonPath { path } => {
                    out.push_str(&format!("{pad}PARSE \"{}\" {source_str} JSON \"{}\"\n", escape(output_var), escape(path)));
                }
            }
        }
        BlockIR::SetVariable { name, value } => {
            out.push_str(&format!("{pad}SET {} = \"{}\"\n", name, escape(value)));
        }
        BlockIR::If { cond, then_ir, else_ir } => {
            out.push_str(&format!("{pad}IF {cond}\n"));
            for b in then_ir {
                emit_block(b, depth + 1, out);
            }
            if !else_ir.is_empty() {
                out.push_str(&format!("{pad}ELSE\n"));
                for b in else_ir {
                    emit_block(b, depth + 1, out);
                }
            }
            out.push_str(&format!("{pad}END IF\n"));
        }
        BlockIR::While { cond, body_ir } => {
            out.push_str(&format!("{pad}WHILE {cond}\n"));
            for b in body_ir {
                emit_block(b, depth + 1, out);
            }
            out.push_str(&format!("{pad}END WHILE\n"));
        }
        BlockIR::Try { try_ir, catches, finally_ir } => {
            out.push_str(&format!("{pad}TRY\n"));
            for b in try_ir {
                emit_block(b, depth + 1, out);
            }
            for CatchBranch { cond, ir } in catches {
                out.push_str(&format!("{pad}CATCH IF {cond}\n"));
                for b in ir {
                    emit_block(b, depth + 1, out);
                }
            }
            if !finally_ir.is_empty() {
                out.push_str(&format!("{pad}FINALLY\n"));
                for b in finally_ir {
                    emit_block(b, depth + 1, out);
                }
            }
            out.push_str(&format!("{pad}END TRY\n"));
        }
        BlockIR::Delay { ms } => {
            out.push_str(&format!("{pad}WAIT {ms}\n"));
        }
        BlockIR::Log { msg } => {
            out.push_str(&format!("{pad}LOG \"{}\"\n", escape(msg)));
        }
        BlockIR::Mark { status, msg } => {
            let status_str = match status {
                MarkStatus::Success => "SUCCESS",
                MarkStatus::Failure => "FAIL",
                MarkStatus::Ban => "BAN",
                MarkStatus::Error => "ERROR",
            };
            match msg {
                Some(m) => out.push_str(&format!("{pad}MARK STATUS \"{status_str}\" \"{}\"\n", escape(m))),
                None => out.push_str(&format!("{pad}MARK STATUS \"{status_str}\"\n")),
            }
        }
    }
}

/// Escape `\`, `"`, and newlines per §4.8.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_request_block_deterministically() {
        let ir = vec![BlockIR::Request {
            method: "GET".to_string(),
            url: "https://app.test/login".to_string(),
            headers: Vec::new(),
            cookies: Vec::new(),
            content_type: None,
            body_template: None,
        }];
        let first = emit(&ir);
        let second = emit(&ir);
        assert_eq!(first, second);
        assert!(first.contains("REQUEST GET \"https://app.test/login\""));
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        let ir = vec![BlockIR::Log { msg: r#"she said "hi" \ bye"#.to_string() }];
        let rendered = emit(&ir);
        assert!(rendered.contains(r#"LOG "she said \"hi\" \\ bye""#));
    }

    #[test]
    fn mark_without_message_omits_trailing_string() {
        let ir = vec![BlockIR::Mark { status: MarkStatus::Success, msg: None }];
        let rendered = emit(&ir);
        assert_eq!(rendered.trim_end(), r#"MARK STATUS "SUCCESS""#);
    }
}
