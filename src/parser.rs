//! Parsers for the two textual DAG formats.
//!
//! The numbered format names nodes by decimal id:
//!
//! ```text
//! Return 100
//! 0 load 0 1 20 1
//! 1 matmul 1 0 10 20 1
//! ```
//!
//! The plain format names nodes directly and reads like the scheduling
//! scenarios are usually written:
//!
//! ```text
//! # budget, then one node per line
//! memory 100
//! a: ; 10, 20, 1
//! b: a; 10, 20, 1
//! ```

use thiserror::Error;

use crate::models::NodeSpec;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Input is empty")]
    EmptyInput,
    #[error("Line {line}: expected header '{expected} <total_memory>'")]
    InvalidHeader { line: usize, expected: &'static str },
    #[error("Line {line}: {reason}")]
    InvalidNodeLine { line: usize, reason: String },
    #[error("Input matches neither DAG format (numbered: {numbered}; plain: {plain})")]
    UnrecognizedFormat { numbered: String, plain: String },
}

/// Parse the numbered format: header `Return <total_memory>`, then one node
/// per line as `<id> <op> <num_inputs> <input_id>... <run> <out> <time>`.
/// The decimal id string is the node's canonical name; the op token is a
/// label only.
pub fn parse_numbered(input: &str) -> Result<(i64, Vec<NodeSpec>), ParseError> {
    let mut total_memory = None;
    let mut specs = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }

        if total_memory.is_none() {
            let mut tokens = text.split_whitespace();
            let keyword = tokens.next();
            let value = tokens.next().and_then(|t| t.parse::<i64>().ok());
            match (keyword, value, tokens.next()) {
                (Some("Return"), Some(mem), None) => total_memory = Some(mem),
                _ => {
                    return Err(ParseError::InvalidHeader {
                        line,
                        expected: "Return",
                    })
                }
            }
            continue;
        }

        specs.push(parse_numbered_node(text, line)?);
    }

    match total_memory {
        Some(mem) => Ok((mem, specs)),
        None => Err(ParseError::EmptyInput),
    }
}

fn parse_numbered_node(text: &str, line: usize) -> Result<NodeSpec, ParseError> {
    let invalid = |reason: &str| ParseError::InvalidNodeLine {
        line,
        reason: reason.to_string(),
    };
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 6 {
        return Err(invalid("expected at least 6 tokens"));
    }

    let id: i64 = tokens[0]
        .parse()
        .map_err(|_| invalid("node id is not an integer"))?;
    let num_inputs: usize = tokens[2]
        .parse()
        .map_err(|_| invalid("input count is not an integer"))?;
    if tokens.len() != 6 + num_inputs {
        return Err(invalid("token count does not match the declared input count"));
    }

    let mut inputs = Vec::with_capacity(num_inputs);
    for token in &tokens[3..3 + num_inputs] {
        let input_id: i64 = token
            .parse()
            .map_err(|_| invalid("input id is not an integer"))?;
        inputs.push(input_id.to_string());
    }

    let mut costs = [0i64; 3];
    for (slot, token) in costs.iter_mut().zip(&tokens[3 + num_inputs..]) {
        *slot = token
            .parse()
            .map_err(|_| invalid("cost field is not an integer"))?;
    }

    Ok(NodeSpec {
        name: id.to_string(),
        inputs,
        run_mem: costs[0],
        output_mem: costs[1],
        time_cost: costs[2],
    })
}

/// Parse the plain format: `#` comments, header `memory <total_memory>`,
/// then one node per line as `name: in1,in2; run, out, time`.
pub fn parse_plain(input: &str) -> Result<(i64, Vec<NodeSpec>), ParseError> {
    let mut total_memory = None;
    let mut specs = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        if total_memory.is_none() {
            let mut tokens = text.split_whitespace();
            let keyword = tokens.next();
            let value = tokens.next().and_then(|t| t.parse::<i64>().ok());
            match (keyword, value, tokens.next()) {
                (Some("memory"), Some(mem), None) => total_memory = Some(mem),
                _ => {
                    return Err(ParseError::InvalidHeader {
                        line,
                        expected: "memory",
                    })
                }
            }
            continue;
        }

        specs.push(parse_plain_node(text, line)?);
    }

    match total_memory {
        Some(mem) => Ok((mem, specs)),
        None => Err(ParseError::EmptyInput),
    }
}

fn parse_plain_node(text: &str, line: usize) -> Result<NodeSpec, ParseError> {
    let invalid = |reason: &str| ParseError::InvalidNodeLine {
        line,
        reason: reason.to_string(),
    };

    let (name, rest) = text
        .split_once(':')
        .ok_or_else(|| invalid("expected 'name: inputs; run, out, time'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid("node name is empty"));
    }

    let (inputs_part, costs_part) = rest
        .split_once(';')
        .ok_or_else(|| invalid("expected ';' between inputs and costs"))?;

    let inputs: Vec<String> = inputs_part
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();

    let costs: Vec<i64> = costs_part
        .split(',')
        .map(|s| s.trim().parse::<i64>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid("cost field is not an integer"))?;
    if costs.len() != 3 {
        return Err(invalid("expected exactly 'run, out, time'"));
    }

    Ok(NodeSpec {
        name: name.to_string(),
        inputs,
        run_mem: costs[0],
        output_mem: costs[1],
        time_cost: costs[2],
    })
}

/// Try the numbered format first, then the plain one.
pub fn parse_auto(input: &str) -> Result<(i64, Vec<NodeSpec>), ParseError> {
    match parse_numbered(input) {
        Ok(parsed) => Ok(parsed),
        Err(numbered_err) => match parse_plain(input) {
            Ok(parsed) => Ok(parsed),
            Err(plain_err) => Err(ParseError::UnrecognizedFormat {
                numbered: numbered_err.to_string(),
                plain: plain_err.to_string(),
            }),
        },
    }
}
