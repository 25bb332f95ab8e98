//! Groups raw transaction log messages into the program invocations that emitted them.

pub mod parsed_transaction;

use std::str::FromStr;

use anyhow::{
    anyhow,
    bail,
    Context,
};
use base64ct::{
    Base64,
    Encoding,
};
use lazy_regex::regex_captures;
use solana_address::Address;

/// How a program invocation ended, as reported by its final log line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvocationResult {
    Success,
    Failed(String),
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// A single program invocation and every log message emitted directly by it.
///
/// Logs and data emitted by CPI callees belong to the callee's own invocation, which records the
/// caller in `parent_index`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramInvocation {
    /// The position of this invocation across the whole transaction, in log order.
    pub invocation_index: usize,
    pub program_id: Address,
    /// 1 for a top-level instruction, incremented for each nested CPI.
    pub stack_height: usize,
    pub parent_index: Option<usize>,
    /// `Program log:` messages with the prefix stripped, plus any other unrecognized line.
    pub program_logs: Vec<String>,
    /// Decoded `Program data:` payloads. A line with several base64 segments is concatenated.
    pub data: Vec<Vec<u8>>,
    pub units_consumed: Option<u64>,
    pub consumption_allowance: Option<u64>,
    /// `None` if the logs were truncated before the invocation finished.
    pub result: Option<InvocationResult>,
}

impl ProgramInvocation {
    fn new(
        invocation_index: usize,
        program_id: Address,
        stack_height: usize,
        parent_index: Option<usize>,
    ) -> Self {
        Self {
            invocation_index,
            program_id,
            stack_height,
            parent_index,
            program_logs: vec![],
            data: vec![],
            units_consumed: None,
            consumption_allowance: None,
            result: None,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_index.is_none()
    }
}

/// Decodes the space separated base64 segments of a `Program data:` line.
pub fn decode_program_data(encoded: &str) -> anyhow::Result<Vec<u8>> {
    let mut res = vec![];
    for segment in encoded.split_whitespace() {
        let bytes = Base64::decode_vec(segment)
            .map_err(|e| anyhow!("Invalid base64 in program data {segment}: {e}"))?;
        res.extend_from_slice(&bytes);
    }
    Ok(res)
}

fn parse_address(s: &str) -> anyhow::Result<Address> {
    Address::from_str(s).map_err(|e| anyhow!("Invalid program id {s}: {e}"))
}

/// Parses transaction log messages into program invocations, ordered by when each invocation
/// began.
///
/// Parsing stops at a `Log truncated` line; invocations that were still running at that point
/// have no `result`.
pub fn parse_program_invocations<S: AsRef<str>>(
    log_messages: &[S],
) -> anyhow::Result<Vec<ProgramInvocation>> {
    let mut invocations: Vec<ProgramInvocation> = vec![];
    // Indices into `invocations` for the current CPI stack.
    let mut stack: Vec<usize> = vec![];

    for (line_number, line) in log_messages.iter().map(AsRef::as_ref).enumerate() {
        let context = || format!("Log line {line_number}: {line}");

        if line == "Log truncated" {
            break;
        }

        if let Some((_, program_id, height)) =
            regex_captures!(r"^Program (\w+) invoke \[(\d+)\]$", line)
        {
            let program_id = parse_address(program_id).with_context(context)?;
            let stack_height: usize = height.parse().with_context(context)?;
            if stack_height != stack.len() + 1 {
                bail!(
                    "Expected stack height {}, got {stack_height}. {}",
                    stack.len() + 1,
                    context()
                );
            }
            let index = invocations.len();
            invocations.push(ProgramInvocation::new(
                index,
                program_id,
                stack_height,
                stack.last().copied(),
            ));
            stack.push(index);
            continue;
        }

        let Some(&current) = stack.last() else {
            bail!("Log outside of any program invocation. {}", context());
        };
        let invocation = &mut invocations[current];

        if let Some((_, program_id, consumed, allowed)) = regex_captures!(
            r"^Program (\w+) consumed (\d+) of (\d+) compute units$",
            line
        ) {
            if parse_address(program_id).with_context(context)? != invocation.program_id {
                bail!("Compute units reported for the wrong program. {}", context());
            }
            invocation.units_consumed = Some(consumed.parse().with_context(context)?);
            invocation.consumption_allowance = Some(allowed.parse().with_context(context)?);
        } else if let Some((_, program_id)) = regex_captures!(r"^Program (\w+) success$", line) {
            if parse_address(program_id).with_context(context)? != invocation.program_id {
                bail!("Unexpected program success. {}", context());
            }
            invocation.result = Some(InvocationResult::Success);
            stack.pop();
        } else if let Some((_, program_id, reason)) =
            regex_captures!(r"^Program (\w+) failed: (.*)$", line)
        {
            if parse_address(program_id).with_context(context)? != invocation.program_id {
                bail!("Unexpected program failure. {}", context());
            }
            invocation.result = Some(InvocationResult::Failed(reason.to_string()));
            stack.pop();
        } else if let Some(encoded) = line.strip_prefix("Program data: ") {
            invocation
                .data
                .push(decode_program_data(encoded).with_context(context)?);
        } else if let Some(log) = line.strip_prefix("Program log: ") {
            invocation.program_logs.push(log.to_string());
        } else {
            invocation.program_logs.push(line.to_string());
        }
    }

    Ok(invocations)
}
