//! Text codec for input sequences.
//!
//! One line encodes one [`InputRecord`]. Decoding is pure and
//! context-free line-by-line; no simulation state is touched. Two
//! grammars exist, selected by [`ControllerKind`]:
//!
//! - **PlaybackLog**: six ASCII decimal fields separated by whitespace,
//!   `thrust strafe turn primary secondary selector`, booleans as `0`/`1`.
//! - **Native**: twelve hex digits packing the 6-byte little-endian
//!   record layout `[thrust][strafe][turn lo][turn hi][flags][selector]`,
//!   flags bit 0 = primary, bit 1 = secondary, other bits reserved.
//!
//! Blank-line policy: a line that is empty or whitespace-only decodes to
//! [`InputRecord::NEUTRAL`] under both grammars, so trailing newlines
//! and interior blank lines are well-defined no-op ticks.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tandem_core::input::{AXIS_LIMIT, SELECTOR_LIMIT, TURN_LIMIT};
use tandem_core::{ControllerKind, InputRecord};

use crate::error::{DecodeError, DecodeReason, SequenceError};

// ── Line decoding ───────────────────────────────────────────────

/// Decode one line into one record under the selected grammar.
///
/// # Errors
///
/// Returns a [`DecodeReason`] describing the first structural problem.
/// Callers that know the line's position wrap it into a
/// [`DecodeError`] to attribute the failure.
pub fn decode_line(line: &str, kind: ControllerKind) -> Result<InputRecord, DecodeReason> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(InputRecord::NEUTRAL);
    }
    match kind {
        ControllerKind::PlaybackLog => decode_playback(trimmed),
        ControllerKind::Native => decode_native(trimmed),
    }
}

fn parse_int(field: &'static str, token: &str) -> Result<i32, DecodeReason> {
    token.parse::<i32>().map_err(|_| DecodeReason::IntField {
        field,
        value: token.to_string(),
    })
}

fn check_range(field: &'static str, value: i32, min: i32, max: i32) -> Result<i32, DecodeReason> {
    if value < min || value > max {
        return Err(DecodeReason::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

fn parse_flag(field: &'static str, token: &str) -> Result<bool, DecodeReason> {
    match token {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(DecodeReason::BadFlag {
            field,
            value: token.to_string(),
        }),
    }
}

fn decode_playback(line: &str) -> Result<InputRecord, DecodeReason> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 6 {
        return Err(DecodeReason::FieldCount {
            expected: 6,
            found: tokens.len(),
        });
    }

    let axis = AXIS_LIMIT as i32;
    let turn_limit = TURN_LIMIT as i32;
    let thrust = check_range("thrust", parse_int("thrust", tokens[0])?, -axis, axis)?;
    let strafe = check_range("strafe", parse_int("strafe", tokens[1])?, -axis, axis)?;
    let turn = check_range("turn", parse_int("turn", tokens[2])?, -turn_limit, turn_limit)?;
    let primary = parse_flag("primary", tokens[3])?;
    let secondary = parse_flag("secondary", tokens[4])?;
    let selector = check_range(
        "selector",
        parse_int("selector", tokens[5])?,
        0,
        SELECTOR_LIMIT as i32,
    )?;

    Ok(InputRecord {
        thrust: thrust as i8,
        strafe: strafe as i8,
        turn: turn as i16,
        primary,
        secondary,
        selector: selector as u8,
    })
}

fn decode_native(line: &str) -> Result<InputRecord, DecodeReason> {
    if let Some(bad) = line.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(DecodeReason::HexDigit { found: bad });
    }
    if line.len() != 12 {
        return Err(DecodeReason::HexLength { found: line.len() });
    }

    let mut bytes = [0u8; 6];
    for (i, byte) in bytes.iter_mut().enumerate() {
        // All-hex and exact length were checked above.
        *byte = u8::from_str_radix(&line[i * 2..i * 2 + 2], 16)
            .map_err(|_| DecodeReason::HexLength { found: line.len() })?;
    }

    let flags = bytes[4];
    if flags & !0b0000_0011 != 0 {
        return Err(DecodeReason::FlagBits { bits: flags });
    }

    let thrust = bytes[0] as i8;
    let strafe = bytes[1] as i8;
    let turn = i16::from_le_bytes([bytes[2], bytes[3]]);

    let axis = AXIS_LIMIT as i32;
    let turn_limit = TURN_LIMIT as i32;
    check_range("thrust", thrust as i32, -axis, axis)?;
    check_range("strafe", strafe as i32, -axis, axis)?;
    check_range("turn", turn as i32, -turn_limit, turn_limit)?;
    check_range("selector", bytes[5] as i32, 0, SELECTOR_LIMIT as i32)?;

    Ok(InputRecord {
        thrust,
        strafe,
        turn,
        primary: flags & 0b01 != 0,
        secondary: flags & 0b10 != 0,
        selector: bytes[5],
    })
}

// ── Line encoding ───────────────────────────────────────────────

/// Encode one record as one line under the selected grammar.
///
/// The exact inverse of [`decode_line`] for in-range records. Used by
/// tests and by tooling that synthesizes sequences.
pub fn encode_line(record: &InputRecord, kind: ControllerKind) -> String {
    debug_assert!(record.in_range());
    match kind {
        ControllerKind::PlaybackLog => format!(
            "{} {} {} {} {} {}",
            record.thrust,
            record.strafe,
            record.turn,
            record.primary as u8,
            record.secondary as u8,
            record.selector
        ),
        ControllerKind::Native => {
            let turn = record.turn.to_le_bytes();
            let flags = record.primary as u8 | (record.secondary as u8) << 1;
            format!(
                "{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
                record.thrust as u8, record.strafe as u8, turn[0], turn[1], flags, record.selector
            )
        }
    }
}

// ── Sequence loading ────────────────────────────────────────────

/// Decode a whole newline-delimited text resource into an input
/// sequence, attributing failures to 1-based line numbers.
///
/// # Errors
///
/// The first undecodable line fails the whole load
/// ([`SequenceError::Decode`]); a read failure is
/// [`SequenceError::Resource`] without a path.
pub fn load_sequence<R: BufRead>(
    reader: R,
    kind: ControllerKind,
) -> Result<Vec<InputRecord>, SequenceError> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| SequenceError::Resource { path: None, source })?;
        let record = decode_line(&line, kind).map_err(|reason| DecodeError {
            line: idx + 1,
            content: line.clone(),
            reason,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// [`load_sequence`] over a file path, attributing I/O failures to the
/// path.
///
/// # Errors
///
/// As [`load_sequence`], with [`SequenceError::Resource`] carrying the
/// path for both open and read failures.
pub fn load_sequence_file(
    path: &Path,
    kind: ControllerKind,
) -> Result<Vec<InputRecord>, SequenceError> {
    let file = File::open(path).map_err(|source| SequenceError::Resource {
        path: Some(path.to_path_buf()),
        source,
    })?;
    load_sequence(BufReader::new(file), kind).map_err(|e| match e {
        SequenceError::Resource { path: None, source } => SequenceError::Resource {
            path: Some(path.to_path_buf()),
            source,
        },
        other => other,
    })
}
