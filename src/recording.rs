// Anim64 - Delta-compressed animation scripts for C64 playback engines
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Text recordings.
//!
//! A recording lists one frame of one object per line:
//!
//! ```text
//! # object  x    y   angle
//! 0         24   50  0
//! 1         $40  50  %00011
//! ```
//!
//! Numbers are decimal, `$` hexadecimal or `%` binary, each optionally
//! negative. `#` and `;` start a comment that runs to the end of the line.
//! Every line must carry the same number of attributes.

use logos::Logos;

use crate::encoder::DeltaEncoder;
use crate::error::{AnimError, ErrorCode, Result, Span};

/// A parsed recording, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recording {
    frames: Vec<(usize, Vec<i32>)>,
}

impl Recording {
    /// Recorded `(object, attributes)` pairs in file order.
    pub fn frames(&self) -> &[(usize, Vec<i32>)] {
        &self.frames
    }

    /// Number of lines with data.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the recording has no data.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Highest object index plus one.
    pub fn num_objects(&self) -> usize {
        self.frames
            .iter()
            .map(|(object, _)| object + 1)
            .max()
            .unwrap_or(0)
    }

    /// Attributes per line, if any line was read.
    pub fn num_attributes(&self) -> Option<usize> {
        self.frames.first().map(|(_, state)| state.len())
    }

    /// Feed every frame into `encoder`.
    pub fn replay(&self, encoder: &mut DeltaEncoder) -> Result<()> {
        for (object, state) in &self.frames {
            encoder.record(*object, state)?;
        }
        Ok(())
    }
}

/// Tokens of the recording format.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r,]+")]
#[logos(skip r"[#;][^\n]*")]
enum Token {
    #[token("\n")]
    Newline,

    #[regex(r"-?[0-9]+", |lex| number(lex.slice(), 10), priority = 10)]
    #[regex(r"-?\$[0-9a-fA-F]+", |lex| number(lex.slice(), 16), priority = 10)]
    #[regex(r"-?%[01]+", |lex| number(lex.slice(), 2), priority = 10)]
    Number(i64),

    /// Anything that starts like a number but isn't one (`%102`, `12ab`).
    #[regex(r"-?[$%]?[0-9A-Za-z_]+", priority = 1)]
    Invalid,
}

fn number(slice: &str, radix: u32) -> Option<i64> {
    let (negative, digits) = match slice.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, slice),
    };
    let digits = digits.trim_start_matches(['$', '%']);
    let value = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -value } else { value })
}

/// Parse a recording.
pub fn parse(source: &str) -> Result<Recording> {
    let mut lexer = Token::lexer(source);
    let mut frames = Vec::new();
    let mut attributes: Option<usize> = None;
    let mut values: Vec<(i64, Span)> = Vec::new();
    let mut line_start = 0;

    loop {
        let token = lexer.next();
        match token {
            Some(Ok(Token::Number(value))) => {
                values.push((value, lexer.span().into()));
                continue;
            }
            Some(Ok(Token::Invalid)) | Some(Err(())) => {
                return Err(AnimError::new(
                    ErrorCode::InvalidRecording,
                    format!("Invalid number '{}'", lexer.slice()),
                )
                .with_span(lexer.span().into()));
            }
            Some(Ok(Token::Newline)) | None => {}
        }

        let line_end = match token {
            Some(_) => lexer.span().start,
            None => source.len(),
        };
        let line = std::mem::take(&mut values);
        if let Some(frame) = parse_line(&line, Span::new(line_start, line_end), &mut attributes)? {
            frames.push(frame);
        }

        match token {
            Some(_) => line_start = lexer.span().end,
            None => break,
        }
    }

    Ok(Recording { frames })
}

fn parse_line(
    values: &[(i64, Span)],
    line_span: Span,
    attributes: &mut Option<usize>,
) -> Result<Option<(usize, Vec<i32>)>> {
    let Some(((object, object_span), rest)) = values.split_first() else {
        return Ok(None);
    };

    let object = usize::try_from(*object).map_err(|_| {
        AnimError::new(
            ErrorCode::InvalidRecording,
            format!("Object index {} is negative", object),
        )
        .with_span(object_span.clone())
    })?;

    if rest.is_empty() {
        return Err(AnimError::new(
            ErrorCode::InvalidRecording,
            format!("Frame of object {} has no attributes", object),
        )
        .with_span(line_span));
    }

    match *attributes {
        Some(n) if n != rest.len() => {
            return Err(AnimError::new(
                ErrorCode::InvalidRecording,
                format!("Expected {} attributes, found {}", n, rest.len()),
            )
            .with_span(line_span))
        }
        _ => *attributes = Some(rest.len()),
    }

    let state = rest
        .iter()
        .map(|(value, span)| {
            i32::try_from(*value).map_err(|_| {
                AnimError::new(
                    ErrorCode::InvalidRecording,
                    format!("Value {} does not fit 32 bits", value),
                )
                .with_span(span.clone())
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some((object, state)))
}

/// Parse one number in recording syntax (`42`, `-3`, `$C000`, `%101`).
pub fn parse_number(text: &str) -> Option<i64> {
    let mut lexer = Token::lexer(text);
    match (lexer.next(), lexer.next()) {
        (Some(Ok(Token::Number(value))), None) => Some(value),
        _ => None,
    }
}
