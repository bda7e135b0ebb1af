// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP tokenizer (nom) and DATA-section entity scanner.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{map, map_res, opt, recognize, value},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::error::{Error, Result};

/// STEP token borrowed from the source text
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// `#123`
    EntityRef(u32),
    /// `'text'`, still carrying doubled-quote escapes
    String(&'a str),
    /// `42`
    Integer(i64),
    /// `3.14`, `0.`, `1.5E-3`
    Float(f64),
    /// `.ELEMENT.` without the dots
    Enum(&'a str),
    /// `(a, b, c)`
    List(Vec<Token<'a>>),
    /// `IFCLENGTHMEASURE(2.5)`
    TypedValue(&'a str, Vec<Token<'a>>),
    /// `$`
    Null,
    /// `*`
    Derived,
}

fn keyword(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn entity_ref(input: &str) -> IResult<&str, Token<'_>> {
    map(
        preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
        Token::EntityRef,
    )(input)
}

/// String body up to the closing quote; `''` stays part of the body.
fn string_body(input: &str) -> IResult<&str, &str> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Ok((&input[i..], &input[..i]));
        }
        i += 1;
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn string(input: &str) -> IResult<&str, Token<'_>> {
    map(delimited(char('\''), string_body, char('\'')), Token::String)(input)
}

fn real(input: &str) -> IResult<&str, Token<'_>> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            char('.'),
            opt(digit1),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| {
            fast_float::parse::<f64, _>(s)
                .or_else(|_| s.parse::<f64>())
                .map(Token::Float)
        },
    )(input)
}

fn integer(input: &str) -> IResult<&str, Token<'_>> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), |s: &str| {
        s.parse::<i64>().map(Token::Integer)
    })(input)
}

fn enumeration(input: &str) -> IResult<&str, Token<'_>> {
    map(delimited(char('.'), keyword, char('.')), Token::Enum)(input)
}

/// Parenthesised, comma separated tokens: `(a, b, c)` or `()`
fn arguments(input: &str) -> IResult<&str, Vec<Token<'_>>> {
    delimited(
        char('('),
        separated_list0(char(','), token),
        preceded(multispace0, char(')')),
    )(input)
}

fn list(input: &str) -> IResult<&str, Token<'_>> {
    map(arguments, Token::List)(input)
}

fn typed_value(input: &str) -> IResult<&str, Token<'_>> {
    map(pair(keyword, arguments), |(name, args)| {
        Token::TypedValue(name, args)
    })(input)
}

fn token(input: &str) -> IResult<&str, Token<'_>> {
    delimited(
        multispace0,
        alt((
            real, // before integer: a real starts like an integer
            integer,
            entity_ref,
            string,
            enumeration,
            list,
            typed_value,
            value(Token::Null, char('$')),
            value(Token::Derived, char('*')),
        )),
        multispace0,
    )(input)
}

/// Parse one entity instance: `#123=IFCWALL('guid',$,...);`
///
/// Returns the id, the type name exactly as written and the attribute tokens.
pub fn parse_entity(input: &str) -> Result<(u32, &str, Vec<Token<'_>>)> {
    let parsed = tuple((
        preceded(
            multispace0,
            preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
        ),
        preceded(tuple((multispace0, char('='), multispace0)), keyword),
        preceded(multispace0, arguments),
        preceded(multispace0, char(';')),
    ))(input);

    match parsed {
        Ok((_, (id, type_name, args, _))) => Ok((id, type_name, args)),
        Err(_) => {
            let snippet: String = input.trim_start().chars().take(80).collect();
            Err(Error::parse(0, format!("malformed entity instance: {}", snippet)))
        }
    }
}

/// An entity instance located by [`EntityScanner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedEntity<'a> {
    pub id: u32,
    /// Type name as written in the file (normally upper case)
    pub type_name: &'a str,
    /// Byte offset of the leading `#`
    pub start: usize,
    /// Byte offset one past the terminating `;`
    pub end: usize,
}

impl<'a> ScannedEntity<'a> {
    /// Full text of the instance, `#id=...;`
    pub fn text(&self, content: &'a str) -> &'a str {
        &content[self.start..self.end]
    }
}

/// Locate the `;` that terminates the statement starting at `from`,
/// skipping quoted strings and `/* */` comments. Returns the offset one past it.
pub(crate) fn statement_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    loop {
        let offset = memchr::memchr3(b';', b'\'', b'/', &bytes[pos..])?;
        let at = pos + offset;
        match bytes[at] {
            b';' => return Some(at + 1),
            b'\'' => {
                // a doubled quote simply opens the next string right away
                let close = memchr::memchr(b'\'', &bytes[at + 1..])?;
                pos = at + close + 2;
            }
            _ => {
                if bytes.get(at + 1) == Some(&b'*') {
                    let close = memchr::memmem::find(&bytes[at + 2..], b"*/")?;
                    pos = at + 2 + close + 2;
                } else {
                    pos = at + 1;
                }
            }
        }
    }
}

/// Offset of the first byte after `DATA;`, or 0 for bare entity listings.
fn data_section_start(content: &str) -> usize {
    memchr::memmem::find(content.as_bytes(), b"DATA;")
        .map(|at| at + "DATA;".len())
        .unwrap_or(0)
}

/// Entity scanner: finds every `#id=TYPE(...);` instance without tokenizing it.
pub struct EntityScanner<'a> {
    content: &'a str,
    origin: usize,
    position: usize,
}

impl<'a> EntityScanner<'a> {
    /// Create a scanner positioned at the start of the DATA section
    pub fn new(content: &'a str) -> Self {
        let origin = data_section_start(content);
        Self {
            content,
            origin,
            position: origin,
        }
    }

    /// Next entity instance in file order
    pub fn next_entity(&mut self) -> Option<ScannedEntity<'a>> {
        let bytes = self.content.as_bytes();

        while self.position < bytes.len() {
            let start = self.position + memchr::memchr2(b'#', b'/', &bytes[self.position..])?;

            if bytes[start] == b'/' {
                // comments between statements may quote whole instances
                if bytes.get(start + 1) == Some(&b'*') {
                    let close = memchr::memmem::find(&bytes[start + 2..], b"*/")?;
                    self.position = start + 2 + close + 2;
                } else {
                    self.position = start + 1;
                }
                continue;
            }

            let id_start = start + 1;
            let mut pos = id_start;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            let id_end = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }

            if id_end == id_start || pos >= bytes.len() || bytes[pos] != b'=' {
                self.position = start + 1;
                continue;
            }

            let Some(end) = statement_end(bytes, pos) else {
                self.position = bytes.len();
                return None;
            };
            self.position = end;

            let Ok(id) = self.content[id_start..id_end].parse::<u32>() else {
                continue;
            };

            let after_eq = self.content[pos + 1..end].trim_start();
            let name_len = after_eq
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after_eq.len());

            return Some(ScannedEntity {
                id,
                type_name: &after_eq[..name_len],
                start,
                end,
            });
        }

        None
    }

    /// All instances whose type name matches `target_type` (ASCII case-insensitive)
    pub fn find_by_type(&mut self, target_type: &str) -> Vec<ScannedEntity<'a>> {
        let mut found = Vec::new();
        while let Some(entity) = self.next_entity() {
            if entity.type_name.eq_ignore_ascii_case(target_type) {
                found.push(entity);
            }
        }
        found
    }

    /// Rewind to the start of the DATA section
    pub fn reset(&mut self) {
        self.position = self.origin;
    }
}

impl<'a> Iterator for EntityScanner<'a> {
    type Item = ScannedEntity<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entity()
    }
}
