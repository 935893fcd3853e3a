//! Tokenizer for the SLF serialization used by `.xcactivitylog` files.
//!
//! A decompressed activity log is the literal `SLF` followed by a flat run of
//! records. Each record is a payload of lowercase hex digits and a type
//! delimiter:
//!
//! | delimiter | token            | payload                                   |
//! |-----------|------------------|-------------------------------------------|
//! | `#`       | integer          | decimal value                             |
//! | `%`       | class name       | byte length of the name that follows      |
//! | `@`       | class name ref   | 1-based index into the class name table   |
//! | `"`       | string           | byte length of the string that follows    |
//! | `^`       | double           | byte-swapped IEEE-754 bit pattern (hex)   |
//! | `-`       | null             | none                                      |
//! | `(`       | list             | element count                             |

use std::fmt::{self, Write as _};

use thiserror::Error;

/// Signature every activity log starts with.
pub const SLF_HEADER: &str = "SLF";

/// Characters of input quoted in `InvalidToken` diagnostics.
const CONTEXT_CHARS: usize = 21;

/// One lexical unit of an activity log.
///
/// String-like tokens borrow from the lexed input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'a> {
    Int(u64),
    Double(f64),
    String(&'a str),
    ClassName(&'a str),
    ClassNameRef(&'a str),
    List(usize),
    Null,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "int({value})"),
            Self::Double(value) => write!(f, "double({value})"),
            Self::String(value) => write!(f, "string({value:?})"),
            Self::ClassName(name) => write!(f, "className({name})"),
            Self::ClassNameRef(name) => write!(f, "classNameRef({name})"),
            Self::List(count) => write!(f, "list({count})"),
            Self::Null => f.write_str("null"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("not an activity log: missing {SLF_HEADER} header")]
    InvalidHeader,
    #[error("invalid token near {context:?}")]
    InvalidToken { context: String },
    #[error("class name reference {index} out of range ({known} known)")]
    UnknownClassRef { index: usize, known: usize },
}

/// Class names seen so far in one lexing session.
///
/// References resolve by 1-based position; the table only ever grows.
#[derive(Debug, Clone, Default)]
pub struct ClassNameTable<'a> {
    names: Vec<&'a str>,
}

impl<'a> ClassNameTable<'a> {
    pub fn push(&mut self, name: &'a str) {
        self.names.push(name);
    }

    /// Looks up a 1-based reference.
    pub fn resolve(&self, index: usize) -> Option<&'a str> {
        index
            .checked_sub(1)
            .and_then(|i| self.names.get(i))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Int,
    ClassName,
    ClassNameRef,
    String,
    Double,
    Null,
    List,
}

impl Delimiter {
    const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'#' => Some(Self::Int),
            b'%' => Some(Self::ClassName),
            b'@' => Some(Self::ClassNameRef),
            b'"' => Some(Self::String),
            b'^' => Some(Self::Double),
            b'-' => Some(Self::Null),
            b'(' => Some(Self::List),
            _ => None,
        }
    }
}

const fn is_payload_byte(byte: u8) -> bool {
    matches!(byte, b'0'..=b'9' | b'a'..=b'f')
}

const fn is_delimiter_byte(byte: u8) -> bool {
    Delimiter::from_byte(byte).is_some()
}

/// A single lexing session over one activity log.
#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    class_names: ClassNameTable<'a>,
}

impl<'a> Lexer<'a> {
    /// Starts a session, checking the `SLF` signature.
    pub fn new(input: &'a str) -> Result<Self, LexError> {
        if !input.starts_with(SLF_HEADER) {
            return Err(LexError::InvalidHeader);
        }
        Ok(Self {
            input,
            pos: SLF_HEADER.len(),
            class_names: ClassNameTable::default(),
        })
    }

    /// Class names recorded so far.
    pub fn class_names(&self) -> &ClassNameTable<'a> {
        &self.class_names
    }

    /// Tokenizes the rest of the input.
    ///
    /// Any record that cannot be classified aborts the whole pass.
    pub fn tokenize(&mut self) -> Result<Vec<Token<'a>>, LexError> {
        let mut tokens = Vec::new();
        while self.pos < self.input.len() {
            self.scan_record(&mut tokens)?;
        }
        Ok(tokens)
    }

    fn scan_record(&mut self, tokens: &mut Vec<Token<'a>>) -> Result<(), LexError> {
        let record_start = self.pos;
        let payload = self.scan_while(is_payload_byte);
        let delimiters_start = self.pos;
        let delimiters = self.scan_while(is_delimiter_byte).as_bytes();

        if delimiters.is_empty() {
            return Err(self.invalid_token(record_start));
        }

        // Delimiter characters right after a string delimiter are the
        // string's first bytes, not delimiters of their own.
        if delimiters.len() > 1 && delimiters[0] == b'"' {
            self.pos = delimiters_start + 1;
            let token = self.scan_token(payload, Delimiter::String, record_start)?;
            tokens.push(token);
            return Ok(());
        }

        for &byte in delimiters {
            let Some(delimiter) = Delimiter::from_byte(byte) else {
                return Err(self.invalid_token(record_start));
            };
            let token = self.scan_token(payload, delimiter, record_start)?;
            tokens.push(token);
        }
        Ok(())
    }

    fn scan_token(
        &mut self,
        payload: &'a str,
        delimiter: Delimiter,
        record_start: usize,
    ) -> Result<Token<'a>, LexError> {
        match delimiter {
            Delimiter::Int => payload
                .parse()
                .map(Token::Int)
                .map_err(|_| self.invalid_token(record_start)),
            Delimiter::ClassName => {
                let name = self.read_length_prefixed(payload, record_start)?;
                self.class_names.push(name);
                Ok(Token::ClassName(name))
            }
            Delimiter::ClassNameRef => {
                let index: usize = payload
                    .parse()
                    .map_err(|_| self.invalid_token(record_start))?;
                self.class_names
                    .resolve(index)
                    .map(Token::ClassNameRef)
                    .ok_or(LexError::UnknownClassRef {
                        index,
                        known: self.class_names.len(),
                    })
            }
            Delimiter::String => self
                .read_length_prefixed(payload, record_start)
                .map(Token::String),
            Delimiter::Double => u64::from_str_radix(payload, 16)
                .map(|bits| Token::Double(f64::from_bits(bits.swap_bytes())))
                .map_err(|_| self.invalid_token(record_start)),
            Delimiter::Null => Ok(Token::Null),
            Delimiter::List => payload
                .parse()
                .map(Token::List)
                .map_err(|_| self.invalid_token(record_start)),
        }
    }

    /// Reads `payload` bytes of raw content following the delimiter.
    fn read_length_prefixed(
        &mut self,
        payload: &str,
        record_start: usize,
    ) -> Result<&'a str, LexError> {
        let len: usize = payload
            .parse()
            .map_err(|_| self.invalid_token(record_start))?;
        let input = self.input;
        let value = self
            .pos
            .checked_add(len)
            .and_then(|end| input.get(self.pos..end))
            .ok_or_else(|| self.invalid_token(record_start))?;
        self.pos += len;
        Ok(value)
    }

    fn scan_while(&mut self, accept: impl Fn(u8) -> bool) -> &'a str {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && accept(bytes[self.pos]) {
            self.pos += 1;
        }
        // Only ASCII bytes were consumed, so both ends are char boundaries.
        &input[start..self.pos]
    }

    fn invalid_token(&self, at: usize) -> LexError {
        let context = self
            .input
            .get(at..)
            .unwrap_or_default()
            .chars()
            .take(CONTEXT_CHARS)
            .collect();
        LexError::InvalidToken { context }
    }
}

/// Tokenizes a whole decompressed activity log.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    Lexer::new(input)?.tokenize()
}

/// Serializes tokens into SLF text.
///
/// The writer keeps its own class name table: [`SlfWriter::class`] emits a
/// definition the first time a name is written and a reference afterwards.
#[derive(Debug, Clone)]
pub struct SlfWriter {
    out: String,
    class_names: Vec<String>,
}

impl Default for SlfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SlfWriter {
    pub fn new() -> Self {
        Self {
            out: SLF_HEADER.to_string(),
            class_names: Vec::new(),
        }
    }

    pub fn int(&mut self, value: u64) -> &mut Self {
        let _ = write!(self.out, "{value}#");
        self
    }

    pub fn double(&mut self, value: f64) -> &mut Self {
        let _ = write!(self.out, "{:016x}^", value.to_bits().swap_bytes());
        self
    }

    pub fn string(&mut self, value: &str) -> &mut Self {
        let _ = write!(self.out, "{}\"{value}", value.len());
        self
    }

    pub fn boolean(&mut self, value: bool) -> &mut Self {
        self.int(u64::from(value))
    }

    pub fn null(&mut self) -> &mut Self {
        self.out.push('-');
        self
    }

    pub fn list(&mut self, count: usize) -> &mut Self {
        let _ = write!(self.out, "{count}(");
        self
    }

    /// Writes a class name definition without a reference.
    pub fn class_name(&mut self, name: &str) -> &mut Self {
        self.class_names.push(name.to_string());
        let _ = write!(self.out, "{}%{name}", name.len());
        self
    }

    /// Writes a reference to `name`, defining it first if it is new.
    pub fn class(&mut self, name: &str) -> &mut Self {
        let index = match self.class_names.iter().position(|known| known == name) {
            Some(i) => i + 1,
            None => {
                self.class_name(name);
                self.class_names.len()
            }
        };
        let _ = write!(self.out, "{index}@");
        self
    }

    /// Writes one token exactly as given.
    ///
    /// A `ClassNameRef` to a name never defined gets its definition written
    /// first, which adds a `ClassName` token on the way back in.
    pub fn token(&mut self, token: &Token<'_>) -> &mut Self {
        match *token {
            Token::Int(value) => self.int(value),
            Token::Double(value) => self.double(value),
            Token::String(value) => self.string(value),
            Token::ClassName(name) => self.class_name(name),
            Token::ClassNameRef(name) => self.class(name),
            Token::List(count) => self.list(count),
            Token::Null => self.null(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn finish(self) -> String {
        self.out
    }
}
