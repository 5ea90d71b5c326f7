//! GDB/MI output records.
//!
//! Grammar (subset used by the profiler):
//!
//! ```text
//! record  = [token] "^" class ("," result)*
//!         | [token] ("*" | "+" | "=") class ("," result)*
//!         | ("~" | "@" | "&") c-string
//!         | "(gdb)"
//! result  = variable "=" value
//! value   = c-string | "{" [result ("," result)*] "}" | "[" [value|result ("," ...)*] "]"
//! ```
//!
//! Lists of results (`stack=[frame={..},frame={..}]`) keep only the values;
//! MI never relies on those keys.

use crate::utils::error::MiParseError;

/// A value in an MI result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiValue {
    Const(String),
    Tuple(Vec<(String, MiValue)>),
    List(Vec<MiValue>),
}

impl MiValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MiValue::Const(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[MiValue]> {
        match self {
            MiValue::List(values) => Some(values),
            _ => None,
        }
    }

    /// Field of a tuple
    pub fn get(&self, key: &str) -> Option<&MiValue> {
        match self {
            MiValue::Tuple(fields) => find(fields, key),
            _ => None,
        }
    }
}

/// Look up a result by name
pub fn find<'a>(results: &'a [(String, MiValue)], key: &str) -> Option<&'a MiValue> {
    results
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultClass {
    Done,
    Running,
    Connected,
    Error,
    Exit,
}

impl ResultClass {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "done" => Some(Self::Done),
            "running" => Some(Self::Running),
            "connected" => Some(Self::Connected),
            "error" => Some(Self::Error),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncKind {
    /// `*` - target state changes (running, stopped)
    Exec,
    /// `+` - progress of long operations
    Status,
    /// `=` - everything else (thread created, library loaded, ...)
    Notify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Console,
    Target,
    Log,
}

/// One line of MI output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiRecord {
    Result {
        token: Option<u64>,
        class: ResultClass,
        results: Vec<(String, MiValue)>,
    },
    Async {
        token: Option<u64>,
        kind: AsyncKind,
        class: String,
        results: Vec<(String, MiValue)>,
    },
    Stream {
        kind: StreamKind,
        text: String,
    },
    Prompt,
}

/// Parse one line of MI output
///
/// **Public** - used by the GDB/MI driver for every line it reads
///
/// # Errors
/// Malformed lines produce an `MiParseError` with the byte column of the
/// problem.
pub fn parse_record(line: &str) -> Result<MiRecord, MiParseError> {
    let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
    if line.trim_end() == "(gdb)" {
        return Ok(MiRecord::Prompt);
    }

    let mut parser = Parser::new(line);
    let token = parser.token();

    let record = match parser.bump() {
        Some(b'^') => {
            let name = parser.identifier()?;
            let class = ResultClass::from_name(&name)
                .ok_or_else(|| MiParseError::UnknownRecord(line.to_string()))?;
            MiRecord::Result {
                token,
                class,
                results: parser.results()?,
            }
        }
        Some(marker @ (b'*' | b'+' | b'=')) => {
            let kind = match marker {
                b'*' => AsyncKind::Exec,
                b'+' => AsyncKind::Status,
                _ => AsyncKind::Notify,
            };
            MiRecord::Async {
                token,
                kind,
                class: parser.identifier()?,
                results: parser.results()?,
            }
        }
        Some(marker @ (b'~' | b'@' | b'&')) if token.is_none() => {
            let kind = match marker {
                b'~' => StreamKind::Console,
                b'@' => StreamKind::Target,
                _ => StreamKind::Log,
            };
            MiRecord::Stream {
                kind,
                text: parser.c_string()?,
            }
        }
        _ => return Err(MiParseError::UnknownRecord(line.to_string())),
    };

    parser.finish()?;
    Ok(record)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn unexpected(&self) -> MiParseError {
        match self.peek() {
            Some(byte) => MiParseError::UnexpectedChar {
                found: char::from(byte),
                column: self.pos,
            },
            None => MiParseError::UnexpectedEnd(self.pos),
        }
    }

    fn expect(&mut self, wanted: u8) -> Result<(), MiParseError> {
        if self.peek() == Some(wanted) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn finish(&self) -> Result<(), MiParseError> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.unexpected()),
        }
    }

    fn token(&mut self) -> Option<u64> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|digits| digits.parse().ok())
    }

    fn identifier(&mut self) -> Result<String, MiParseError> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b) if b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
        ) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.unexpected());
        }
        Ok(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
    }

    /// Trailing `,result` pairs of a record
    fn results(&mut self) -> Result<Vec<(String, MiValue)>, MiParseError> {
        let mut results = Vec::new();
        while self.peek() == Some(b',') {
            self.pos += 1;
            results.push(self.result()?);
        }
        Ok(results)
    }

    fn result(&mut self) -> Result<(String, MiValue), MiParseError> {
        let name = self.identifier()?;
        self.expect(b'=')?;
        Ok((name, self.value()?))
    }

    fn value(&mut self) -> Result<MiValue, MiParseError> {
        match self.peek() {
            Some(b'"') => Ok(MiValue::Const(self.c_string()?)),
            Some(b'{') => self.tuple(),
            Some(b'[') => self.list(),
            _ => Err(self.unexpected()),
        }
    }

    fn tuple(&mut self) -> Result<MiValue, MiParseError> {
        self.expect(b'{')?;
        let mut fields = Vec::new();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(MiValue::Tuple(fields));
        }
        loop {
            fields.push(self.result()?);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(MiValue::Tuple(fields));
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn list(&mut self) -> Result<MiValue, MiParseError> {
        self.expect(b'[')?;
        let mut values = Vec::new();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(MiValue::List(values));
        }
        loop {
            let value = match self.peek() {
                Some(b'"' | b'{' | b'[') => self.value()?,
                _ => self.result()?.1,
            };
            values.push(value);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(MiValue::List(values));
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn c_string(&mut self) -> Result<String, MiParseError> {
        self.expect(b'"')?;
        let mut bytes = Vec::new();

        loop {
            let escape_at = self.pos;
            match self.bump() {
                None => return Err(MiParseError::UnexpectedEnd(self.pos)),
                Some(b'"') => break,
                Some(b'\\') => {
                    let byte = match self.bump() {
                        Some(b'n') => b'\n',
                        Some(b't') => b'\t',
                        Some(b'r') => b'\r',
                        Some(b'\\') => b'\\',
                        Some(b'"') => b'"',
                        Some(b'\'') => b'\'',
                        Some(b'a') => 0x07,
                        Some(b'b') => 0x08,
                        Some(b'f') => 0x0c,
                        Some(b'v') => 0x0b,
                        Some(b'e') => 0x1b,
                        Some(first @ b'0'..=b'7') => self.octal(first, escape_at)?,
                        _ => return Err(MiParseError::InvalidEscape(escape_at)),
                    };
                    bytes.push(byte);
                }
                Some(byte) => bytes.push(byte),
            }
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Up to three octal digits, the first already consumed
    fn octal(&mut self, first: u8, escape_at: usize) -> Result<u8, MiParseError> {
        let mut value = u32::from(first - b'0');
        for _ in 0..2 {
            match self.peek() {
                Some(digit @ b'0'..=b'7') => {
                    value = value * 8 + u32::from(digit - b'0');
                    self.pos += 1;
                }
                _ => break,
            }
        }
        u8::try_from(value).map_err(|_| MiParseError::InvalidEscape(escape_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt() {
        assert_eq!(parse_record("(gdb) \n").unwrap(), MiRecord::Prompt);
    }

    #[test]
    fn test_result_record() {
        let record = parse_record("12^done,value=\"42\"").unwrap();
        assert_eq!(
            record,
            MiRecord::Result {
                token: Some(12),
                class: ResultClass::Done,
                results: vec![("value".to_string(), MiValue::Const("42".to_string()))],
            }
        );
    }

    #[test]
    fn test_error_record() {
        let record = parse_record("3^error,msg=\"The program is not being run.\"").unwrap();
        match record {
            MiRecord::Result { class, results, .. } => {
                assert_eq!(class, ResultClass::Error);
                assert_eq!(
                    find(&results, "msg").and_then(MiValue::as_str),
                    Some("The program is not being run.")
                );
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_exec_async_record() {
        let record = parse_record(concat!(
            "*stopped,reason=\"signal-received\",",
            "signal-name=\"SIGINT\",thread-id=\"1\""
        ))
        .unwrap();
        match record {
            MiRecord::Async {
                token,
                kind,
                class,
                results,
            } => {
                assert_eq!(token, None);
                assert_eq!(kind, AsyncKind::Exec);
                assert_eq!(class, "stopped");
                assert_eq!(
                    find(&results, "signal-name").and_then(MiValue::as_str),
                    Some("SIGINT")
                );
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_stream_record_unescapes() {
        let record = parse_record(r#"~"Reading symbols from \"a.out\"...\n""#).unwrap();
        assert_eq!(
            record,
            MiRecord::Stream {
                kind: StreamKind::Console,
                text: "Reading symbols from \"a.out\"...\n".to_string(),
            }
        );
    }

    #[test]
    fn test_octal_escapes_decode_utf8() {
        let record = parse_record(r#"~"caf\303\251""#).unwrap();
        assert_eq!(
            record,
            MiRecord::Stream {
                kind: StreamKind::Console,
                text: "café".to_string(),
            }
        );
    }

    #[test]
    fn test_nested_stack_list() {
        let line = concat!(
            "5^done,stack=[",
            "frame={level=\"0\",addr=\"0x1\",func=\"io\",args=[]},",
            "frame={level=\"1\",addr=\"0x2\",func=\"work\"},",
            "frame={level=\"2\",addr=\"0x3\"}]"
        );

        let results = match parse_record(line).unwrap() {
            MiRecord::Result { results, .. } => results,
            other => panic!("unexpected record {:?}", other),
        };

        let frames = find(&results, "stack").and_then(MiValue::as_list).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].get("func").and_then(MiValue::as_str), Some("io"));
        assert_eq!(frames[0].get("args"), Some(&MiValue::List(vec![])));
        assert!(frames[2].get("func").is_none());
    }

    #[test]
    fn test_list_of_values() {
        let record = parse_record("=x,ids=[\"1\",\"2\"],empty={}").unwrap();
        match record {
            MiRecord::Async { kind, results, .. } => {
                assert_eq!(kind, AsyncKind::Notify);
                assert_eq!(
                    find(&results, "ids"),
                    Some(&MiValue::List(vec![
                        MiValue::Const("1".to_string()),
                        MiValue::Const("2".to_string()),
                    ]))
                );
                assert_eq!(find(&results, "empty"), Some(&MiValue::Tuple(vec![])));
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            parse_record("hello"),
            Err(MiParseError::UnknownRecord(_))
        ));
        assert!(matches!(
            parse_record("^bogus"),
            Err(MiParseError::UnknownRecord(_))
        ));
        assert!(matches!(
            parse_record("^done,value=\"unterminated"),
            Err(MiParseError::UnexpectedEnd(_))
        ));
        assert!(matches!(
            parse_record("^done,value={a=\"1\""),
            Err(MiParseError::UnexpectedEnd(_))
        ));
        assert!(matches!(
            parse_record("^done,value=\"1\"trailing"),
            Err(MiParseError::UnexpectedChar { found: 't', .. })
        ));
        assert!(matches!(
            parse_record(r#"~"bad \q escape""#),
            Err(MiParseError::InvalidEscape(_))
        ));
    }
}
