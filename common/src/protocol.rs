//! The line protocol: newline-delimited JSON objects in both directions.
//! Decode validates field presence and type here so the dispatcher only
//! ever sees well-formed commands.

use embedded_hal::serial::{Read, Write};
use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::config::MAX_LINE;

/// One decoded, validated request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Tree { id: i32 },
    Pump { kind: String<16> },
    Status,
    Home,
    Recalibrate,
    Move { revs_x: f32, revs_y: f32 },
}

#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum DecodeError {
    /// Not JSON, not an object, a field of the wrong type, or an
    /// over-long line.
    Malformed,
    /// Known verb with a required field absent.
    MissingField,
    /// Verb not in the command table.
    UnknownCommand,
}

impl DecodeError {
    pub fn message(self) -> &'static str {
        match self {
            DecodeError::Malformed => "Malformed command",
            DecodeError::MissingField => "Missing field",
            DecodeError::UnknownCommand => "Unknown command",
        }
    }
}

/// The request record as it appears on the wire. Everything past the verb
/// is optional at this layer; `Command::from_request` enforces presence
/// per verb.
#[derive(Deserialize)]
struct Request {
    cmd: String<16>,
    id: Option<i32>,
    #[serde(rename = "type")]
    kind: Option<String<16>>,
    #[serde(rename = "revsX")]
    revs_x: Option<f32>,
    #[serde(rename = "revsY")]
    revs_y: Option<f32>,
}

impl Command {
    pub fn decode(line: &[u8]) -> Result<Command, DecodeError> {
        let (request, _) =
            serde_json_core::from_slice::<Request>(line).map_err(|_| DecodeError::Malformed)?;
        Command::from_request(request)
    }

    fn from_request(request: Request) -> Result<Command, DecodeError> {
        match request.cmd.as_str() {
            "tree" => Ok(Command::Tree {
                id: request.id.ok_or(DecodeError::MissingField)?,
            }),
            "pump" => Ok(Command::Pump {
                kind: request.kind.ok_or(DecodeError::MissingField)?,
            }),
            "status" => Ok(Command::Status),
            "home" => Ok(Command::Home),
            "recalibrate" => Ok(Command::Recalibrate),
            "move" => Ok(Command::Move {
                revs_x: request.revs_x.unwrap_or(0.0),
                revs_y: request.revs_y.unwrap_or(0.0),
            }),
            _ => Err(DecodeError::UnknownCommand),
        }
    }
}

/// One response line, always a flat object.
#[derive(Serialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Status {
        run: bool,
        soil: [u8; 3],
        #[serde(rename = "pWater")]
        p_water: bool,
        #[serde(rename = "pFert")]
        p_fert: bool,
    },
    Tree {
        status: &'static str,
        tree: u8,
    },
    Pump {
        pump: &'static str,
        state: bool,
    },
    Move {
        status: &'static str,
        #[serde(rename = "stepsX")]
        steps_x: i32,
        #[serde(rename = "stepsY")]
        steps_y: i32,
    },
    Plain {
        status: &'static str,
    },
    Error {
        error: &'static str,
    },
}

impl Response {
    pub fn error(message: &'static str) -> Response {
        Response::Error { error: message }
    }

    /// Serializes and writes the response as one line.
    pub fn send<W: Write<u8>>(&self, writer: &mut W) {
        if let Ok(encoded) = serde_json_core::to_string::<_, { MAX_LINE }>(self) {
            for byte in encoded.as_bytes() {
                nb::block!(writer.write(*byte)).ok();
            }
        }
        nb::block!(writer.write(b'\n')).ok();
    }
}

/// Accumulates serial bytes into terminator-delimited lines. A line that
/// outgrows the buffer is dropped whole and reported malformed rather than
/// decoded truncated.
pub struct LineBuffer {
    buf: Vec<u8, MAX_LINE>,
    overflow: bool,
}

impl LineBuffer {
    pub const fn new() -> Self {
        LineBuffer {
            buf: Vec::new(),
            overflow: false,
        }
    }

    /// Feeds one byte; a completed line yields its decode result. Bare
    /// terminators (the trailing half of CRLF) are ignored.
    pub fn feed(&mut self, byte: u8) -> Option<Result<Command, DecodeError>> {
        match byte {
            b'\n' | b'\r' => {
                if self.buf.is_empty() && !self.overflow {
                    return None;
                }
                let result = if self.overflow {
                    Err(DecodeError::Malformed)
                } else {
                    Command::decode(&self.buf)
                };
                self.buf.clear();
                self.overflow = false;
                Some(result)
            }
            _ => {
                if self.buf.push(byte).is_err() {
                    self.overflow = true;
                }
                None
            }
        }
    }

    /// Drains one byte from a serial reader, like `feed`.
    pub fn recv<R: Read<u8>>(&mut self, reader: &mut R) -> Option<Result<Command, DecodeError>> {
        match reader.read() {
            Ok(byte) => self.feed(byte),
            _ => None,
        }
    }
}
