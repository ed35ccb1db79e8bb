//! Decoder for the `dissect` replay container.
//!
//! ## Layout
//!
//! All integers are little endian. Strings are a `u16` byte length followed
//! by UTF-8.
//!
//! 1. Magic `dissect` and a one byte format version (currently 1)
//! 2. Header: key/value string pairs, ended by an empty key
//! 3. Match feedback: records of `u8` kind, `u32` seconds into the round,
//!    username, message. Kinds outside 0-9 decode as [`MatchUpdateType::Other`].
//!    The round ends where the stream ends, which must be between two
//!    records. Reading to the very end is also what lets an archive entry
//!    verify its checksum.

use std::io::{self, BufReader, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{DecodeError, DecodeStatus, Decoded, Decoder, ReplayStream, Session};

pub const MAGIC: &[u8; 7] = b"dissect";
pub const VERSION: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchUpdateType {
    Kill,
    Death,
    DefuserPlantStart,
    DefuserPlantComplete,
    DefuserDisableStart,
    DefuserDisableComplete,
    LocateObjective,
    OperatorSwap,
    Battleye,
    PlayerLeave,
    Other,
}

impl MatchUpdateType {
    pub fn from_u8(kind: u8) -> Self {
        match kind {
            0 => MatchUpdateType::Kill,
            1 => MatchUpdateType::Death,
            2 => MatchUpdateType::DefuserPlantStart,
            3 => MatchUpdateType::DefuserPlantComplete,
            4 => MatchUpdateType::DefuserDisableStart,
            5 => MatchUpdateType::DefuserDisableComplete,
            6 => MatchUpdateType::LocateObjective,
            7 => MatchUpdateType::OperatorSwap,
            8 => MatchUpdateType::Battleye,
            9 => MatchUpdateType::PlayerLeave,
            _ => MatchUpdateType::Other,
        }
    }
}

/// One match-feedback event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUpdate {
    #[serde(rename = "type")]
    pub kind: MatchUpdateType,
    pub username: String,
    pub time_in_seconds: u32,
    pub message: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DissectDecoder;

impl Decoder for DissectDecoder {
    fn open(&self, stream: ReplayStream) -> Result<Box<dyn Session>, DecodeError> {
        let mut stream = BufReader::new(stream);

        let mut preamble = [0u8; 8];
        stream.read_exact(&mut preamble).map_err(|err| match err.kind() {
            io::ErrorKind::UnexpectedEof => {
                DecodeError::UnrecognizedContainer("file is too short".to_string())
            }
            _ => DecodeError::Io(err),
        })?;

        if &preamble[..7] != MAGIC {
            return Err(DecodeError::UnrecognizedContainer(
                "missing dissect magic".to_string(),
            ));
        }
        if preamble[7] != VERSION {
            return Err(DecodeError::UnsupportedVersion(preamble[7]));
        }

        Ok(Box::new(DissectSession { stream }))
    }
}

struct DissectSession {
    stream: BufReader<ReplayStream>,
}

impl Session for DissectSession {
    fn decode(mut self: Box<Self>) -> Decoded {
        let mut header = Map::new();
        let mut events = Vec::new();

        let status = match self.read_round(&mut header, &mut events) {
            Ok(status) => status,
            Err(err) => DecodeStatus::Failed(err),
        };

        Decoded {
            header: Value::Object(header),
            events: events.into_iter().map(event_to_value).collect(),
            status,
        }
    }
}

impl DissectSession {
    fn read_round(
        &mut self,
        header: &mut Map<String, Value>,
        events: &mut Vec<MatchUpdate>,
    ) -> Result<DecodeStatus, DecodeError> {
        loop {
            let key = self.read_string("header")?;
            if key.is_empty() {
                break;
            }
            let value = self.read_string("header")?;
            header.insert(key, Value::String(value));
        }

        loop {
            let mut kind = [0u8; 1];
            if read_or_eof(&mut self.stream, &mut kind)? == 0 {
                return Ok(DecodeStatus::EndOfStream);
            }

            let time_in_seconds = self
                .stream
                .read_u32::<LittleEndian>()
                .map_err(truncated("match feedback"))?;
            let username = self.read_string("match feedback")?;
            let message = self.read_string("match feedback")?;

            events.push(MatchUpdate {
                kind: MatchUpdateType::from_u8(kind[0]),
                username,
                time_in_seconds,
                message,
            });
        }
    }

    fn read_string(&mut self, section: &'static str) -> Result<String, DecodeError> {
        let len = self
            .stream
            .read_u16::<LittleEndian>()
            .map_err(truncated(section))?;
        let mut bytes = vec![0u8; len as usize];
        self.stream
            .read_exact(&mut bytes)
            .map_err(truncated(section))?;
        String::from_utf8(bytes)
            .map_err(|_| DecodeError::Malformed(format!("invalid UTF-8 in {section}")))
    }
}

/// Read one byte, reporting a clean end of stream as `Ok(0)`.
fn read_or_eof(stream: &mut impl Read, buf: &mut [u8; 1]) -> Result<usize, DecodeError> {
    loop {
        match stream.read(buf) {
            Ok(n) => return Ok(n),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(DecodeError::Io(err)),
        }
    }
}

fn truncated(section: &'static str) -> impl Fn(io::Error) -> DecodeError {
    move |err| match err.kind() {
        io::ErrorKind::UnexpectedEof => {
            DecodeError::Malformed(format!("unexpected end of {section}"))
        }
        _ => DecodeError::Io(err),
    }
}

fn event_to_value(event: MatchUpdate) -> Value {
    // Plain strings, integers and unit variants always serialize
    serde_json::to_value(event).unwrap_or(Value::Null)
}
