use crate::sdp::attribute::Attribute;
use crate::sdp::bandwidth::Bandwidth;
use crate::sdp::connection::Connection;
use crate::sdp::encryption_key::EncryptionKey;
use crate::sdp::media::MediaDescription;
use crate::sdp::origin::Origin;
use crate::sdp::sdp_error::{LineError, SdpError};
use crate::sdp::session::Session;
use crate::sdp::time_desc::{RepeatTime, TimeZone, Timing, parse_time_zones};
use std::io::BufRead;

/// Reads a session description line by line from any buffered reader.
///
/// Both `\n` and `\r\n` line endings are accepted.
///
/// # Example
/// ```rust
/// use rustyjsep::sdp::decoder::Decoder;
/// let text = "v=0\no=- 0 2 IN IP4 127.0.0.1\ns=-\nc=IN IP4 127.0.0.1\nt=0 0\n";
/// let session = Decoder::new(text.as_bytes()).decode().unwrap();
/// assert_eq!(session.origin.session_version(), 2);
/// ```
pub struct Decoder<R> {
    reader: R,
}

impl<R: BufRead> Decoder<R> {
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Consumes the reader and builds a [`Session`].
    ///
    /// # Errors
    /// [`SdpError::Line`] with the 1-based line number for a malformed line,
    /// [`SdpError::MissingRequiredFields`] / [`SdpError::MissingConnection`]
    /// for end-of-input checks, [`SdpError::Io`] if reading fails.
    pub fn decode(self) -> Result<Session, SdpError> {
        let mut parser = SessionParser::default();
        for (idx, line) in self.reader.lines().enumerate() {
            let line = line?;
            parser.feed(&line).map_err(|cause| SdpError::Line {
                line: idx + 1,
                cause,
            })?;
        }
        parser.finish()
    }
}

/// Decodes an in-memory description.
///
/// # Errors
/// Same as [`Decoder::decode`], minus I/O failures.
pub fn decode_str(text: &str) -> Result<Session, SdpError> {
    decode_lines(text.lines())
}

/// Decodes an already split sequence of lines (no terminators).
///
/// # Errors
/// Same as [`Decoder::decode`], minus I/O failures.
pub fn decode_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Session, SdpError> {
    let mut parser = SessionParser::default();
    for (idx, line) in lines.into_iter().enumerate() {
        parser
            .feed(line)
            .map_err(|cause| SdpError::Line { line: idx + 1, cause })?;
    }
    parser.finish()
}

/// Accumulates fields until the input ends.
#[derive(Default)]
struct SessionParser {
    version: Option<u8>,
    origin: Option<Origin>,
    session_name: Option<String>,
    information: Option<String>,
    uri: Option<String>,
    emails: Vec<String>,
    phones: Vec<String>,
    connection: Option<Connection>,
    bandwidths: Vec<Bandwidth>,
    timings: Vec<Timing>,
    time_zones: Vec<TimeZone>,
    encryption_keys: Vec<EncryptionKey>,
    attributes: Vec<Attribute>,
    media: Vec<MediaDescription>,
}

fn set_once<T>(slot: &mut Option<T>, value: T, field: &'static str) -> Result<(), LineError> {
    if slot.is_some() {
        return Err(LineError::Duplicate(field));
    }
    *slot = Some(value);
    Ok(())
}

fn parse_attribute(value: &str) -> Attribute {
    match value.parse::<Attribute>() {
        Ok(attr) => attr,
        Err(never) => match never {},
    }
}

impl SessionParser {
    fn feed(&mut self, line: &str) -> Result<(), LineError> {
        let bytes = line.as_bytes();
        if bytes.len() < 2 || bytes[1] != b'=' {
            return Err(LineError::Format);
        }
        // bytes[1] is ASCII, so index 2 is a char boundary
        let key = char::from(bytes[0]);
        let value = &line[2..];

        if key == 'm' {
            self.media.push(value.parse()?);
            return Ok(());
        }
        match self.media.last_mut() {
            Some(media) => Self::feed_media_line(media, key, value),
            None => self.feed_session_line(key, value),
        }
    }

    fn feed_session_line(&mut self, key: char, value: &str) -> Result<(), LineError> {
        match key {
            'v' => {
                let version: u8 = value.parse().map_err(LineError::parse_int("version"))?;
                if version != 0 {
                    return Err(LineError::invalid("version", format!("'{version}'")));
                }
                self.version = Some(version);
            }
            'o' => self.origin = Some(value.parse()?),
            's' => {
                if value.is_empty() {
                    return Err(LineError::invalid("session name", "must not be empty"));
                }
                set_once(&mut self.session_name, value.to_owned(), "session name")?;
            }
            'i' => set_once(&mut self.information, value.to_owned(), "session information")?,
            'u' => set_once(&mut self.uri, value.to_owned(), "URI")?,
            'e' => self.emails.push(value.to_owned()),
            'p' => self.phones.push(value.to_owned()),
            'c' => set_once(&mut self.connection, value.parse()?, "session connection")?,
            'b' => self.bandwidths.push(value.parse()?),
            'z' => self.time_zones.extend(parse_time_zones(value)?),
            'k' => self.encryption_keys.push(value.parse()?),
            'a' => self.attributes.push(parse_attribute(value)),
            't' => self.timings.push(value.parse()?),
            'r' => {
                let timing = self.timings.last_mut().ok_or(LineError::RepeatBeforeTiming)?;
                timing.repeat_times.push(value.parse::<RepeatTime>()?);
            }
            other => return Err(LineError::UnknownParameter(other)),
        }
        Ok(())
    }

    fn feed_media_line(
        media: &mut MediaDescription,
        key: char,
        value: &str,
    ) -> Result<(), LineError> {
        match key {
            'i' => set_once(&mut media.information, value.to_owned(), "media information")?,
            'c' => media.connections.push(value.parse()?),
            'b' => media.bandwidths.push(value.parse()?),
            'k' => media.encryption_keys.push(value.parse()?),
            'a' => media.attributes.push(parse_attribute(value)),
            'u' => return Err(LineError::AfterMedia("URI")),
            'e' => return Err(LineError::AfterMedia("email")),
            'p' => return Err(LineError::AfterMedia("phone")),
            other => return Err(LineError::UnknownParameter(other)),
        }
        Ok(())
    }

    fn finish(self) -> Result<Session, SdpError> {
        let (Some(version), Some(origin), Some(session_name)) =
            (self.version, self.origin, self.session_name)
        else {
            return Err(SdpError::MissingRequiredFields);
        };
        let session = Session {
            version,
            origin,
            session_name,
            information: self.information,
            uri: self.uri,
            emails: self.emails,
            phones: self.phones,
            connection: self.connection,
            bandwidths: self.bandwidths,
            timings: self.timings,
            time_zones: self.time_zones,
            encryption_keys: self.encryption_keys,
            attributes: self.attributes,
            media: self.media,
        };
        session.validate()?;
        Ok(session)
    }
}
