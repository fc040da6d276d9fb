use crate::sdp::media::MediaDescription;
use crate::sdp::sdp_error::SdpError;
use crate::sdp::session::Session;
use bytes::{Buf, BytesMut};
use std::fmt;
use std::io;

const INITIAL_CAPACITY: usize = 1024;

/// Writes `session` in canonical field order, one `\n`-terminated line per field.
///
/// # Errors
/// Only the errors of the underlying `fmt::Write`.
pub fn write_session(session: &Session, out: &mut impl fmt::Write) -> fmt::Result {
    writeln!(out, "v={}", session.version)?;
    writeln!(out, "o={}", session.origin)?;
    writeln!(out, "s={}", session.session_name)?;
    if let Some(info) = &session.information {
        writeln!(out, "i={info}")?;
    }
    if let Some(uri) = &session.uri {
        writeln!(out, "u={uri}")?;
    }
    for email in &session.emails {
        writeln!(out, "e={email}")?;
    }
    for phone in &session.phones {
        writeln!(out, "p={phone}")?;
    }
    if let Some(c) = &session.connection {
        writeln!(out, "c={c}")?;
    }
    for b in &session.bandwidths {
        writeln!(out, "b={b}")?;
    }
    for timing in &session.timings {
        writeln!(out, "t={timing}")?;
        for repeat in &timing.repeat_times {
            writeln!(out, "r={repeat}")?;
        }
    }
    if !session.time_zones.is_empty() {
        out.write_str("z=")?;
        for (i, zone) in session.time_zones.iter().enumerate() {
            if i > 0 {
                out.write_char(' ')?;
            }
            write!(out, "{zone}")?;
        }
        out.write_char('\n')?;
    }
    for k in &session.encryption_keys {
        writeln!(out, "k={k}")?;
    }
    for a in &session.attributes {
        writeln!(out, "a={a}")?;
    }
    for media in &session.media {
        write_media(media, out)?;
    }
    Ok(())
}

/// Writes one `m=` section: m, i, c*, b*, k*, a*.
///
/// # Errors
/// Only the errors of the underlying `fmt::Write`.
pub fn write_media(media: &MediaDescription, out: &mut impl fmt::Write) -> fmt::Result {
    out.write_str("m=")?;
    media.write_header(out)?;
    out.write_char('\n')?;
    if let Some(info) = &media.information {
        writeln!(out, "i={info}")?;
    }
    for c in &media.connections {
        writeln!(out, "c={c}")?;
    }
    for b in &media.bandwidths {
        writeln!(out, "b={b}")?;
    }
    for k in &media.encryption_keys {
        writeln!(out, "k={k}")?;
    }
    for a in &media.attributes {
        writeln!(out, "a={a}")?;
    }
    Ok(())
}

/// Streams sessions to an `io::Write`.
///
/// Each session is rendered into an internal buffer first and then flushed;
/// on a short write only the unwritten remainder is retried.
pub struct Encoder<W> {
    writer: W,
    buffer: BytesMut,
}

impl<W: io::Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Renders `session` and writes all of it.
    ///
    /// # Errors
    /// [`SdpError::Io`] if the writer fails or stops accepting bytes.
    pub fn encode(&mut self, session: &Session) -> Result<(), SdpError> {
        self.buffer.clear();
        write_session(session, &mut self.buffer)
            .map_err(|_| io::Error::other("failed to render session description"))?;
        self.flush_buffer()?;
        Ok(())
    }

    fn flush_buffer(&mut self) -> io::Result<()> {
        while !self.buffer.is_empty() {
            match self.writer.write(&self.buffer) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => self.buffer.advance(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        self.writer.flush()
    }

    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Encodes `session` into a fresh `Vec<u8>`.
///
/// # Errors
/// Never fails in practice; the signature mirrors [`Encoder::encode`].
pub fn encode_to_vec(session: &Session) -> Result<Vec<u8>, SdpError> {
    let mut encoder = Encoder::new(Vec::new());
    encoder.encode(session)?;
    Ok(encoder.into_inner())
}
