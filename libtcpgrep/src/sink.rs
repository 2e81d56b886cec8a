use std::io::{self, Write};

use crate::decode::DecodedFrame;

/// Destination for matched frames.
pub trait Sink {
    /// Render one matched frame.
    ///
    /// Output is best-effort observability, not guaranteed delivery:
    /// implementations log write failures and drop the emission, they
    /// never fail the dispatch loop.
    fn emit(&mut self, frame: &DecodedFrame);
}

/// Sink rendering matches as text: one summary line (interface,
/// timestamp, endpoints), the payload as lossy UTF-8, then a
/// separator line.
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        TextSink { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_match(&mut self, frame: &DecodedFrame) -> io::Result<()> {
        write!(self.out, "{} {}", frame.interface, frame.ts)?;
        match &frame.five_tuple {
            Some(five_tuple) => writeln!(self.out, " {five_tuple}")?,
            None => writeln!(self.out)?,
        }
        write!(self.out, "{}", String::from_utf8_lossy(frame.payload))?;
        writeln!(self.out, "\r\n----------------------")?;
        self.out.flush()
    }
}

impl<W: Write> Sink for TextSink<W> {
    fn emit(&mut self, frame: &DecodedFrame) {
        if let Err(e) = self.write_match(frame) {
            warn!("could not write match: {e}");
        }
    }
}
