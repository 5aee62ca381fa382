//! Tab-separated XYZ output.
//!
//! The artifact starts with the literal line `X\tY\tZ`, followed by one
//! `x\ty\tz` line per sample and no trailing newline.

use crate::bbox::Sample;
use crate::Result;
use std::io::Write;

/// Header line of every artifact.
pub const XYZ_HEADER: &str = "X\tY\tZ";

/// Streams samples as XYZ lines.
pub struct XyzWriter<W: Write> {
    writer: W,
    count: usize,
}

impl<W: Write> XyzWriter<W> {
    /// Write the header line and return the writer.
    pub fn new(mut writer: W) -> Result<Self> {
        writer.write_all(XYZ_HEADER.as_bytes())?;
        Ok(Self { writer, count: 0 })
    }

    /// Append one sample.
    pub fn write_sample(&mut self, sample: &Sample) -> Result<()> {
        // Records are newline-prefixed so the output never ends with one
        write!(self.writer, "\n{}\t{}\t{}", sample.x, sample.y, sample.z)?;
        self.count += 1;
        Ok(())
    }

    /// Drain a sample sequence, stopping at the first error.
    pub fn write_all<I>(&mut self, samples: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Sample>>,
    {
        let mut written = 0;
        for sample in samples {
            self.write_sample(&sample?)?;
            written += 1;
        }
        Ok(written)
    }

    /// Number of samples written so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Flush and return the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Render samples into an XYZ string.
pub fn to_xyz_string<I>(samples: I) -> Result<String>
where
    I: IntoIterator<Item = Sample>,
{
    let mut writer = XyzWriter::new(Vec::new())?;
    writer.write_all(samples.into_iter().map(Ok))?;
    let bytes = writer.finish()?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
