use std::io;

/// Optional CSV table written to the standard output.
///
/// When disabled, every call is a no-op, so callers don't have to branch on
/// the `--csv` flag.
#[derive(Debug)]
pub(crate) struct CsvStatOutput {
    writer: Option<csv::Writer<io::Stdout>>,
}

impl CsvStatOutput {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        let writer = enabled.then(|| csv::Writer::from_writer(io::stdout()));

        Self { writer }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn add_record<I, T>(&mut self, values: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        if let Some(writer) = &mut self.writer {
            writer.write_record(values)?;
        }

        anyhow::Ok(())
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        if let Some(writer) = &mut self.writer {
            writer.flush()?;
        }

        anyhow::Ok(())
    }
}
