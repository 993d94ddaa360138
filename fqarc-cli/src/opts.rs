use std::fmt::Display;
use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use atty::Stream;
use fqarc::alphabet::SymbolAlphabet;
use fqarc::alphabet_serializer::SerializableAlphabet;
use fqarc::fastq::input::open_maybe_gzip;
use log::{debug, info};

#[derive(Debug, Clone)]
pub struct InputFile {
    path: PathBuf,
}

impl Display for InputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

pub fn input_file(path: &str) -> Result<InputFile, String> {
    let result = InputFile {
        path: PathBuf::from(path),
    };

    Ok(result)
}

impl InputFile {
    /// Loads an alphabet previously saved with the `alphabet` command.
    pub fn read_alphabet(&self) -> anyhow::Result<SymbolAlphabet> {
        let file = File::open(&self.path)
            .with_context(|| format!("Could not open alphabet file {}", self))?;
        let alphabet = SerializableAlphabet::read_json(BufReader::new(file))
            .with_context(|| format!("Could not read alphabet file {}", self))?;
        info!("Using alphabet from {} ({} symbols)", self, alphabet.len());

        Ok(alphabet)
    }
}

pub fn input_stream(path: &str) -> Result<InputStream, String> {
    let result = InputStream {
        path: PathBuf::from(path),
    };

    Ok(result)
}

#[derive(Debug, Clone)]
pub struct InputStream {
    path: PathBuf,
}

impl Display for InputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl Default for InputStream {
    fn default() -> Self {
        Self {
            path: PathBuf::from("-"),
        }
    }
}

impl InputStream {
    pub fn as_reader(&self) -> Result<InputReader, anyhow::Error> {
        InputReader::from_path(&self.path)
    }
}

#[derive(Debug)]
pub enum InputReader {
    Stdin(io::Stdin),
    File { file: File, path: PathBuf },
}

impl InputReader {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        let is_stdin = path.to_string_lossy() == "-";

        let val = if is_stdin {
            Self::Stdin(io::stdin())
        } else {
            let file = File::open(path)
                .with_context(|| format!("Could not open input file {}", path.display()))?;

            Self::File {
                file,
                path: path.to_owned(),
            }
        };
        Ok(val)
    }

    pub fn length(&self) -> anyhow::Result<Option<u64>> {
        let val = match self {
            InputReader::Stdin(_) => None,
            InputReader::File { file, .. } => Some(file.metadata()?.len()),
        };
        Ok(val)
    }

    pub fn file_path(&self) -> Option<&Path> {
        match self {
            InputReader::Stdin(_) => None,
            InputReader::File { path, .. } => Some(path),
        }
    }

    #[must_use]
    pub fn into_read(self) -> Box<dyn Read + Send> {
        match self {
            InputReader::Stdin(stdin) => Box::new(stdin),
            InputReader::File { file, .. } => Box::new(file),
        }
    }

    /// Turns the input into a source that can be read more than once.
    ///
    /// Files are simply reopened; the standard input is buffered in memory.
    pub fn into_reopenable(self) -> anyhow::Result<ReopenableInput> {
        let val = match self {
            InputReader::Stdin(mut stdin) => {
                let mut data = Vec::new();
                stdin
                    .read_to_end(&mut data)
                    .context("Could not read the standard input")?;
                debug!("Buffered {} bytes of the standard input", data.len());

                ReopenableInput::Buffered(data)
            }
            InputReader::File { path, .. } => ReopenableInput::File(path),
        };
        Ok(val)
    }
}

/// FASTQ source that each compression pass opens from the beginning.
#[derive(Debug)]
pub enum ReopenableInput {
    Buffered(Vec<u8>),
    File(PathBuf),
}

impl ReopenableInput {
    pub fn open(&self) -> io::Result<Box<dyn BufRead + Send + '_>> {
        match self {
            ReopenableInput::Buffered(data) => open_maybe_gzip(data.as_slice()),
            ReopenableInput::File(path) => open_maybe_gzip(File::open(path)?),
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Binary,
}

#[derive(Debug)]
pub enum OutputWriter {
    Stdout(io::Stdout),
    File(File),
}

impl OutputWriter {
    pub fn from_path_and_input(
        output: &Option<PathBuf>,
        input: &InputReader,
        new_extension: &str,
        mode: OutputMode,
    ) -> anyhow::Result<Self> {
        if let Some(path) = output {
            Self::from_path(path, mode)
        } else {
            let path = input
                .file_path()
                .map(|path| path.with_extension(new_extension))
                .unwrap_or_else(|| PathBuf::from("-"));

            Self::from_path(&path, mode)
        }
    }

    fn from_path(path: &Path, mode: OutputMode) -> anyhow::Result<Self> {
        info!("Output file: {}", path.display());

        let is_stdout = path.to_string_lossy() == "-";

        if mode == OutputMode::Binary && is_stdout && atty::is(Stream::Stdout) {
            bail!("Cannot output an archive to stdout when running in terminal; please use -o option instead or pipe the standard output");
        }

        let writer = if is_stdout {
            Self::Stdout(io::stdout())
        } else {
            let file = File::create(path)
                .with_context(|| format!("Could not create output file {}", path.display()))?;
            Self::File(file)
        };

        Ok(writer)
    }

    pub fn into_write(self) -> Box<dyn Write + Send> {
        match self {
            OutputWriter::Stdout(stdout) => Box::new(stdout),
            OutputWriter::File(file) => Box::new(file),
        }
    }
}
