use std::{
    fs,
    io::{self, BufRead, BufReader, Read},
    path::Path,
    thread::{self, JoinHandle},
};

use crossbeam::channel::{Receiver, Sender};
use xz2::read::XzDecoder;

use crate::error::TraceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Instruction,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub address: u32,
    pub kind: AccessKind,
}

impl Access {
    pub fn instruction(address: u32) -> Self {
        Access {
            address,
            kind: AccessKind::Instruction,
        }
    }

    pub fn data(address: u32) -> Self {
        Access {
            address,
            kind: AccessKind::Data,
        }
    }

    /// Address 0 terminates a trace.
    pub fn is_sentinel(&self) -> bool {
        self.address == 0
    }
}

/// Parses one `<I|D> <hex address>` record. Blank lines yield `None`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<Access>, TraceError> {
    let mut fields = line.split_whitespace();
    let Some(kind) = fields.next() else {
        return Ok(None);
    };
    let kind = match kind {
        "I" => AccessKind::Instruction,
        "D" => AccessKind::Data,
        _ => {
            return Err(TraceError::UnknownKind {
                line: line_no,
                kind: kind.to_owned(),
            })
        }
    };

    let text = fields.next().unwrap_or_default();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let address = u32::from_str_radix(digits, 16).map_err(|_| TraceError::BadAddress {
        line: line_no,
        text: text.to_owned(),
    })?;

    if let Some(rest) = fields.next() {
        return Err(TraceError::TrailingInput {
            line: line_no,
            text: rest.to_owned(),
        });
    }
    Ok(Some(Access { address, kind }))
}

/// Iterator over the records of a textual trace. Stops after the first
/// error.
#[derive(Debug)]
pub struct AccessReader<R> {
    lines: io::Lines<R>,
    line_no: usize,
    failed: bool,
}

impl<R: BufRead> AccessReader<R> {
    pub fn new(reader: R) -> Self {
        AccessReader {
            lines: reader.lines(),
            line_no: 0,
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for AccessReader<R> {
    type Item = Result<Access, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            self.line_no += 1;
            let parsed = match self.lines.next()? {
                Ok(line) => parse_line(self.line_no, &line),
                Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                    Err(TraceError::NotText { line: self.line_no })
                }
                Err(err) => Err(err.into()),
            };
            match parsed {
                Ok(Some(access)) => return Some(Ok(access)),
                Ok(None) => continue,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

pub fn read_accesses<R: BufRead>(reader: R) -> AccessReader<R> {
    AccessReader::new(reader)
}

pub type Block = Result<Vec<Access>, TraceError>;

/// Trace file parsed on a background thread and handed over in blocks.
pub struct Trace {
    pub rec: Receiver<Block>,
    _thread: JoinHandle<()>,
}

impl Trace {
    /// Opens `path`, decompressing it on the fly when it ends in `.xz`.
    pub fn read(
        path: &Path,
        records_per_block: usize,
        blocks_per_queue: usize,
    ) -> io::Result<Trace> {
        let file = fs::File::open(path)?;
        let stream: Box<dyn Read + Send> = if path.extension().is_some_and(|ext| ext == "xz") {
            Box::new(XzDecoder::new(file))
        } else {
            Box::new(file)
        };
        let (sender, receiver) = crossbeam::channel::bounded(blocks_per_queue.max(1));
        let records_per_block = records_per_block.max(1);

        tracing::debug!(path = %path.display(), records_per_block, "reading trace");
        let t = thread::spawn(move || {
            Trace::run_thread(BufReader::new(stream), records_per_block, sender)
        });

        Ok(Trace {
            rec: receiver,
            _thread: t,
        })
    }

    fn run_thread<R: BufRead>(stream: R, records_per_block: usize, queue: Sender<Block>) {
        let mut reader = AccessReader::new(stream);
        loop {
            let mut buffer = Vec::with_capacity(records_per_block);
            let mut done = true;
            for access in reader.by_ref() {
                match access {
                    Ok(access) => {
                        buffer.push(access);
                        if access.is_sentinel() {
                            break;
                        }
                        if buffer.len() == records_per_block {
                            done = false;
                            break;
                        }
                    }
                    Err(err) => {
                        if !buffer.is_empty() && queue.send(Ok(buffer)).is_err() {
                            return;
                        }
                        let _ = queue.send(Err(err));
                        return;
                    }
                }
            }

            if !buffer.is_empty() && queue.send(Ok(buffer)).is_err() {
                return;
            }
            if done {
                return;
            }
        }
    }
}
