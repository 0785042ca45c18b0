// Source acquisition: read selected files, decode, hand to a parser

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use propostas_recon::{SourceKind, TabularData};

use crate::error::IoError;

/// How a source's bytes become a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Semicolon-delimited text in the selected encoding.
    Delimited,
    /// First worksheet of a workbook.
    Spreadsheet,
}

impl SourceFormat {
    pub fn for_kind(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Sales | SourceKind::Items => Self::Delimited,
            SourceKind::Insurance => Self::Spreadsheet,
        }
    }

    /// False only for spreadsheets in a build without workbook support.
    pub fn is_available(&self) -> bool {
        match self {
            Self::Delimited => true,
            Self::Spreadsheet => crate::xlsx::is_available(),
        }
    }

    pub fn parse(&self, content: &SourceContent) -> Result<TabularData, IoError> {
        match (self, content) {
            (Self::Delimited, SourceContent::Text(text)) => crate::csv::parse(text),
            (Self::Spreadsheet, SourceContent::Binary(bytes)) => crate::xlsx::parse(bytes),
            (Self::Delimited, SourceContent::Binary(_)) => {
                Err(IoError::ContentMismatch { expected: "text" })
            }
            (Self::Spreadsheet, SourceContent::Text(_)) => {
                Err(IoError::ContentMismatch { expected: "binary" })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceContent {
    Text(String),
    Binary(Vec<u8>),
}

/// One file selected for import.
#[derive(Debug, Clone)]
pub struct SourceRequest {
    pub kind: SourceKind,
    pub path: PathBuf,
    /// Encoding label for delimited sources (e.g. "utf-8", "windows-1252").
    pub encoding: String,
}

impl SourceRequest {
    pub fn new(kind: SourceKind, path: impl Into<PathBuf>, encoding: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            encoding: encoding.into(),
        }
    }

    pub fn format(&self) -> SourceFormat {
        SourceFormat::for_kind(self.kind)
    }
}

/// Turns a request into content. Implemented over the filesystem for the
/// CLI and over memory in tests.
pub trait SourceReader: Sync {
    fn read(&self, request: &SourceRequest) -> Result<SourceContent, IoError>;
}

/// Reads from local paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read(&self, request: &SourceRequest) -> Result<SourceContent, IoError> {
        match request.format() {
            SourceFormat::Delimited => read_text(&request.path, &request.encoding).map(SourceContent::Text),
            SourceFormat::Spreadsheet => read_binary(&request.path).map(SourceContent::Binary),
        }
    }
}

/// Look up an encoding by WHATWG label.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, IoError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| IoError::UnknownEncoding(label.to_string()))
}

/// Decode bytes with the given encoding. A leading byte-order mark is
/// honored and stripped; malformed sequences become U+FFFD.
pub fn decode_text(bytes: &[u8], label: &str) -> Result<String, IoError> {
    let encoding = resolve_encoding(label)?;
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::warn!("malformed {} sequences replaced while decoding", used.name());
    }
    Ok(text.into_owned())
}

pub fn read_text(path: &Path, label: &str) -> Result<String, IoError> {
    // resolve first so a bad label fails before touching the disk
    resolve_encoding(label)?;
    let bytes = read_binary(path)?;
    decode_text(&bytes, label)
}

pub fn read_binary(path: &Path) -> Result<Vec<u8>, IoError> {
    std::fs::read(path).map_err(|e| IoError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read every request concurrently. Results keep request order; if any
/// read fails the first failure (in request order) is returned and no
/// content is handed back.
pub fn read_all<R: SourceReader>(
    reader: &R,
    requests: &[SourceRequest],
) -> Result<Vec<SourceContent>, IoError> {
    let results: Vec<Result<SourceContent, IoError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = requests
            .iter()
            .map(|req| scope.spawn(move || reader.read(req)))
            .collect();
        handles
            .into_iter()
            .zip(requests)
            .map(|(handle, req)| {
                handle.join().unwrap_or_else(|_| {
                    Err(IoError::Read {
                        path: req.path.display().to_string(),
                        message: "reader thread panicked".to_string(),
                    })
                })
            })
            .collect()
    });

    let contents = results.into_iter().collect::<Result<Vec<_>, _>>()?;
    log::debug!("read {} source(s)", contents.len());
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct MemoryReader(HashMap<PathBuf, Result<SourceContent, String>>);

    impl SourceReader for MemoryReader {
        fn read(&self, request: &SourceRequest) -> Result<SourceContent, IoError> {
            match self.0.get(&request.path) {
                Some(Ok(c)) => Ok(c.clone()),
                Some(Err(m)) => Err(IoError::Read {
                    path: request.path.display().to_string(),
                    message: m.clone(),
                }),
                None => Err(IoError::Read {
                    path: request.path.display().to_string(),
                    message: "not found".to_string(),
                }),
            }
        }
    }

    #[test]
    fn format_per_kind() {
        assert_eq!(SourceFormat::for_kind(SourceKind::Sales), SourceFormat::Delimited);
        assert_eq!(SourceFormat::for_kind(SourceKind::Items), SourceFormat::Delimited);
        assert_eq!(SourceFormat::for_kind(SourceKind::Insurance), SourceFormat::Spreadsheet);
        assert!(SourceFormat::Delimited.is_available());
    }

    #[test]
    fn windows_1252_decoding() {
        // "Cód" in windows-1252
        let bytes = [b'C', 0xF3, b'd'];
        assert_eq!(decode_text(&bytes, "windows-1252").unwrap(), "Cód");
        assert_eq!(decode_text(&bytes, "latin1").unwrap(), "Cód");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let bytes = b"\xEF\xBB\xBFA;B";
        assert_eq!(decode_text(bytes, "utf-8").unwrap(), "A;B");
    }

    #[test]
    fn unknown_label_is_fatal() {
        let err = decode_text(b"x", "klingon").unwrap_err();
        assert!(matches!(err, IoError::UnknownEncoding(ref l) if l == "klingon"));
    }

    #[test]
    fn fs_reader_reads_text_with_encoding() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(&[b'L', b'o', b'j', b'a', b';', 0xC9]).unwrap();
        let req = SourceRequest::new(SourceKind::Sales, f.path(), "windows-1252");
        let content = FsReader.read(&req).unwrap();
        assert_eq!(content, SourceContent::Text("Loja;É".to_string()));
    }

    #[test]
    fn missing_file_is_descriptive() {
        let req = SourceRequest::new(SourceKind::Items, "/no/such/Itens.csv", "utf-8");
        let err = FsReader.read(&req).unwrap_err();
        assert!(err.to_string().contains("/no/such/Itens.csv"));
    }

    #[test]
    fn read_all_keeps_request_order() {
        let reader = MemoryReader(HashMap::from([
            (PathBuf::from("v"), Ok(SourceContent::Text("v".into()))),
            (PathBuf::from("i"), Ok(SourceContent::Text("i".into()))),
            (PathBuf::from("t"), Ok(SourceContent::Binary(vec![1, 2]))),
        ]));
        let requests = [
            SourceRequest::new(SourceKind::Sales, "v", "utf-8"),
            SourceRequest::new(SourceKind::Items, "i", "utf-8"),
            SourceRequest::new(SourceKind::Insurance, "t", "utf-8"),
        ];
        let contents = read_all(&reader, &requests).unwrap();
        assert_eq!(
            contents,
            vec![
                SourceContent::Text("v".into()),
                SourceContent::Text("i".into()),
                SourceContent::Binary(vec![1, 2]),
            ]
        );
    }

    #[test]
    fn read_all_first_failure_aborts() {
        let reader = MemoryReader(HashMap::from([
            (PathBuf::from("v"), Ok(SourceContent::Text("v".into()))),
            (PathBuf::from("i"), Err("permission denied".to_string())),
        ]));
        let requests = [
            SourceRequest::new(SourceKind::Sales, "v", "utf-8"),
            SourceRequest::new(SourceKind::Items, "i", "utf-8"),
        ];
        let err = read_all(&reader, &requests).unwrap_err();
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn content_must_match_format() {
        let err = SourceFormat::Delimited
            .parse(&SourceContent::Binary(vec![]))
            .unwrap_err();
        assert!(matches!(err, IoError::ContentMismatch { .. }));
    }

    #[test]
    fn spreadsheet_availability_follows_the_feature() {
        assert!(SourceFormat::Delimited.is_available());
        assert_eq!(SourceFormat::Spreadsheet.is_available(), cfg!(feature = "xlsx"));
    }
}
