//! CBZ (zip comic archive) output.

use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::comic::{write_atomically, ComicFile, ComicMetadata};
use crate::error::{Error, Result};

/// Zip archive of page images named by their zero-padded page index.
pub struct CbzComic {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    pages: usize,
    metadata: ComicMetadata,
}

impl CbzComic {
    pub fn new(metadata: ComicMetadata) -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            pages: 0,
            metadata,
        }
    }

    fn comic_info(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <ComicInfo xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\">\n\
             \x20 <Title>{}</Title>\n\
             \x20 <Series>{}</Series>\n\
             \x20 <Number>{}</Number>\n\
             \x20 <PageCount>{}</PageCount>\n\
             </ComicInfo>\n",
            escape_xml(&self.metadata.title),
            escape_xml(&self.metadata.series),
            escape_xml(&self.metadata.number),
            self.pages
        )
    }
}

/// Archive entry name for a page, e.g. `0000000003.jpg`.
pub fn page_entry_name(index: usize, extension: &str) -> String {
    format!("{:010}.{}", index, extension)
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl ComicFile for CbzComic {
    fn append_page(&mut self, image: &[u8]) -> Result<()> {
        // Images are stored untouched; sniffing the format only picks the
        // entry extension and rejects non-image payloads.
        let format = image::guess_format(image)?;
        let extension = format.extensions_str().first().copied().unwrap_or("jpg");

        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        self.writer
            .start_file(page_entry_name(self.pages, extension), options)?;
        self.writer.write_all(image)?;
        self.pages += 1;

        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn finalize(mut self: Box<Self>, path: &Path) -> Result<()> {
        if self.pages == 0 {
            return Err(Error::EmptyComic(path.display().to_string()));
        }

        let info = self.comic_info();
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer.start_file("ComicInfo.xml", options)?;
        self.writer.write_all(info.as_bytes())?;

        let buffer = self.writer.finish()?.into_inner();
        write_atomically(path, &buffer)
    }
}
