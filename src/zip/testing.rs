//! Archive fixtures for unit tests, written with an independent zip writer.

use std::io::{Cursor, Write};

use ::zip::write::SimpleFileOptions;
use ::zip::{CompressionMethod, ZipWriter};

pub(crate) enum ArchiveSpec<'a> {
    File {
        name: &'a str,
        data: &'a [u8],
        method: CompressionMethod,
    },
    Directory(&'a str),
}

impl<'a> ArchiveSpec<'a> {
    pub(crate) fn stored(name: &'a str, data: &'a [u8]) -> Self {
        ArchiveSpec::File {
            name,
            data,
            method: CompressionMethod::Stored,
        }
    }

    pub(crate) fn deflated(name: &'a str, data: &'a [u8]) -> Self {
        ArchiveSpec::File {
            name,
            data,
            method: CompressionMethod::Deflated,
        }
    }

    pub(crate) fn directory(name: &'a str) -> Self {
        ArchiveSpec::Directory(name)
    }
}

pub(crate) fn build_archive(specs: &[ArchiveSpec<'_>]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for spec in specs {
        match spec {
            ArchiveSpec::File { name, data, method } => {
                let options = SimpleFileOptions::default().compression_method(*method);
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
            ArchiveSpec::Directory(name) => {
                writer
                    .add_directory(*name, SimpleFileOptions::default())
                    .unwrap();
            }
        }
    }

    writer.finish().unwrap().into_inner()
}
