// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Decides which files of a bundle are native binaries worth scanning for dependencies.

use serde::Serialize;
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use super::errors::{ScanError, ScanResult};
use super::sniff::{self, ContentType, SNIFF_LEN};

/// ELF magic bytes: 0x7f followed by ASCII "ELF".
const ELF_MAGIC: [u8; 4] = [0x7f, 0x45, 0x4c, 0x46];

/// Any of the owner/group/other execute bits.
const EXECUTE_BITS: u32 = 0o111;

/// ELF file type (wrapper around `goblin::elf::header::e_type`), read from the sniffed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElfType {
    None,
    Relocatable,
    Executable,
    SharedObject,
    Core,
    /// Generic binary data without an ELF header.
    NotElf,
}

impl ElfType {
    fn from_header(bytes: &[u8]) -> Self {
        if !bytes.starts_with(&ELF_MAGIC) {
            return Self::NotElf;
        }
        match goblin::elf::Elf::parse_header(bytes).map(|header| header.e_type) {
            Ok(goblin::elf::header::ET_REL) => Self::Relocatable,
            Ok(goblin::elf::header::ET_EXEC) => Self::Executable,
            Ok(goblin::elf::header::ET_DYN) => Self::SharedObject,
            Ok(goblin::elf::header::ET_CORE) => Self::Core,
            Ok(_) => Self::None,
            Err(_) => Self::NotElf,
        }
    }
}

/// A native binary found in the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binary {
    path: PathBuf,
    size: u64,
    mode: u32,
    kind: ElfType,
}

/// Why a file was not selected for scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Directory,
    Empty,
    NotExecutable,
    /// Symlinks are scanned at their target, not directly.
    Symlink,
    NotBinary(ContentType),
    /// Generic binary data, but with an extension that is not a shared object.
    Extension,
}

/// Outcome of classifying a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Candidate(Binary),
    Skipped(SkipReason),
}

impl Binary {
    /// Classify the file at `path`.
    ///
    /// The rules are applied in order: directories, empty files, files without any execute
    /// bit and symlinks are skipped; the remaining files are sniffed and only generic binary
    /// content is kept, provided the file has no extension or its path contains `.so`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be stat'ed, opened or read.
    pub fn classify(path: &Path) -> ScanResult<Classification> {
        let metadata = fs::symlink_metadata(path).map_err(|e| ScanError::StatFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file_type = metadata.file_type();

        if file_type.is_dir() {
            return Ok(Classification::Skipped(SkipReason::Directory));
        }
        if metadata.len() == 0 {
            return Ok(Classification::Skipped(SkipReason::Empty));
        }
        let mode = metadata.permissions().mode();
        if mode & EXECUTE_BITS == 0 {
            return Ok(Classification::Skipped(SkipReason::NotExecutable));
        }
        if file_type.is_symlink() {
            return Ok(Classification::Skipped(SkipReason::Symlink));
        }

        let head = Self::read_head(path)?;
        let content_type = sniff::detect(&head);
        if content_type != ContentType::Binary {
            return Ok(Classification::Skipped(SkipReason::NotBinary(content_type)));
        }
        if !Self::has_binary_name(path) {
            return Ok(Classification::Skipped(SkipReason::Extension));
        }

        Ok(Classification::Candidate(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            mode,
            kind: ElfType::from_header(&head),
        }))
    }

    /// Native binaries either have no extension or are shared objects (`.so`, `.so.1`, ...).
    fn has_binary_name(path: &Path) -> bool {
        path.extension().is_none() || path.to_string_lossy().contains(".so")
    }

    /// Read up to [`SNIFF_LEN`] bytes and rewind the file afterwards.
    fn read_head(path: &Path) -> ScanResult<Vec<u8>> {
        let mut file = fs::File::open(path).map_err(|e| ScanError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let read_failed = |e| ScanError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        };

        let mut head = Vec::with_capacity(SNIFF_LEN);
        (&mut file)
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut head)
            .map_err(read_failed)?;
        file.seek(SeekFrom::Start(0)).map_err(read_failed)?;
        Ok(head)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Unix permission bits, including the file type bits.
    #[must_use]
    pub fn mode(&self) -> u32 {
        self.mode
    }

    #[must_use]
    pub fn kind(&self) -> ElfType {
        self.kind
    }

    /// The file name of the binary.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("")
    }

    #[cfg(test)]
    pub(crate) fn new_for_testing(path: &str, kind: ElfType) -> Self {
        Self {
            path: PathBuf::from(path),
            size: 1,
            mode: 0o100_755,
            kind,
        }
    }
}
