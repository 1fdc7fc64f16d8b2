// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Content-type sniffing from the leading bytes of a file.
//!
//! Follows the WHATWG MIME sniffing rules for the signatures relevant here: markup,
//! documents, images, audio/video containers, fonts and archives are recognized by
//! their magic bytes, data without binary control bytes is text, and anything else
//! falls into the generic binary class.

use serde::Serialize;

/// Number of leading bytes considered when sniffing.
pub(crate) const SNIFF_LEN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentType {
    Html,
    Xml,
    Pdf,
    PostScript,
    Image,
    Audio,
    Video,
    Font,
    Archive,
    Wasm,
    Text,
    /// Generic binary data (`application/octet-stream`).
    Binary,
}

const WHITESPACE: &[u8] = b"\t\n\x0c\r ";

// Each tag must be followed by a space or `>` to count.
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

const PREFIXES: &[(&[u8], ContentType)] = &[
    (b"%PDF-", ContentType::Pdf),
    (b"%!PS-Adobe-", ContentType::PostScript),
    // Byte order marks.
    (b"\xFE\xFF", ContentType::Text),
    (b"\xFF\xFE", ContentType::Text),
    (b"\xEF\xBB\xBF", ContentType::Text),
    (b"\x00\x00\x01\x00", ContentType::Image),
    (b"\x00\x00\x02\x00", ContentType::Image),
    (b"BM", ContentType::Image),
    (b"GIF87a", ContentType::Image),
    (b"GIF89a", ContentType::Image),
    (b"\x89PNG\x0D\x0A\x1A\x0A", ContentType::Image),
    (b"\xFF\xD8\xFF", ContentType::Image),
    (b"ID3", ContentType::Audio),
    (b"OggS\x00", ContentType::Audio),
    (b"MThd\x00\x00\x00\x06", ContentType::Audio),
    (b"\x1A\x45\xDF\xA3", ContentType::Video),
    (b"wOFF", ContentType::Font),
    (b"wOF2", ContentType::Font),
    (b"\x1F\x8B\x08", ContentType::Archive),
    (b"PK\x03\x04", ContentType::Archive),
    (b"Rar!\x1A\x07\x00", ContentType::Archive),
    (b"Rar!\x1A\x07\x01\x00", ContentType::Archive),
    (b"\x00asm", ContentType::Wasm),
];

// RIFF containers carry their type at offset 8.
const RIFF_TYPES: &[(&[u8], ContentType)] = &[
    (b"WEBPVP", ContentType::Image),
    (b"WAVE", ContentType::Audio),
    (b"AVI ", ContentType::Video),
];

/// Classify `data` (at most the first [`SNIFF_LEN`] bytes are used).
#[must_use]
pub fn detect(data: &[u8]) -> ContentType {
    let data = &data[..data.len().min(SNIFF_LEN)];

    let markup = trim_leading_whitespace(data);
    if is_html(markup) {
        return ContentType::Html;
    }
    if markup.starts_with(b"<?xml") {
        return ContentType::Xml;
    }
    if let Some((_, kind)) = PREFIXES.iter().find(|(magic, _)| data.starts_with(magic)) {
        return *kind;
    }
    if let Some(kind) = riff_type(data) {
        return kind;
    }
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        return ContentType::Video;
    }
    if data.iter().any(|b| is_binary_byte(*b)) {
        ContentType::Binary
    } else {
        ContentType::Text
    }
}

fn trim_leading_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !WHITESPACE.contains(b))
        .unwrap_or(data.len());
    &data[start..]
}

fn is_html(data: &[u8]) -> bool {
    HTML_TAGS.iter().any(|tag| {
        data.len() > tag.len()
            && data[..tag.len()].eq_ignore_ascii_case(tag)
            && matches!(data[tag.len()], b' ' | b'>')
    })
}

fn riff_type(data: &[u8]) -> Option<ContentType> {
    if !data.starts_with(b"RIFF") || data.len() < 8 {
        return None;
    }
    RIFF_TYPES
        .iter()
        .find(|(tag, _)| data[8..].starts_with(tag))
        .map(|(_, kind)| *kind)
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elf_header_is_binary() {
        let header = b"\x7fELF\x02\x01\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x03\x00\x3e\x00";
        assert_eq!(detect(header), ContentType::Binary);
    }

    #[test]
    fn test_scripts_are_text() {
        assert_eq!(detect(b"#!/bin/sh\necho hello\n"), ContentType::Text);
        assert_eq!(detect(b"#!/usr/bin/env python3\n"), ContentType::Text);
    }

    #[test]
    fn test_empty_is_text() {
        assert_eq!(detect(b""), ContentType::Text);
    }

    #[test]
    fn test_markup() {
        assert_eq!(detect(b"  <html><body></body></html>"), ContentType::Html);
        assert_eq!(detect(b"<!doctype html>"), ContentType::Html);
        assert_eq!(detect(b"<?xml version=\"1.0\"?>"), ContentType::Xml);
        // Not followed by a space or `>`.
        assert_eq!(detect(b"<Applet"), ContentType::Text);
    }

    #[test]
    fn test_signatures() {
        let cases: &[(&[u8], ContentType)] = &[
            (b"%PDF-1.7\n\x00", ContentType::Pdf),
            (b"\x89PNG\x0D\x0A\x1A\x0A\x00\x00", ContentType::Image),
            (b"\x1F\x8B\x08\x00\x00", ContentType::Archive),
            (b"PK\x03\x04\x14\x00", ContentType::Archive),
            (b"RIFF\x00\x00\x00\x00WAVEfmt ", ContentType::Audio),
            (b"RIFF\x00\x00\x00\x00WEBPVP8 ", ContentType::Image),
            (b"\x00\x00\x00\x18ftypmp42\x00\x00", ContentType::Video),
            (b"\x00asm\x01\x00\x00\x00", ContentType::Wasm),
            (b"wOF2\x00\x01", ContentType::Font),
        ];
        for (data, expected) in cases {
            assert_eq!(detect(data), *expected, "data: {data:?}");
        }
    }

    #[test]
    fn test_binary_control_bytes() {
        assert_eq!(detect(b"plain\x1btext\r\n\t"), ContentType::Text);
        assert_eq!(detect(b"data\x01\x02"), ContentType::Binary);
    }
}
