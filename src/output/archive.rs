//! Archive Output
//!
//! 複数の出力ファイルを1つのZIPアーカイブにまとめる。

use std::collections::HashSet;
use std::io::{Cursor, Write};

use log::{debug, warn};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use super::{CleanedFile, SkippedFile};
use crate::error::SibsError;
use crate::security::sanitize_archive_entry_name;

/// パッケージング結果
#[derive(Debug, Clone)]
pub struct PackagedArchive {
    /// ZIPファイルのバイト列
    pub bytes: Vec<u8>,

    /// 安全なエントリ名にできず、アーカイブから外したファイル
    pub rejected: Vec<SkippedFile>,
}

/// 出力ファイルをZIP（deflate）にまとめる
///
/// エントリ名は出力ファイル名をそのまま使います（相対パスを含む場合も保持）。
/// 安全でない名前は整えてから書き込み、整えても使えない名前のファイルは
/// `rejected`に記録して残りのファイルだけをまとめます。
/// 同名のエントリが重なった場合は、2件目以降に連番を付けます。
pub fn package_archive(files: &[CleanedFile]) -> Result<PackagedArchive, SibsError> {
    let mut buffer = Cursor::new(Vec::new());
    let mut rejected = Vec::new();
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut used = HashSet::new();

        for file in files {
            let safe_name = match sanitize_archive_entry_name(&file.name) {
                Ok(name) => name,
                Err(e) => {
                    warn!("leaving {} out of the archive: {}", file.name, e);
                    rejected.push(SkippedFile {
                        name: file.source_name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            if safe_name != file.name {
                debug!("archive entry {} stored as {}", file.name, safe_name);
            }

            let entry_name = unique_entry_name(&safe_name, &mut used);
            zip.start_file(entry_name, options)?;
            zip.write_all(&file.bytes)?;
        }

        zip.finish()?;
    }

    Ok(PackagedArchive {
        bytes: buffer.into_inner(),
        rejected,
    })
}

/// 重複しないエントリ名を返す（`a_LIMPO.xlsx` -> `a_LIMPO_2.xlsx`）
fn unique_entry_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(idx) => (&name[..idx], &name[idx..]),
        None => (name, ""),
    };
    let mut counter = 2;
    loop {
        let candidate = format!("{}_{}{}", stem, counter, ext);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::ExtractionStats;
    use crate::formatter::FormatReport;
    use crate::types::RecordSet;
    use std::io::Read;
    use zip::ZipArchive;

    fn file(name: &str, bytes: &[u8]) -> CleanedFile {
        CleanedFile {
            source_name: name.to_string(),
            name: name.to_string(),
            bytes: bytes.to_vec(),
            records: RecordSet::new(),
            stats: ExtractionStats::default(),
            format_report: FormatReport::new(),
            fallback_reason: None,
        }
    }

    #[test]
    fn test_package_archive_entries() {
        let packaged = package_archive(&[
            file("jan_LIMPO.xlsx", b"first"),
            file("2024/fev_LIMPO.xlsx", b"second"),
        ])
        .unwrap();
        assert!(packaged.rejected.is_empty());

        let mut archive = ZipArchive::new(Cursor::new(packaged.bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut entry = archive.by_name("2024/fev_LIMPO.xlsx").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "second");
    }

    #[test]
    fn test_package_archive_duplicate_names() {
        let packaged = package_archive(&[
            file("a_LIMPO.xlsx", b"1"),
            file("a_LIMPO.xlsx", b"2"),
            file("a_LIMPO.xlsx", b"3"),
        ])
        .unwrap();

        let archive = ZipArchive::new(Cursor::new(packaged.bytes)).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["a_LIMPO.xlsx", "a_LIMPO_2.xlsx", "a_LIMPO_3.xlsx"]);
    }

    #[test]
    fn test_package_archive_sanitizes_unsafe_names() {
        let packaged = package_archive(&[
            file("jan_LIMPO.xlsx", b"1"),
            file("../evil_LIMPO.xlsx", b"2"),
            file("a\\b_LIMPO.xlsx", b"3"),
        ])
        .unwrap();
        assert!(packaged.rejected.is_empty());

        let archive = ZipArchive::new(Cursor::new(packaged.bytes)).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["a_b_LIMPO.xlsx", "evil_LIMPO.xlsx", "jan_LIMPO.xlsx"]);
    }

    #[test]
    fn test_package_archive_keeps_good_entries_when_one_is_unusable() {
        let packaged = package_archive(&[
            file("jan_LIMPO.xlsx", b"1"),
            file("dir/..", b"2"),
            file("fev_LIMPO.xlsx", b"3"),
        ])
        .unwrap();

        assert_eq!(packaged.rejected.len(), 1);
        assert_eq!(packaged.rejected[0].name, "dir/..");

        let archive = ZipArchive::new(Cursor::new(packaged.bytes)).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["fev_LIMPO.xlsx", "jan_LIMPO.xlsx"]);
    }

    #[test]
    fn test_unique_entry_name_without_extension() {
        let mut used = HashSet::new();
        assert_eq!(unique_entry_name("a", &mut used), "a");
        assert_eq!(unique_entry_name("a", &mut used), "a_2");
    }
}
