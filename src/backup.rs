use crate::db::{self, Collection};
use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
pub const BUNDLE_FORMAT_V1: &str = "schoold-data-v1";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
    pub restored: Vec<String>,
}

fn entry_name(c: Collection) -> String {
    format!("data/{}", c.file_name())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn export_bundle(data_dir: &Path, out_path: &Path) -> anyhow::Result<ExportSummary> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    if !data_dir.is_dir() {
        return Err(anyhow!(
            "data directory not found: {}",
            data_dir.to_string_lossy()
        ));
    }

    // Absent collections are written as empty so a restore replaces all five.
    let mut files = Vec::new();
    for c in Collection::ALL {
        let p = c.path_in(data_dir);
        let bytes = if p.is_file() {
            std::fs::read(&p).with_context(|| format!("failed to read {}", p.to_string_lossy()))?
        } else {
            c.empty_json().as_bytes().to_vec()
        };
        files.push((c, bytes));
    }

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let checksums: serde_json::Map<String, serde_json::Value> = files
        .iter()
        .map(|(c, bytes)| (entry_name(*c), json!(sha256_hex(bytes))))
        .collect();
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "sha256": checksums,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    for (c, bytes) in &files {
        zip.start_file(entry_name(*c), opts)
            .with_context(|| format!("failed to start {} entry", c.as_str()))?;
        zip.write_all(bytes)
            .with_context(|| format!("failed to write {} entry", c.as_str()))?;
    }

    zip.finish().context("failed to finalize zip bundle")?;
    tracing::info!(out = %out_path.display(), entries = files.len() + 1, "bundle exported");

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: files.len() + 1,
    })
}

/// Restores collection files from a bundle. Every entry is extracted and checked
/// before any live file is replaced; a collection the manifest does not list is
/// restored as empty.
pub fn import_bundle(in_path: &Path, data_dir: &Path) -> anyhow::Result<ImportSummary> {
    db::open_data_dir(data_dir)?;

    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }
    let checksums = manifest
        .get("sha256")
        .and_then(|v| v.as_object())
        .context("manifest missing sha256 table")?;

    let mut staged: Vec<(Collection, PathBuf)> = Vec::new();
    let result = (|| -> anyhow::Result<()> {
        for c in Collection::ALL {
            let name = entry_name(c);
            let bytes = match checksums.get(&name) {
                None => c.empty_json().as_bytes().to_vec(),
                Some(expected) => {
                    let expected = expected
                        .as_str()
                        .with_context(|| format!("bad checksum entry for {}", name))?;
                    let mut bytes = Vec::new();
                    archive
                        .by_name(&name)
                        .with_context(|| format!("bundle missing {}", name))?
                        .read_to_end(&mut bytes)
                        .with_context(|| format!("failed to read {}", name))?;
                    if sha256_hex(&bytes) != expected {
                        return Err(anyhow!("checksum mismatch for {}", name));
                    }
                    bytes
                }
            };
            let tmp = db::tmp_path(&c.path_in(data_dir));
            std::fs::write(&tmp, &bytes)
                .with_context(|| format!("failed to write {}", tmp.to_string_lossy()))?;
            staged.push((c, tmp));
        }
        Ok(())
    })();
    if let Err(e) = result {
        for (_, tmp) in &staged {
            let _ = std::fs::remove_file(tmp);
        }
        return Err(e);
    }

    let mut restored = Vec::new();
    for (c, tmp) in staged {
        let dst = c.path_in(data_dir);
        std::fs::rename(&tmp, &dst).with_context(|| {
            format!(
                "failed to move extracted {} to {}",
                c.as_str(),
                dst.to_string_lossy()
            )
        })?;
        restored.push(c.as_str().to_string());
    }
    tracing::info!(bundle = %in_path.display(), ?restored, "bundle imported");

    Ok(ImportSummary {
        bundle_format_detected: BUNDLE_FORMAT_V1.to_string(),
        restored,
    })
}
