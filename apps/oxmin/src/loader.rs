use anyhow::{Context, Result};
use ignore::WalkBuilder;
use log::{debug, trace, warn};
use oxmin_core::SourceFile;
use path_clean::clean;
use sourcemap::{DecodedMap, SourceMap};
use std::{
    fs,
    path::{Path, PathBuf},
};

const SOURCE_MAPPING_URL: &str = "//# sourceMappingURL=";

/// Loads every `.js` file under `root` as a bundle file, ordered by path.
///
/// A file's map comes from a `<file>.map` sidecar when there is one,
/// otherwise from an inline `data:` `sourceMappingURL` comment.
pub fn load_bundle(root: &Path) -> Result<Vec<SourceFile>> {
    debug!("Loading bundle from {}", root.display());
    let mut paths: Vec<PathBuf> = Vec::new();
    let walker = WalkBuilder::new(root).hidden(false).ignore(false).git_ignore(false).build();
    for res in walker {
        let dent = res?;
        let p = dent.path();
        if p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("js") {
            paths.push(p.to_path_buf());
        }
    }
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for p in paths {
        files.push(load_file(root, &p)?);
    }
    debug!("Loaded {} files from {}", files.len(), root.display());
    Ok(files)
}

fn load_file(root: &Path, path: &Path) -> Result<SourceFile> {
    let contents = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let logical = bundle_path(root, path);
    trace!("Loaded {} as {}", path.display(), logical);

    let mut file = SourceFile::new(logical, contents);
    file.source_map = match sidecar_map(path)? {
        Some(map) => Some(map),
        None => inline_map(&file.contents_as_string(), &file.path),
    };
    Ok(file)
}

/// Path relative to the bundle root, with `/` separators.
fn bundle_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> =
        rel.components().map(|c| c.as_os_str().to_string_lossy().to_string()).collect();
    clean(parts.join("/")).to_string_lossy().to_string()
}

fn sidecar_map(path: &Path) -> Result<Option<SourceMap>> {
    let mut map_path = path.as_os_str().to_owned();
    map_path.push(".map");
    let map_path = PathBuf::from(map_path);
    if !map_path.is_file() {
        return Ok(None);
    }

    let bytes =
        fs::read(&map_path).with_context(|| format!("Failed to read {}", map_path.display()))?;
    let map = SourceMap::from_slice(&bytes)
        .with_context(|| format!("Invalid source map {}", map_path.display()))?;
    trace!("Using sidecar map {}", map_path.display());
    Ok(Some(map))
}

fn inline_map(contents: &str, path: &str) -> Option<SourceMap> {
    let url = contents
        .lines()
        .rev()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(SOURCE_MAPPING_URL))?;
    if !url.starts_with("data:") {
        trace!("{} references an external map that is not a sidecar: {}", path, url);
        return None;
    }

    match sourcemap::decode_data_url(url) {
        Ok(DecodedMap::Regular(map)) => Some(map),
        Ok(_) => {
            warn!("Ignoring unsupported inline source map kind in {}", path);
            None
        }
        Err(e) => {
            warn!("Ignoring invalid inline source map in {}: {}", path, e);
            None
        }
    }
}
