use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_FALLBACK_ASSET: &str = "ic_unknown";

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "webp", "jpg", "jpeg", "gif", "svg"];
const HEADER_PROBE_BYTES: usize = 256;

/// Opaque key the host resolves through its resource system.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    pub fn new(value: impl Into<String>) -> Self {
        AssetRef(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetRef {
    fn from(value: &str) -> Self {
        AssetRef(value.to_string())
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Answers whether a reference points at something the host can draw.
pub trait AssetSource {
    fn is_renderable(&self, asset: &AssetRef) -> bool;
}

/// In-memory resource table, the analogue of a bundled drawable index.
#[derive(Clone, Debug, Default)]
pub struct AssetTable {
    known: HashSet<AssetRef>,
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: impl Into<AssetRef>) {
        self.known.insert(asset.into());
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl<A: Into<AssetRef>> FromIterator<A> for AssetTable {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        AssetTable {
            known: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl AssetSource for AssetTable {
    fn is_renderable(&self, asset: &AssetRef) -> bool {
        self.known.contains(asset)
    }
}

/// Image files under a directory. `happy` resolves to the first of
/// `happy.png`, `happy.webp`, ... that exists and carries a recognised header.
#[derive(Clone, Debug)]
pub struct AssetDir {
    root: PathBuf,
}

impl AssetDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        AssetDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidate_paths(&self, asset: &AssetRef) -> Vec<PathBuf> {
        let relative = Path::new(asset.as_str());
        let stays_inside = !asset.as_str().is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !stays_inside {
            return Vec::new();
        }

        let mut paths = Vec::with_capacity(IMAGE_EXTENSIONS.len() + 1);
        if relative.extension().is_some() {
            paths.push(self.root.join(relative));
        }
        for ext in IMAGE_EXTENSIONS {
            paths.push(self.root.join(format!("{}.{}", asset.as_str(), ext)));
        }
        paths
    }
}

fn read_header(path: &Path) -> Option<Vec<u8>> {
    let mut file = File::open(path).ok()?;
    let mut header = vec![0u8; HEADER_PROBE_BYTES];
    let read = file.read(&mut header).ok()?;
    header.truncate(read);
    Some(header)
}

impl AssetSource for AssetDir {
    fn is_renderable(&self, asset: &AssetRef) -> bool {
        self.candidate_paths(asset)
            .iter()
            .filter_map(|path| read_header(path))
            .any(|header| looks_decodable(&header))
    }
}

/// Recognises the image containers the presentation layer can decode.
pub fn looks_decodable(header: &[u8]) -> bool {
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];

    if header.starts_with(PNG) || header.starts_with(JPEG) {
        return true;
    }
    if header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a") {
        return true;
    }
    if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"WEBP" {
        return true;
    }
    let text = String::from_utf8_lossy(header);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

/// Resolves asset references, substituting the fallback icon for anything the source
/// cannot render. Never fails.
pub struct AssetValidator {
    source: Box<dyn AssetSource>,
    fallback: AssetRef,
}

impl AssetValidator {
    pub fn new(source: impl AssetSource + 'static, fallback: impl Into<AssetRef>) -> Self {
        AssetValidator {
            source: Box::new(source),
            fallback: fallback.into(),
        }
    }

    pub fn fallback(&self) -> &AssetRef {
        &self.fallback
    }

    pub fn is_valid(&self, asset: &AssetRef) -> bool {
        self.source.is_renderable(asset)
    }

    pub fn resolve(&self, asset: &AssetRef) -> AssetRef {
        if self.is_valid(asset) {
            asset.clone()
        } else {
            warn!("Asset '{}' not renderable, using fallback '{}'", asset, self.fallback);
            self.fallback.clone()
        }
    }
}

impl fmt::Debug for AssetValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetValidator")
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}
