//! Lexical path helpers for output layout and document-relative URIs
//!
//! Nothing here touches the file system: source textures and output
//! directories may not exist yet when paths are computed.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without consulting the file system
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path of `path` relative to directory `base`
///
/// Both are normalized lexically first. Walks up with `..` where the two
/// diverge, like `os.path.relpath` on already-absolute inputs.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path = normalize_lexically(path);
    let base = normalize_lexically(base);
    let mut path_components = path.components().peekable();
    let mut base_components = base.components().peekable();

    while let (Some(a), Some(b)) = (path_components.peek(), base_components.peek()) {
        if a != b {
            break;
        }
        path_components.next();
        base_components.next();
    }

    let mut out = PathBuf::new();
    for _ in base_components {
        out.push("..");
    }
    for component in path_components {
        out.push(component.as_os_str());
    }
    out
}

/// Join path components with `/` for use inside a glTF URI
pub fn to_uri(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Source texture reference as stored in the scene (`textures\foo\bar.dds`)
pub fn source_texture_path(texture_root: &Path, reference: &str) -> PathBuf {
    normalize_lexically(&texture_root.join(reference.replace('\\', "/")))
}

/// Where a converted texture lands under the output root
///
/// The path relative to `input_root` is lower-cased and a `source_extension`
/// suffix is swapped for `.png`.
pub fn texture_output_path(
    texture: &Path,
    input_root: &Path,
    output_root: &Path,
    source_extension: &str,
) -> PathBuf {
    let relative = relative_to(texture, input_root);
    let mut lowered = PathBuf::from(to_uri(&relative).to_lowercase());
    let source_extension = source_extension.trim_start_matches('.').to_lowercase();
    if lowered
        .extension()
        .is_some_and(|ext| ext.to_string_lossy() == source_extension)
    {
        lowered.set_extension("png");
    }
    normalize_lexically(&output_root.join(lowered))
}
