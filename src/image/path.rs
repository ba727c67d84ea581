//! Validated image file path.
//!
//! Only checks the extension; existence is the reader's concern.
use crate::error::{OrientationError, Result};
use std::fmt;
use std::path::Path;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// A path string ending in `.jpg`, `.jpeg`, `.png` or `.bmp` (any case).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImagePath {
    value: String,
}

impl ImagePath {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let valid = value
            .rsplit_once('.')
            .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)));
        if !valid {
            return Err(OrientationError::InvalidImagePath(value));
        }
        Ok(Self { value })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.value)
    }
}

impl fmt::Display for ImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<Path> for ImagePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_extensions_any_case() {
        for p in ["valid/path/image.jpeg", "a.jpg", "b.PNG", "c.Bmp", "non_existent_file.png"] {
            let path = ImagePath::new(p).expect("valid path");
            assert_eq!(path.as_str(), p);
        }
    }

    #[test]
    fn rejects_other_extensions() {
        for p in [
            "path/with/wrong_extension.txt",
            "/path/to/a/directory",
            "image.png.txt",
            "dir.png/",
            "",
        ] {
            assert_eq!(
                ImagePath::new(p),
                Err(OrientationError::InvalidImagePath(p.to_string()))
            );
        }
    }
}
