use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Mp4,
    Wav,
    Txt,
}

impl Extension {
    /// Return the extension with the leading dot.
    /// e.g. ".ext"
    pub fn with_dot(self) -> &'static str {
        match self {
            Extension::Mp4 => ".mp4",
            Extension::Wav => ".wav",
            Extension::Txt => ".txt",
        }
    }

    /// Return the extension without the leading dot
    pub fn with_no_dot(self) -> &'static str {
        &self.with_dot()[1..]
    }

    /// Parse the path file extension.
    /// Return None in case of no or invalid extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext {
                "mp4" => Some(Self::Mp4),
                "wav" => Some(Self::Wav),
                "txt" => Some(Self::Txt),
                _ => None,
            })
    }
}
