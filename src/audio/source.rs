use std::path::PathBuf;

/// Where to load a clip from. The core engine never sees this type directly —
/// it only ever receives the decoded [`super::AudioClip`] that loading one of
/// these variants produces.
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// A local file path, decoded by container/codec according to extension/content.
    Path(PathBuf),
    /// A remote URL, fetched over HTTP(S) then decoded the same way as `Path`.
    Url(String),
    /// An in-memory encoded byte buffer (container sniffed from content).
    Bytes(Vec<u8>),
    /// Already-decoded mono samples, passed straight through.
    Samples { samples: Vec<f32>, sample_rate: u32 },
}
