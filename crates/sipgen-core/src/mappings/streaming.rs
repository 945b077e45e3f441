use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SipError};

pub const DEFAULT_STREAMING_BASE_URL: &str = "https://durastream.lib.unc.edu/player";

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "aac", "flac", "ogg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingMediaType {
    Sound,
    Video,
}

impl StreamingMediaType {
    pub fn for_filename(filename: &str) -> Self {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension {
            Some(ext) if AUDIO_EXTENSIONS.contains(&ext.as_str()) => StreamingMediaType::Sound,
            _ => StreamingMediaType::Video,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamingMediaType::Sound => "sound",
            StreamingMediaType::Video => "video",
        }
    }
}

impl fmt::Display for StreamingMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamingEntry {
    pub id: String,
    pub streaming_file: String,
    pub streaming_space: String,
}

/// Playback link attached to a file that has no original datastream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamingReference {
    pub url: String,
    pub media_type: StreamingMediaType,
}

#[derive(Debug, Clone)]
pub struct StreamingMetadataService {
    base_url: String,
    entries: HashMap<String, StreamingEntry>,
}

impl StreamingMetadataService {
    pub fn new(base_url: impl Into<String>, entries: Vec<StreamingEntry>) -> Self {
        Self {
            base_url: base_url.into(),
            entries: entries
                .into_iter()
                .map(|entry| (entry.id.clone(), entry))
                .collect(),
        }
    }

    pub fn load_csv(base_url: impl Into<String>, path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|err| SipError::csv(path, err))?;
        let mut entries = Vec::new();
        for row in reader.deserialize::<StreamingEntry>() {
            let row = row.map_err(|err| SipError::csv(path, err))?;
            if row.streaming_file.trim().is_empty() {
                continue;
            }
            entries.push(row);
        }
        Ok(Self::new(base_url, entries))
    }

    pub fn load_optional(base_url: impl Into<String>, path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_csv(base_url, path),
            None => Ok(Self::new(base_url, Vec::new())),
        }
    }

    pub fn get(&self, legacy_id: &str) -> Option<&StreamingEntry> {
        self.entries.get(legacy_id)
    }

    pub fn reference_for(&self, legacy_id: &str) -> Option<StreamingReference> {
        let entry = self.get(legacy_id)?;
        Some(StreamingReference {
            url: format!(
                "{}?spaceId={}&filename={}",
                self.base_url, entry.streaming_space, entry.streaming_file
            ),
            media_type: StreamingMediaType::for_filename(&entry.streaming_file),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_builds_playback_url() {
        let service = StreamingMetadataService::new(
            DEFAULT_STREAMING_BASE_URL,
            vec![StreamingEntry {
                id: "17".into(),
                streaming_file: "gilmer_interview-playlist.m3u8".into(),
                streaming_space: "open-hls".into(),
            }],
        );
        let reference = service.reference_for("17").expect("reference");
        assert_eq!(
            reference.url,
            "https://durastream.lib.unc.edu/player?spaceId=open-hls&filename=gilmer_interview-playlist.m3u8"
        );
        assert_eq!(reference.media_type, StreamingMediaType::Video);
        assert!(service.reference_for("18").is_none());
    }

    #[test]
    fn audio_extensions_are_sound() {
        assert_eq!(
            StreamingMediaType::for_filename("song.MP3"),
            StreamingMediaType::Sound
        );
        assert_eq!(
            StreamingMediaType::for_filename("noext"),
            StreamingMediaType::Video
        );
    }
}
