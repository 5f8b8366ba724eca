// Projection of preview-frame-rate and preview-size-values into capability records.
use std::fmt;

use serde::Serialize;

use crate::core::codec::ParameterMap;
use crate::core::numeric::parse_leading_int;

pub const PREVIEW_FRAME_RATE: &str = "preview-frame-rate";
pub const PREVIEW_SIZE_VALUES: &str = "preview-size-values";

const DIMENSION_SEPARATOR: char = 'x';

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryKind {
    DroidSurface,
}

impl MemoryKind {
    /// Caps feature name attached to records backed by this memory.
    pub fn caps_feature(self) -> &'static str {
        match self {
            MemoryKind::DroidSurface => "memory:DroidSurface",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    /// Parses `WxH`. Each half is read permissively (leading digits only) and
    /// must come out positive; anything else is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut halves = text.split(DIMENSION_SEPARATOR);
        let width = positive(halves.next()?)?;
        let height = positive(halves.next()?)?;
        Some(Self { width, height })
    }
}

fn positive(text: &str) -> Option<u32> {
    u32::try_from(parse_leading_int(text)).ok().filter(|value| *value > 0)
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CapabilityRecord {
    pub width: u32,
    pub height: u32,
    pub framerate_num: u32,
    pub framerate_den: u32,
    pub memory: MemoryKind,
}

impl CapabilityRecord {
    pub const FORMAT: &'static str = "ENCODED";
    pub const MEDIA_TYPE: &'static str = "video/x-raw";

    pub fn new(dimension: Dimension, framerate_num: u32) -> Self {
        Self {
            width: dimension.width,
            height: dimension.height,
            framerate_num,
            framerate_den: 1,
            memory: MemoryKind::DroidSurface,
        }
    }

    pub fn to_caps_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CapabilityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}), format=(string){}, width=(int){}, height=(int){}, framerate=(fraction){}/{}",
            Self::MEDIA_TYPE,
            self.memory.caps_feature(),
            Self::FORMAT,
            self.width,
            self.height,
            self.framerate_num,
            self.framerate_den
        )
    }
}

/// Integer value of the first element of `key`, or `-1` when the key is absent.
pub(crate) fn int_value(map: &ParameterMap, key: &str) -> i32 {
    map.first(key).map(parse_leading_int).unwrap_or(-1)
}

/// Records for every valid `preview-size-values` entry at `fps`, where `fps`
/// is the value of `preview-frame-rate` already read by the caller.
pub(crate) fn viewfinder_caps(fps: i32, map: &ParameterMap) -> Vec<CapabilityRecord> {
    let Some(fps) = u32::try_from(fps).ok().filter(|fps| *fps > 0) else {
        tracing::debug!(fps, "frame rate is not positive; no viewfinder caps");
        return Vec::new();
    };
    let Some(sizes) = map.get(PREVIEW_SIZE_VALUES) else {
        return Vec::new();
    };

    sizes
        .iter()
        .filter_map(|size| {
            let dimension = Dimension::parse(size);
            if dimension.is_none() {
                tracing::trace!(size = size.as_str(), "skipping invalid dimension");
            }
            dimension
        })
        .map(|dimension| CapabilityRecord::new(dimension, fps))
        .collect()
}
