use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::model::{Properties, PropertyValue, SampleSeries, SAMPLE_SPACING_PROPERTY};

// ---------------------------------------------------------------------------
// Format constants
// ---------------------------------------------------------------------------

pub(crate) const SEGMENT_TAG: &[u8; 4] = b"TDSm";
pub(crate) const LEAD_IN_LEN: usize = 28;

pub(crate) const TOC_META_DATA: u32 = 1 << 1;
pub(crate) const TOC_NEW_OBJ_LIST: u32 = 1 << 2;
pub(crate) const TOC_RAW_DATA: u32 = 1 << 3;
pub(crate) const TOC_INTERLEAVED_DATA: u32 = 1 << 5;
pub(crate) const TOC_BIG_ENDIAN: u32 = 1 << 6;
pub(crate) const TOC_DAQMX_RAW_DATA: u32 = 1 << 7;

pub(crate) const NO_RAW_DATA: u32 = 0xFFFF_FFFF;
pub(crate) const REUSE_PREVIOUS_INDEX: u32 = 0x0000_0000;
const DAQMX_FORMAT_CHANGING: u32 = 0x6912_0000;
const DAQMX_DIGITAL_LINE_SCALER: u32 = 0x6913_0000;

/// Seconds between 1904-01-01 (TDMS epoch) and 1970-01-01.
const TDMS_EPOCH_OFFSET_SECS: i64 = -2_082_844_800;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TdmsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad segment tag at byte {offset}: expected \"TDSm\"")]
    BadTag { offset: usize },
    #[error("unsupported TDMS version {0}")]
    UnsupportedVersion(u32),
    #[error("unexpected end of data at byte {offset} while reading {what}")]
    UnexpectedEof { offset: usize, what: &'static str },
    #[error("segment at byte {offset} is corrupt: {reason}")]
    CorruptSegment { offset: usize, reason: String },
    #[error("unsupported data type code 0x{0:08X}")]
    UnsupportedDataType(u32),
    #[error("DAQmx raw data is not supported (object {0})")]
    DaqmxUnsupported(String),
    #[error("object {path} has unsupported array dimension {dimension}")]
    UnsupportedDimension { path: String, dimension: u32 },
    #[error("object {0} reuses a raw data index it never defined")]
    MissingPreviousIndex(String),
    #[error("interleaved string data is not supported (object {0})")]
    InterleavedStrings(String),
    #[error("invalid object path {0:?}")]
    InvalidPath(String),
    #[error("invalid UTF-8 string at byte {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("group {0:?} not found")]
    GroupNotFound(String),
    #[error("channel {channel:?} not found in group {group:?}")]
    ChannelNotFound { group: String, channel: String },
    #[error("channel {channel:?} holds {data_type} data, not numbers")]
    NonNumeric { channel: String, data_type: DataType },
    #[error("channel {0:?} has no wf_increment property")]
    MissingSpacing(String),
    #[error("channel {channel:?} has invalid sample spacing {spacing}")]
    InvalidSpacing { channel: String, spacing: f64 },
}

pub type Result<T> = std::result::Result<T, TdmsError>;

// ---------------------------------------------------------------------------
// DataType
// ---------------------------------------------------------------------------

/// Value types that can appear in raw data or properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Bool,
    Timestamp,
}

impl DataType {
    pub fn from_code(code: u32) -> Result<Self> {
        Ok(match code {
            0x01 => DataType::I8,
            0x02 => DataType::I16,
            0x03 => DataType::I32,
            0x04 => DataType::I64,
            0x05 => DataType::U8,
            0x06 => DataType::U16,
            0x07 => DataType::U32,
            0x08 => DataType::U64,
            // Plain and "with unit" variants share a layout.
            0x09 | 0x19 => DataType::F32,
            0x0A | 0x1A => DataType::F64,
            0x20 => DataType::String,
            0x21 => DataType::Bool,
            0x44 => DataType::Timestamp,
            other => return Err(TdmsError::UnsupportedDataType(other)),
        })
    }

    pub fn code(self) -> u32 {
        match self {
            DataType::I8 => 0x01,
            DataType::I16 => 0x02,
            DataType::I32 => 0x03,
            DataType::I64 => 0x04,
            DataType::U8 => 0x05,
            DataType::U16 => 0x06,
            DataType::U32 => 0x07,
            DataType::U64 => 0x08,
            DataType::F32 => 0x09,
            DataType::F64 => 0x0A,
            DataType::String => 0x20,
            DataType::Bool => 0x21,
            DataType::Timestamp => 0x44,
        }
    }

    /// Fixed size in bytes, `None` for variable-length strings.
    pub fn size(self) -> Option<usize> {
        match self {
            DataType::I8 | DataType::U8 | DataType::Bool => Some(1),
            DataType::I16 | DataType::U16 => Some(2),
            DataType::I32 | DataType::U32 | DataType::F32 => Some(4),
            DataType::I64 | DataType::U64 | DataType::F64 => Some(8),
            DataType::Timestamp => Some(16),
            DataType::String => None,
        }
    }

    /// Whether raw values of this type decode to plottable numbers.
    pub fn is_numeric(self) -> bool {
        !matches!(self, DataType::String | DataType::Timestamp)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::I8 => "int8",
            DataType::I16 => "int16",
            DataType::I32 => "int32",
            DataType::I64 => "int64",
            DataType::U8 => "uint8",
            DataType::U16 => "uint16",
            DataType::U32 => "uint32",
            DataType::U64 => "uint64",
            DataType::F32 => "float32",
            DataType::F64 => "float64",
            DataType::String => "string",
            DataType::Bool => "boolean",
            DataType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Byte cursor
// ---------------------------------------------------------------------------

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Absolute file offset of `bytes[0]`, for error messages.
    base: usize,
    big_endian: bool,
}

macro_rules! read_number {
    ($name:ident, $ty:ty, $len:literal) => {
        fn $name(&mut self, what: &'static str) -> Result<$ty> {
            let raw: [u8; $len] = self.array(what)?;
            Ok(if self.big_endian {
                <$ty>::from_be_bytes(raw)
            } else {
                <$ty>::from_le_bytes(raw)
            })
        }
    };
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8], base: usize, big_endian: bool) -> Self {
        Self {
            bytes,
            pos: 0,
            base,
            big_endian,
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &'static str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(TdmsError::UnexpectedEof {
                offset: self.base + self.pos,
                what,
            });
        }
        let out = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    read_number!(i8, i8, 1);
    read_number!(u8, u8, 1);
    read_number!(i16, i16, 2);
    read_number!(u16, u16, 2);
    read_number!(i32, i32, 4);
    read_number!(u32, u32, 4);
    read_number!(i64, i64, 8);
    read_number!(u64, u64, 8);
    read_number!(f32, f32, 4);
    read_number!(f64, f64, 8);

    fn string(&mut self, what: &'static str) -> Result<String> {
        let len = self.u32(what)? as usize;
        let offset = self.base + self.pos;
        let raw = self.take(len, what)?;
        String::from_utf8(raw.to_vec()).map_err(|_| TdmsError::InvalidUtf8 { offset })
    }

    fn timestamp(&mut self) -> Result<PropertyValue> {
        // Little-endian: fractions first; big-endian: seconds first.
        let (seconds, fractions) = if self.big_endian {
            let s = self.i64("timestamp seconds")?;
            (s, self.u64("timestamp fractions")?)
        } else {
            let f = self.u64("timestamp fractions")?;
            (self.i64("timestamp seconds")?, f)
        };
        Ok(timestamp_value(seconds, fractions))
    }

    fn property_value(&mut self, data_type: DataType) -> Result<PropertyValue> {
        Ok(match data_type {
            DataType::I8 => PropertyValue::Integer(self.i8("property")? as i64),
            DataType::I16 => PropertyValue::Integer(self.i16("property")? as i64),
            DataType::I32 => PropertyValue::Integer(self.i32("property")? as i64),
            DataType::I64 => PropertyValue::Integer(self.i64("property")?),
            DataType::U8 => PropertyValue::Integer(self.u8("property")? as i64),
            DataType::U16 => PropertyValue::Integer(self.u16("property")? as i64),
            DataType::U32 => PropertyValue::Integer(self.u32("property")? as i64),
            DataType::U64 => {
                let v = self.u64("property")?;
                i64::try_from(v)
                    .map(PropertyValue::Integer)
                    .unwrap_or(PropertyValue::Unsigned(v))
            }
            DataType::F32 => PropertyValue::Float(self.f32("property")? as f64),
            DataType::F64 => PropertyValue::Float(self.f64("property")?),
            DataType::String => PropertyValue::String(self.string("property")?),
            DataType::Bool => PropertyValue::Bool(self.u8("property")? != 0),
            DataType::Timestamp => self.timestamp()?,
        })
    }
}

/// Convert a TDMS timestamp (seconds since 1904 plus 2^-64 fractions).
fn timestamp_value(seconds: i64, fractions: u64) -> PropertyValue {
    let nanos = ((fractions as u128 * 1_000_000_000u128) >> 64) as u32;
    seconds
        .checked_add(TDMS_EPOCH_OFFSET_SECS)
        .and_then(|unix| DateTime::<Utc>::from_timestamp(unix, nanos))
        .map(PropertyValue::Timestamp)
        .unwrap_or(PropertyValue::Float(
            seconds as f64 + fractions as f64 / 2f64.powi(64),
        ))
}

macro_rules! decode_values {
    ($bytes:expr, $big_endian:expr, $out:expr, $ty:ty, $len:literal) => {
        for raw in $bytes.chunks_exact($len) {
            let mut buf = [0u8; $len];
            buf.copy_from_slice(raw);
            let v = if $big_endian {
                <$ty>::from_be_bytes(buf)
            } else {
                <$ty>::from_le_bytes(buf)
            };
            $out.push(v as f64);
        }
    };
}

/// Decode fixed-size numeric values into `out`. Trailing partial values are ignored.
fn decode_numeric(data_type: DataType, bytes: &[u8], big_endian: bool, out: &mut Vec<f64>) {
    match data_type {
        DataType::I8 => decode_values!(bytes, big_endian, out, i8, 1),
        DataType::I16 => decode_values!(bytes, big_endian, out, i16, 2),
        DataType::I32 => decode_values!(bytes, big_endian, out, i32, 4),
        DataType::I64 => decode_values!(bytes, big_endian, out, i64, 8),
        DataType::U8 => decode_values!(bytes, big_endian, out, u8, 1),
        DataType::U16 => decode_values!(bytes, big_endian, out, u16, 2),
        DataType::U32 => decode_values!(bytes, big_endian, out, u32, 4),
        DataType::U64 => decode_values!(bytes, big_endian, out, u64, 8),
        DataType::F32 => decode_values!(bytes, big_endian, out, f32, 4),
        DataType::F64 => decode_values!(bytes, big_endian, out, f64, 8),
        DataType::Bool => out.extend(bytes.iter().map(|&b| if b != 0 { 1.0 } else { 0.0 })),
        DataType::String | DataType::Timestamp => {}
    }
}

// ---------------------------------------------------------------------------
// Object paths
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ObjectPath {
    Root,
    Group(String),
    Channel(String, String),
}

/// Parse `/`, `/'group'` or `/'group'/'channel'`; quotes inside names are doubled.
fn parse_path(path: &str) -> Result<ObjectPath> {
    if path == "/" {
        return Ok(ObjectPath::Root);
    }
    let invalid = || TdmsError::InvalidPath(path.to_string());

    let mut parts = Vec::new();
    let mut chars = path.chars().peekable();
    while chars.peek().is_some() {
        if chars.next() != Some('/') || chars.next() != Some('\'') {
            return Err(invalid());
        }
        let mut name = String::new();
        loop {
            match chars.next() {
                Some('\'') if chars.peek() == Some(&'\'') => {
                    chars.next();
                    name.push('\'');
                }
                Some('\'') => break,
                Some(c) => name.push(c),
                None => return Err(invalid()),
            }
        }
        parts.push(name);
    }

    let mut parts = parts.into_iter();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(group), None, None) => Ok(ObjectPath::Group(group)),
        (Some(group), Some(channel), None) => Ok(ObjectPath::Channel(group, channel)),
        _ => Err(invalid()),
    }
}

// ---------------------------------------------------------------------------
// Segment parsing state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawIndex {
    data_type: DataType,
    values: u64,
    /// Bytes per chunk for this object.
    bytes: u64,
}

#[derive(Debug, Default)]
struct ObjectData {
    properties: Properties,
    data_type: Option<DataType>,
    data: Vec<f64>,
    last_index: Option<RawIndex>,
}

#[derive(Debug, Clone, Copy)]
struct ActiveObject {
    object: usize,
    index: Option<RawIndex>,
}

#[derive(Debug, Clone, Copy)]
struct LeadIn {
    toc: u32,
    next_segment_offset: u64,
    raw_data_offset: u64,
}

impl LeadIn {
    fn parse(bytes: &[u8], offset: usize) -> Result<Self> {
        if &bytes[..4] != SEGMENT_TAG {
            return Err(TdmsError::BadTag { offset });
        }
        // The lead-in is always little-endian.
        let mut cur = Cursor::new(&bytes[4..LEAD_IN_LEN], offset + 4, false);
        let toc = cur.u32("ToC mask")?;
        let version = cur.u32("version")?;
        if version != 4712 && version != 4713 {
            return Err(TdmsError::UnsupportedVersion(version));
        }
        Ok(Self {
            toc,
            next_segment_offset: cur.u64("next segment offset")?,
            raw_data_offset: cur.u64("raw data offset")?,
        })
    }
}

#[derive(Default)]
struct Parser {
    objects: Vec<(ObjectPath, ObjectData)>,
    lookup: HashMap<ObjectPath, usize>,
    active: Vec<ActiveObject>,
}

impl Parser {
    fn object_index(&mut self, path: ObjectPath) -> usize {
        if let Some(&i) = self.lookup.get(&path) {
            return i;
        }
        let i = self.objects.len();
        self.lookup.insert(path.clone(), i);
        self.objects.push((path, ObjectData::default()));
        i
    }

    fn parse(&mut self, bytes: &[u8]) -> Result<()> {
        let mut pos = 0usize;
        while pos < bytes.len() {
            if bytes.len() - pos < LEAD_IN_LEN {
                log::warn!(
                    "ignoring {} trailing bytes after last segment",
                    bytes.len() - pos
                );
                break;
            }
            let lead = LeadIn::parse(&bytes[pos..pos + LEAD_IN_LEN], pos)?;
            let data_start = pos + LEAD_IN_LEN;
            let corrupt = |reason: String| TdmsError::CorruptSegment {
                offset: pos,
                reason,
            };

            let segment_end = match usize::try_from(lead.next_segment_offset)
                .ok()
                .and_then(|off| data_start.checked_add(off))
            {
                Some(end) if end <= bytes.len() => end,
                _ => {
                    log::warn!(
                        "segment at byte {pos} is incomplete, reading raw data to end of file"
                    );
                    bytes.len()
                }
            };
            let raw_start = usize::try_from(lead.raw_data_offset)
                .ok()
                .and_then(|off| data_start.checked_add(off))
                .filter(|&start| start <= segment_end)
                .ok_or_else(|| {
                    corrupt(format!(
                        "raw data offset {} exceeds segment length",
                        lead.raw_data_offset
                    ))
                })?;

            if lead.toc & TOC_DAQMX_RAW_DATA != 0 {
                return Err(TdmsError::DaqmxUnsupported(format!("segment at byte {pos}")));
            }
            let big_endian = lead.toc & TOC_BIG_ENDIAN != 0;

            log::debug!(
                "segment at byte {pos}: toc=0x{:02X}, metadata {} bytes, raw data {} bytes",
                lead.toc,
                raw_start - data_start,
                segment_end - raw_start
            );

            if lead.toc & TOC_META_DATA != 0 {
                let meta = Cursor::new(&bytes[data_start..raw_start], data_start, big_endian);
                self.read_metadata(meta, lead.toc & TOC_NEW_OBJ_LIST != 0)?;
            }
            if lead.toc & TOC_RAW_DATA != 0 {
                self.read_raw_data(
                    &bytes[raw_start..segment_end],
                    raw_start,
                    lead.toc & TOC_INTERLEAVED_DATA != 0,
                    big_endian,
                )?;
            }
            pos = segment_end;
        }
        Ok(())
    }

    fn read_metadata(&mut self, mut cur: Cursor<'_>, new_object_list: bool) -> Result<()> {
        if new_object_list {
            self.active.clear();
        }
        let count = cur.u32("object count")?;
        for _ in 0..count {
            let raw_path = cur.string("object path")?;
            let path = parse_path(&raw_path)?;
            let obj = self.object_index(path);

            let index = match cur.u32("raw data index")? {
                NO_RAW_DATA => None,
                REUSE_PREVIOUS_INDEX => Some(
                    self.objects[obj]
                        .1
                        .last_index
                        .ok_or_else(|| TdmsError::MissingPreviousIndex(raw_path.clone()))?,
                ),
                DAQMX_FORMAT_CHANGING | DAQMX_DIGITAL_LINE_SCALER => {
                    return Err(TdmsError::DaqmxUnsupported(raw_path))
                }
                _ => Some(read_raw_index(&mut cur, &raw_path)?),
            };

            let data = &mut self.objects[obj].1;
            if let Some(ix) = index {
                data.last_index = Some(ix);
                data.data_type = Some(ix.data_type);
            }
            match self.active.iter_mut().find(|a| a.object == obj) {
                Some(active) => active.index = index,
                None => self.active.push(ActiveObject { object: obj, index }),
            }

            let n_props = cur.u32("property count")?;
            for _ in 0..n_props {
                let name = cur.string("property name")?;
                let data_type = DataType::from_code(cur.u32("property type")?)?;
                let value = cur.property_value(data_type)?;
                self.objects[obj].1.properties.insert(name, value);
            }
        }
        Ok(())
    }

    fn read_raw_data(
        &mut self,
        raw: &[u8],
        base: usize,
        interleaved: bool,
        big_endian: bool,
    ) -> Result<()> {
        let channels: Vec<(usize, RawIndex)> = self
            .active
            .iter()
            .filter_map(|a| a.index.map(|ix| (a.object, ix)))
            .filter(|(_, ix)| ix.values > 0 && ix.bytes > 0)
            .collect();
        if channels.is_empty() {
            return Ok(());
        }

        if interleaved {
            return self.read_interleaved(raw, &channels, big_endian);
        }

        let mut cur = Cursor::new(raw, base, big_endian);
        while cur.remaining() > 0 {
            for &(obj, ix) in &channels {
                let wanted = usize::try_from(ix.bytes).unwrap_or(usize::MAX);
                let len = wanted.min(cur.remaining());
                let bytes = cur.take(len, "raw data")?;
                if ix.data_type.is_numeric() {
                    decode_numeric(ix.data_type, bytes, big_endian, &mut self.objects[obj].1.data);
                }
                if len < wanted {
                    log::warn!(
                        "raw data at byte {base} ends inside a chunk, keeping {} of {wanted} bytes",
                        len
                    );
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn read_interleaved(
        &mut self,
        raw: &[u8],
        channels: &[(usize, RawIndex)],
        big_endian: bool,
    ) -> Result<()> {
        let mut sizes = Vec::with_capacity(channels.len());
        for &(obj, ix) in channels {
            let size = ix.data_type.size().ok_or_else(|| {
                TdmsError::InterleavedStrings(format!("{:?}", self.objects[obj].0))
            })?;
            sizes.push(size);
        }
        let row: usize = sizes.iter().sum();
        let rows = raw.len() / row;
        if raw.len() % row != 0 {
            log::warn!(
                "interleaved raw data has {} trailing bytes",
                raw.len() % row
            );
        }
        for r in 0..rows {
            let mut offset = r * row;
            for (&(obj, ix), &size) in channels.iter().zip(&sizes) {
                let bytes = &raw[offset..offset + size];
                decode_numeric(ix.data_type, bytes, big_endian, &mut self.objects[obj].1.data);
                offset += size;
            }
        }
        Ok(())
    }

    fn finish(self) -> TdmsFile {
        let mut file = TdmsFile::default();
        for (path, data) in self.objects {
            match path {
                ObjectPath::Root => file.properties = data.properties,
                ObjectPath::Group(name) => file.group_entry(&name).properties = data.properties,
                ObjectPath::Channel(group, name) => {
                    file.group_entry(&group).channels.push(TdmsChannel {
                        name,
                        properties: data.properties,
                        data_type: data.data_type,
                        data: data.data,
                    });
                }
            }
        }
        file
    }
}

fn read_raw_index(cur: &mut Cursor<'_>, path: &str) -> Result<RawIndex> {
    let data_type = DataType::from_code(cur.u32("raw data type")?)?;
    let dimension = cur.u32("array dimension")?;
    if dimension != 1 {
        return Err(TdmsError::UnsupportedDimension {
            path: path.to_string(),
            dimension,
        });
    }
    let values = cur.u64("value count")?;
    let bytes = match data_type.size() {
        Some(size) => values.checked_mul(size as u64).ok_or_else(|| TdmsError::CorruptSegment {
            offset: cur.base + cur.pos,
            reason: format!("value count {values} overflows for {path}"),
        })?,
        None => cur.u64("string data size")?,
    };
    Ok(RawIndex {
        data_type,
        values,
        bytes,
    })
}

// ---------------------------------------------------------------------------
// Public file model
// ---------------------------------------------------------------------------

/// One channel: its properties and decoded samples.
#[derive(Debug, Clone)]
pub struct TdmsChannel {
    pub name: String,
    pub properties: Properties,
    /// Raw data type, `None` when the channel never carried data.
    pub data_type: Option<DataType>,
    data: Vec<f64>,
}

impl TdmsChannel {
    /// Decoded samples, or an error for string/timestamp channels.
    pub fn values(&self) -> Result<&[f64]> {
        match self.data_type {
            Some(dt) if !dt.is_numeric() => Err(TdmsError::NonNumeric {
                channel: self.name.clone(),
                data_type: dt,
            }),
            _ => Ok(&self.data),
        }
    }

    /// The `wf_increment` property, validated as a positive finite number.
    pub fn sample_spacing(&self) -> Result<f64> {
        let spacing = self
            .properties
            .get(SAMPLE_SPACING_PROPERTY)
            .and_then(PropertyValue::as_f64)
            .ok_or_else(|| TdmsError::MissingSpacing(self.name.clone()))?;
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(TdmsError::InvalidSpacing {
                channel: self.name.clone(),
                spacing,
            });
        }
        Ok(spacing)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TdmsGroup {
    pub name: String,
    pub properties: Properties,
    pub channels: Vec<TdmsChannel>,
}

impl TdmsGroup {
    pub fn channel(&self, name: &str) -> Option<&TdmsChannel> {
        self.channels.iter().find(|c| c.name == name)
    }
}

/// A fully parsed TDMS file, groups and channels in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct TdmsFile {
    /// File name used to label series read from this file.
    pub name: String,
    pub properties: Properties,
    pub groups: Vec<TdmsGroup>,
}

impl TdmsFile {
    /// Read and parse a file from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let mut file = Self::from_bytes(&bytes)?;
        file.name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(file)
    }

    /// Parse an in-memory TDMS image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut parser = Parser::default();
        parser.parse(bytes)?;
        Ok(parser.finish())
    }

    pub fn group(&self, name: &str) -> Result<&TdmsGroup> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| TdmsError::GroupNotFound(name.to_string()))
    }

    pub fn channel(&self, group: &str, channel: &str) -> Result<&TdmsChannel> {
        self.group(group)?
            .channel(channel)
            .ok_or_else(|| TdmsError::ChannelNotFound {
                group: group.to_string(),
                channel: channel.to_string(),
            })
    }

    /// Samples, spacing and properties of one channel.
    pub fn read_series(&self, group: &str, channel: &str) -> Result<SampleSeries> {
        let ch = self.channel(group, channel)?;
        Ok(SampleSeries {
            label: self.name.clone(),
            values: ch.values()?.to_vec(),
            spacing: ch.sample_spacing()?,
            properties: ch.properties.clone(),
        })
    }

    fn group_entry(&mut self, name: &str) -> &mut TdmsGroup {
        let idx = match self.groups.iter().position(|g| g.name == name) {
            Some(i) => i,
            None => {
                self.groups.push(TdmsGroup {
                    name: name.to_string(),
                    ..Default::default()
                });
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx]
    }
}
