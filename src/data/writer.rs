use std::io;
use std::path::Path;

use super::model::{Properties, PropertyValue, SAMPLE_SPACING_PROPERTY};
use super::tdms::{
    DataType, LEAD_IN_LEN, NO_RAW_DATA, SEGMENT_TAG, TOC_META_DATA, TOC_NEW_OBJ_LIST,
    TOC_RAW_DATA,
};

// ---------------------------------------------------------------------------
// Minimal TDMS writer
// ---------------------------------------------------------------------------

/// Writes a single little-endian segment holding `f64` channels.
///
/// Enough to produce sample acquisitions and test fixtures; it does not try
/// to cover the format the way the reader does.
#[derive(Debug, Clone, Default)]
pub struct TdmsWriter {
    file_properties: Properties,
    groups: Vec<GroupSpec>,
}

#[derive(Debug, Clone)]
struct GroupSpec {
    name: String,
    properties: Properties,
    channels: Vec<ChannelSpec>,
}

#[derive(Debug, Clone)]
struct ChannelSpec {
    name: String,
    properties: Properties,
    values: Vec<f64>,
}

impl TdmsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// One group, one channel with `wf_increment` set.
    pub fn single_channel(group: &str, channel: &str, values: &[f64], spacing: f64) -> Self {
        let mut props = Properties::new();
        props.insert(SAMPLE_SPACING_PROPERTY.into(), PropertyValue::Float(spacing));
        let mut w = Self::new();
        w.add_channel(group, channel, values, props);
        w
    }

    pub fn set_file_property(&mut self, name: &str, value: PropertyValue) {
        self.file_properties.insert(name.to_string(), value);
    }

    pub fn set_group_property(&mut self, group: &str, name: &str, value: PropertyValue) {
        self.group_mut(group)
            .properties
            .insert(name.to_string(), value);
    }

    pub fn add_channel(&mut self, group: &str, channel: &str, values: &[f64], properties: Properties) {
        self.group_mut(group).channels.push(ChannelSpec {
            name: channel.to_string(),
            properties,
            values: values.to_vec(),
        });
    }

    /// Encode the whole file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut meta = Vec::new();
        let n_objects = 1 + self
            .groups
            .iter()
            .map(|g| 1 + g.channels.len())
            .sum::<usize>();
        put_u32(&mut meta, n_objects as u32);

        put_str(&mut meta, "/");
        put_u32(&mut meta, NO_RAW_DATA);
        put_properties(&mut meta, &self.file_properties);

        let mut raw = Vec::new();
        for group in &self.groups {
            let group_path = format!("/{}", quote(&group.name));
            put_str(&mut meta, &group_path);
            put_u32(&mut meta, NO_RAW_DATA);
            put_properties(&mut meta, &group.properties);

            for channel in &group.channels {
                put_str(&mut meta, &format!("{group_path}/{}", quote(&channel.name)));
                // index length, type, dimension, count
                put_u32(&mut meta, 20);
                put_u32(&mut meta, DataType::F64.code());
                put_u32(&mut meta, 1);
                meta.extend_from_slice(&(channel.values.len() as u64).to_le_bytes());
                put_properties(&mut meta, &channel.properties);

                for v in &channel.values {
                    raw.extend_from_slice(&v.to_le_bytes());
                }
            }
        }

        let mut out = Vec::with_capacity(LEAD_IN_LEN + meta.len() + raw.len());
        out.extend_from_slice(SEGMENT_TAG);
        put_u32(&mut out, TOC_META_DATA | TOC_NEW_OBJ_LIST | TOC_RAW_DATA);
        put_u32(&mut out, 4713);
        out.extend_from_slice(&((meta.len() + raw.len()) as u64).to_le_bytes());
        out.extend_from_slice(&(meta.len() as u64).to_le_bytes());
        out.extend_from_slice(&meta);
        out.extend_from_slice(&raw);
        out
    }

    pub fn write(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }

    fn group_mut(&mut self, name: &str) -> &mut GroupSpec {
        let idx = match self.groups.iter().position(|g| g.name == name) {
            Some(i) => i,
            None => {
                self.groups.push(GroupSpec {
                    name: name.to_string(),
                    properties: Properties::new(),
                    channels: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx]
    }
}

fn quote(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    put_u32(out, s.len() as u32);
    out.extend_from_slice(s.as_bytes());
}

fn put_properties(out: &mut Vec<u8>, props: &Properties) {
    put_u32(out, props.len() as u32);
    for (name, value) in props {
        put_str(out, name);
        match value {
            PropertyValue::String(s) => {
                put_u32(out, DataType::String.code());
                put_str(out, s);
            }
            PropertyValue::Integer(i) => {
                put_u32(out, DataType::I64.code());
                out.extend_from_slice(&i.to_le_bytes());
            }
            PropertyValue::Unsigned(u) => {
                put_u32(out, DataType::U64.code());
                out.extend_from_slice(&u.to_le_bytes());
            }
            PropertyValue::Float(f) => {
                put_u32(out, DataType::F64.code());
                out.extend_from_slice(&f.to_le_bytes());
            }
            PropertyValue::Bool(b) => {
                put_u32(out, DataType::Bool.code());
                out.push(u8::from(*b));
            }
            PropertyValue::Timestamp(t) => {
                put_u32(out, DataType::Timestamp.code());
                let seconds = t.timestamp() + 2_082_844_800;
                let fractions = ((t.timestamp_subsec_nanos() as u128) << 64) / 1_000_000_000;
                out.extend_from_slice(&(fractions as u64).to_le_bytes());
                out.extend_from_slice(&seconds.to_le_bytes());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tdms::TdmsFile;
    use chrono::{DateTime, Utc};

    #[test]
    fn properties_of_every_kind_survive() {
        let start = DateTime::<Utc>::from_timestamp(1_700_000_000, 250_000_000).unwrap();
        let mut props = Properties::new();
        props.insert(SAMPLE_SPACING_PROPERTY.into(), PropertyValue::Float(1e-3));
        props.insert("wf_samples".into(), PropertyValue::Integer(2));
        props.insert("big".into(), PropertyValue::Unsigned(u64::MAX));
        props.insert("enabled".into(), PropertyValue::Bool(true));
        props.insert("wf_start_time".into(), PropertyValue::Timestamp(start));

        let mut w = TdmsWriter::new();
        w.add_channel("it's", "ch", &[1.0, -1.0], props.clone());
        let file = TdmsFile::from_bytes(&w.to_bytes()).unwrap();
        let channel = file.channel("it's", "ch").unwrap();
        assert_eq!(channel.properties, props);
    }
}
