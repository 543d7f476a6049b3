use std::f64::consts::PI;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use quick_plot_tdms::data::model::{Properties, PropertyValue, SAMPLE_SPACING_PROPERTY};
use quick_plot_tdms::data::writer::TdmsWriter;

const SAMPLE_RATE: f64 = 1000.0;
const SAMPLES_PER_FILE: usize = 2000;
const FILES: usize = 2;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Sum of sines `(frequency Hz, amplitude)` plus white noise, starting at sample `offset`.
fn signal(offset: usize, tones: &[(f64, f64)], noise: f64, rng: &mut SimpleRng) -> Vec<f64> {
    (offset..offset + SAMPLES_PER_FILE)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE;
            let clean: f64 = tones
                .iter()
                .map(|&(f, a)| a * (2.0 * PI * f * t).sin())
                .sum();
            clean + rng.gauss(0.0, noise)
        })
        .collect()
}

fn channel_properties(unit: &str, start: DateTime<Utc>) -> Properties {
    let mut props = Properties::new();
    props.insert(
        SAMPLE_SPACING_PROPERTY.into(),
        PropertyValue::Float(1.0 / SAMPLE_RATE),
    );
    props.insert(
        "wf_samples".into(),
        PropertyValue::Integer(SAMPLES_PER_FILE as i64),
    );
    props.insert("wf_start_offset".into(), PropertyValue::Float(0.0));
    props.insert("wf_start_time".into(), PropertyValue::Timestamp(start));
    props.insert("unit_string".into(), PropertyValue::String(unit.into()));
    props
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);
    let t0 = DateTime::<Utc>::from_timestamp(1_735_689_600, 0).context("start time")?;

    for n in 0..FILES {
        let offset = n * SAMPLES_PER_FILE;
        let start = t0 + Duration::milliseconds((offset as f64 / SAMPLE_RATE * 1000.0) as i64);

        let voltage = signal(offset, &[(50.0, 1.0), (120.0, 0.25)], 0.05, &mut rng);
        let current = signal(offset, &[(50.0, 0.2), (150.0, 0.02)], 0.01, &mut rng);

        let mut writer = TdmsWriter::new();
        writer.set_file_property("name", PropertyValue::String(format!("acquisition {n}")));
        writer.set_group_property(
            "Measurements",
            "description",
            PropertyValue::String("synthetic mains measurement".into()),
        );
        writer.add_channel("Measurements", "Voltage", &voltage, channel_properties("V", start));
        writer.add_channel("Measurements", "Current", &current, channel_properties("A", start));

        let path = format!("sample_{n}.tdms");
        writer
            .write(Path::new(&path))
            .with_context(|| format!("writing {path}"))?;
        println!(
            "Wrote {path}: 2 channels, {SAMPLES_PER_FILE} samples at {SAMPLE_RATE} Hz"
        );
    }
    Ok(())
}
