#![allow(missing_docs)]

//! Configuration model of a LoRa packet-forwarder gateway, declared the way
//! an application using `toml-slots` would declare it.

use std::cell::Cell;
use toml_slots::{Array, Error, Key, Record, Target, str::terminated_str};

/// Reads a file from `data/`.
pub fn data(name: &str) -> String {
    let path = format!("{}/data/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to load {path}: {e}"))
}

/// Text of a terminated string destination.
pub fn text<const N: usize>(buf: &Cell<[u8; N]>) -> String {
    terminated_str(&buf.get())
        .expect("destination holds valid utf-8")
        .to_owned()
}

/// Parses a document into a fresh [`Gateway`] and asserts the rendered error.
#[macro_export]
macro_rules! invalid {
    ($name:ident, $toml:expr, $message:expr) => {
        #[test]
        fn $name() {
            let gateway = $crate::Gateway::default();
            match gateway.load($toml) {
                Ok(()) => panic!("expected {:?} to fail", $toml),
                Err(e) => ::pretty_assertions::assert_eq!(e.to_string(), $message),
            }
        }
    };
}

#[derive(Default)]
pub struct Timestamp {
    pub enable: Cell<bool>,
    pub mode: Cell<[u8; 16]>,
}

impl Record for Timestamp {
    fn entry(&self, name: &str) -> Option<Target<'_>> {
        Some(match name {
            "enable" => Target::from(&self.enable),
            "mode" => Target::from(&self.mode),
            _ => return None,
        })
    }
}

#[derive(Default)]
pub struct TempCompensation {
    pub coeff_a: Cell<f64>,
    pub coeff_b: Cell<f64>,
    pub coeff_c: Cell<f64>,
    pub coeff_d: Cell<f64>,
    pub coeff_e: Cell<f64>,
}

impl Record for TempCompensation {
    fn entry(&self, name: &str) -> Option<Target<'_>> {
        Some(match name {
            "coeff_a" => Target::from(&self.coeff_a),
            "coeff_b" => Target::from(&self.coeff_b),
            "coeff_c" => Target::from(&self.coeff_c),
            "coeff_d" => Target::from(&self.coeff_d),
            "coeff_e" => Target::from(&self.coeff_e),
            _ => return None,
        })
    }
}

#[derive(Default)]
pub struct Gain {
    pub rf_power: Cell<i8>,
    pub pa_gain: Cell<u8>,
    pub pwr_idx: Cell<u8>,
}

impl Record for Gain {
    fn entry(&self, name: &str) -> Option<Target<'_>> {
        Some(match name {
            "rf_power" => Target::from(&self.rf_power),
            "pa_gain" => Target::from(&self.pa_gain),
            "pwr_idx" => Target::from(&self.pwr_idx),
            _ => return None,
        })
    }
}

#[derive(Default)]
pub struct Tx {
    pub enable: Cell<bool>,
    pub freq_min: Cell<u32>,
    pub freq_max: Cell<u32>,
    pub gains: [Gain; 16],
    pub gains_len: Cell<usize>,
}

impl Record for Tx {
    fn entry(&self, name: &str) -> Option<Target<'_>> {
        Some(match name {
            "enable" => Target::from(&self.enable),
            "freq_min" => Target::from(&self.freq_min),
            "freq_max" => Target::from(&self.freq_max),
            "gains" => Target::from(Array::tables(&self.gains, &self.gains_len)),
            _ => return None,
        })
    }
}

#[derive(Default)]
pub struct Radio {
    pub enable: Cell<bool>,
    pub kind: Cell<[u8; 8]>,
    pub freq: Cell<u32>,
    pub rssi_offset: Cell<f64>,
    pub rssi_tcomp: TempCompensation,
    pub tx: Tx,
}

impl Record for Radio {
    fn entry(&self, name: &str) -> Option<Target<'_>> {
        Some(match name {
            "enable" => Target::from(&self.enable),
            "type" => Target::from(&self.kind),
            "freq" => Target::from(&self.freq),
            "rssi_offset" => Target::from(&self.rssi_offset),
            "rssi_tcomp" => Target::Record(&self.rssi_tcomp),
            "tx" => Target::Record(&self.tx),
            _ => return None,
        })
    }
}

#[derive(Default)]
pub struct Channel {
    pub enable: Cell<bool>,
    pub radio: Cell<u8>,
    pub if_freq: Cell<i32>,
    pub bw: Cell<u32>,
    pub sf: Cell<u8>,
    pub dr: Cell<u32>,
}

impl Record for Channel {
    fn entry(&self, name: &str) -> Option<Target<'_>> {
        Some(match name {
            "enable" => Target::from(&self.enable),
            "radio" => Target::from(&self.radio),
            "if" => Target::from(&self.if_freq),
            "bw" => Target::from(&self.bw),
            "sf" => Target::from(&self.sf),
            "dr" => Target::from(&self.dr),
            _ => return None,
        })
    }
}

#[derive(Default)]
pub struct Engine {
    pub kind: Cell<[u8; 8]>,
    pub device: Cell<[u8; 16]>,
    pub lorawan_public: Cell<bool>,
    pub clksrc: Cell<u8>,
    pub antenna_gain: Cell<i32>,
    pub full_duplex: Cell<bool>,
    pub timestamp: Timestamp,
    pub radios: [Radio; 2],
    pub radios_len: Cell<usize>,
    pub channels: [Channel; 8],
    pub channels_len: Cell<usize>,
    pub chan_lora: Channel,
    pub chan_fsk: Channel,
    pub enable_sf: Cell<[u8; 8]>,
    pub enable_sf_len: Cell<usize>,
}

impl Record for Engine {
    fn entry(&self, name: &str) -> Option<Target<'_>> {
        Some(match name {
            "type" => Target::from(&self.kind),
            "device" => Target::from(&self.device),
            "lorawan_public" => Target::from(&self.lorawan_public),
            "clksrc" => Target::from(&self.clksrc),
            "antenna_gain" => Target::from(&self.antenna_gain),
            "full_duplex" => Target::from(&self.full_duplex),
            "timestamp" => Target::Record(&self.timestamp),
            "radios" => Target::from(Array::tables(&self.radios, &self.radios_len)),
            "channels" => Target::from(Array::tables(&self.channels, &self.channels_len)),
            "chan_lora" => Target::Record(&self.chan_lora),
            "chan_fsk" => Target::Record(&self.chan_fsk),
            "enable_sf" => Target::from(Array::new(&self.enable_sf, &self.enable_sf_len)),
            _ => return None,
        })
    }
}

#[derive(Default)]
pub struct BeaconFreq {
    pub hz: Cell<u32>,
    pub nb: Cell<u8>,
    pub step: Cell<u32>,
}

impl Record for BeaconFreq {
    fn entry(&self, name: &str) -> Option<Target<'_>> {
        Some(match name {
            "hz" => Target::from(&self.hz),
            "nb" => Target::from(&self.nb),
            "step" => Target::from(&self.step),
            _ => return None,
        })
    }
}

#[derive(Default)]
pub struct Beacon {
    pub period: Cell<u32>,
    pub freq: BeaconFreq,
    pub dr: Cell<u8>,
    pub bw: Cell<u32>,
    pub power: Cell<i8>,
    pub id: Cell<u8>,
}

impl Record for Beacon {
    fn entry(&self, name: &str) -> Option<Target<'_>> {
        Some(match name {
            "period" => Target::from(&self.period),
            "freq" => Target::Record(&self.freq),
            "dr" => Target::from(&self.dr),
            "bw" => Target::from(&self.bw),
            "power" => Target::from(&self.power),
            "id" => Target::from(&self.id),
            _ => return None,
        })
    }
}

#[derive(Default)]
pub struct Gps {
    pub device: Cell<[u8; 16]>,
    pub lat: Cell<f64>,
    pub lon: Cell<f64>,
    pub alt: Cell<f64>,
}

impl Record for Gps {
    fn entry(&self, name: &str) -> Option<Target<'_>> {
        Some(match name {
            "device" => Target::from(&self.device),
            "lat" => Target::from(&self.lat),
            "lon" => Target::from(&self.lon),
            "alt" => Target::from(&self.alt),
            _ => return None,
        })
    }
}

/// Root of the gateway configuration.
#[derive(Default)]
pub struct Gateway {
    pub engine: Engine,
    pub beacon: Beacon,
    pub gps: Gps,
}

impl Gateway {
    pub fn schema(&self) -> [Key<'_>; 3] {
        [
            Key::new("engine", Target::Record(&self.engine)),
            Key::new("beacon", Target::Record(&self.beacon)),
            Key::new("gps", Target::Record(&self.gps)),
        ]
    }

    pub fn load(&self, input: &str) -> Result<(), Error> {
        toml_slots::parse(input, &self.schema())
    }
}
