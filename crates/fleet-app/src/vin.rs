// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

pub const VIN_LENGTH: usize = 17;
const VIN_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Produces placeholder VINs for newly created vehicles. Not a check-digit
/// valid VIN, just 17 characters from `0-9A-Z`.
#[derive(Debug, Clone)]
pub struct VinGenerator {
    state: u64,
}

impl VinGenerator {
    pub fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    pub fn from_clock() -> Self {
        let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
        Self::new(nanos as u64 ^ (nanos >> 64) as u64)
    }

    pub fn generate(&mut self) -> String {
        (0..VIN_LENGTH)
            .map(|_| {
                let index = (self.next_u64() % VIN_ALPHABET.len() as u64) as usize;
                char::from(VIN_ALPHABET[index])
            })
            .collect()
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }
}

impl Default for VinGenerator {
    fn default() -> Self {
        Self::from_clock()
    }
}
