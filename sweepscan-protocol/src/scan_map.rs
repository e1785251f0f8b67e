//! Polar scan map
//!
//! Accumulates sample lines into a fixed-resolution polar buffer holding the
//! latest distance seen at each angle. A 360-bin map gives one degree
//! resolution, a 720-bin map half a degree.

use core::fmt::{self, Write};

use crate::line::LineReading;

/// Distances above this are treated as implausible and not recorded
pub const MAX_PLAUSIBLE_MM: u16 = 5000;

/// Near band upper limit in mm (inclusive)
const NEAR_LIMIT_MM: u16 = 300;

/// Mid band upper limit in mm (inclusive)
const MID_LIMIT_MM: u16 = 1000;

/// Coarse proximity classification of a distance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProximityBand {
    /// Up to 300 mm
    Near,
    /// Up to 1000 mm
    Mid,
    /// Beyond 1000 mm
    Far,
}

impl ProximityBand {
    /// Classify a distance in millimeters
    pub fn of(distance_mm: u16) -> Self {
        if distance_mm <= NEAR_LIMIT_MM {
            ProximityBand::Near
        } else if distance_mm <= MID_LIMIT_MM {
            ProximityBand::Mid
        } else {
            ProximityBand::Far
        }
    }
}

/// Latest distance per angular bin for one full revolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanMap<const BINS: usize> {
    distances: [Option<u16>; BINS],
}

impl<const BINS: usize> Default for ScanMap<BINS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BINS: usize> ScanMap<BINS> {
    const HAS_BINS: () = assert!(BINS > 0, "scan map needs at least one bin");

    /// Create an empty map
    pub const fn new() -> Self {
        let () = Self::HAS_BINS;
        Self {
            distances: [None; BINS],
        }
    }

    /// Bin index for an angle in degrees
    ///
    /// Angles are wrapped into [0, 360) and rounded to the nearest bin, so
    /// 359.9° lands in bin 0 on a 360-bin map.
    pub fn bin_for(angle_deg: f32) -> usize {
        let () = Self::HAS_BINS;
        let mut wrapped = angle_deg % 360.0;
        if wrapped < 0.0 {
            wrapped += 360.0;
        }
        let scaled = wrapped * BINS as f32 / 360.0;
        (scaled + 0.5) as usize % BINS
    }

    /// Center angle of a bin in degrees
    pub fn angle_of(bin: usize) -> f32 {
        bin as f32 * 360.0 / BINS as f32
    }

    /// Record a distance at an angle
    ///
    /// Returns false if the distance is implausible or the angle is not
    /// finite; the map is unchanged in that case.
    pub fn record(&mut self, angle_deg: f32, distance_mm: u16) -> bool {
        if !angle_deg.is_finite() || distance_mm > MAX_PLAUSIBLE_MM {
            return false;
        }
        self.distances[Self::bin_for(angle_deg)] = Some(distance_mm);
        true
    }

    /// Record a parsed sample line; faulted samples are skipped
    pub fn record_reading(&mut self, reading: &LineReading) -> bool {
        match reading.distance_mm {
            Some(mm) => self.record(reading.angle_deg, mm),
            None => false,
        }
    }

    /// Distance stored in a bin
    pub fn get(&self, bin: usize) -> Option<u16> {
        self.distances.get(bin).copied().flatten()
    }

    /// Iterate filled bins as (angle in degrees, distance in mm)
    pub fn points(&self) -> impl Iterator<Item = (f32, u16)> + '_ {
        self.distances
            .iter()
            .enumerate()
            .filter_map(|(bin, d)| d.map(|mm| (Self::angle_of(bin), mm)))
    }

    /// Number of filled bins
    pub fn filled(&self) -> usize {
        self.distances.iter().filter(|d| d.is_some()).count()
    }

    /// Closest recorded point
    pub fn nearest(&self) -> Option<(f32, u16)> {
        self.points().min_by_key(|&(_, mm)| mm)
    }

    /// Forget all recorded distances
    pub fn clear(&mut self) {
        self.distances = [None; BINS];
    }

    /// Write filled bins as CSV with an `angle,distance` header
    pub fn write_csv<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str("angle,distance\n")?;
        for (angle, mm) in self.points() {
            writeln!(out, "{:.1},{}", angle, mm)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::parse_line;
    use proptest::prelude::*;
    use std::string::String;

    #[test]
    fn test_single_bin_map() {
        assert_eq!(ScanMap::<1>::bin_for(0.0), 0);
        assert_eq!(ScanMap::<1>::bin_for(179.9), 0);
        assert_eq!(ScanMap::<1>::bin_for(359.9), 0);

        let mut map = ScanMap::<1>::new();
        assert!(map.record(270.0, 500));
        assert_eq!(map.get(0), Some(500));
        assert_eq!(map.filled(), 1);
    }

    #[test]
    fn test_bin_rounding_full_degree() {
        assert_eq!(ScanMap::<360>::bin_for(0.0), 0);
        assert_eq!(ScanMap::<360>::bin_for(0.4), 0);
        assert_eq!(ScanMap::<360>::bin_for(0.6), 1);
        assert_eq!(ScanMap::<360>::bin_for(180.0), 180);
        assert_eq!(ScanMap::<360>::bin_for(359.9), 0);
    }

    #[test]
    fn test_bin_rounding_half_degree() {
        assert_eq!(ScanMap::<720>::bin_for(0.5), 1);
        assert_eq!(ScanMap::<720>::bin_for(90.0), 180);
        assert_eq!(ScanMap::<720>::bin_for(359.8), 0);
        assert_eq!(ScanMap::<720>::angle_of(181), 90.5);
    }

    #[test]
    fn test_bin_wraps_out_of_range_angles() {
        assert_eq!(ScanMap::<360>::bin_for(-90.0), 270);
        assert_eq!(ScanMap::<360>::bin_for(450.0), 90);
    }

    #[test]
    fn test_record_replaces_previous_distance() {
        let mut map = ScanMap::<360>::new();
        assert!(map.record(45.0, 300));
        assert!(map.record(45.2, 310));
        assert_eq!(map.get(45), Some(310));
        assert_eq!(map.filled(), 1);
    }

    #[test]
    fn test_record_rejects_implausible_distance() {
        let mut map = ScanMap::<720>::new();
        assert!(!map.record(10.0, 8191));
        assert!(!map.record(f32::NAN, 100));
        assert!(map.record(10.0, MAX_PLAUSIBLE_MM));
        assert_eq!(map.filled(), 1);
    }

    #[test]
    fn test_record_reading_skips_faults() {
        let mut map = ScanMap::<360>::new();
        let fault = parse_line("Angle: 10.0°, Sensor ERROR!").unwrap();
        let valid = parse_line("Angle: 20.0°, Distance: 250 mm").unwrap();

        assert!(!map.record_reading(&fault));
        assert!(map.record_reading(&valid));
        assert_eq!(map.get(10), None);
        assert_eq!(map.get(20), Some(250));
    }

    #[test]
    fn test_nearest_and_clear() {
        let mut map = ScanMap::<360>::new();
        assert_eq!(map.nearest(), None);

        map.record(10.0, 900);
        map.record(200.0, 120);
        map.record(300.0, 4000);
        assert_eq!(map.nearest(), Some((200.0, 120)));

        map.clear();
        assert_eq!(map.filled(), 0);
        assert_eq!(map.points().count(), 0);
    }

    #[test]
    fn test_write_csv() {
        let mut map = ScanMap::<360>::new();
        map.record(90.0, 150);
        map.record(270.0, 2000);

        let mut out = String::new();
        map.write_csv(&mut out).unwrap();
        assert_eq!(out, "angle,distance\n90.0,150\n270.0,2000\n");
    }

    #[test]
    fn test_proximity_bands() {
        assert_eq!(ProximityBand::of(0), ProximityBand::Near);
        assert_eq!(ProximityBand::of(300), ProximityBand::Near);
        assert_eq!(ProximityBand::of(301), ProximityBand::Mid);
        assert_eq!(ProximityBand::of(1000), ProximityBand::Mid);
        assert_eq!(ProximityBand::of(1001), ProximityBand::Far);
    }

    proptest! {
        #[test]
        fn prop_bin_always_in_range(angle in -1.0e6f32..1.0e6f32) {
            prop_assert!(ScanMap::<360>::bin_for(angle) < 360);
            prop_assert!(ScanMap::<720>::bin_for(angle) < 720);
        }
    }
}
