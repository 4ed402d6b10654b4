//! Fixed mappings from modulation source/destination names to slot indices.
//!
//! The indices were obtained by reverse engineering and should be re-verified
//! with a hex editor against the synthesizer version in use.

/// Modulation sources in listing order.
pub const SOURCES: [(&str, u8); 16] = [
    ("LFO1", 0),
    ("LFO2", 1),
    ("LFO3", 2),
    ("LFO4", 3),
    ("ENV1", 4),
    ("ENV2", 5),
    ("ENV3", 6),
    ("VELOCITY", 10),
    ("NOTE", 11),
    ("MODWHEEL", 12),
    ("PITCHBEND", 13),
    ("AFTERTOUCH", 14),
    ("MACRO1", 20),
    ("MACRO2", 21),
    ("MACRO3", 22),
    ("MACRO4", 23),
];

/// Modulation destinations in listing order.
pub const DESTINATIONS: [(&str, u8); 22] = [
    ("OSC_A_PITCH", 0),
    ("OSC_A_PAN", 1),
    ("OSC_A_LEVEL", 2),
    ("OSC_A_WAVETABLE", 3),
    ("OSC_B_PITCH", 4),
    ("OSC_B_PAN", 5),
    ("OSC_B_LEVEL", 6),
    ("OSC_B_WAVETABLE", 7),
    ("NOISE_LEVEL", 8),
    ("FILTER_CUTOFF", 17),
    ("FILTER_RES", 18),
    ("FILTER_DRIVE", 19),
    ("LFO1_RATE", 30),
    ("LFO2_RATE", 31),
    ("LFO3_RATE", 32),
    ("LFO4_RATE", 33),
    ("ENV1_ATTACK", 40),
    ("ENV1_DECAY", 41),
    ("ENV1_SUSTAIN", 42),
    ("ENV1_RELEASE", 43),
    ("MASTER_VOL", 51),
    ("MASTER_PAN", 52),
];

/// Looks up the slot index of a modulation source.
///
/// # Examples
///
/// ```
/// # use wavesmith::routing;
/// assert_eq!(routing::source_index("LFO1"), Some(0));
/// assert_eq!(routing::source_index("MODWHEEL"), Some(12));
/// assert_eq!(routing::source_index("LFO99"), None);
/// ```
pub fn source_index(name: &str) -> Option<u8> {
    SOURCES
        .iter()
        .find(|&&(entry, _)| entry == name)
        .map(|&(_, index)| index)
}

/// Looks up the slot index of a modulation destination.
///
/// # Examples
///
/// ```
/// # use wavesmith::routing;
/// assert_eq!(routing::destination_index("FILTER_CUTOFF"), Some(17));
/// assert_eq!(routing::destination_index("filter_cutoff"), None);
/// ```
pub fn destination_index(name: &str) -> Option<u8> {
    DESTINATIONS
        .iter()
        .find(|&&(entry, _)| entry == name)
        .map(|&(_, index)| index)
}
