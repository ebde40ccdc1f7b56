/// Deterministic display names for consensus members via CRC32 hash of the
/// member address. Cheap, stable across processes, no upstream lookup needed.
const ADJECTIVES: [&str; 24] = [
    "Brisk", "Quiet", "Rapid", "Gentle", "Bold", "Clever", "Daring", "Eager", "Fierce", "Humble",
    "Keen", "Lively", "Mellow", "Nimble", "Proud", "Restless", "Sleek", "Steady", "Swift",
    "Tranquil", "Vivid", "Wandering", "Witty", "Zealous",
];

const COLORS: [&str; 16] = [
    "Amber", "Azure", "Coral", "Crimson", "Emerald", "Golden", "Indigo", "Ivory", "Jade",
    "Lavender", "Magenta", "Obsidian", "Pearl", "Scarlet", "Silver", "Teal",
];

const ANIMALS: [&str; 24] = [
    "Badger", "Bison", "Condor", "Crane", "Dolphin", "Falcon", "Fox", "Gazelle", "Heron", "Ibex",
    "Jaguar", "Kestrel", "Lemur", "Lynx", "Marmot", "Otter", "Panther", "Puffin", "Raven", "Seal",
    "Stoat", "Tapir", "Walrus", "Wolf",
];

/// Three-word name ("Brisk Coral Heron") derived from the address hash.
/// Purely presentational; the address remains the identity key.
pub fn display_name(address: &str) -> String {
    let hash = crc32fast::hash(address.as_bytes());
    let adjective = ADJECTIVES[(hash >> 20) as usize % ADJECTIVES.len()];
    let color = COLORS[(hash >> 10) as usize % COLORS.len()];
    let animal = ANIMALS[hash as usize % ANIMALS.len()];
    format!("{adjective} {color} {animal}")
}
