/// Serializes guest inputs the way the zkVM reads `u64` words: each value as 8 little-endian
/// bytes, concatenated in order.
pub fn encode_inputs(values: &[u64]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_le_bytes()).collect()
}
