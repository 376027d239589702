//! Typed convenience wrappers over the byte-oriented core (spec §6
//! "Typed adapters"). Thin and out of the ABI contract — callers who
//! need cross-process reproducibility stick to `put`/`get`.
use crate::error::{Error, Result};
use crate::table::HashTable;

/// `put`/`get` a UTF-8 string value.
pub fn put_str<const K: usize, const V: usize, const VS: usize>(
    table: &mut HashTable<K, V, VS>,
    key: &[u8],
    value: &str,
) -> Result<()> {
    table.put(key, value.as_bytes())
}

pub fn get_str<const K: usize, const V: usize, const VS: usize>(
    table: &HashTable<K, V, VS>,
    key: &[u8],
) -> Result<String> {
    let bytes = table.get(key)?;
    String::from_utf8(bytes).map_err(|_| Error::InvalidArg)
}

/// `put`/`get` any value that formats to a string via `Display`/`Into<String>`.
pub fn put_string<const K: usize, const V: usize, const VS: usize>(
    table: &mut HashTable<K, V, VS>,
    key: &[u8],
    value: impl Into<String>,
) -> Result<()> {
    put_str(table, key, &value.into())
}

/// Signed 64-bit integer, stored as decimal text plus a terminating NUL
/// (spec §9's note on the source's integer adapter).
pub fn put_int<const K: usize, const V: usize, const VS: usize>(
    table: &mut HashTable<K, V, VS>,
    key: &[u8],
    value: i64,
) -> Result<()> {
    let mut text = value.to_string().into_bytes();
    text.push(0);
    table.put(key, &text)
}

pub fn get_int<const K: usize, const V: usize, const VS: usize>(
    table: &HashTable<K, V, VS>,
    key: &[u8],
) -> Result<i64> {
    let bytes = table.get(key)?;
    let text = bytes.strip_suffix(&[0]).unwrap_or(&bytes);
    std::str::from_utf8(text)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(Error::InvalidArg)
}
