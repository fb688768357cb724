pub mod bindings;
pub mod syscall;

// Reads a native-endian `u64` at `offset`.
#[inline]
pub fn u64_at(buf: &[u8], offset: usize) -> Option<u64> {
    let bytes = buf.get(offset..offset + size_of::<u64>())?;
    Some(u64::from_ne_bytes(bytes.try_into().ok()?))
}

pub type Attr = bindings::perf_event_attr;
