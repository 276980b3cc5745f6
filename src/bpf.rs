// CLASSIFICATION: COMMUNITY
// Filename: bpf.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Raw `bpf(2)` calls for the post-load kernel self-check.

use std::io;
use std::os::fd::{FromRawFd, OwnedFd, RawFd};
use std::os::raw::c_long;

use log::error;
use thiserror::Error;

const BPF_MAP_CREATE: c_long = 0;
const BPF_MAP_UPDATE_ELEM: c_long = 2;
const BPF_MAP_TYPE_ARRAY: u32 = 2;
const BPF_ANY: u64 = 0;

#[derive(Debug, Error)]
pub enum SelfCheckError {
    #[error("bpf(BPF_MAP_CREATE) -> {0}")]
    MapCreate(#[source] io::Error),
    #[error("critical kernel bug - failure to write into index 1 of 2 element bpf map array: {0}")]
    MapWrite(#[source] io::Error),
}

/// Kernel sanity probe run after every object has loaded.
pub trait SelfCheck {
    fn run(&self) -> Result<(), SelfCheckError>;
}

/// `union bpf_attr` is larger than any command we issue; the kernel
/// requires the unused tail to be zero.
#[repr(C, align(8))]
struct BpfAttr([u8; 128]);

impl BpfAttr {
    fn zeroed() -> Self {
        BpfAttr([0; 128])
    }

    fn put_u32(&mut self, offset: usize, v: u32) {
        self.0[offset..offset + 4].copy_from_slice(&v.to_ne_bytes());
    }

    fn put_u64(&mut self, offset: usize, v: u64) {
        self.0[offset..offset + 8].copy_from_slice(&v.to_ne_bytes());
    }
}

fn sys_bpf(cmd: c_long, attr: &mut BpfAttr) -> io::Result<c_long> {
    // SAFETY: attr points at a zero-padded, correctly aligned bpf_attr
    // of the size we pass; the kernel reads at most that many bytes.
    let ret = unsafe {
        libc::syscall(
            libc::SYS_bpf,
            cmd,
            attr as *mut BpfAttr,
            std::mem::size_of::<BpfAttr>(),
        )
    };
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

/// Create an array map with 4-byte keys and values.
pub fn create_array_map(max_entries: u32) -> io::Result<OwnedFd> {
    let mut attr = BpfAttr::zeroed();
    attr.put_u32(0, BPF_MAP_TYPE_ARRAY);
    attr.put_u32(4, 4); // key_size
    attr.put_u32(8, 4); // value_size
    attr.put_u32(12, max_entries);
    let fd = sys_bpf(BPF_MAP_CREATE, &mut attr)? as RawFd;
    // SAFETY: BPF_MAP_CREATE returned a fresh descriptor we now own.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

pub fn update_u32(map: &OwnedFd, key: u32, value: u32) -> io::Result<()> {
    use std::os::fd::AsRawFd;

    let mut attr = BpfAttr::zeroed();
    attr.put_u32(0, map.as_raw_fd() as u32);
    attr.put_u64(8, &key as *const u32 as u64);
    attr.put_u64(16, &value as *const u32 as u64);
    attr.put_u64(24, BPF_ANY);
    sys_bpf(BPF_MAP_UPDATE_ELEM, &mut attr).map(drop)
}

/// Writes 123 at index 1 of a fresh two-entry array map.
pub struct ArrayMapSelfCheck;

impl SelfCheck for ArrayMapSelfCheck {
    fn run(&self) -> Result<(), SelfCheckError> {
        let map = create_array_map(2).map_err(|e| {
            error!("bpf map create failed: {e}");
            SelfCheckError::MapCreate(e)
        })?;
        update_u32(&map, 1, 123).map_err(SelfCheckError::MapWrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_layout() {
        let mut attr = BpfAttr::zeroed();
        attr.put_u32(12, 2);
        attr.put_u64(24, u64::MAX);
        assert_eq!(std::mem::align_of::<BpfAttr>(), 8);
        assert_eq!(&attr.0[12..16], &2u32.to_ne_bytes());
        assert!(attr.0[32..].iter().all(|b| *b == 0));
    }

    #[test]
    fn self_check_runs_or_reports_permission() {
        // Unprivileged hosts get EPERM from bpf(2); both outcomes are
        // fine as long as nothing panics and errors are typed.
        match ArrayMapSelfCheck.run() {
            Ok(()) => {}
            Err(SelfCheckError::MapCreate(e)) => assert!(e.raw_os_error().is_some()),
            Err(SelfCheckError::MapWrite(e)) => panic!("map created but write failed: {e}"),
        }
    }
}
