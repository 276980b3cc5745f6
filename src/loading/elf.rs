// CLASSIFICATION: COMMUNITY
// Filename: elf.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! eBPF object inspection.
//!
//! [`ElfObjectLoader`] is the load step wired into the shipped binary.
//! It reads each object with `xmas-elf`, classifies it as critical when
//! it carries a `critical` section, rejects anything that is not a
//! relocatable eBPF object with a `license` section, and derives the
//! bpffs names its programs and maps pin under. Kernel object creation
//! itself sits behind the [`ObjectLoader`] seam.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use xmas_elf::header::{Class, Type};
use xmas_elf::sections::SHN_LORESERVE;
use xmas_elf::ElfFile;

use super::{LoadError, ObjectLoader};
use crate::location::Location;

/// `EM_BPF`
pub const EM_BPF: u16 = 247;

const CRITICAL_SECTION: &str = "critical";
const LICENSE_SECTION: &str = "license";
const MAPS_SECTION: &str = "maps";

/// What an object file declares, as far as the loader cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Owning subsystem named by the `critical` section, if any.
    pub critical_for: Option<String>,
    pub license: String,
    /// Program section names, e.g. `schedcls/ingress/tether_ether`.
    pub programs: Vec<String>,
    pub has_maps: bool,
}

fn c_string(raw: &[u8]) -> String {
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

fn e_machine(data: &[u8]) -> Option<u16> {
    let raw = [*data.get(18)?, *data.get(19)?];
    match data.get(5)? {
        1 => Some(u16::from_le_bytes(raw)),
        2 => Some(u16::from_be_bytes(raw)),
        _ => None,
    }
}

/// `[offset, offset + size)` of `data`, if it lies inside.
fn span(data: &[u8], offset: u64, size: u64) -> Option<&[u8]> {
    let start = usize::try_from(offset).ok()?;
    let end = usize::try_from(offset.checked_add(size)?).ok()?;
    data.get(start..end)
}

/// Validate the section table before xmas-elf reads it in place; it
/// does not bounds-check. Returns the section count.
fn check_layout(elf: &ElfFile, data: &[u8]) -> Result<u16, String> {
    let pt2 = &elf.header.pt2;
    let (entry, align) = match elf.header.pt1.class() {
        Class::SixtyFour => (64u16, 8usize),
        Class::ThirtyTwo => (40, 4),
        other => return Err(format!("unsupported ELF class {other:?}")),
    };
    if pt2.sh_entry_size() != entry {
        return Err(format!("section header size {} != {entry}", pt2.sh_entry_size()));
    }
    let count = pt2.sh_count();
    if count >= SHN_LORESERVE || pt2.sh_str_index() >= count {
        return Err(format!("bad section count {count} / name index {}", pt2.sh_str_index()));
    }
    let table = span(data, pt2.sh_offset(), u64::from(entry) * u64::from(count))
        .ok_or_else(|| "truncated section table".to_owned())?;
    if table.as_ptr() as usize % align != 0 {
        return Err("misaligned section table".into());
    }
    Ok(count)
}

/// Inspect an object image. Errors carry the criticality read so far.
pub fn inspect(data: &[u8]) -> Result<ObjectSummary, LoadError> {
    // header structs are read in place
    if data.as_ptr() as usize % 8 != 0 {
        return Err(LoadError::non_critical("misaligned object image"));
    }
    let elf = ElfFile::new(data).map_err(|e| LoadError::non_critical(format!("not ELF: {e}")))?;
    let count = check_layout(&elf, data).map_err(LoadError::non_critical)?;
    let section = |index: u16| {
        elf.section_header(index)
            .map_err(|e| LoadError::non_critical(format!("section {index}: {e}")))
    };
    let names = section(elf.header.pt2.sh_str_index())?;
    let names = span(data, names.offset(), names.size())
        .ok_or_else(|| LoadError::non_critical("section names out of range"))?;

    let mut critical_for = None;
    let mut license = None;
    let mut programs = Vec::new();
    let mut has_maps = false;
    let mut broken = None;
    for index in 1..count {
        let header = section(index)?;
        let Some(name) = usize::try_from(header.name())
            .ok()
            .and_then(|at| names.get(at..))
            .map(c_string)
        else {
            broken.get_or_insert_with(|| format!("section {index}: name out of range"));
            continue;
        };
        let body = span(data, header.offset(), header.size());
        if body.is_none() && matches!(name.as_str(), CRITICAL_SECTION | LICENSE_SECTION) {
            broken.get_or_insert_with(|| format!("section {name}: data out of range"));
        }
        match name.as_str() {
            CRITICAL_SECTION => critical_for = Some(body.map(c_string).unwrap_or_default()),
            LICENSE_SECTION => license = body.map(c_string),
            MAPS_SECTION | ".maps" => has_maps = true,
            n if n.contains('/') && !n.starts_with(".rel") => programs.push(n.to_owned()),
            _ => {}
        }
    }

    let fail = |msg: String| LoadError {
        critical: critical_for.is_some(),
        message: msg,
    };
    if let Some(msg) = broken {
        return Err(fail(msg));
    }
    match e_machine(data) {
        Some(EM_BPF) => {}
        other => return Err(fail(format!("e_machine {other:?} is not EM_BPF"))),
    }
    if !matches!(elf.header.pt2.type_().as_type(), Type::Relocatable) {
        return Err(fail("object is not relocatable".into()));
    }
    let Some(license) = license else {
        return Err(fail("missing license section".into()));
    };
    Ok(ObjectSummary {
        critical_for,
        license,
        programs,
        has_maps,
    })
}

/// `prog_<object>_<section>` with `/` folded to `_`, under the
/// location's pin prefix.
pub fn program_pin_path(root: &Path, location: &Location, object: &Path, section: &str) -> PathBuf {
    let stem = object
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    root.join(location.pin_prefix())
        .join(format!("prog_{stem}_{}", section.replace('/', "_")))
}

/// Object loader used by the `netbpfload` binary.
pub struct ElfObjectLoader {
    pin_root: PathBuf,
}

impl ElfObjectLoader {
    pub fn new(pin_root: impl Into<PathBuf>) -> Self {
        Self {
            pin_root: pin_root.into(),
        }
    }
}

impl ObjectLoader for ElfObjectLoader {
    fn load(&self, path: &Path, location: &Location) -> Result<(), LoadError> {
        let data = fs::read(path).map_err(|e| LoadError::non_critical(format!("read: {e}")))?;
        let summary = inspect(&data)?;
        if let Some(owner) = &summary.critical_for {
            info!("{} is critical for {owner}", path.display());
        }
        debug!("{} license {:?}, maps: {}", path.display(), summary.license, summary.has_maps);
        for section in &summary.programs {
            debug!(
                "{} -> {}",
                section,
                program_pin_path(&self.pin_root, location, path, section).display()
            );
        }
        Ok(())
    }
}
