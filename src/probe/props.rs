// CLASSIFICATION: COMMUNITY
// Filename: props.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19
//
// ─────────────────────────────────────────────────────────────
// Build property reader
//
// Parses `key=value` property files (`/system/build.prop` and
// friends) so the loader can learn the device API level and build
// type without a property service.
//
//   # begin build properties
//   ro.build.type=userdebug
//   ro.build.version.sdk=35
//   import /odm/etc/build.prop
//
// Lines without `=` (directives such as `import`) and `#` comments
// are ignored. When several files define a key the first file read
// wins.
// ─────────────────────────────────────────────────────────────

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};

/// Read-only view of merged build properties.
#[derive(Debug, Clone, Default)]
pub struct BuildProps {
    map: HashMap<String, String>,
}

impl BuildProps {
    /// Retrieve the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    /// Merge one property file's text. Keys already known are kept.
    pub fn merge_text(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(eq) = line.find('=') else {
                continue;
            };
            let (k, v) = (line[..eq].trim(), line[eq + 1..].trim());
            if k.is_empty() {
                debug!("ignoring property line with empty key: {line:?}");
                continue;
            }
            self.map.entry(k.to_owned()).or_insert_with(|| v.to_owned());
        }
    }

    /// Load and merge `files` in order. Unreadable files are skipped.
    pub fn load(files: &[impl AsRef<Path>]) -> Self {
        let mut props = Self::default();
        for file in files {
            let file = file.as_ref();
            match fs::read_to_string(file) {
                Ok(text) => props.merge_text(&text),
                Err(e) => warn!("cannot read {}: {e}", file.display()),
            }
        }
        props
    }
}

/// Parse a single property file body.
///
/// # Examples
///
/// ```
/// use netbpfload::probe::props::parse_props;
///
/// let props = parse_props("ro.build.type=user\n# c\nimport /x\n");
/// assert_eq!(props.get("ro.build.type"), Some("user"));
/// assert_eq!(props.get("import /x"), None);
/// ```
pub fn parse_props(text: &str) -> BuildProps {
    let mut props = BuildProps::default();
    props.merge_text(text);
    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_key_values() {
        let props = parse_props("ro.build.version.sdk = 35\n=junk\nro.empty=\n");
        assert_eq!(props.get("ro.build.version.sdk"), Some("35"));
        assert_eq!(props.get("ro.empty"), Some(""));
        assert_eq!(props.get(""), None);
    }

    #[test]
    fn first_file_wins() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.prop");
        let b = dir.path().join("b.prop");
        fs::write(&a, "ro.build.type=user\n").unwrap();
        fs::write(&b, "ro.build.type=eng\nro.build.version.sdk=34\n").unwrap();
        let missing = dir.path().join("missing.prop");
        let props = BuildProps::load(&[missing, a, b]);
        assert_eq!(props.get("ro.build.type"), Some("user"));
        assert_eq!(props.get("ro.build.version.sdk"), Some("34"));
    }
}
