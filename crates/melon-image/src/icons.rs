//! Fixed platform icon table
//!
//! Symbolic icons are referenced by short name (`alert`) or by their long
//! platform resource name (`ic_dialog_alert`). Lookups are case-insensitive.

use serde::Serialize;

/// A built-in platform icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlatformIcon {
    /// Short name
    pub name: &'static str,
    /// Platform resource name
    pub resource: &'static str,
    /// Platform resource code
    pub code: u32,
}

const PLATFORM_ICONS: &[PlatformIcon] = &[
    icon("alert", "ic_dialog_alert", 0x0108_0027),
    icon("info", "ic_dialog_info", 0x0108_0028),
    icon("email", "ic_dialog_email", 0x0108_0029),
    icon("map", "ic_dialog_map", 0x0108_002a),
    icon("dialer", "ic_dialog_dialer", 0x0108_002b),
    icon("call", "ic_menu_call", 0x0108_002c),
    icon("camera", "ic_menu_camera", 0x0108_002d),
    icon("delete", "ic_menu_delete", 0x0108_002e),
    icon("edit", "ic_menu_edit", 0x0108_002f),
    icon("help", "ic_menu_help", 0x0108_0030),
    icon("search", "ic_menu_search", 0x0108_0031),
    icon("send", "ic_menu_send", 0x0108_0032),
    icon("share", "ic_menu_share", 0x0108_0033),
    icon("star_on", "star_on", 0x0108_0034),
    icon("star_off", "star_off", 0x0108_0035),
    icon("upload", "stat_sys_upload", 0x0108_0036),
    icon("download", "stat_sys_download", 0x0108_0037),
    icon("notify_error", "stat_notify_error", 0x0108_0038),
    icon("notify_sync", "stat_notify_sync", 0x0108_0039),
];

const fn icon(name: &'static str, resource: &'static str, code: u32) -> PlatformIcon {
    PlatformIcon {
        name,
        resource,
        code,
    }
}

/// Lookup table for symbolic icons
#[derive(Debug, Clone, Copy)]
pub struct IconTable {
    icons: &'static [PlatformIcon],
}

impl IconTable {
    /// The fixed platform icon table
    #[inline]
    #[must_use]
    pub fn platform() -> Self {
        Self {
            icons: PLATFORM_ICONS,
        }
    }

    /// Find icon by short or resource name
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<PlatformIcon> {
        let name = name.trim();
        self.icons
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name) || i.resource.eq_ignore_ascii_case(name))
            .copied()
    }

    /// The default small icon
    #[inline]
    #[must_use]
    pub fn alert() -> PlatformIcon {
        PLATFORM_ICONS[0]
    }

    /// Number of icons in the table
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    /// Check if table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

impl Default for IconTable {
    fn default() -> Self {
        Self::platform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_short_and_resource_names() {
        let table = IconTable::platform();
        let short = table.lookup("alert").unwrap();
        let long = table.lookup("IC_DIALOG_ALERT").unwrap();
        assert_eq!(short, long);
        assert_eq!(short, IconTable::alert());
    }

    #[test]
    fn lookup_unknown() {
        assert!(IconTable::platform().lookup("no_such_icon").is_none());
    }

    #[test]
    fn names_are_unique() {
        let table = IconTable::platform();
        for icon in PLATFORM_ICONS {
            assert_eq!(table.lookup(icon.name), Some(*icon));
        }
    }
}
