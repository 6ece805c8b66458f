// ── Device list ordering ──
//
// Type-aware, stable ordering of device records by one selectable field.
// Sorting never touches the source list; callers get a fresh ordering of
// borrowed records, so concurrent renders of the same snapshot agree.

use std::cmp::Ordering;
use std::net::IpAddr;

use icu_collator::{Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::warn;

use crate::model::DeviceRecord;

/// Sortable device columns.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SortField {
    Name,
    #[strum(to_string = "address", serialize = "ip")]
    Address,
    #[strum(to_string = "downloaded", serialize = "download")]
    Downloaded,
    #[strum(to_string = "uploaded", serialize = "upload")]
    Uploaded,
    #[default]
    #[strum(to_string = "download-rate", serialize = "download-speed")]
    DownloadRate,
    #[strum(to_string = "upload-rate", serialize = "upload-speed")]
    UploadRate,
}

impl SortField {
    /// Text-like fields start ascending; counters start descending.
    pub fn default_direction(self) -> SortDirection {
        match self {
            Self::Name | Self::Address => SortDirection::Ascending,
            Self::Downloaded | Self::Uploaded | Self::DownloadRate | Self::UploadRate => {
                SortDirection::Descending
            }
        }
    }

    /// Short column header.
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Address => "Address",
            Self::Downloaded => "Downloaded",
            Self::Uploaded => "Uploaded",
            Self::DownloadRate => "↓ Rate",
            Self::UploadRate => "↑ Rate",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[strum(serialize = "asc")]
    Ascending,
    #[default]
    #[strum(serialize = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// Active sort column and direction. Lives in UI state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Selecting the active field flips direction; selecting another field
    /// switches to it in its natural direction.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = field.default_direction();
        }
    }
}

// ── Keys ───────────────────────────────────────────────────────────

/// Normalized name key: trimmed, case-folded, domain suffix stripped.
/// Missing names sort as the empty string.
pub fn name_key(name: Option<&str>) -> String {
    let trimmed = name.map(str::trim).unwrap_or_default();
    let host = trimmed.split('.').next().unwrap_or_default();
    host.to_lowercase()
}

/// Numeric address key. IPv4 occupies the low 32 bits, so all IPv4
/// addresses sort before IPv6. Missing addresses sort as zero.
pub fn address_key(ip: Option<IpAddr>) -> u128 {
    match ip {
        Some(IpAddr::V4(v4)) => u128::from(u32::from(v4)),
        Some(IpAddr::V6(v6)) => u128::from(v6),
        None => 0,
    }
}

/// Locale-aware comparison of name keys using the root collation at
/// secondary strength: accents are significant, case is not. Falls back
/// to code-point order if the collation data cannot be loaded.
pub struct NameCollator {
    collator: Option<Collator>,
}

impl NameCollator {
    pub fn new() -> Self {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        let collator = match Collator::try_new(&Default::default(), options) {
            Ok(collator) => Some(collator),
            Err(e) => {
                warn!(error = %e, "collation unavailable; names sort by code point");
                None
            }
        };
        Self { collator }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }
}

impl Default for NameCollator {
    fn default() -> Self {
        Self::new()
    }
}

fn compare_counters(a: &DeviceRecord, b: &DeviceRecord, field: SortField) -> Ordering {
    match field {
        SortField::Address => address_key(a.ip).cmp(&address_key(b.ip)),
        SortField::Downloaded => a.downloaded.cmp(&b.downloaded),
        SortField::Uploaded => a.uploaded.cmp(&b.uploaded),
        SortField::DownloadRate => a.download_rate.cmp(&b.download_rate),
        SortField::UploadRate => a.upload_rate.cmp(&b.upload_rate),
        // Names go through the precomputed-key path
        SortField::Name => Ordering::Equal,
    }
}

/// Order `devices` by `spec`. Equal keys keep their input order.
pub fn sort_devices<'a>(devices: &'a [DeviceRecord], spec: SortSpec) -> Vec<&'a DeviceRecord> {
    let mut ordered: Vec<&DeviceRecord> = devices.iter().collect();
    match spec.field {
        // Precompute name keys once instead of re-normalizing per comparison.
        SortField::Name => {
            let collator = NameCollator::new();
            let mut keyed: Vec<(String, &DeviceRecord)> = ordered
                .into_iter()
                .map(|d| (name_key(d.name.as_deref()), d))
                .collect();
            keyed.sort_by(|(ka, _), (kb, _)| directed(collator.compare(ka, kb), spec.direction));
            ordered = keyed.into_iter().map(|(_, d)| d).collect();
        }
        field => ordered.sort_by(|a, b| directed(compare_counters(a, b, field), spec.direction)),
    }
    ordered
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::model::MacAddress;

    fn named(mac: &str, name: Option<&str>, downloaded: u64) -> DeviceRecord {
        DeviceRecord {
            name: name.map(str::to_owned),
            downloaded,
            ..DeviceRecord::new(MacAddress::new(mac))
        }
    }

    fn macs(sorted: &[&DeviceRecord]) -> Vec<String> {
        sorted.iter().map(|d| d.mac.to_string()).collect()
    }

    #[test]
    fn sort_is_stable_for_equal_keys_descending() {
        let devices = [named("b", Some("b"), 1), named("a", Some("a"), 1)];
        let sorted = sort_devices(
            &devices,
            SortSpec::new(SortField::Downloaded, SortDirection::Descending),
        );
        assert_eq!(macs(&sorted), vec!["b", "a"]);
    }

    #[test]
    fn name_key_strips_case_and_domain() {
        assert_eq!(name_key(Some("Router.local")), name_key(Some("router")));
        assert_eq!(name_key(Some("  NAS.home.arpa ")), "nas");
        assert_eq!(name_key(None), "");
    }

    #[test]
    fn missing_names_sort_first_ascending() {
        let devices = [
            named("1", Some("zeta"), 0),
            named("2", None, 0),
            named("3", Some("Alpha.lan"), 0),
        ];
        let sorted = sort_devices(&devices, SortSpec::new(SortField::Name, SortDirection::Ascending));
        assert_eq!(macs(&sorted), vec!["2", "3", "1"]);
    }

    #[test]
    fn address_sorts_numerically() {
        let mut a = named("a", None, 0);
        a.ip = Some("10.0.0.10".parse().unwrap());
        let mut b = named("b", None, 0);
        b.ip = Some("10.0.0.9".parse().unwrap());
        let c = named("c", None, 0);

        let devices = [a, b, c];
        let sorted = sort_devices(
            &devices,
            SortSpec::new(SortField::Address, SortDirection::Ascending),
        );
        assert_eq!(macs(&sorted), vec!["c", "b", "a"]);
    }

    #[test]
    fn upload_rate_descending_orders_by_rate() {
        let mut a = named("a", None, 0);
        a.download_rate = 1000;
        a.upload_rate = 200;
        let mut b = named("b", None, 0);
        b.download_rate = 500;
        b.upload_rate = 900;

        let devices = [a, b];
        let sorted = sort_devices(
            &devices,
            SortSpec::new(SortField::UploadRate, SortDirection::Descending),
        );
        assert_eq!(macs(&sorted), vec!["b", "a"]);
    }

    #[test]
    fn source_list_is_untouched() {
        let devices = vec![named("a", None, 1), named("b", None, 2)];
        let before = devices.clone();
        let _ = sort_devices(&devices, SortSpec::default());
        assert_eq!(devices, before);
    }

    #[test]
    fn toggle_flips_then_resets() {
        let mut spec = SortSpec::new(SortField::DownloadRate, SortDirection::Descending);
        spec.toggle(SortField::DownloadRate);
        assert_eq!(spec.direction, SortDirection::Ascending);

        spec.toggle(SortField::Name);
        assert_eq!(spec, SortSpec::new(SortField::Name, SortDirection::Ascending));

        spec.toggle(SortField::Uploaded);
        assert_eq!(spec.direction, SortDirection::Descending);
    }

    #[test]
    fn fields_parse_from_cli_names() {
        assert_eq!(SortField::from_str("upload-rate").unwrap(), SortField::UploadRate);
        assert_eq!(SortField::from_str("IP").unwrap(), SortField::Address);
        assert_eq!(SortField::from_str("name").unwrap(), SortField::Name);
        assert!(SortField::from_str("colour").is_err());
    }

    #[test]
    fn accented_names_sort_with_their_base_letter() {
        let devices = [
            named("1", Some("zed"), 0),
            named("2", Some("Émile"), 0),
            named("3", Some("adam"), 0),
        ];
        let sorted = sort_devices(&devices, SortSpec::new(SortField::Name, SortDirection::Ascending));
        let names: Vec<_> = sorted.iter().filter_map(|d| d.name.as_deref()).collect();
        assert_eq!(names, vec!["adam", "Émile", "zed"]);
    }

    #[test]
    fn collation_ignores_case_but_not_accents() {
        let collator = NameCollator::new();
        assert_eq!(collator.compare("resume", "RESUME"), Ordering::Equal);
        assert_eq!(collator.compare("resume", "résumé"), Ordering::Less);
        assert_eq!(collator.compare("Öl", "zebra"), Ordering::Less);
    }
}
