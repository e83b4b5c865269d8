// File: src/services/region.rs
//
// The bot only recommends places in northern Thailand.

/// Name of the supported region. Also the default destination.
pub const REGION_NAME: &str = "ภาคเหนือ";

pub const NORTHERN_PROVINCES: [&str; 9] = [
    "เชียงใหม่",
    "เชียงราย",
    "ลำปาง",
    "ลำพูน",
    "แม่ฮ่องสอน",
    "น่าน",
    "พะเยา",
    "แพร่",
    "อุตรดิตถ์",
];

/// The first province named anywhere in `text`, case-insensitively.
pub fn matching_province(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    NORTHERN_PROVINCES
        .iter()
        .copied()
        .find(|p| lowered.contains(&p.to_lowercase()))
}

/// Whether recommendations may be given for `destination`.
pub fn is_supported_destination(destination: &str) -> bool {
    matching_province(destination).is_some()
        || destination.to_lowercase().contains(&REGION_NAME.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provinces_and_region_pass() {
        assert!(is_supported_destination("เชียงใหม่"));
        assert!(is_supported_destination("ตัวเมืองน่าน"));
        assert!(is_supported_destination(REGION_NAME));
        assert_eq!(matching_province("เที่ยวแม่ฮ่องสอน 3 วัน"), Some("แม่ฮ่องสอน"));
    }

    #[test]
    fn other_regions_fail() {
        assert!(!is_supported_destination("กรุงเทพ"));
        assert!(!is_supported_destination("ภูเก็ต"));
        assert!(!is_supported_destination(""));
    }
}
