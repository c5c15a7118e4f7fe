use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Fuel station operators the finder knows how to filter by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BrandTag {
    #[serde(rename = "MOL")]
    Mol,
    Shell,
    #[serde(rename = "OMV")]
    Omv,
    Oplus,
}

impl BrandTag {
    /// Canonical list order. Classification tie-breaks follow this order
    /// unless the station config supplies a different one.
    pub const ALL: [BrandTag; 4] = [BrandTag::Mol, BrandTag::Shell, BrandTag::Omv, BrandTag::Oplus];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BrandTag::Mol => "MOL",
            BrandTag::Shell => "Shell",
            BrandTag::Omv => "OMV",
            BrandTag::Oplus => "Oplus",
        }
    }
}

impl std::fmt::Display for BrandTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrandTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BrandTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownBrand(s.to_string()))
    }
}

/// Maps a station display name to a brand by case-insensitive substring match.
///
/// Brands are tested in list order and the first hit wins, so a name such as
/// "Shell OMV Express" resolves to whichever of the two comes first.
#[derive(Debug, Clone)]
pub struct BrandClassifier {
    order: Vec<(BrandTag, String)>,
}

impl BrandClassifier {
    #[must_use]
    pub fn new(order: &[BrandTag]) -> Self {
        Self {
            order: order
                .iter()
                .map(|tag| (*tag, tag.as_str().to_uppercase()))
                .collect(),
        }
    }

    #[must_use]
    pub fn classify(&self, name: &str) -> Option<BrandTag> {
        let upper = name.to_uppercase();
        self.order
            .iter()
            .find(|(_, needle)| upper.contains(needle.as_str()))
            .map(|(tag, _)| *tag)
    }

    /// Brands in classification order.
    pub fn brands(&self) -> impl Iterator<Item = BrandTag> + '_ {
        self.order.iter().map(|(tag, _)| *tag)
    }
}

impl Default for BrandClassifier {
    fn default() -> Self {
        Self::new(&BrandTag::ALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_brand_inside_longer_name() {
        let classifier = BrandClassifier::default();
        assert_eq!(classifier.classify("MOL Szeged Tesco"), Some(BrandTag::Mol));
    }

    #[test]
    fn unknown_operator_has_no_tag() {
        let classifier = BrandClassifier::default();
        assert_eq!(classifier.classify("Family Market"), None);
    }

    #[test]
    fn match_is_case_insensitive() {
        let classifier = BrandClassifier::default();
        assert_eq!(classifier.classify("shell budaörs"), Some(BrandTag::Shell));
        assert_eq!(classifier.classify("oplus m0"), Some(BrandTag::Oplus));
    }

    #[test]
    fn ambiguous_name_resolves_to_earlier_brand() {
        let classifier = BrandClassifier::default();
        assert_eq!(classifier.classify("OMV / Shell shared forecourt"), Some(BrandTag::Shell));

        let reordered = BrandClassifier::new(&[BrandTag::Omv, BrandTag::Shell]);
        assert_eq!(reordered.classify("OMV / Shell shared forecourt"), Some(BrandTag::Omv));
    }

    #[test]
    fn narrowed_list_ignores_unlisted_brands() {
        let classifier = BrandClassifier::new(&[BrandTag::Mol]);
        assert_eq!(classifier.classify("Shell Vác"), None);
    }

    #[test]
    fn parse_brand_tag_ignores_case() {
        assert_eq!("mol".parse::<BrandTag>().unwrap(), BrandTag::Mol);
        assert_eq!(" Oplus ".parse::<BrandTag>().unwrap(), BrandTag::Oplus);
        assert!(matches!(
            "Lukoil".parse::<BrandTag>(),
            Err(CoreError::UnknownBrand(ref s)) if s == "Lukoil"
        ));
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&BrandTag::Omv).unwrap();
        assert_eq!(json, "\"OMV\"");
        let tag: BrandTag = serde_json::from_str("\"MOL\"").unwrap();
        assert_eq!(tag, BrandTag::Mol);
    }
}
