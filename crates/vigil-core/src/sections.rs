//! Marketplace section vocabulary.
//!
//! Maps the human-readable section labels shown to users onto the short
//! codes the site uses in its search URLs. The set is fixed; a saved
//! search whose section label is not listed here cannot produce a crawl
//! URL.

/// Section label to site search-path code, in display order.
const SECTIONS: &[(&str, &str)] = &[
    ("all", "sss"),
    ("antiques", "ata"),
    ("appliances", "ppa"),
    ("arts+crafts", "ara"),
    ("atvs/utvs/snow", "sna"),
    ("auto parts", "pta"),
    ("auto wheels & tires", "wta"),
    ("aviation", "ava"),
    ("baby+kids", "baa"),
    ("barter", "bar"),
    ("beauty+hlth", "haa"),
    ("bike parts", "bip"),
    ("bikes", "bia"),
    ("boat parts", "bpa"),
    ("boats", "boo"),
    ("books", "bka"),
    ("business", "bfa"),
    ("cars+trucks", "cta"),
    ("cds/dvd/vhs", "ema"),
    ("cell phones", "moa"),
    ("clothes+acc", "cla"),
    ("collectibles", "cba"),
    ("computer parts", "syp"),
    ("computers", "sya"),
    ("electronics", "ela"),
    ("farm+garden", "gra"),
    ("free stuff", "zip"),
    ("furniture", "fua"),
    ("garage sales", "gms"),
    ("general", "foa"),
    ("heavy equipment", "hva"),
    ("household", "hsa"),
    ("jewerly", "jwa"),
    ("materials", "maa"),
    ("motorcycle parts", "mpa"),
    ("motorcycles", "mca"),
    ("music instr", "msa"),
    ("photo+video", "pha"),
    ("RVs", "rva"),
    ("sporting", "sga"),
    ("tickets", "tia"),
    ("tools", "tla"),
    ("toys+games", "taa"),
    ("trailers", "tra"),
    ("video gaming", "vga"),
    ("wanted", "waa"),
];

/// Resolve a section label to its site search-path code.
///
/// Returns `None` for labels outside the fixed vocabulary.
#[must_use]
pub fn section_code(label: &str) -> Option<&'static str> {
    SECTIONS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, code)| *code)
}

/// All known section labels, in display order.
///
/// Consumed by the configuration UI to populate its section picker.
#[must_use]
pub fn section_labels() -> impl Iterator<Item = &'static str> {
    SECTIONS.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sections_resolve() {
        assert_eq!(section_code("all"), Some("sss"));
        assert_eq!(section_code("cars+trucks"), Some("cta"));
        assert_eq!(section_code("video gaming"), Some("vga"));
    }

    #[test]
    fn test_unknown_section_is_none() {
        assert_eq!(section_code("does-not-exist"), None);
        assert_eq!(section_code(""), None);
        // Labels are case-sensitive
        assert_eq!(section_code("All"), None);
    }

    #[test]
    fn test_labels_cover_vocabulary() {
        let labels: Vec<_> = section_labels().collect();
        assert_eq!(labels.len(), 46);
        assert_eq!(labels.first(), Some(&"all"));
        assert!(labels.contains(&"free stuff"));

        for label in labels {
            assert!(section_code(label).is_some());
        }
    }
}
