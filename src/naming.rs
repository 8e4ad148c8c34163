//! Name derivation for entities and properties.

/// Segment dropped from `$id` values when deriving type names.
const SECTION_SEGMENT: &str = "section";

/// Number of leading `$id` segments (`cper-json`) that carry no type name.
const ID_PREFIX_SEGMENTS: usize = 2;

/// Derive a type name from a CPER schema `$id`.
///
/// The id is split on `-`, the leading `cper-json` segments and any
/// `section` segment are dropped, and the remaining segments are title-cased
/// and concatenated:
///
/// - `"cper-json-firmware-error-section"` → `"FirmwareError"`
/// - `"cper-json-error-status"` → `"ErrorStatus"`
/// - `"cper-json-x86ia32-processor-section"` → `"X86Ia32Processor"`
pub fn format_id(id: &str) -> String {
    id.split('-')
        .skip(ID_PREFIX_SEGMENTS)
        .filter(|segment| *segment != SECTION_SEGMENT)
        .map(title_case)
        .collect()
}

/// Title-case a word: a letter that follows a non-letter (or starts the
/// word) is upper-cased, every other letter is lower-cased.
///
/// Digits count as word breaks, so `"x86ia32"` becomes `"X86Ia32"`.
pub fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_letter = false;
    for c in word.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

/// Upper-case the first character, leaving the rest untouched.
///
/// `"validationBits"` → `"ValidationBits"`, `"NvidiaCPER"` → `"NvidiaCPER"`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().to_string() + chars.as_str(),
    }
}
