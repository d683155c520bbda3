use crate::widths::PRINTABLE;

// A bfchar block may hold at most 100 entries.
const MAX_BFCHAR_ENTRIES: usize = 100;

const CMAP_HEADER: &str = "/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS)
/Supplement 0
>> def
";

const CMAP_FOOTER: &str = "endcmap
CMapName currentdict /CMap defineresource pop
end
end
";

/// Builds a ToUnicode CMap that maps each single-byte code to the UTF-16 code
/// unit with the same value. That identity only holds for Basic Latin, which is
/// all the label font exposes.
///
/// When `pairs` is empty the whole printable ASCII range is mapped instead.
pub fn to_unicode_cmap<I, G>(pairs: I, name: &str) -> String
where
    I: IntoIterator<Item = (u8, G)>,
{
    let mut codes: Vec<u8> = pairs.into_iter().map(|(code, _)| code).collect();
    if codes.is_empty() {
        codes = PRINTABLE.collect();
    }

    let mut out = String::from(CMAP_HEADER);
    out.push_str(&format!("/CMapName /{} def\n", name));
    out.push_str("/CMapType 2 def\n");
    out.push_str("1 begincodespacerange\n<00> <FF>\nendcodespacerange\n");

    for chunk in codes.chunks(MAX_BFCHAR_ENTRIES) {
        out.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for code in chunk {
            out.push_str(&format!("<{:02X}> <{:04X}>\n", code, code));
        }
        out.push_str("endbfchar\n");
    }

    out.push_str(CMAP_FOOTER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(cmap: &str) -> Vec<&str> {
        cmap.lines()
            .filter(|line| line.len() == 11 && line.starts_with('<'))
            .collect()
    }

    #[test]
    fn each_pair_becomes_one_identity_entry() {
        let cmap = to_unicode_cmap([(b'A', 36u16), (b'z', 93u16)], "CUSTOM+Example");
        assert!(cmap.contains("/CMapName /CUSTOM+Example def"));
        assert!(cmap.contains("1 begincodespacerange\n<00> <FF>\nendcodespacerange"));
        assert!(cmap.contains("2 beginbfchar\n<41> <0041>\n<7A> <007A>\nendbfchar"));
    }

    #[test]
    fn empty_input_maps_printable_ascii() {
        let cmap = to_unicode_cmap(Vec::<(u8, u16)>::new(), "CUSTOM+CustomFont");
        assert!(cmap.contains("95 beginbfchar"));
        let lines = entries(&cmap);
        assert_eq!(lines.len(), 95);
        assert_eq!(lines[0], "<20> <0020>");
        assert_eq!(lines[94], "<7E> <007E>");
        for line in lines {
            let (code, unicode) = line.split_once(' ').unwrap();
            let code = u32::from_str_radix(&code[1..3], 16).unwrap();
            let unicode = u32::from_str_radix(&unicode[1..5], 16).unwrap();
            assert_eq!(code, unicode);
        }
    }

    #[test]
    fn large_inputs_are_split_into_blocks() {
        let pairs: Vec<(u8, ())> = (0..=255u8).map(|code| (code, ())).collect();
        let cmap = to_unicode_cmap(pairs, "X");
        assert_eq!(cmap.matches("beginbfchar").count(), 3);
        assert!(cmap.contains("100 beginbfchar"));
        assert!(cmap.contains("56 beginbfchar"));
        assert!(cmap.contains("<FF> <00FF>"));
    }

    #[test]
    fn parses_as_a_cmap() {
        let cmap = to_unicode_cmap([(b'L', 0u16), (b'O', 0u16)], "CUSTOM+Test");
        let map = adobe_cmap_parser::get_unicode_map(cmap.as_bytes()).unwrap();
        assert_eq!(map.get(&0x4c), Some(&vec![0x00, 0x4c]));
        assert_eq!(map.get(&0x4f), Some(&vec![0x00, 0x4f]));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn resource_is_framed_by_header_and_footer() {
        let cmap = to_unicode_cmap([(b'A', 0u16)], "F");
        assert!(cmap.starts_with("/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n"));
        assert!(cmap.contains(">> def\n/CMapName /F def\n/CMapType 2 def\n"));
        assert!(cmap.ends_with("endbfchar\nendcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n"));
    }

    #[test]
    fn output_is_deterministic() {
        let a = to_unicode_cmap(Vec::<(u8, u16)>::new(), "N");
        let b = to_unicode_cmap(Vec::<(u8, u16)>::new(), "N");
        assert_eq!(a, b);
    }
}
