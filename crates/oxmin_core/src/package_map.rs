use log::trace;
use sourcemap::{SourceMap, SourceMapBuilder};

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Space,
    Word,
    Punct,
}

fn classify(ch: char) -> CharClass {
    if ch.is_whitespace() {
        CharClass::Space
    } else if ch.is_alphanumeric() || ch == '_' || ch == '$' {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

/// Builds an identity source map for `content` living at `path` in the bundle.
///
/// Every non-empty line gets a mapping at column 0, plus one at the start of
/// each identifier/number run and each punctuation character, all pointing at
/// the same line and column in `path`. The original text is inlined as the
/// source's content. Columns are UTF-16 code units.
pub fn synthesize(content: &str, path: &str) -> SourceMap {
    let mut builder = SourceMapBuilder::new(Some(path));
    let src_id = builder.add_source(path);
    builder.set_source_contents(src_id, Some(content));

    let mut mappings = 0usize;
    for (line_idx, line) in content.split('\n').enumerate() {
        let line_no = line_idx as u32;
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }

        builder.add_raw(line_no, 0, line_no, 0, Some(src_id), None, false);
        mappings += 1;

        let mut col = 0u32;
        let mut prev = CharClass::Space;
        for ch in line.chars() {
            let class = classify(ch);
            let starts_token = match class {
                CharClass::Space => false,
                CharClass::Word => prev != CharClass::Word,
                CharClass::Punct => true,
            };
            if starts_token && col > 0 {
                builder.add_raw(line_no, col, line_no, col, Some(src_id), None, false);
                mappings += 1;
            }
            prev = class;
            col += ch.len_utf16() as u32;
        }
    }

    trace!("Synthesized identity map for {} with {} mappings", path, mappings);
    builder.into_sourcemap()
}
