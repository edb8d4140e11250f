use std::collections::HashMap;

use log::{debug, trace};
use sourcemap::{SourceMap, SourceMapBuilder};

/// Where a generated position came from, according to some source map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalPosition {
    pub source: Option<String>,
    pub source_id: Option<u32>,
    pub line: u32,
    pub column: u32,
    pub name: Option<String>,
}

/// Resolves a generated position through `map`.
///
/// Uses the closest mapping at or before the position on the same generated
/// line and shifts its original column by the remaining distance, so a
/// position inside a mapped token lands inside the original token too.
/// Returns `None` when nothing on that line maps to a source.
pub fn original_position(map: &SourceMap, line: u32, column: u32) -> Option<OriginalPosition> {
    let token = map.lookup_token(line, column)?;
    if token.get_dst_line() != line || !token.has_source() {
        return None;
    }

    let offset = column - token.get_dst_col();
    Some(OriginalPosition {
        source: token.get_source().map(str::to_string),
        source_id: Some(token.get_src_id()),
        line: token.get_src_line(),
        column: token.get_src_col() + offset,
        name: if offset == 0 { token.get_name().map(str::to_string) } else { None },
    })
}

/// Chains two maps: `generated` maps minified code back to the input file and
/// `input` maps the input file back to its original sources. The result maps
/// minified code straight to the original sources.
///
/// Mappings of `generated` that do not land anywhere in `input` are dropped.
/// With `inline_sources`, the original sources' contents are copied over.
pub fn compose(
    generated: &SourceMap,
    input: &SourceMap,
    file: Option<&str>,
    inline_sources: bool,
) -> SourceMap {
    let mut builder = SourceMapBuilder::new(file);
    let mut source_ids: HashMap<u32, u32> = HashMap::new();
    let mut dropped = 0usize;

    for token in generated.tokens() {
        if !token.has_source() {
            continue;
        }

        let Some(orig) = original_position(input, token.get_src_line(), token.get_src_col())
        else {
            dropped += 1;
            continue;
        };
        let (Some(source), Some(input_id)) = (orig.source.as_deref(), orig.source_id) else {
            dropped += 1;
            continue;
        };

        let src_id = *source_ids.entry(input_id).or_insert_with(|| {
            let id = builder.add_source(source);
            if inline_sources {
                builder.set_source_contents(id, input.get_source_contents(input_id));
            }
            id
        });
        let name_id = token.get_name().or(orig.name.as_deref()).map(|n| builder.add_name(n));

        builder.add_raw(
            token.get_dst_line(),
            token.get_dst_col(),
            orig.line,
            orig.column,
            Some(src_id),
            name_id,
            false,
        );
    }

    if dropped > 0 {
        debug!("Dropped {} mappings that have no original position", dropped);
    }
    trace!("Composed map with {} sources", source_ids.len());
    builder.into_sourcemap()
}

/// Serializes a map to its JSON text.
pub fn map_to_json(map: &SourceMap) -> anyhow::Result<String> {
    let mut out = Vec::new();
    map.to_writer(&mut out)?;
    Ok(String::from_utf8(out)?)
}
