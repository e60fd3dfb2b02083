//! Script concatenation with an optional line-level source map.

use anyhow::{Result, anyhow};
use parcel_sourcemap::{OriginalLocation, SourceMap};

/// One input file: display name (relative path) and content.
pub struct ConcatInput<'a> {
    pub name: &'a str,
    pub content: &'a str,
}

/// Joined code and, when requested, the map JSON.
#[derive(Debug)]
pub struct Concatenated {
    pub code: String,
    pub map: Option<String>,
}

/// Join files with `\n`, recording each source line's generated position.
pub fn concat(inputs: &[ConcatInput<'_>], with_map: bool) -> Result<Concatenated> {
    let code = inputs
        .iter()
        .map(|input| input.content)
        .collect::<Vec<_>>()
        .join("\n");

    if !with_map {
        return Ok(Concatenated { code, map: None });
    }

    let mut map = SourceMap::new("/");
    let mut generated_line = 0u32;
    for input in inputs {
        let source = map.add_source(input.name);
        map.set_source_content(source as usize, input.content)
            .map_err(|e| anyhow!("source map: {e:?}"))?;

        let lines = input.content.split('\n').count() as u32;
        for line in 0..lines {
            map.add_mapping(
                generated_line + line,
                0,
                Some(OriginalLocation::new(line, 0, source, None)),
            );
        }
        generated_line += lines;
    }

    let json = map.to_json(None).map_err(|e| anyhow!("source map: {e:?}"))?;
    Ok(Concatenated {
        code,
        map: Some(json),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> Vec<ConcatInput<'static>> {
        vec![
            ConcatInput {
                name: "a.js",
                content: "var a = 1;\nvar b = 2;",
            },
            ConcatInput {
                name: "lib/c.js",
                content: "var c = 3;\n",
            },
        ]
    }

    #[test]
    fn test_joined_with_newline() {
        let out = concat(&inputs(), false).unwrap();
        assert_eq!(out.code, "var a = 1;\nvar b = 2;\nvar c = 3;\n");
        assert!(out.map.is_none());
    }

    #[test]
    fn test_map_lists_sources() {
        let out = concat(&inputs(), true).unwrap();
        let map: serde_json::Value = serde_json::from_str(&out.map.unwrap()).unwrap();
        assert_eq!(map["version"], 3);
        let sources: Vec<&str> = map["sources"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s.as_str().unwrap())
            .collect();
        assert_eq!(sources.len(), 2);
        assert!(sources[1].ends_with("lib/c.js"));
        assert!(!map["mappings"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_empty_input() {
        let out = concat(&[], false).unwrap();
        assert!(out.code.is_empty());
    }
}
