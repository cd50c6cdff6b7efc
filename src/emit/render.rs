//! C text rendering of an [`ArtifactSet`].
//!
//! The header only sees declarations and the source only definitions. Both
//! are rendered from the same set, so symbol names, element types and
//! shapes cannot diverge. Comments are documentation only.

use super::artifact::{ArraySymbol, ArtifactSet, Shape};

/// Values per line inside a table row.
const VALUES_PER_LINE: usize = 16;

/// File name of the declarations artifact.
pub const HEADER_FILE_NAME: &str = "lwb_constants.h";

/// File name of the definitions artifact.
pub const SOURCE_FILE_NAME: &str = "lwb_constants.c";

const INCLUDE_GUARD: &str = "LWB_CONSTANTS_H";

/// Rendered declaration/definition texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPair {
    pub header: String,
    pub source: String,
}

fn banner(file_name: &str, fingerprint: &str) -> String {
    format!(
        "/*\n * {}\n *\n * Generated by lwb-constgen {}. Do not edit.\n * Configuration sha256: {}\n */\n",
        file_name,
        env!("CARGO_PKG_VERSION"),
        fingerprint
    )
}

fn dimensions(shape: Shape) -> String {
    match shape {
        Shape::Vector => "[]".to_string(),
        Shape::Table { columns } => format!("[][{}]", columns),
    }
}

fn join(values: &[i64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the declarations artifact.
pub fn render_header(set: &ArtifactSet, fingerprint: &str) -> String {
    let mut out = banner(HEADER_FILE_NAME, fingerprint);
    out.push_str(&format!("\n#ifndef {}\n#define {}\n\n", INCLUDE_GUARD, INCLUDE_GUARD));
    out.push_str("#include <stdint.h>\n\n");

    for define in &set.defines {
        match &define.comment {
            Some(comment) => out.push_str(&format!(
                "#define {} {} /* {} */\n",
                define.name, define.value, comment
            )),
            None => out.push_str(&format!("#define {} {}\n", define.name, define.value)),
        }
    }

    out.push('\n');
    for declaration in set.declarations() {
        out.push_str(&format!(
            "extern const {} {}{};\n",
            declaration.element_type.c_name(),
            declaration.name,
            dimensions(declaration.shape)
        ));
    }

    out.push_str(&format!("\n#endif /* {} */\n", INCLUDE_GUARD));
    out
}

fn render_array(out: &mut String, array: &ArraySymbol) {
    if let Some(note) = &array.note {
        out.push_str(&format!("/* {} */\n", note));
    }
    out.push_str(&format!(
        "const {} {}{} = {{",
        array.element_type.c_name(),
        array.name,
        dimensions(array.shape)
    ));

    match array.shape {
        Shape::Vector if array.labels.len() == array.values.len() => {
            out.push('\n');
            for (value, label) in array.values.iter().zip(&array.labels) {
                out.push_str(&format!("    {}, /* {} */\n", value, label));
            }
        }
        Shape::Vector => out.push_str(&join(&array.values)),
        Shape::Table { .. } => {
            out.push('\n');
            for (index, row) in array.rows().into_iter().enumerate() {
                match array.labels.get(index) {
                    Some(label) => out.push_str(&format!("    {{ /* {} */\n", label)),
                    None => out.push_str("    {\n"),
                }
                for chunk in row.chunks(VALUES_PER_LINE) {
                    out.push_str(&format!("        {},\n", join(chunk)));
                }
                out.push_str("    },\n");
            }
        }
    }

    out.push_str("};\n");
}

/// Render the definitions artifact.
pub fn render_source(set: &ArtifactSet, fingerprint: &str) -> String {
    let mut out = banner(SOURCE_FILE_NAME, fingerprint);
    out.push_str(&format!("\n#include \"{}\"\n", HEADER_FILE_NAME));

    for array in &set.arrays {
        out.push('\n');
        render_array(&mut out, array);
    }
    out
}

/// Render both artifacts.
pub fn render(set: &ArtifactSet, fingerprint: &str) -> ArtifactPair {
    ArtifactPair {
        header: render_header(set, fingerprint),
        source: render_source(set, fingerprint),
    }
}
