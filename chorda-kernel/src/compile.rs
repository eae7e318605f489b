//! The compilation pipeline facade: preprocess, parse, transform.

use std::collections::HashMap;
use std::path::Path;

use chorda_api::MenuConfig;
use tracing::debug;

use crate::chord::ChordTree;
use crate::error::ChordError;
use crate::parser::Parser;
use crate::{preprocessor, transform};

/// A compiled menu: the chord tree plus whatever the source defined along
/// the way.
#[derive(Debug)]
pub struct Compilation {
    pub tree: ChordTree,
    pub user_vars: HashMap<String, String>,
}

/// Compile `.wks` source into an immutable chord tree. Directives in the
/// source update `config` in place; `source_path` is used for `:include`
/// resolution and diagnostics (`None` for stdin scripts).
pub fn compile(
    source: &str,
    source_path: Option<&Path>,
    config: &mut MenuConfig,
) -> Result<Compilation, ChordError> {
    let filepath = source_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    let processed = preprocessor::run(source, source_path)?;
    debug!(file = %filepath, bytes = processed.len(), "preprocessed source");

    let output = Parser::new(&processed, &filepath, config).parse()?;

    let mut chords = output.chords;
    transform::transform(&mut chords, config, &output.user_vars, &filepath)?;

    let tree = ChordTree::new(chords);
    debug!(chords = tree.count(), "compiled chord tree");

    Ok(Compilation {
        tree,
        user_vars: output.user_vars,
    })
}
