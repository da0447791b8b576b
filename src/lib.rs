//! SWC plugin that stamps `[file:line:col] ` onto log intrinsics and thrown messages.
//!
//! - `$print(..)` / `$warn(..)` become `print("[tag] ", ..)` / `warn("[tag] ", ..)`
//! - `$debug(x)` becomes `debugPrint("[tag] x = ", x)`
//! - `throw "msg"`, `` throw `msg ${v}` `` and `throw err` get the tag prepended

use std::sync::Arc;

use swc_core::{
    common::SourceMapper,
    ecma::{ast::Program, visit::VisitMutWith},
    plugin::{
        metadata::TransformPluginMetadataContextKind, plugin_transform,
        proxies::TransformPluginProgramMetadata,
    },
};

pub mod config;
pub mod location;
pub mod transform;

pub use config::PluginConfig;
pub use transform::LocationTagger;

// -----------------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------------

#[plugin_transform]
pub fn process_transform(mut program: Program, metadata: TransformPluginProgramMetadata) -> Program {
    let config = PluginConfig::from_json(metadata.get_transform_plugin_config().as_deref());

    // The plugin sandbox cwd is not the project root; ask the host for it.
    let base_dir = config
        .base_dir
        .or_else(|| metadata.get_context(&TransformPluginMetadataContextKind::Cwd));

    let source_map: Option<Arc<dyn SourceMapper>> = Some(Arc::new(metadata.source_map));

    let mut tagger = LocationTagger::new(source_map, base_dir, config.debug_callee);
    program.visit_mut_with(&mut tagger);

    program
}
