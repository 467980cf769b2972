//! Process adapter for the xacro template compiler.

use gzspawn_core::{SpawnError, SpawnResult, TemplateCompiler};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Runs the `xacro` executable on a template description.
pub struct XacroCompiler;

impl TemplateCompiler for XacroCompiler {
    fn compile(&self, template: &Path, args: &[String], output: &Path) -> SpawnResult<()> {
        let mut cmd = Command::new("xacro");
        cmd.arg("-o").arg(output).arg(template).args(args);
        debug!(?cmd, "compiling template description");

        let out = cmd.output()?;
        if !out.status.success() {
            return Err(SpawnError::TemplateCompile(
                String::from_utf8_lossy(&out.stderr).into_owned(),
            ));
        }
        Ok(())
    }
}
